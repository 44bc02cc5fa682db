//! Tool runner - manages and executes tools

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::Result;
use crate::error::Error;
use crate::google::ServiceProvider;
use super::Tool;
use super::docs::{CreateDocumentTool, ListDocumentsTool, ReadDocumentTool};

/// Tool definition as advertised by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Tool runner manages registered tools and executes them
///
/// Tools keep their registration order.
pub struct ToolRunner {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRunner {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Runner with the three Google Docs tools
    pub fn new_with_defaults(services: Arc<dyn ServiceProvider>) -> Self {
        let mut runner = Self::new();
        runner.register(ListDocumentsTool::new(services.clone()));
        runner.register(ReadDocumentTool::new(services.clone()));
        runner.register(CreateDocumentTool::new(services));
        runner
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Box::new(tool));
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, params: Value) -> Result<String> {
        let tool = self.tools.iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::Tool(format!("Unknown tool: {}", name)))?;

        tracing::debug!("Executing tool {}", name);
        tool.execute(params).await
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl Default for ToolRunner {
    fn default() -> Self {
        Self::new()
    }
}
