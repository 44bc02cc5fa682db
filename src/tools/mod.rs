//! Tools module - operations exposed to MCP clients
//!
//! Three tools cover Google Docs: `list_documents`, `read_document` and
//! `create_document`. Each asks a [`ServiceProvider`](crate::google::ServiceProvider)
//! for a client per call, so authentication happens lazily on first use.

mod runner;
mod docs;
pub mod operations;

pub use runner::{ToolRunner, ToolDefinition};
pub use docs::{CreateDocumentTool, ListDocumentsTool, ReadDocumentTool};
pub use operations::{CreatedDocument, DocumentRef};

use async_trait::async_trait;
use serde_json::Value;
use crate::Result;

/// Tool trait - interface for all exposed tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name used in `tools/call`
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for parameters
    fn parameters(&self) -> Value;

    /// Execute the tool with given parameters
    async fn execute(&self, params: Value) -> Result<String>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters(),
        }
    }
}

#[cfg(test)]
pub(crate) use docs::tests::FakeServices;
