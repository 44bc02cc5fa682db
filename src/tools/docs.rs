//! Google Docs tools - list, read, and create documents

use std::sync::Arc;
use async_trait::async_trait;
use serde_json::{json, Value};
use crate::Result;
use crate::error::Error;
use crate::google::ServiceProvider;
use super::Tool;
use super::operations::{self, DEFAULT_MAX_RESULTS};

fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Tool(format!("Missing '{}' parameter", key)))
}

/// List Google Docs files from Drive
pub struct ListDocumentsTool {
    services: Arc<dyn ServiceProvider>,
}

impl ListDocumentsTool {
    pub fn new(services: Arc<dyn ServiceProvider>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for ListDocumentsTool {
    fn name(&self) -> &str { "list_documents" }
    fn description(&self) -> &str { "List Google Docs files from your Google Drive." }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "default": DEFAULT_MAX_RESULTS,
                    "description": "Maximum number of documents to return"
                }
            }
        })
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let max_results = match params.get("max_results") {
            None | Some(Value::Null) => DEFAULT_MAX_RESULTS,
            Some(v) => v.as_u64()
                .filter(|n| *n > 0)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| Error::Tool("'max_results' must be a positive integer".to_string()))?,
        };

        let drive = self.services.metadata().await?;
        let documents = operations::list_documents(drive.as_ref(), max_results).await?;
        Ok(serde_json::to_string_pretty(&documents)?)
    }
}

/// Read the text of a Google Doc
pub struct ReadDocumentTool {
    services: Arc<dyn ServiceProvider>,
}

impl ReadDocumentTool {
    pub fn new(services: Arc<dyn ServiceProvider>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for ReadDocumentTool {
    fn name(&self) -> &str { "read_document" }
    fn description(&self) -> &str { "Read the text content of a Google Doc by its document ID." }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "doc_id": {
                    "type": "string",
                    "description": "ID of the document to read"
                }
            },
            "required": ["doc_id"]
        })
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let doc_id = required_str(&params, "doc_id")?;
        let docs = self.services.documents().await?;
        operations::read_document(docs.as_ref(), doc_id).await
    }
}

/// Create a Google Doc with a title and body
pub struct CreateDocumentTool {
    services: Arc<dyn ServiceProvider>,
}

impl CreateDocumentTool {
    pub fn new(services: Arc<dyn ServiceProvider>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Tool for CreateDocumentTool {
    fn name(&self) -> &str { "create_document" }
    fn description(&self) -> &str { "Create a new Google Doc with a title and body content." }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title of the new document"
                },
                "content": {
                    "type": "string",
                    "description": "Plain text body of the new document"
                }
            },
            "required": ["title", "content"]
        })
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let title = required_str(&params, "title")?;
        let content = required_str(&params, "content")?;

        let docs = self.services.documents().await?;
        let created = operations::create_document(docs.as_ref(), title, content).await?;
        Ok(serde_json::to_string_pretty(&created)?)
    }
}
