//! Google Docs v1 client

use async_trait::async_trait;
use reqwest::Client;
use url::Url;
use crate::Result;
use crate::auth::ValidCredential;
use crate::config::DOCS_API_BASE;
use crate::error::Error;
use super::types::{BatchUpdateRequest, CreateDocumentRequest, Document, Location, UpdateRequest};
use super::{handle_response, DocumentApi};

/// Docs API client bound to one access token
#[derive(Clone)]
pub struct DocsClient {
    http: Client,
    access_token: String,
    base_url: String,
}

impl DocsClient {
    pub fn new(credential: &ValidCredential) -> Self {
        Self {
            http: Client::new(),
            access_token: credential.access_token().to_string(),
            base_url: DOCS_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn documents_url(&self) -> String {
        format!("{}/documents", self.base_url)
    }

    /// `{base}/documents/{id}{suffix}` with the id escaped as one path segment
    fn document_url(&self, document_id: &str, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(&self.documents_url())
            .map_err(|e| Error::Config(format!("Invalid Docs API base {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Docs API base {} cannot hold a path", self.base_url)))?
            .push(&format!("{}{}", document_id, suffix));
        Ok(url)
    }
}

#[async_trait]
impl DocumentApi for DocsClient {
    async fn get_document(&self, document_id: &str) -> Result<Document> {
        tracing::debug!("Fetching document {}", document_id);
        let response = self.http
            .get(self.document_url(document_id, "")?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn create_document(&self, title: &str) -> Result<Document> {
        tracing::debug!("Creating document {:?}", title);
        let response = self.http
            .post(self.documents_url())
            .bearer_auth(&self.access_token)
            .json(&CreateDocumentRequest { title })
            .send()
            .await?;

        handle_response(response).await
    }

    async fn insert_text(&self, document_id: &str, index: u32, text: &str) -> Result<()> {
        let body = BatchUpdateRequest {
            requests: vec![UpdateRequest::InsertText {
                location: Location { index },
                text: text.to_string(),
            }],
        };

        tracing::debug!("Inserting {} chars into {} at {}", text.len(), document_id, index);
        let response = self.http
            .post(self.document_url(document_id, ":batchUpdate")?)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        // Reply lists per-request results; nothing in it is needed
        let _: serde_json::Value = handle_response(response).await?;
        Ok(())
    }
}
