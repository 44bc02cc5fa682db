//! Google API service clients
//!
//! [`DocsClient`] and [`DriveClient`] are thin typed wrappers over the
//! Docs v1 and Drive v3 REST endpoints. Both are built from a
//! [`ValidCredential`] and perform no network I/O until first use.
//! [`GoogleServices`] hands out clients backed by the credential manager.

mod docs;
mod drive;
pub mod types;

pub use docs::DocsClient;
pub use drive::DriveClient;
pub use types::{Document, DriveFile};

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use crate::Result;
use crate::auth::{CredentialManager, ValidCredential};
use crate::config::Config;
use crate::error::Error;
use types::ErrorEnvelope;

/// Document content API surface
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn get_document(&self, document_id: &str) -> Result<Document>;

    /// Create an empty document with the given title
    async fn create_document(&self, title: &str) -> Result<Document>;

    /// Insert plain text at a body index (index 0 is reserved)
    async fn insert_text(&self, document_id: &str, index: u32, text: &str) -> Result<()>;
}

/// File metadata API surface
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// One page of files matching `query`, projected to `fields`
    async fn list_files(&self, query: &str, page_size: u32, fields: &str) -> Result<Vec<DriveFile>>;
}

/// Supplies service clients to the tools
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    async fn documents(&self) -> Result<Box<dyn DocumentApi>>;
    async fn metadata(&self) -> Result<Box<dyn MetadataApi>>;
}

/// Build a Docs client for a valid credential
pub fn build_document_client(credential: &ValidCredential) -> DocsClient {
    DocsClient::new(credential)
}

/// Build a Drive client for a valid credential
pub fn build_metadata_client(credential: &ValidCredential) -> DriveClient {
    DriveClient::new(credential)
}

/// [`ServiceProvider`] that obtains a credential per call
#[derive(Clone)]
pub struct GoogleServices {
    manager: CredentialManager,
    docs_api_base: String,
    drive_api_base: String,
}

impl GoogleServices {
    pub fn new(manager: CredentialManager, config: &Config) -> Self {
        Self {
            manager,
            docs_api_base: config.docs_api_base.clone(),
            drive_api_base: config.drive_api_base.clone(),
        }
    }
}

#[async_trait]
impl ServiceProvider for GoogleServices {
    async fn documents(&self) -> Result<Box<dyn DocumentApi>> {
        let credential = self.manager.ensure_valid_credential().await?;
        Ok(Box::new(build_document_client(&credential).with_base_url(&self.docs_api_base)))
    }

    async fn metadata(&self) -> Result<Box<dyn MetadataApi>> {
        let credential = self.manager.ensure_valid_credential().await?;
        Ok(Box::new(build_metadata_client(&credential).with_base_url(&self.drive_api_base)))
    }
}

/// Decode a successful response or turn a failure into [`Error::RemoteApi`]
pub(crate) async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => match envelope.error.status {
                Some(code) => format!("{}: {}", code, envelope.error.message),
                None => envelope.error.message,
            },
            Err(_) => body,
        };
        return Err(Error::RemoteApi {
            status: Some(status.as_u16()),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::RemoteApi {
        status: Some(status.as_u16()),
        message: format!("Unexpected response shape: {}", e),
    })
}
