//! Google Drive v3 client (file metadata only)

use async_trait::async_trait;
use reqwest::Client;
use crate::Result;
use crate::auth::ValidCredential;
use crate::config::DRIVE_API_BASE;
use super::types::{DriveFile, FileListResponse};
use super::{handle_response, MetadataApi};

/// Drive API client bound to one access token
#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    access_token: String,
    base_url: String,
}

impl DriveClient {
    pub fn new(credential: &ValidCredential) -> Self {
        Self {
            http: Client::new(),
            access_token: credential.access_token().to_string(),
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MetadataApi for DriveClient {
    async fn list_files(&self, query: &str, page_size: u32, fields: &str) -> Result<Vec<DriveFile>> {
        tracing::debug!("Listing files: q={} pageSize={}", query, page_size);
        let page_size = page_size.to_string();
        let response = self.http
            .get(format!("{}/files", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query),
                ("pageSize", page_size.as_str()),
                ("fields", fields),
            ])
            .send()
            .await?;

        let list: FileListResponse = handle_response(response).await?;
        Ok(list.files)
    }
}
