//! Error types for gdocs-mcp

use thiserror::Error;

/// Result type alias for gdocs-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gdocs-mcp
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Consent flow failed, was denied, or produced an unusable token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The cached credential file could not be read or written
    #[error("Credential store error: {0}")]
    CredentialIo(String),

    /// A Docs or Drive API call failed
    #[error("{}", remote_api_display(.status, .message))]
    RemoteApi {
        status: Option<u16>,
        message: String,
    },

    /// The document was created but inserting its content failed
    #[error("Document {document_id} was created but inserting content failed: {source}")]
    PartialCreate {
        document_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

fn remote_api_display(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Remote API error ({}): {}", code, message),
        None => format!("Remote API error: {}", message),
    }
}

impl Error {
    /// HTTP status of a remote API failure, if any
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Error::RemoteApi { status, .. } => *status,
            _ => None,
        }
    }
}
