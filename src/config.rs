//! Configuration management
//!
//! File locations default to the directory holding the running executable:
//! `credentials.json` (OAuth client secret, read-only) and `token.json`
//! (cached credential, read/write).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use crate::Result;
use crate::error::Error;

/// Scopes requested during consent
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive.metadata.readonly",
];

pub const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1";
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const CLIENT_SECRET_FILE: &str = "credentials.json";
const TOKEN_FILE: &str = "token.json";

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client secret file downloaded from the Google Cloud console
    pub credentials_path: PathBuf,

    /// Cached credential file
    pub token_path: PathBuf,

    pub scopes: Vec<String>,

    /// Google Docs API root
    pub docs_api_base: String,

    /// Google Drive API root
    pub drive_api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_path: program_dir().join(CLIENT_SECRET_FILE),
            token_path: program_dir().join(TOKEN_FILE),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            docs_api_base: DOCS_API_BASE.to_string(),
            drive_api_base: DRIVE_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Override file locations, keeping defaults for anything not given
    pub fn with_paths(credentials_path: Option<PathBuf>, token_path: Option<PathBuf>) -> Self {
        let mut config = Self::default();
        if let Some(path) = credentials_path {
            config.credentials_path = path;
        }
        if let Some(path) = token_path {
            config.token_path = path;
        }
        config
    }
}

/// Directory containing the running executable
///
/// Falls back to the current directory when the executable path is unknown.
pub fn program_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// OAuth client identity read from `credentials.json`
#[derive(Debug, Clone)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecretEntry>,
    web: Option<ClientSecretEntry>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretEntry {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl ClientSecrets {
    /// Load client secrets from a Google client secret file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Client secret file not found at {:?}. Download it from the Google Cloud console.",
                path
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse the `installed` (desktop app) or `web` client secret layout
    pub fn parse(content: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid client secret file: {}", e)))?;

        let entry = file.installed.or(file.web).ok_or_else(|| {
            Error::Config("Client secret file has neither an 'installed' nor a 'web' section".to_string())
        })?;

        Ok(Self {
            client_id: entry.client_id,
            client_secret: entry.client_secret,
            auth_uri: entry.auth_uri.unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            token_uri: entry.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}
