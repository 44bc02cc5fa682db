//! Credential storage and management
//!
//! The cached credential lives in a single JSON file wrapped in a versioned
//! envelope: `{"version": 1, "credential": {...}}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::Result;
use crate::error::Error;

/// Current on-disk format version
const STORE_VERSION: u32 = 1;

/// Tokens expiring within this window are treated as expired
const EXPIRY_SKEW_SECS: i64 = 300;

/// OAuth2 token bundle granting API access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// When the access token expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,

    /// Scopes granted
    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    /// Create a credential from a token endpoint response
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        let expiry = expires_in_secs.map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        Self {
            access_token,
            refresh_token,
            token_type: default_token_type(),
            expiry,
            scopes: Vec::new(),
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// True if the access token is expired or expires within the skew window
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => Utc::now() + chrono::Duration::seconds(EXPIRY_SKEW_SECS) >= expiry,
            None => false,
        }
    }

    /// The credential can be used for API calls right now
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A credential that passed the validity check
///
/// Service clients are only ever built from this type.
#[derive(Debug, Clone)]
pub struct ValidCredential(Credential);

impl ValidCredential {
    /// Wrap a credential, returning `None` if it is not currently valid
    pub fn new(credential: Credential) -> Option<Self> {
        credential.is_valid().then_some(Self(credential))
    }

    pub fn access_token(&self) -> &str {
        &self.0.access_token
    }

    pub fn credential(&self) -> &Credential {
        &self.0
    }
}

/// Persistence for the cached credential
pub trait CredentialStore: Send + Sync {
    /// Load the cached credential, `None` if nothing is stored
    fn load(&self) -> Result<Option<Credential>>;

    /// Persist a credential, replacing whatever was stored
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Remove the cached credential
    fn delete(&self) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct StoredCredential {
    version: u32,
    credential: Credential,
}

/// Credential store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn store_error(action: &str, path: &Path, err: impl std::fmt::Display) -> Error {
    Error::CredentialIo(format!("Failed to {} {:?}: {}", action, path, err))
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| store_error("read", &self.path, e))?;
        let stored: StoredCredential = serde_json::from_str(&content)
            .map_err(|e| store_error("decode", &self.path, e))?;

        if stored.version != STORE_VERSION {
            return Err(Error::CredentialIo(format!(
                "Unsupported credential file version {} in {:?} (expected {})",
                stored.version, self.path, STORE_VERSION
            )));
        }

        Ok(Some(stored.credential))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| store_error("create directory for", &self.path, e))?;
            }
        }

        let stored = StoredCredential {
            version: STORE_VERSION,
            credential: credential.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|e| store_error("encode", &self.path, e))?;
        std::fs::write(&self.path, content)
            .map_err(|e| store_error("write", &self.path, e))?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| store_error("restrict permissions on", &self.path, e))?;
        }

        tracing::debug!("Saved credential to {:?}", self.path);
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| store_error("delete", &self.path, e))?;
        }
        Ok(())
    }
}
