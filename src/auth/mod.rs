//! Authentication module for OAuth2 and credential management
//!
//! This module provides:
//! - PKCE challenge and CSRF state generation
//! - Credential storage and retrieval
//! - A loopback callback listener for the browser redirect
//! - `OAuthFlow` for consent, code exchange and refresh
//! - `CredentialManager`, which ties the pieces together

mod pkce;
mod credentials;
mod callback_server;
mod oauth;
mod manager;

pub use credentials::{Credential, CredentialStore, FileCredentialStore, ValidCredential};
pub use oauth::OAuthFlow;
pub use manager::{Authorizer, CredentialManager, CredentialState};

#[cfg(test)]
pub(crate) use manager::tests::{FakeAuthorizer, MemoryStore};
