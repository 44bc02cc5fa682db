//! gdocs-mcp - Google Docs tools over the Model Context Protocol
//!
//! This library provides OAuth credential management, typed Google Docs and
//! Drive clients, and the `list_documents`, `read_document` and
//! `create_document` tools served over stdio.

pub mod auth;
pub mod config;
pub mod error;
pub mod google;
pub mod mcp;
pub mod tools;
pub mod ui;

pub use error::{Error, Result};
