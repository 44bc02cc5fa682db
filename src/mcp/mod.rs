//! MCP (Model Context Protocol) server
//!
//! Speaks newline-delimited JSON-RPC 2.0 over stdio and exposes the
//! registered tools through `tools/list` and `tools/call`.

mod server;
mod types;

pub use server::McpServer;
pub use types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
