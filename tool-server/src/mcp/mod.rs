//! Model Context Protocol host over stdio.
//!
//! Speaks newline-delimited JSON-RPC 2.0 and maps `tools/list` and
//! `tools/call` onto the [`Dispatcher`](crate::dispatch::Dispatcher).

mod jsonrpc;
mod server;

pub use jsonrpc::{
    CallToolParams, ContentItem, JsonRpcRequest, JsonRpcResponse, RpcError, ToolResultBody,
    error_codes,
};
pub use server::{DEFAULT_PROTOCOL_VERSION, McpServer, SERVER_NAME};
