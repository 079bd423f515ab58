//! Stdio MCP host.
//!
//! Reads one JSON-RPC message per line and writes one response per line.
//! Calls are handled one at a time, in order. stdout carries only protocol
//! messages; logs go elsewhere.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::jsonrpc::{
    CallToolParams, ContentItem, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse,
    ToolResultBody, error_codes,
};
use crate::dispatch::Dispatcher;

/// Name announced in `initialize`.
pub const SERVER_NAME: &str = "UtilityTools";

/// Protocol revision used when the client does not ask for one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const INSTRUCTIONS: &str = "This server provides utilities: a calculator, the timetable of \
     the Taiwan High Speed Rail and an account book.";

/// MCP server over a shared dispatcher.
#[derive(Debug, Clone)]
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Serve until the reader reaches end of input.
    pub fn run<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> io::Result<()> {
        info!(server = SERVER_NAME, "serving MCP over stdio");
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(reply) = self.handle_line(&line) {
                writeln!(writer, "{reply}")?;
                writer.flush()?;
            }
        }
        info!("input closed, stopping");
        Ok(())
    }

    /// Handle one message; `None` when nothing should be written back.
    pub fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle(request)?,
            Err(e) => {
                warn!(error = %e, "unparsable message");
                JsonRpcResponse::error(Value::Null, error_codes::PARSE_ERROR, format!("parse error: {e}"))
            }
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "cannot serialize response");
                let fallback = JsonRpcResponse::error(
                    response.id,
                    error_codes::INTERNAL_ERROR,
                    "response could not be serialized",
                );
                serde_json::to_string(&fallback).ok()
            }
        }
    }

    fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, id = ?request.id, "request");
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                error_codes::INVALID_REQUEST,
                format!("unsupported jsonrpc version {:?}", request.jsonrpc),
            ));
        }

        // Notifications never get a reply, known or not.
        let id = request.id?;
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::result(id, initialize(&request.params)),
            "ping" => JsonRpcResponse::result(id, json!({})),
            "tools/list" => JsonRpcResponse::result(id, self.list_tools()),
            "tools/call" => match serde_json::from_value::<CallToolParams>(request.params) {
                Ok(params) => JsonRpcResponse::result(id, self.call_tool(params)),
                Err(e) => JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("invalid tools/call params: {e}"),
                ),
            },
            other => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            ),
        };
        Some(response)
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self.dispatcher.specs().iter().map(|s| s.declaration()).collect();
        json!({ "tools": tools })
    }

    fn call_tool(&self, params: CallToolParams) -> Value {
        let arguments = params.arguments.unwrap_or_else(Map::new);
        let envelope = self.dispatcher.call_tool(&params.name, &arguments);

        let structured = serde_json::to_value(&envelope).unwrap_or_else(|e| {
            json!({ "success": false, "error": format!("unserializable result: {e}") })
        });
        let body = ToolResultBody {
            content: vec![ContentItem::Text {
                text: structured.to_string(),
            }],
            is_error: !envelope.success,
            structured_content: Some(structured),
        };
        serde_json::to_value(body).unwrap_or_else(|e| {
            json!({
                "content": [{"type": "text", "text": format!("unserializable result: {e}")}],
                "isError": true,
            })
        })
    }
}

fn initialize(params: &Value) -> Value {
    let version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);
    let client = params
        .pointer("/clientInfo/name")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    info!(client, protocol = version, "client connected");

    json!({
        "protocolVersion": version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") },
        "instructions": INSTRUCTIONS,
    })
}
