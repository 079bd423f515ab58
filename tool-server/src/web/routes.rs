//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::state::AppState;
use crate::dispatch::{ToolCall, ToolResponse};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/call", post(call_tool))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Declarations of every tool, as `{name, description, inputSchema}`.
async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    let tools: Vec<Value> = state.dispatcher.specs().iter().map(|s| s.declaration()).collect();
    Json(json!({ "tools": tools }))
}

/// Run one tool call.
///
/// Tool failures are reported inside the envelope with a 200 status; only
/// a body that is not a tool call at all is a 400.
async fn call_tool(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ToolResponse>, AppError> {
    let call: ToolCall = serde_json::from_slice(&body).map_err(|e| AppError::BadRequest {
        message: format!("Invalid tool call: {e}"),
    })?;

    // Handlers block on network and sheet I/O.
    let dispatcher = state.dispatcher.clone();
    let response = tokio::task::spawn_blocking(move || dispatcher.call(&call))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Tool call aborted: {e}"),
        })?;

    Ok(Json(response))
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
