//! Timetable client error types.

use std::fmt;

use serde_json::{Value, json};

/// Maximum number of body characters kept for diagnostics.
pub const BODY_PREVIEW_CHARS: usize = 500;

/// Failures while fetching a timetable from the remote endpoint.
///
/// These never escape the timetable client as panics or raw transport
/// errors; each carries enough of the reply to diagnose the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Endpoint answered with a non-2xx status
    Http { status: u16, body: String },

    /// 2xx reply whose body is not JSON, whatever its content type claims
    NonJson {
        content_type: String,
        raw_text: String,
    },

    /// No reply within the request timeout
    Timeout { secs: u64 },

    /// Connection, TLS or protocol failure
    Transport(String),
}

impl FetchError {
    /// Short name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Http { .. } => "http",
            FetchError::NonJson { .. } => "non_json",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Transport(_) => "transport",
        }
    }

    /// Structured form of the error, as reported to diagnostics.
    pub(crate) fn to_json(&self) -> Value {
        match self {
            FetchError::Http { status, body } => json!({
                "error": format!("HTTP error {status}"),
                "status": status,
                "response": body,
            }),
            FetchError::NonJson {
                content_type,
                raw_text,
            } => json!({
                "error": "non-JSON response",
                "content_type": content_type,
                "raw_text": raw_text,
            }),
            FetchError::Timeout { secs } => json!({
                "error": "request timed out",
                "timeout": secs,
            }),
            FetchError::Transport(message) => json!({
                "error": format!("transport error: {message}"),
            }),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http { status, body } => {
                write!(f, "HTTP error {status}")?;
                if !body.is_empty() {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            FetchError::NonJson { content_type, .. } => {
                write!(f, "non-JSON response (content type {content_type:?})")
            }
            FetchError::Timeout { secs } => write!(f, "request timed out after {secs}s"),
            FetchError::Transport(message) => write!(f, "transport error: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Truncate a reply body to [`BODY_PREVIEW_CHARS`] characters.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

/// Errors from a timetable lookup.
///
/// The `Display` text is what the agent sees in the tool result, so the
/// lookup-level variants are worded for the end user.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// One of the stations did not resolve; no request was sent
    #[error("查無從{start}到{destination}的時刻表")]
    UnknownRoute { start: String, destination: String },

    /// Remote request failed
    #[error("網路查詢發生錯誤: {0}")]
    Fetch(#[from] FetchError),

    /// Remote answered but flagged the query as unsuccessful
    #[error("查詢失敗")]
    Rejected,

    /// Remote JSON did not have the timetable shape
    #[error("查詢失敗: unexpected timetable payload ({0})")]
    Malformed(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl TimetableError {
    /// Structured diagnostics for logs. Fetch failures keep their status
    /// and body preview; other variants carry only their message.
    pub fn details(&self) -> Value {
        match self {
            TimetableError::Fetch(err) => err.to_json(),
            other => json!({ "error": other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Timeout { secs: 20 };
        assert_eq!(err.to_string(), "request timed out after 20s");

        let err = FetchError::Http {
            status: 503,
            body: "busy".into(),
        };
        assert_eq!(err.to_string(), "HTTP error 503 (body: busy)");

        let err = TimetableError::UnknownRoute {
            start: "Tokyo".into(),
            destination: "台中".into(),
        };
        assert_eq!(err.to_string(), "查無從Tokyo到台中的時刻表");
    }

    #[test]
    fn structured_http_error_keeps_status() {
        let err = FetchError::Http {
            status: 404,
            body: "missing".into(),
        };
        let value = err.to_json();
        assert_eq!(value["status"], 404);
        assert_eq!(value["response"], "missing");
        assert_eq!(value["error"], "HTTP error 404");
    }

    #[test]
    fn structured_non_json_error() {
        let err = FetchError::NonJson {
            content_type: "text/html".into(),
            raw_text: "<html>".into(),
        };
        let value = err.to_json();
        assert_eq!(value["error"], "non-JSON response");
        assert_eq!(value["raw_text"], "<html>");
        assert_eq!(err.kind(), "non_json");
    }

    #[test]
    fn lookup_details_carry_the_fetch_diagnostics() {
        let err = TimetableError::from(FetchError::Http {
            status: 502,
            body: "bad gateway".into(),
        });
        let details = err.details();
        assert_eq!(details["status"], 502);
        assert_eq!(details["response"], "bad gateway");

        assert_eq!(
            TimetableError::Rejected.details(),
            json!({"error": "查詢失敗"})
        );
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let body = "高".repeat(600);
        let cut = preview(&body);
        assert_eq!(cut.chars().count(), BODY_PREVIEW_CHARS);
    }
}
