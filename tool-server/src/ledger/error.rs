//! Ledger error types.

use std::path::PathBuf;

/// Failures of a single request against the sheet store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store answered with an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Reply did not have the expected shape
    #[error("unexpected store reply: {message}")]
    Decode { message: String },

    /// Access token could not be obtained
    #[error("authorization failed: {message}")]
    Auth { message: String },
}

/// Failures while opening a sheet session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Credential file missing or unreadable
    #[error("cannot read credential file {path}: {message}")]
    Credentials { path: PathBuf, message: String },

    /// Neither a spreadsheet id nor a name is configured
    #[error("no spreadsheet id or name configured")]
    NoSpreadsheet,

    /// Spreadsheet or worksheet does not exist or is not shared with us
    #[error("failed to open {what}: not found or permission denied")]
    NotFound { what: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from a ledger operation.
///
/// Everything except [`LedgerError::Store`] is a business-level outcome
/// and is reported to the agent as an ordinary message.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No sheet session is open
    #[error("Cannot open account book")]
    NotConnected,

    /// Row id is the header row or below
    #[error("Failed to {op} entry. Item ID must be greater than 1 (got {id}).")]
    InvalidId { op: &'static str, id: i64 },

    /// Row has no data
    #[error("Entry with Item ID {id} not found.")]
    NotFound { id: i64 },

    #[error("Account book store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Whether this is an ordinary outcome rather than a failed call.
    pub fn is_business(&self) -> bool {
        !matches!(self, LedgerError::Store(_))
    }
}

/// Errors loading the ledger configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_mentions_the_rule() {
        let err = LedgerError::InvalidId { op: "read", id: 1 };
        assert_eq!(
            err.to_string(),
            "Failed to read entry. Item ID must be greater than 1 (got 1)."
        );
        assert!(err.is_business());
    }

    #[test]
    fn store_errors_are_not_business() {
        let err = LedgerError::from(StoreError::Api {
            status: 500,
            message: "backend".into(),
        });
        assert!(!err.is_business());
        assert_eq!(err.to_string(), "Account book store error: API error 500: backend");
    }
}
