//! Dispatcher error types.

/// Why a tool call failed.
///
/// Only these reach the caller, and only as the `error` string of the
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// No tool registered under this name
    #[error("unknown tool: {0:?}")]
    UnknownTool(String),

    /// A required argument is absent
    #[error("missing required argument `{0}`")]
    MissingArgument(String),

    /// An argument has the wrong type
    #[error("invalid argument `{field}`: expected {expected}, got {found}")]
    InvalidArgument {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// The tool ran and failed
    #[error("{0}")]
    Failed(String),

    /// The tool panicked
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let err = ToolError::InvalidArgument {
            field: "itemId".into(),
            expected: "integer",
            found: "string".into(),
        };
        assert_eq!(err.to_string(), "invalid argument `itemId`: expected integer, got string");
        assert_eq!(
            ToolError::MissingArgument("expression".into()).to_string(),
            "missing required argument `expression`"
        );
    }
}
