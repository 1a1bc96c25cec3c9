//! Error types for the blockvol system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the blockvol system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input schema could not be recognized. Fatal for the run.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A single input row could not be turned into a bar record.
    /// Reported with identifying context and skipped, never zero-filled.
    #[error("Malformed row (block {block_id}, bar {bar_number}): {reason}")]
    MalformedRow {
        block_id: String,
        bar_number: String,
        reason: String,
    },

    /// Internal invariant violation (e.g. profile lookup miss at read time).
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Export error.
    #[error("Export error: {0}")]
    Export(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a malformed-row error with identifying context.
    pub fn malformed_row(
        block_id: impl Into<String>,
        bar_number: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedRow {
            block_id: block_id.into(),
            bar_number: bar_number.into(),
            reason: reason.into(),
        }
    }

    /// Create an invariant-violation error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }

    /// Create an export error.
    pub fn export(msg: impl Into<String>) -> Self {
        Error::Export(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_context() {
        let err = Error::malformed_row("2024-01-05:A", "3", "missing cell in column buy2");
        let msg = err.to_string();
        assert!(msg.contains("2024-01-05:A"));
        assert!(msg.contains("bar 3"));
        assert!(msg.contains("buy2"));
    }
}
