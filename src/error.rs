//! Error types for indexflow

use thiserror::Error;

/// Result type alias for indexflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in indexflow
///
/// Channel-level failures (bad status codes, unreachable endpoints, invalid
/// URLs handed to a channel) are never reported through this type, transport
/// errors included; they are
/// captured as [`crate::types::ChannelResult::Failure`] so the orchestrator can
/// always persist a terminal per-channel state.
#[derive(Error, Debug)]
pub enum Error {
    /// A channel credential or key is absent
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Malformed input (bad URL, missing required field)
    #[error("validation error: {0}")]
    Validation(String),

    /// Duplicate insert on the (url, site) idempotency key
    #[error("submission already exists for {url} on site {site_id}")]
    Conflict {
        /// Submitted URL
        url: String,
        /// Site identifier
        site_id: String,
    },

    /// Requested record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// SQLite error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant broken
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Structured body for JSON-facing surfaces: `{"error": "<message>"}`
    pub fn to_json_body(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }

    /// Whether this error is the caller's fault rather than ours
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_carries_message() {
        let err = Error::NotFound("submission abc".to_string());
        assert_eq!(
            err.to_json_body(),
            serde_json::json!({ "error": "not found: submission abc" })
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::Validation("url is required".into()).is_client_error());
        assert!(!Error::Internal("boom".into()).is_client_error());
    }
}
