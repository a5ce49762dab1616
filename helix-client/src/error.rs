//! Error types for the Helix worker client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the worker API
///
/// A non-200 status is not an error: the endpoints answer that way while
/// nothing is ready yet, and callers see it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a status was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Response body was not the expected JSON record
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    pub(crate) fn parse(kind: &str, err: serde_json::Error) -> Self {
        Self::ParseError(format!("invalid {} JSON: {}", kind, err))
    }
}
