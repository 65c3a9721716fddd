//! Error types for protocol operations
//!
//! These cover the few cases where a reply breaks the minimal contract the
//! client relies on. Everything else the service sends is tolerated.

use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Longest body excerpt carried inside an error.
const BODY_SNIPPET_LEN: usize = 220;

/// Errors raised when a reply cannot be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The start reply was JSON but carried no `clientID`
    #[error("No ID in connection response")]
    MissingClientId,

    /// The start request produced no usable body at all
    #[error("No response to start request")]
    NoStartResponse,

    /// The body was neither a known sentinel nor valid JSON
    #[error("Malformed JSON response: {message} (body: {body})")]
    MalformedJson {
        /// Decoder error message
        message: String,
        /// Leading excerpt of the offending body
        body: String,
    },
}

impl ProtocolError {
    /// Build a [`ProtocolError::MalformedJson`] from a decoder error and the raw body.
    pub fn malformed(err: &serde_json::Error, body: &str) -> Self {
        Self::MalformedJson {
            message: err.to_string(),
            body: body.chars().take(BODY_SNIPPET_LEN).collect(),
        }
    }
}
