//! Error types for the session client
//!
//! Only misuse of the API and replies the client cannot make sense of are
//! reported as errors. Network failures never appear here: the session turns
//! them into "no events this round" and the next poll tries again.

use omegle_protocol::ProtocolError;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the session client.
#[derive(Debug, Error)]
pub enum Error {
    /// Conflicting mode options, a bad host, or reconfiguration while connected.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The action needs a session identity and there is none.
    #[error("Not connected: cannot {0} without a session identity")]
    NotConnected(&'static str),

    /// `start` was called while a session is connecting or connected.
    #[error("Session already started")]
    AlreadyConnected,

    /// The service replied with something outside the contract the client understands.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Invalid HTTP header name.
    #[error("Invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("Invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// The default HTTP transport could not be initialised.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidConfiguration`].
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Whether this error was caused by the caller rather than the service.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_)
                | Self::NotConnected(_)
                | Self::AlreadyConnected
                | Self::InvalidHeaderName(_)
                | Self::InvalidHeaderValue(_)
        )
    }

    /// The underlying protocol error, if any.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}
