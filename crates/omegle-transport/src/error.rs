//! Transport error types

use std::fmt;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur in transport operations
#[derive(Debug)]
pub enum TransportError {
    /// HTTP request/response error
    Http(String),

    /// Connection error (refused, reset, DNS)
    Connection(String),

    /// Timeout error
    Timeout,

    /// The request could not be built
    InvalidRequest(String),
}

impl TransportError {
    /// Whether the failure is the kind the service produces routinely.
    ///
    /// Timeouts and dropped connections happen often against the chat
    /// service and say nothing about the health of the session.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(msg) => write!(f, "HTTP error: {}", msg),
            Self::Connection(msg) => write!(f, "Connection error: {}", msg),
            Self::Timeout => write!(f, "Timeout"),
            Self::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::Connection("reset".to_string()).is_transient());
        assert!(!TransportError::Http("bad".to_string()).is_transient());
        assert!(!TransportError::InvalidRequest("bad".to_string()).is_transient());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransportError::Timeout.to_string(), "Timeout");
        assert_eq!(
            TransportError::Connection("reset by peer".to_string()).to_string(),
            "Connection error: reset by peer"
        );
    }
}
