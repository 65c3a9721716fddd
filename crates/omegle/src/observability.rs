//! Centralized observability utilities for structured logging
//!
//! Every request the session makes is logged through this layer, along with
//! phase transitions and queue growth. Failed requests are not errors for the
//! session, so they are logged here and then forgotten.

use crate::session::SessionPhase;
use omegle_transport::TransportError;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET or POST)
    pub method: &'static str,
    /// Request path
    pub path: &'static str,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: &'static str, path: &'static str) -> Self {
        Self {
            method,
            path,
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log request being sent
    pub fn log_request(&self) {
        debug!(
            method = %self.method,
            path = %self.path,
            body_size = self.body_size,
            "Sending HTTP request"
        );
    }

    /// Log a request that never produced a response.
    ///
    /// Timeouts and resets are routine for the service and logged at debug.
    pub fn log_transport_failure(&self, error: &TransportError, elapsed: Duration) {
        if error.is_transient() {
            debug!(
                method = %self.method,
                path = %self.path,
                elapsed_ms = elapsed.as_millis(),
                error = %error,
                "HTTP request produced no response"
            );
        } else {
            warn!(
                method = %self.method,
                path = %self.path,
                elapsed_ms = elapsed.as_millis(),
                error = %error,
                "HTTP request failed"
            );
        }
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Response body size in bytes
    pub body_size: usize,
    /// Time elapsed for the request
    pub elapsed: Duration,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, body_size: usize, elapsed: Duration) -> Self {
        Self {
            status,
            body_size,
            elapsed,
        }
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            "HTTP request succeeded"
        );
    }

    /// Log a response whose status means "no data"
    pub fn log_rejected(&self, request: &RequestMetadata) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            "HTTP request returned non-200 status, treating as no data"
        );
    }
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Log a batch of events entering the queue
pub fn log_events_enqueued(source: &str, added: usize, pending: usize) {
    if added > 0 {
        debug!(source = %source, added, pending, "Events enqueued");
    }
}

/// Log a session phase transition
pub fn log_phase_change(from: &SessionPhase, to: &SessionPhase) {
    info!(from = %from, to = %to, "Session phase changed");
}
