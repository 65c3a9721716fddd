//! # omegle
//!
//! Session client for Omegle's HTTP polling chat protocol, supporting:
//! - Ordinary chat, optionally matched on topics
//! - Spy mode as the asker (pose a question) or the watched stranger
//! - Inbound events delivered in arrival order through a polling feed
//! - Tolerant handling of the service's loosely shaped replies
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use omegle::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::builder().topics(["rust"]).build()?;
//!
//!     let received = Session::run(config, |session| async move {
//!         session.send_message("Hello, stranger!").await?;
//!         let received = session
//!             .listen(|event| async move { println!("{event}") })
//!             .await?;
//!         Ok::<_, omegle::Error>(received)
//!     })
//!     .await??;
//!
//!     println!("{received} events received");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use config::{
    DEFAULT_HOST, REFERER, SessionConfig, SessionConfigBuilder, SessionMode, SessionOptions,
};
pub use error::{Error, Result};
pub use omegle_protocol::{Event, EventKind, ProtocolError};
pub use omegle_transport::{HttpTransport, Transport};
pub use queue::EventQueue;
pub use session::{Session, SessionPhase};

// Module declarations
pub mod config;
pub mod error;
pub mod observability;
pub mod queue;
pub mod randid;
pub mod request;
pub mod session;

// Re-export key dependencies for convenience
pub use async_trait::async_trait;
pub use serde_json::Value as JsonValue;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use omegle::prelude::*;
/// ```
pub mod prelude {

    pub use crate::{
        Error, Event, EventKind, Result, Session, SessionConfig, SessionMode, SessionOptions,
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
