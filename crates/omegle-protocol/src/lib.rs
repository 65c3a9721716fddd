//! Shared protocol types for the Omegle session client
//!
//! This crate holds everything about the wire protocol that does not need to
//! touch the network: the event model and the rules used to make sense of the
//! service's loosely shaped replies.
//!
//! # Type Organization
//!
//! - **Events**: [`event`] - Tagged event values routed to callers
//! - **Replies**: [`response`] - Classification of raw response bodies
//! - **Error types**: [`error`] - Protocol contract violations
//!
//! # Design Principles
//!
//! - **Zero I/O**: All types are pure data structures
//! - **Tolerant decoding**: Unknown event kinds and shapes are preserved, not rejected

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```
//! use omegle_protocol::{EventKind, Reply, interpret};
//!
//! let reply = Reply::Body(r#"[["connected"], ["gotMessage", "hi"]]"#.to_string());
//! let events = interpret(&reply).unwrap();
//!
//! assert_eq!(events[0].kind(), &EventKind::Connected);
//! assert_eq!(events[1].arg_str(0), Some("hi"));
//! ```

pub mod error;
pub mod event;
pub mod response;

// Re-export commonly used types at crate level
pub use error::{ProtocolError, Result};
pub use event::{Event, EventKind};
pub use response::{NO_EVENT_SENTINELS, Reply, StartReply, interpret, parse_start};
