//! Transport abstraction layer for the Omegle session client
//!
//! The session only ever needs one primitive from the network: send a request
//! and get back a status and body, or learn that the request failed. This
//! crate defines that primitive as a trait and ships a `reqwest` backed
//! implementation of it.
//!
//! # Architecture
//!
//! - **Transport trait**: Generic interface for any transport implementation
//! - **HTTP transport**: Plain HTTP/1.1 client via reqwest

#![deny(unsafe_code)]
#![warn(missing_docs)]
//! - **Error handling**: Failures are reported, never retried
//!
//! # Usage
//!
//! ```ignore
//! use omegle_transport::{HttpRequest, HttpTransport, Transport};
//!
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::post("http://omegle.com/events")
//!     .with_form_body([("id", "central2:abc")]);
//! let response = transport.send_http(request).await?;
//! ```

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use http::{HttpTransport, HttpTransportConfig};
pub use traits::{HttpRequest, HttpResponse, Transport};
