//! Interpretation of raw response bodies
//!
//! The service answers with a grab-bag of shapes: JSON event batches, the
//! bare strings `win` and `null`, a quoted `"shard:token"` scalar at session
//! start, or nothing at all when the request failed. The functions here sort
//! those into events or errors without ever touching the network.

use crate::error::{ProtocolError, Result};
use crate::event::Event;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Bodies that acknowledge a request without carrying events.
pub const NO_EVENT_SENTINELS: [&str; 2] = ["win", "null"];

/// Start replies of the form `"central2:abcdef"`.
///
/// This is a heuristic for telling a plain token from a JSON object, not a
/// guarantee about the token's character set.
static BARE_CLIENT_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^"(\w+:\w+)"$"#).expect("Failed to compile bare client id regex")
});

/// Outcome of one request as seen by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The request succeeded and returned this body
    Body(String),
    /// The request failed or returned a non-200 status
    NoData,
}

impl Reply {
    /// The body, if there was one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Body(body) => Some(body),
            Self::NoData => None,
        }
    }

    /// Whether the request produced a response at all.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Turn a reply to `/events`, `/send`, `/typing` or `/disconnect` into a batch.
///
/// Missing or empty bodies and the [`NO_EVENT_SENTINELS`] yield no events.
/// A JSON array yields its elements in document order; any other JSON value
/// is ignored.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedJson`] when the body is not valid JSON.
pub fn interpret(reply: &Reply) -> Result<Vec<Event>> {
    let Some(body) = reply.body() else {
        return Ok(Vec::new());
    };

    let trimmed = body.trim();
    if trimmed.is_empty() || NO_EVENT_SENTINELS.contains(&trimmed) {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => Ok(items.into_iter().map(Event::from_value).collect()),
        Ok(_) => Ok(Vec::new()),
        Err(err) => Err(ProtocolError::malformed(&err, body)),
    }
}

/// Decoded reply to a `/start` request.
#[derive(Debug, Clone, PartialEq)]
pub struct StartReply {
    /// Identity assigned to the new session
    pub client_id: String,
    /// Events delivered together with the identity
    pub events: Vec<Event>,
}

/// Decode the reply to a `/start` request.
///
/// # Errors
///
/// - [`ProtocolError::NoStartResponse`] if the request produced no body
/// - [`ProtocolError::MalformedJson`] if the body is neither a quoted id nor JSON
/// - [`ProtocolError::MissingClientId`] if the JSON has no string `clientID`
pub fn parse_start(reply: &Reply) -> Result<StartReply> {
    let body = reply
        .body()
        .map(str::trim)
        .filter(|body| !body.is_empty())
        .ok_or(ProtocolError::NoStartResponse)?;

    if let Some(captures) = BARE_CLIENT_ID.captures(body) {
        return Ok(StartReply {
            client_id: captures[1].to_string(),
            events: Vec::new(),
        });
    }

    let value: Value =
        serde_json::from_str(body).map_err(|err| ProtocolError::malformed(&err, body))?;

    let client_id = value
        .get("clientID")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingClientId)?
        .to_string();

    // A lone event is accepted in place of a batch.
    let events = match value.get("events") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().cloned().map(Event::from_value).collect(),
        Some(single) => vec![Event::from_value(single.clone())],
    };

    Ok(StartReply { client_id, events })
}
