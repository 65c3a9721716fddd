//! Request construction for each endpoint
//!
//! One builder per session mode for `/start`; every other endpoint is a form
//! POST keyed by the session identity.

use crate::config::{SessionConfig, SessionMode};
use crate::error::Result;
use crate::randid::random_id;
use url::Url;

/// Endpoints of the chat service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /start`
    Start,
    /// `POST /events`
    Events,
    /// `POST /send`
    Send,
    /// `POST /typing`
    Typing,
    /// `POST /disconnect`
    Disconnect,
}

impl Endpoint {
    /// Path of the endpoint relative to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Start => "/start",
            Self::Events => "/events",
            Self::Send => "/send",
            Self::Typing => "/typing",
            Self::Disconnect => "/disconnect",
        }
    }

    /// HTTP method used for the endpoint.
    pub fn method(self) -> &'static str {
        match self {
            Self::Start => "GET",
            _ => "POST",
        }
    }

    /// What the caller was trying to do, for error messages.
    pub fn action(self) -> &'static str {
        match self {
            Self::Start => "start a session",
            Self::Events => "poll for events",
            Self::Send => "send a message",
            Self::Typing => "send a typing notice",
            Self::Disconnect => "disconnect",
        }
    }
}

/// Absolute URL of `endpoint` under the configured host.
pub fn endpoint_url(config: &SessionConfig, endpoint: Endpoint) -> Result<Url> {
    let mut url = config.base_url()?;
    let path = format!("{}{}", url.path().trim_end_matches('/'), endpoint.path());
    url.set_path(&path);
    Ok(url)
}

/// URL of the `/start` request for the configured mode.
pub fn start_url(config: &SessionConfig) -> Result<Url> {
    let mut url = endpoint_url(config, Endpoint::Start)?;
    match &config.mode {
        SessionMode::Question(question) => question_start(&mut url, question),
        SessionMode::Answer => answer_start(&mut url),
        SessionMode::Chat { topics } => chat_start(&mut url, topics),
    }
    Ok(url)
}

fn question_start(url: &mut Url, question: &str) {
    url.query_pairs_mut()
        .append_pair("rcs", "1")
        .append_pair("firstevents", "1")
        .append_pair("spid", "")
        .append_pair("randid", &random_id())
        .append_pair("cansavequestion", "1")
        .append_pair("ask", question);
}

fn answer_start(url: &mut Url) {
    url.query_pairs_mut()
        .append_pair("firstevents", "1")
        .append_pair("wantsspy", "1");
}

fn chat_start(url: &mut Url, topics: &[String]) {
    let mut query = url.query_pairs_mut();
    query.append_pair("firstevents", "1");
    if !topics.is_empty() {
        let encoded = serde_json::Value::from(topics.to_vec()).to_string();
        query.append_pair("topics", &encoded);
    }
}
