//! Configuration for a chat session
//!
//! A session runs in exactly one of three modes (see [`SessionMode`]). The
//! service offers them as independent query flags, so the client enforces
//! the exclusion itself: [`SessionOptions`] are merged into a
//! [`SessionConfig`] and the result is rejected if more than one mode ends
//! up active.

use crate::error::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use url::Url;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "omegle.com";

/// Referer sent with every request. The service rejects calls without it.
pub const REFERER: &str = "http://omegle.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a session is matched with other participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Spy mode, asker side: pose a question and watch two strangers discuss it.
    Question(String),

    /// Spy mode, watcher side: volunteer to be one of the observed strangers.
    Answer,

    /// Ordinary one-to-one chat, optionally matched on shared topics.
    Chat {
        /// Interests used for matching; empty for random matching
        topics: Vec<String>,
    },
}

impl Default for SessionMode {
    fn default() -> Self {
        Self::Chat { topics: Vec::new() }
    }
}

impl SessionMode {
    /// Build a mode from the three independent settings, rejecting combinations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if more than one of
    /// `question`, `answer` and a non-empty `topics` is active.
    pub fn from_parts(question: Option<String>, topics: Vec<String>, answer: bool) -> Result<Self> {
        match (question, topics.is_empty(), answer) {
            (Some(_), false, _) => Err(Error::config(
                "Topics cannot be specified along with a question",
            )),
            (None, false, true) => Err(Error::config(
                "Topics cannot be specified along with answer mode",
            )),
            (Some(_), true, true) => Err(Error::config(
                "Answer mode cannot be enabled along with a question",
            )),
            (Some(question), true, false) => Ok(Self::Question(question)),
            (None, true, true) => Ok(Self::Answer),
            (None, _, false) => Ok(Self::Chat { topics }),
        }
    }

    /// The spy-mode question, if asking one.
    pub fn question(&self) -> Option<&str> {
        match self {
            Self::Question(question) => Some(question),
            _ => None,
        }
    }

    /// Matching topics; empty outside of chat mode.
    pub fn topics(&self) -> &[String] {
        match self {
            Self::Chat { topics } => topics,
            _ => &[],
        }
    }

    /// Whether this is spy mode on the asker side.
    pub fn is_spy(&self) -> bool {
        matches!(self, Self::Question(_))
    }

    /// Whether this is spy mode on the watcher side.
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer)
    }
}

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Host name (`omegle.com`) or full base URL (`http://127.0.0.1:8080`)
    pub host: String,

    /// Matching mode
    pub mode: SessionMode,

    /// Extra headers sent with every request, in addition to the referer
    pub default_headers: HeaderMap,

    /// Timeout for each request made by the default transport
    pub timeout: Duration,

    /// Connection timeout for the default transport
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            mode: SessionMode::default(),
            default_headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Create a new builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first, if present.
    /// This will look for:
    /// - `OMEGLE_HOST` for the host or base URL
    /// - `OMEGLE_QUESTION` to run as a spy-mode asker
    /// - `OMEGLE_TOPICS` for comma-separated matching topics
    /// - `OMEGLE_ANSWER_MODE` (`1`/`true`/`yes`) to run as a spy-mode watcher
    /// - `OMEGLE_TIMEOUT` for request timeout (in seconds)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the variables select more
    /// than one mode or the host is not a valid URL.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        use std::env;

        let _ = dotenvy::dotenv();

        let mut options = SessionOptions::new();

        if let Ok(host) = env::var("OMEGLE_HOST") {
            options = options.host(host);
        }

        if let Ok(question) = env::var("OMEGLE_QUESTION")
            && !question.trim().is_empty()
        {
            options = options.question(question);
        }

        if let Ok(topics) = env::var("OMEGLE_TOPICS") {
            options = options.topics(
                topics
                    .split(',')
                    .map(str::trim)
                    .filter(|topic| !topic.is_empty()),
            );
        }

        if let Ok(answer) = env::var("OMEGLE_ANSWER_MODE") {
            let enabled = matches!(
                answer.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
            options = options.answer_mode(enabled);
        }

        let mut config = Self::default().apply(options)?;

        if let Ok(timeout_str) = env::var("OMEGLE_TIMEOUT")
            && let Ok(timeout_secs) = timeout_str.parse::<u64>()
        {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        Ok(config)
    }

    /// Merge `options` into a copy of this configuration.
    ///
    /// Options that are not set keep their current value. The merged result
    /// must select at most one mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the merge would activate
    /// two modes at once or the host is not a valid URL.
    pub fn apply(&self, options: SessionOptions) -> Result<Self> {
        let question = match options.question {
            Some(question) => question,
            None => self.mode.question().map(str::to_string),
        };
        let topics = options
            .topics
            .unwrap_or_else(|| self.mode.topics().to_vec());
        let answer = options.answer_mode.unwrap_or(self.mode.is_answer());

        let mut merged = self.clone();
        merged.mode = SessionMode::from_parts(question, topics, answer)?;

        if let Some(host) = options.host {
            merged.host = host;
        }
        for (key, value) in options.headers.iter() {
            merged.default_headers.insert(key.clone(), value.clone());
        }

        merged.base_url()?;
        Ok(merged)
    }

    /// Base URL derived from [`SessionConfig::host`].
    ///
    /// A bare host name is served over plain HTTP, which is what the service
    /// speaks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an empty host, an
    /// unparseable URL, or a scheme other than `http`/`https`.
    pub fn base_url(&self) -> Result<Url> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(Error::config("host cannot be empty"));
        }

        let candidate = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };

        let url = Url::parse(&candidate)
            .map_err(|e| Error::config(format!("invalid host '{host}': {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::config(format!(
                "unsupported scheme '{scheme}' in host, expected http or https"
            ))),
        }
    }

    /// Headers to attach to a request: the defaults plus the fixed referer.
    pub fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .default_headers
            .iter()
            .filter(|(key, _)| **key != http::header::REFERER)
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect();
        headers.push((http::header::REFERER.as_str().to_string(), REFERER.to_string()));
        headers
    }
}

/// A partial update to a [`SessionConfig`].
///
/// Only the fields that are set take part in the merge.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    host: Option<String>,
    question: Option<Option<String>>,
    topics: Option<Vec<String>>,
    answer_mode: Option<bool>,
    headers: HeaderMap,
}

impl SessionOptions {
    /// Create an empty set of options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host name or base URL.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Ask a question in spy mode.
    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(Some(question.into()));
        self
    }

    /// Remove a previously configured question.
    pub fn clear_question(mut self) -> Self {
        self.question = Some(None);
        self
    }

    /// Set matching topics. An empty list clears them.
    pub fn topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = Some(topics.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable spy-mode watching.
    pub fn answer_mode(mut self, enabled: bool) -> Self {
        self.answer_mode = Some(enabled);
        self
    }

    /// Add a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: HeaderName = key_str
            .parse()
            .map_err(|_| Error::InvalidHeaderName(key_str.clone()))?;
        let value: HeaderValue = value_str
            .parse()
            .map_err(|_| Error::InvalidHeaderValue(value_str.clone()))?;

        self.headers.insert(key, value);
        Ok(self)
    }
}

/// Builder for creating SessionConfig with a fluent API.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    options: SessionOptions,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl SessionConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host name or base URL.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.options = self.options.host(host);
        self
    }

    /// Ask a question in spy mode.
    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.options = self.options.question(question);
        self
    }

    /// Set matching topics.
    pub fn topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.topics(topics);
        self
    }

    /// Enable or disable spy-mode watching.
    pub fn answer_mode(mut self, enabled: bool) -> Self {
        self.options = self.options.answer_mode(enabled);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        self.options = self.options.header(key, value)?;
        Ok(self)
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if more than one mode was
    /// selected or the host is invalid.
    pub fn build(self) -> Result<SessionConfig> {
        let mut config = SessionConfig::default().apply(self.options)?;
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = timeout;
        }
        Ok(config)
    }
}
