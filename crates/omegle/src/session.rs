//! Session state machine
//!
//! A [`Session`] owns one conversation at a time. Its configuration, phase
//! and inbound queue live in a single state object behind one lock, which is
//! held for the length of a state update and never across a network call.

use crate::config::{SessionConfig, SessionOptions};
use crate::error::{Error, Result};
use crate::observability::{
    RequestMetadata, RequestTimer, ResponseMetadata, log_events_enqueued, log_phase_change,
};
use crate::queue::EventQueue;
use crate::request::{Endpoint, endpoint_url, start_url};
use omegle_protocol::{Event, Reply, interpret, parse_start};
use omegle_transport::{HttpRequest, HttpTransport, HttpTransportConfig, Transport};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// No identity and no start in flight
    Idle,
    /// A start request is in flight
    Connecting,
    /// The service assigned this identity
    Connected(String),
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected(_) => write!(f, "connected"),
        }
    }
}

struct SessionState {
    config: SessionConfig,
    phase: SessionPhase,
    queue: EventQueue,
}

impl SessionState {
    fn set_phase(&mut self, phase: SessionPhase) {
        log_phase_change(&self.phase, &phase);
        self.phase = phase;
    }

    fn identity(&self) -> Option<&str> {
        match &self.phase {
            SessionPhase::Connected(id) => Some(id),
            _ => None,
        }
    }

    fn enqueue(&mut self, source: &str, events: Vec<Event>) -> usize {
        let added = self.queue.push(events);
        log_events_enqueued(source, added, self.queue.len());
        added
    }
}

struct SessionInner {
    transport: Arc<dyn Transport>,
    state: Mutex<SessionState>,
}

/// A chat session.
///
/// Cloning a `Session` yields another handle to the same conversation, so
/// one task can send messages while another listens.
///
/// # Example
///
/// ```rust,no_run
/// use omegle::{Session, SessionConfig};
///
/// # async fn example() -> omegle::Result<()> {
/// let session = Session::new(SessionConfig::builder().topics(["rust"]).build()?)?;
/// session.start().await?;
/// session.send_message("hi!").await?;
///
/// session
///     .listen(|event| async move { println!("{event}") })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Session")
            .field("host", &state.config.host)
            .field("mode", &state.config.mode)
            .field("phase", &state.phase)
            .field("pending_events", &state.queue.len())
            .finish()
    }
}

/// Puts a session back to idle if a start is abandoned part way.
struct ConnectingGuard<'a> {
    session: &'a Session,
    armed: bool,
}

impl ConnectingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.session.lock();
        if state.phase == SessionPhase::Connecting {
            state.set_phase(SessionPhase::Idle);
        }
    }
}

impl Session {
    /// Create a session that talks HTTP through the default transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is invalid or the HTTP client cannot be built.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(HttpTransportConfig {
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
            ..Default::default()
        })
        .map_err(|e| Error::HttpClient(e.to_string()))?;

        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a session on top of any [`Transport`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the host is invalid.
    pub fn with_transport(config: SessionConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.base_url()?;

        Ok(Self {
            inner: Arc::new(SessionInner {
                transport,
                state: Mutex::new(SessionState {
                    config,
                    phase: SessionPhase::Idle,
                    queue: EventQueue::new(),
                }),
            }),
        })
    }

    /// Start a session, run `f` with it, then disconnect.
    ///
    /// The session is only disconnected if it is still connected when `f`
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns any error from construction or [`Session::start`]. See
    /// [`Session::scoped`] for how the final disconnect is handled.
    pub async fn run<F, Fut, T>(config: SessionConfig, f: F) -> Result<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = T>,
    {
        let session = Self::new(config)?;
        session.scoped(f).await
    }

    /// Start this session, run `f` with a handle to it, then disconnect.
    ///
    /// A failed final disconnect is logged and does not discard the output
    /// of `f`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Session::start`].
    pub async fn scoped<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = T>,
    {
        self.start().await?;
        let output = f(self.clone()).await;
        if self.is_connected()
            && let Err(err) = self.disconnect().await
        {
            warn!(error = %err, "Disconnect after scoped session failed");
        }
        Ok(output)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge `options` into the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] while a session is connecting
    /// or connected, or if the merged options select more than one mode.
    pub fn configure(&self, options: SessionOptions) -> Result<()> {
        let mut state = self.lock();
        if state.phase != SessionPhase::Idle {
            return Err(Error::config("Cannot alter session settings while connected"));
        }
        state.config = state.config.apply(options)?;
        debug!(mode = ?state.config.mode, "Session reconfigured");
        Ok(())
    }

    /// Apply `options`, then [`start`](Session::start).
    ///
    /// # Errors
    ///
    /// See [`Session::configure`] and [`Session::start`].
    pub async fn start_with(&self, options: SessionOptions) -> Result<()> {
        self.configure(options)?;
        self.start().await
    }

    /// Ask the service for a new session in the configured mode.
    ///
    /// Events delivered with the identity are queued before the session is
    /// marked connected.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyConnected`] if a start is in flight or a session is open
    /// - [`Error::Protocol`] if the service gave no usable identity
    pub async fn start(&self) -> Result<()> {
        let config = {
            let mut state = self.lock();
            if state.phase != SessionPhase::Idle {
                return Err(Error::AlreadyConnected);
            }
            state.set_phase(SessionPhase::Connecting);
            state.config.clone()
        };
        let guard = ConnectingGuard {
            session: self,
            armed: true,
        };

        let url = start_url(&config)?;
        let request = HttpRequest::get(url.as_str()).with_headers(config.request_headers());
        let reply = self.exchange(Endpoint::Start, request).await;
        let start = parse_start(&reply)?;

        guard.disarm();
        let mut state = self.lock();
        state.enqueue("start", start.events);
        debug!(client_id = %start.client_id, "Session identity assigned");
        info!(mode = ?config.mode, "Session started");
        state.set_phase(SessionPhase::Connected(start.client_id));
        Ok(())
    }

    /// Fetch pending events into the queue.
    ///
    /// Returns the number of events added. A failed request adds none.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] without an identity
    /// - [`Error::Protocol`] if the reply is not valid JSON
    pub async fn poll_events(&self) -> Result<usize> {
        let reply = self.post_with_identity(Endpoint::Events, None).await?;
        let events = interpret(&reply)?;
        Ok(self.lock().enqueue("poll", events))
    }

    /// Send a chat message.
    ///
    /// Any events piggybacked on the reply are queued; returns how many.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] without an identity
    /// - [`Error::Protocol`] if the reply is not valid JSON
    pub async fn send_message(&self, text: &str) -> Result<usize> {
        let reply = self
            .post_with_identity(Endpoint::Send, Some(("msg", text)))
            .await?;
        let events = interpret(&reply)?;
        Ok(self.lock().enqueue("send", events))
    }

    /// Tell the stranger we are typing.
    ///
    /// # Errors
    ///
    /// See [`Session::send_message`].
    pub async fn notify_typing(&self) -> Result<usize> {
        let reply = self.post_with_identity(Endpoint::Typing, None).await?;
        let events = interpret(&reply)?;
        Ok(self.lock().enqueue("typing", events))
    }

    /// End the conversation.
    ///
    /// If the service answered, trailing events are queued and the identity is
    /// dropped, whatever the reply said. If the request failed the identity is
    /// kept so the caller can try again or [`clear_identity`](Session::clear_identity).
    ///
    /// Returns whether the identity was dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] without an identity
    /// - [`Error::Protocol`] if the reply is not valid JSON; the identity is
    ///   dropped all the same
    pub async fn disconnect(&self) -> Result<bool> {
        let (identity, reply) = self
            .post_with_identity_keyed(Endpoint::Disconnect, None)
            .await?;
        if reply.is_no_data() {
            debug!(client_id = %identity, "Disconnect got no response, keeping identity");
            return Ok(false);
        }

        let (events, malformed) = match interpret(&reply) {
            Ok(events) => (events, None),
            Err(err) => (Vec::new(), Some(err)),
        };

        {
            let mut state = self.lock();
            state.enqueue("disconnect", events);
            if state.identity() == Some(identity.as_str()) {
                state.set_phase(SessionPhase::Idle);
            }
        }
        info!("Session disconnected");

        match malformed {
            Some(err) => Err(err.into()),
            None => Ok(true),
        }
    }

    /// Drop the identity without telling the service.
    ///
    /// Meant for recovering after the service stopped answering. Returns the
    /// identity that was held, if any.
    pub fn clear_identity(&self) -> Option<String> {
        let mut state = self.lock();
        let identity = state.identity().map(str::to_string);
        if identity.is_some() {
            state.set_phase(SessionPhase::Idle);
        }
        identity
    }

    /// Poll, then hand every event to `on_event` until the feed runs dry.
    ///
    /// Whenever the queue empties the session polls again, so this keeps
    /// going for as long as the service has something to say. It returns once
    /// a poll comes back empty or the session is no longer connected. No
    /// messages are sent on the caller's behalf.
    ///
    /// Returns the number of events delivered.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if there is no identity when listening starts
    /// - [`Error::Protocol`] if a poll reply is not valid JSON
    pub async fn listen<F, Fut>(&self, mut on_event: F) -> Result<usize>
    where
        F: FnMut(Event) -> Fut,
        Fut: Future<Output = ()>,
    {
        self.poll_events().await?;

        let mut delivered = 0;
        while let Some(event) = self.get_oldest_event() {
            on_event(event).await;
            delivered += 1;

            if self.pending_events() == 0 && self.is_connected() {
                match self.poll_events().await {
                    Ok(_) | Err(Error::NotConnected(_)) => {}
                    Err(err) => return Err(err),
                }
            }
        }

        debug!(delivered, "Event feed drained");
        Ok(delivered)
    }

    /// Remove and return the oldest queued event.
    pub fn get_oldest_event(&self) -> Option<Event> {
        self.lock().queue.pop_oldest()
    }

    /// The oldest queued event, left in the queue.
    pub fn peek_oldest_event(&self) -> Option<Event> {
        self.lock().queue.peek_oldest().cloned()
    }

    /// Number of queued events.
    pub fn pending_events(&self) -> usize {
        self.lock().queue.len()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase.clone()
    }

    /// Whether the session holds an identity.
    pub fn is_connected(&self) -> bool {
        matches!(self.lock().phase, SessionPhase::Connected(_))
    }

    /// Whether a start request is in flight.
    pub fn is_connecting(&self) -> bool {
        self.lock().phase == SessionPhase::Connecting
    }

    /// The identity assigned by the service, while connected.
    pub fn identity(&self) -> Option<String> {
        self.lock().identity().map(str::to_string)
    }

    /// Whether the session asks a question in spy mode.
    pub fn is_spy_mode(&self) -> bool {
        self.lock().config.mode.is_spy()
    }

    /// Whether the session volunteers to be watched in spy mode.
    pub fn is_answer_mode(&self) -> bool {
        self.lock().config.mode.is_answer()
    }

    /// Configured matching topics.
    pub fn topics(&self) -> Vec<String> {
        self.lock().config.mode.topics().to_vec()
    }

    /// Configured spy-mode question.
    pub fn question(&self) -> Option<String> {
        self.lock().config.mode.question().map(str::to_string)
    }

    /// Snapshot of the configuration.
    pub fn config(&self) -> SessionConfig {
        self.lock().config.clone()
    }

    async fn post_with_identity(
        &self,
        endpoint: Endpoint,
        extra: Option<(&str, &str)>,
    ) -> Result<Reply> {
        let (_, reply) = self.post_with_identity_keyed(endpoint, extra).await?;
        Ok(reply)
    }

    async fn post_with_identity_keyed(
        &self,
        endpoint: Endpoint,
        extra: Option<(&str, &str)>,
    ) -> Result<(String, Reply)> {
        let (identity, url, headers) = {
            let state = self.lock();
            let identity = state
                .identity()
                .ok_or(Error::NotConnected(endpoint.action()))?
                .to_string();
            let url = endpoint_url(&state.config, endpoint)?;
            (identity, url, state.config.request_headers())
        };

        let mut form = vec![("id", identity.as_str())];
        form.extend(extra);

        let request = HttpRequest::post(url.as_str())
            .with_headers(headers)
            .with_form_body(form);
        let reply = self.exchange(endpoint, request).await;
        Ok((identity, reply))
    }

    /// Send `request` and collapse every kind of failure into [`Reply::NoData`].
    async fn exchange(&self, endpoint: Endpoint, request: HttpRequest) -> Reply {
        let mut metadata = RequestMetadata::new(endpoint.method(), endpoint.path());
        if let Some(body) = &request.body {
            metadata = metadata.with_body_size(body.len());
        }
        metadata.log_request();

        let timer = RequestTimer::start();
        match self.inner.transport.send_http(request).await {
            Ok(response) => {
                let response_metadata =
                    ResponseMetadata::new(response.status, response.body.len(), timer.elapsed());
                if response.is_ok() {
                    response_metadata.log_success(&metadata);
                    Reply::Body(response.text())
                } else {
                    response_metadata.log_rejected(&metadata);
                    Reply::NoData
                }
            }
            Err(err) => {
                metadata.log_transport_failure(&err, timer.elapsed());
                Reply::NoData
            }
        }
    }
}
