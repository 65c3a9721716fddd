//! Event types delivered by the event feed
//!
//! The service describes each event as a small JSON value, most commonly an
//! array whose first element names the event (`["gotMessage", "hello"]`).
//! [`Event`] keeps that value intact and exposes its discriminator as an
//! [`EventKind`] so callers can match on the kinds they know while still
//! receiving the ones they don't.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Key holding the discriminator in object-shaped events.
const TYPE_KEY: &str = "type";

/// Discriminator of an [`Event`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Waiting for a stranger to be matched
    Waiting,
    /// Matched with a stranger
    Connected,
    /// The stranger sent a message
    GotMessage,
    /// The stranger left the conversation
    StrangerDisconnected,
    /// The stranger started typing
    Typing,
    /// The stranger stopped typing
    StoppedTyping,
    /// The service wants a CAPTCHA solved
    RecaptchaRequired,
    /// A CAPTCHA answer was rejected
    RecaptchaRejected,
    /// Count of users online
    Count,
    /// A spied-on participant sent a message
    SpyMessage,
    /// A spied-on participant started typing
    SpyTyping,
    /// A spied-on participant stopped typing
    SpyStoppedTyping,
    /// A spied-on participant left
    SpyDisconnected,
    /// The question under discussion in spy mode
    Question,
    /// The service reported an error
    Error,
    /// Topics shared with the stranger
    CommonLikes,
    /// The client was banned by the content filter
    AntinudeBanned,
    /// Any discriminator not listed above, kept verbatim
    Other(String),
}

impl EventKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Waiting => "waiting",
            Self::Connected => "connected",
            Self::GotMessage => "gotMessage",
            Self::StrangerDisconnected => "strangerDisconnected",
            Self::Typing => "typing",
            Self::StoppedTyping => "stoppedTyping",
            Self::RecaptchaRequired => "recaptchaRequired",
            Self::RecaptchaRejected => "recaptchaRejected",
            Self::Count => "count",
            Self::SpyMessage => "spyMessage",
            Self::SpyTyping => "spyTyping",
            Self::SpyStoppedTyping => "spyStoppedTyping",
            Self::SpyDisconnected => "spyDisconnected",
            Self::Question => "question",
            Self::Error => "error",
            Self::CommonLikes => "commonLikes",
            Self::AntinudeBanned => "antinudeBanned",
            Self::Other(name) => name,
        }
    }

    /// Whether this kind only occurs in spy mode.
    pub fn is_spy(&self) -> bool {
        matches!(
            self,
            Self::SpyMessage
                | Self::SpyTyping
                | Self::SpyStoppedTyping
                | Self::SpyDisconnected
                | Self::Question
        )
    }

    /// Whether this kind signals the other side is gone.
    pub fn ends_conversation(&self) -> bool {
        matches!(self, Self::StrangerDisconnected | Self::SpyDisconnected)
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "waiting" => Self::Waiting,
            "connected" => Self::Connected,
            "gotMessage" => Self::GotMessage,
            "strangerDisconnected" => Self::StrangerDisconnected,
            "typing" => Self::Typing,
            "stoppedTyping" => Self::StoppedTyping,
            "recaptchaRequired" => Self::RecaptchaRequired,
            "recaptchaRejected" => Self::RecaptchaRejected,
            "count" => Self::Count,
            "spyMessage" => Self::SpyMessage,
            "spyTyping" => Self::SpyTyping,
            "spyStoppedTyping" => Self::SpyStoppedTyping,
            "spyDisconnected" => Self::SpyDisconnected,
            "question" => Self::Question,
            "error" => Self::Error,
            "commonLikes" => Self::CommonLikes,
            "antinudeBanned" => Self::AntinudeBanned,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single event from the feed.
///
/// Three wire shapes are understood:
///
/// - `["kind", arg, ...]` - positional arguments land in [`Event::args`]
/// - `{"type": "kind", ...}` - remaining keys land in [`Event::fields`]
/// - `"kind"` - a bare discriminator
///
/// Anything else is kept with an empty [`EventKind::Other`] discriminator.
/// The original value is always available through [`Event::raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    args: Vec<Value>,
    fields: Map<String, Value>,
    raw: Value,
}

impl Event {
    /// Create an event with no payload, in the service's array shape.
    pub fn new(kind: impl Into<EventKind>) -> Self {
        let kind = kind.into();
        let raw = Value::Array(vec![Value::String(kind.as_str().to_string())]);
        Self {
            kind,
            args: Vec::new(),
            fields: Map::new(),
            raw,
        }
    }

    /// Wrap a decoded JSON value as an event.
    pub fn from_value(raw: Value) -> Self {
        let (kind, args, fields) = match &raw {
            Value::Array(items) => match items.split_first() {
                Some((Value::String(name), rest)) => {
                    (EventKind::from(name.as_str()), rest.to_vec(), Map::new())
                }
                _ => (EventKind::Other(String::new()), items.clone(), Map::new()),
            },
            Value::Object(map) => {
                let kind = map
                    .get(TYPE_KEY)
                    .and_then(Value::as_str)
                    .map(EventKind::from)
                    .unwrap_or_else(|| EventKind::Other(String::new()));
                let fields = map
                    .iter()
                    .filter(|(key, _)| key.as_str() != TYPE_KEY)
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                (kind, Vec::new(), fields)
            }
            Value::String(name) => (EventKind::from(name.as_str()), Vec::new(), Map::new()),
            _ => (EventKind::Other(String::new()), Vec::new(), Map::new()),
        };

        Self {
            kind,
            args,
            fields,
            raw,
        }
    }

    /// The event discriminator.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The discriminator as it appeared on the wire.
    pub fn name(&self) -> &str {
        self.kind.as_str()
    }

    /// Positional arguments following the discriminator.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Positional argument `index` if it is a string.
    pub fn arg_str(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Value::as_str)
    }

    /// Named fields of an object-shaped event.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a named field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The value exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consume the event, returning the value as received.
    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl From<Value> for Event {
    fn from(raw: Value) -> Self {
        Self::from_value(raw)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for Event {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}
