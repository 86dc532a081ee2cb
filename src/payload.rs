//! Caller-facing payload types.
//!
//! [`Payload`] is what the logging entry points accept. Only the
//! [`Payload::Text`] and [`Payload::Structured`] variants can become a batch;
//! [`Payload::Unsupported`] carries any other serializable value so it can be
//! reported verbatim when normalization rejects it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One key/value pair of a structured message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Pair {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Structured log message with an optional zone, category and ordered pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// IANA zone name used to stamp the record; the resolver default applies
    /// when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Free-form classification, sent as the SLS `Category`.
    #[serde(default)]
    pub category: String,
    /// Record contents in the order they are sent.
    #[serde(default)]
    pub pairs: Vec<Pair>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a message from any iterator of pair-like values.
    pub fn from_pairs<I, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pair>,
    {
        Self {
            pairs: pairs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_timezone(mut self, zone: impl Into<String>) -> Self {
        self.timezone = Some(zone.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Append a key/value pair, keeping insertion order.
    pub fn with_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push(Pair::new(key, value));
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push(Pair::new(key, value));
    }
}

/// Value accepted by every logging entry point.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Plain text, stored under the `message` key.
    Text(String),
    /// Structured message with explicit pairs.
    Structured(Message),
    /// Anything else; always rejected by normalization.
    Unsupported(Value),
}

impl Payload {
    /// Wrap an arbitrary serializable value as a payload.
    ///
    /// Values serializing to a JSON string become [`Payload::Text`], the same
    /// as `From<Value>`; everything else is [`Payload::Unsupported`].
    pub fn unsupported<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::from(serde_json::to_value(value).unwrap_or(Value::Null))
    }

    /// Serialize the payload for diagnostics. Never fails; an unserializable
    /// payload yields an empty string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(text) => f.write_str(text),
            Payload::Structured(_) | Payload::Unsupported(_) => f.write_str(&self.to_json()),
        }
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Payload {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Message> for Payload {
    fn from(value: Message) -> Self {
        Self::Structured(value)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Unsupported(other),
        }
    }
}

macro_rules! unsupported_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Payload {
                fn from(value: $ty) -> Self {
                    Self::Unsupported(Value::from(value))
                }
            }
        )*
    };
}

unsupported_from!(bool, i32, i64, u32, u64, f64);
