//! Response records and reply normalization.
//!
//! Every operation returns a [`Response`]: a flat JSON object. Success,
//! fallback and error records share that shape; callers tell them apart by
//! the presence of the `error` key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the reply text when it could not be parsed.
pub const RAW_RESPONSE_KEY: &str = "raw_response";

/// A flat mapping from field name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response(Map<String, Value>);

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// True for error records.
    pub fn is_error(&self) -> bool {
        self.0.contains_key("error")
    }

    /// The `error` message, if this is an error record.
    pub fn error(&self) -> Option<&str> {
        self.get_str("error")
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get_str("timestamp")
    }

    /// The model label; absent on error records.
    pub fn model(&self) -> Option<&str> {
        self.get_str("model")
    }

    /// The unparsed reply, present only on fallback records.
    pub fn raw_response(&self) -> Option<&str> {
        self.get_str(RAW_RESPONSE_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Current time as an RFC 3339 (ISO-8601) string.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Outcome of reading a model reply as structured data.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    /// The reply is a JSON object.
    Object(Response),
    /// The reply is not JSON at all; callers build a fallback record.
    NotJson,
    /// The reply is valid JSON of another kind (array, string, number,
    /// boolean or null).
    NotAnObject(&'static str),
}

/// Parse a model reply as a JSON object.
///
/// Only surrounding whitespace is ignored. A reply wrapped in a Markdown
/// code fence is not JSON and yields [`ParsedReply::NotJson`].
pub fn parse_structured(reply: &str) -> ParsedReply {
    match serde_json::from_str::<Value>(reply.trim()) {
        Ok(Value::Object(map)) => ParsedReply::Object(Response(map)),
        Ok(other) => ParsedReply::NotAnObject(json_kind(&other)),
        Err(_) => ParsedReply::NotJson,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
