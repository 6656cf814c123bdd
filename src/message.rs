//! Message model for the eval-server protocol.
//!
//! The wire format is a stream of map-shaped messages per operation:
//!
//! ```text
//! Client → Server:  Operation       (named request + parameter map)
//! Server → Client:  ResponseMessage (one map of named fields)   * N
//!                   ... until a message carries status "done"
//! ```
//!
//! A full stream is aggregated into a [`DoneResponse`]: for every field name
//! the ordered sequence of all values seen across the stream. Field values
//! are untyped protocol trees (`serde_json::Value`); consumers must check
//! shape before use, there is no implicit coercion.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Parameter map of an operation or field map of a response message.
pub type Params = serde_json::Map<String, Value>;

/// A named request sent to the eval server. Immutable once sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Wire operation name (`eval`, `describe`, `test-var-query`, ...).
    pub op: String,

    /// Correlation id, assigned at construction.
    pub id: String,

    /// Operation parameters.
    pub params: Params,
}

impl Operation {
    /// Create an operation with a fresh correlation id.
    pub fn new(op: &str, params: Params) -> Self {
        Self {
            op: op.to_string(),
            id: Uuid::new_v4().to_string(),
            params,
        }
    }

    /// Create an operation with a caller-chosen id.
    pub fn with_id(op: &str, id: &str, params: Params) -> Self {
        Self {
            op: op.to_string(),
            id: id.to_string(),
            params,
        }
    }
}

/// One unit of server output: a map of named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    fields: Params,
}

impl ResponseMessage {
    pub fn new(fields: Params) -> Self {
        Self { fields }
    }

    /// Build a message from a JSON object value. Non-object values yield an
    /// empty message.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self {
                fields: Params::new(),
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Params {
        &self.fields
    }

    /// True if this message terminates the stream: its `status` field is the
    /// string `"done"` or a sequence containing `"done"`.
    pub fn is_done(&self) -> bool {
        match self.fields.get("status") {
            Some(Value::String(s)) => s == "done",
            Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some("done")),
            _ => false,
        }
    }
}

/// Aggregation of one operation's full message stream.
///
/// Append-only while the stream is open; once the done marker arrives the
/// response is sealed and later messages are ignored. The `context` sub-map
/// is the request context echoed back onto the response by the terminal
/// handler, so leave-phase interceptors can read per-request flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoneResponse {
    fields: HashMap<String, Vec<Value>>,
    context: Params,
    done: bool,
}

impl DoneResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a whole message stream at once.
    pub fn from_messages<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = ResponseMessage>,
    {
        let mut resp = Self::new();
        for msg in messages {
            resp.push(msg);
        }
        resp
    }

    /// Append one message. Every field value is recorded in arrival order;
    /// messages arriving after the done marker are dropped.
    pub fn push(&mut self, message: ResponseMessage) {
        if self.done {
            return;
        }
        let done = message.is_done();
        for (key, value) in message.fields {
            self.fields.entry(key).or_default().push(value);
        }
        if done {
            self.done = true;
        }
    }

    /// First recorded value for `key`, if any. Never panics.
    pub fn get_first(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).and_then(|values| values.first())
    }

    /// All recorded values for `key`, in arrival order. Empty slice, not
    /// absent, when the key was never recorded.
    pub fn get_all(&self, key: &str) -> &[Value] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True once the terminal done marker has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn context(&self) -> &Params {
        &self.context
    }

    /// Attach a request context sub-map, replacing any previous one.
    pub fn with_context(mut self, context: Params) -> Self {
        self.context = context;
        self
    }

    /// Rebuild the response with every recorded value under `key` passed
    /// through `f`. Other fields, the context and the done flag carry over.
    pub fn map_field<F>(mut self, key: &str, f: F) -> Self
    where
        F: Fn(Value) -> Value,
    {
        if let Some(values) = self.fields.remove(key) {
            self.fields
                .insert(key.to_string(), values.into_iter().map(&f).collect());
        }
        self
    }
}
