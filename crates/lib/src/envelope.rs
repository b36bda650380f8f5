//! Client request envelope and its normalization into the upstream message list.
//!
//! Browsers post `{ "input" | "message" | "text": <string or [{role, content}]> }`.
//! The first non-null candidate wins; a bare string becomes a single user message and a list
//! is forwarded as sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope keys checked for the prompt, in priority order.
pub const CANDIDATE_FIELDS: [&str; 3] = ["input", "message", "text"];

/// A plain `{role, content}` message, as kept in the CLI conversation history.
/// Extra keys are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }

    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            extra: Map::new(),
        }
    }
}

/// The prompt carried by an envelope: a bare string or an explicit message list.
/// List items are opaque; their shape (e.g. `content` as a list of parts) is the upstream's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Messages(Vec<Value>),
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Missing 'input' field in request body")]
    Missing,
    #[error("field '{field}' must be a string or a list of messages")]
    Invalid {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw client body (a JSON object). Unrecognized keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    /// First non-null candidate field and its value.
    pub fn candidate(&self) -> Option<(&'static str, &Value)> {
        CANDIDATE_FIELDS
            .iter()
            .find_map(|&f| self.0.get(f).filter(|v| !v.is_null()).map(|v| (f, v)))
    }

    /// Resolve the prompt from the first non-null candidate field.
    pub fn resolve(&self) -> Result<Prompt, EnvelopeError> {
        let (field, value) = self.candidate().ok_or(EnvelopeError::Missing)?;
        Prompt::deserialize(value).map_err(|source| EnvelopeError::Invalid { field, source })
    }
}

impl From<Map<String, Value>> for Envelope {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Body posted to the inference endpoint: `{ "input": [ {role, content}, ... ] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamRequest {
    pub input: Vec<Value>,
}

impl From<Prompt> for UpstreamRequest {
    fn from(prompt: Prompt) -> Self {
        match prompt {
            Prompt::Messages(input) => Self { input },
            Prompt::Text(s) => Self::single(s),
        }
    }
}

impl UpstreamRequest {
    /// Single user message, as sent for a bare string and by the connection check.
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            input: vec![user_message(content.into())],
        }
    }
}

fn user_message(content: String) -> Value {
    let mut m = Map::new();
    m.insert("role".to_string(), Value::String("user".to_string()));
    m.insert("content".to_string(), Value::String(content));
    Value::Object(m)
}
