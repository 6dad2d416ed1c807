//! Shared prompt types: the render context and the prompt-function signature.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::{GraphitiError, Result};
use crate::llm_client::Message;

/// A prompt function: context in, ordered messages out.
///
/// Prompt functions are pure; the same context always renders the same
/// messages.
pub type PromptFunction = fn(&PromptContext) -> Result<Vec<Message>>;

/// Caller-supplied values that a prompt template interpolates.
///
/// Values are opaque pre-formatted text blocks. A string value is inserted
/// verbatim; any other JSON value is inserted in its compact JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptContext {
    values: BTreeMap<String, Value>,
}

impl PromptContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one under `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text form of the value under `key`, as it will appear in a prompt.
    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.values.get(key).map(|value| match value {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        })
    }

    /// Like [`text`](Self::text), but a missing key is a
    /// [`GraphitiError::MissingContext`] attributed to `version`.
    pub fn require(&self, version: &'static str, key: &'static str) -> Result<String> {
        match self.text(key) {
            Some(text) => Ok(text.into_owned()),
            None => {
                warn!(version, key, "prompt context is missing a required key");
                Err(GraphitiError::MissingContext { version, key })
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for PromptContext
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

impl TryFrom<Value> for PromptContext {
    type Error = GraphitiError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(GraphitiError::Validation(format!(
                "prompt context must be a JSON object, got {other}"
            ))),
        }
    }
}
