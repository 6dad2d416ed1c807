//! LLM client abstraction.
//!
//! Prompt functions produce [`Message`] sequences; an [`LlmClient`] executes
//! them. No concrete client ships with this crate: transport, retry and caching
//! belong to the implementor.

use crate::errors::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A chat message for the LLM conversation.
///
/// Fields are private so a rendered message cannot be altered after the
/// prompt function returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Shorthand for a [`Role::System`] message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Shorthand for a [`Role::User`] message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Speaker role in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role, as chat-completion APIs expect it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for LLM clients supporting structured output (JSON schema).
#[allow(async_fn_in_trait)]
pub trait LlmClient: Send + Sync {
    /// Send a request and parse the response as plain text.
    async fn generate(&self, messages: &[Message]) -> Result<String>;

    /// Send a request and parse the response as a structured JSON type.
    ///
    /// Implementors constrain the model with the JSON schema derived from `T`
    /// (via `schemars`) and must preserve message order exactly.
    async fn generate_structured<T>(&self, messages: &[Message]) -> Result<T>
    where
        T: DeserializeOwned + schemars::JsonSchema;
}
