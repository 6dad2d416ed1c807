//! Error types for graphiti-prompts.

/// Alias for Results returning [`GraphitiError`].
pub type Result<T> = std::result::Result<T, GraphitiError>;

/// Top-level error type for graphiti-prompts.
#[derive(Debug, thiserror::Error)]
pub enum GraphitiError {
    /// The requested prompt version key is not registered.
    #[error("Unknown prompt version: {0:?}")]
    UnknownPromptVersion(String),

    /// A key the selected prompt version interpolates is absent from the context.
    #[error("Missing context key {key:?} for prompt version {version}")]
    MissingContext { version: &'static str, key: &'static str },

    /// Model output did not match the structured-output schema.
    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// LLM-specific errors.
///
/// Returned by [`crate::llm_client::LlmClient`] implementations; this crate
/// never produces them itself.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Rate limited")]
    RateLimit,

    #[error("Model refused to respond")]
    Refusal,

    #[error("Empty response from LLM")]
    EmptyResponse,

    #[error("Authentication failed")]
    Authentication,

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
}
