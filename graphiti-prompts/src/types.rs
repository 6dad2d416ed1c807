//! Shared configuration types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::prompts::Version;

/// Env var selecting the edge invalidation prompt version.
pub const INVALIDATE_EDGES_VERSION_VAR: &str = "INVALIDATE_EDGES_PROMPT_VERSION";

/// Version used when [`INVALIDATE_EDGES_VERSION_VAR`] is unset.
pub const DEFAULT_INVALIDATE_EDGES_VERSION: Version = Version::V2;

fn validate_version_key(key: &str) -> Result<(), validator::ValidationError> {
    if key.parse::<Version>().is_err() {
        return Err(validator::ValidationError::new("unknown prompt version"));
    }
    Ok(())
}

/// Prompt selection loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PromptConfig {
    /// Key of the edge invalidation prompt version (`"v1"` or `"v2"`).
    #[validate(custom(function = "validate_version_key"))]
    pub invalidate_edges_version: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            invalidate_edges_version: DEFAULT_INVALIDATE_EDGES_VERSION.as_str().to_string(),
        }
    }
}

impl PromptConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent).
    /// An unset variable falls back to the default; a set but unregistered
    /// key returns [`crate::GraphitiError::Validation`].
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let invalidate_edges_version = std::env::var(INVALIDATE_EDGES_VERSION_VAR)
            .unwrap_or_else(|_| DEFAULT_INVALIDATE_EDGES_VERSION.as_str().to_string());

        let config = Self {
            invalidate_edges_version,
        };

        config.validate().map_err(|e| {
            crate::GraphitiError::Validation(format!("{INVALIDATE_EDGES_VERSION_VAR}: {e}"))
        })?;

        Ok(config)
    }

    /// The configured edge invalidation prompt version.
    pub fn invalidate_edges_version(&self) -> crate::Result<Version> {
        self.invalidate_edges_version.parse()
    }
}
