//! # graphiti-prompts
//!
//! Versioned prompt templates for [Graphiti](https://github.com/getzep/graphiti)-style
//! temporal knowledge graphs: the step that decides which stored relationship
//! facts ("edges") a newer observation invalidates.
//!
//! ## Architecture
//!
//! - **Prompt registry**: a closed set of [`prompts::invalidate_edges::Version`]s, each
//!   mapped to a pure `context → messages` function
//! - **Structured output**: [`prompts::InvalidatedEdges`] is the JSON schema the model must answer in
//! - **Edge lines**: [`edges::EdgeLine`] renders edges in the layout the templates describe
//! - **LLM seam**: [`llm_client::LlmClient`] is implemented elsewhere; this crate only renders
//!
//! Rendering is synchronous, allocation-only and safe to call from any number
//! of threads; the registry is a `static` that is never mutated.

pub mod edges;
pub mod errors;
pub mod types;

pub mod llm_client;
pub mod prompts;

pub mod utils;

pub use errors::{GraphitiError, LlmError, Result};
pub use prompts::invalidate_edges::render;
pub use types::PromptConfig;
