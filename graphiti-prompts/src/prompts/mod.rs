//! Prompt templates for LLM interactions.
//!
//! Each submodule holds the prompts for one pipeline stage. A stage exposes a
//! closed set of versions; callers pick one by key and get back an ordered
//! [`Message`](crate::llm_client::Message) sequence.
//!
//! Prompts are stored as Rust string literals (not external files) for
//! compile-time inclusion and zero-cost access.

pub mod invalidate_edges;
pub mod models;

pub use invalidate_edges::{InvalidatedEdges, Version, VERSIONS};
pub use models::{PromptContext, PromptFunction};
