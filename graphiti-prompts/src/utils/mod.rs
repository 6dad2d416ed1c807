//! Shared utilities.
//!
//! Includes:
//! - Date formatting for edge lines
//! - JSON extraction from free-form model responses

pub mod datetime;
pub mod text;

pub use datetime::format_edge_timestamp;
pub use text::extract_json_object;
