//! Edge rendering for prompts.
//!
//! - [`EdgeLine`] — one entity edge in the `ID | SOURCE - EDGE - TARGET (fact: …), START (END)` layout

pub mod line;

pub use line::{format_edge_lines, sort_newest_first, EdgeId, EdgeLine};
