//! EdgeLine — one entity edge rendered as a single prompt line.
//!
//! Line layout (the templates describe it to the model, so it must not drift):
//!
//! ```text
//! ID | SOURCE_NODE - EDGE_NAME - TARGET_NODE (fact: EDGE_FACT), START_DATE (END_DATE)
//! ```
//!
//! The trailing ` (END_DATE)` appears only when the edge has an `invalid_at`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::format_edge_timestamp;

/// Placeholder for an edge whose valid-time start is not known.
pub const UNKNOWN_START: &str = "unknown";

/// Identifier printed at the head of an edge line.
///
/// Prompts that ask for integer ids back (see
/// [`InvalidatedEdges`](crate::prompts::invalidate_edges::InvalidatedEdges))
/// should use [`EdgeId::Index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeId {
    Uuid(Uuid),
    Index(i64),
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeId::Uuid(uuid) => write!(f, "{uuid}"),
            EdgeId::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<Uuid> for EdgeId {
    fn from(uuid: Uuid) -> Self {
        EdgeId::Uuid(uuid)
    }
}

impl From<i64> for EdgeId {
    fn from(idx: i64) -> Self {
        EdgeId::Index(idx)
    }
}

/// A factual relationship between two named entities, with its valid-time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLine {
    pub id: EdgeId,
    /// Name of the source entity node.
    pub source_node: String,
    /// Relationship label (e.g. "LIVES_IN").
    pub edge_name: String,
    /// Name of the target entity node.
    pub target_node: String,
    /// Human-readable fact string.
    pub fact: String,
    /// When the fact became true in the real world.
    pub valid_at: Option<DateTime<Utc>>,
    /// When the fact ceased to be true in the real world.
    pub invalid_at: Option<DateTime<Utc>>,
}

impl EdgeLine {
    pub fn new(
        id: impl Into<EdgeId>,
        source_node: impl Into<String>,
        edge_name: impl Into<String>,
        target_node: impl Into<String>,
        fact: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_node: source_node.into(),
            edge_name: edge_name.into(),
            target_node: target_node.into(),
            fact: fact.into(),
            valid_at: None,
            invalid_at: None,
        }
    }

    pub fn with_valid_at(mut self, valid_at: DateTime<Utc>) -> Self {
        self.valid_at = Some(valid_at);
        self
    }

    pub fn with_invalid_at(mut self, invalid_at: DateTime<Utc>) -> Self {
        self.invalid_at = Some(invalid_at);
        self
    }

    /// Copy `lines`, replacing each id with its zero-based position.
    ///
    /// The position is what the model returns in `contradicted_facts`, so the
    /// caller maps results back through the original slice.
    pub fn indexed(lines: &[EdgeLine]) -> Vec<EdgeLine> {
        lines
            .iter()
            .zip(0_i64..)
            .map(|(line, idx)| EdgeLine {
                id: EdgeId::Index(idx),
                ..line.clone()
            })
            .collect()
    }
}

impl fmt::Display for EdgeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self
            .valid_at
            .as_ref()
            .map(format_edge_timestamp)
            .unwrap_or_else(|| UNKNOWN_START.to_string());

        write!(
            f,
            "{} | {} - {} - {} (fact: {}), {}",
            self.id, self.source_node, self.edge_name, self.target_node, self.fact, start
        )?;

        if let Some(end) = &self.invalid_at {
            write!(f, " ({})", format_edge_timestamp(end))?;
        }
        Ok(())
    }
}

/// Render edge lines as a newline-separated block ready for a prompt context.
pub fn format_edge_lines(lines: &[EdgeLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Order lines by `valid_at`, newest first. Lines without a start go last;
/// ties keep their input order.
pub fn sort_newest_first(lines: &mut [EdgeLine]) {
    lines.sort_by(|a, b| b.valid_at.cmp(&a.valid_at));
}
