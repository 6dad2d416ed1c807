//! Timestamp formatting for bi-temporal edge lines.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a valid-time boundary the way edge lines present it to the model.
///
/// Output format: `"2024-01-15T10:30:00Z"` (RFC 3339, whole seconds, UTC).
/// Sub-second precision is dropped; it carries no meaning for the model.
pub fn format_edge_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
