//! Edge invalidation prompts.
//!
//! Given existing edges and newly extracted information, the model decides
//! which existing facts are contradicted and returns their ids as
//! [`InvalidatedEdges`]. Two interchangeable renderings are registered:
//!
//! - [`Version::V1`]: temporal invalidation over edge lists with start/end dates,
//!   with the surrounding episodes as context.
//! - [`Version::V2`]: contradiction detection of one new fact against a set of
//!   existing facts, with entity and domain guardrails.
//!
//! Callers pick a version by key and go through [`render`], or build a typed
//! context ([`InvalidateEdgesV1Context`], [`InvalidateEdgesV2Context`]) and call
//! its `messages()` directly.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{GraphitiError, Result};
use crate::llm_client::{LlmClient, Message};
use crate::utils::extract_json_object;

use super::models::{PromptContext, PromptFunction};

// ── Structured output ─────────────────────────────────────────────────────────

/// The model's decision: ids of existing facts to invalidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InvalidatedEdges {
    /// List of ids of facts that should be invalidated. If no facts should be
    /// invalidated, the list should be empty.
    #[serde(default)]
    pub contradicted_facts: Vec<i64>,
}

impl InvalidatedEdges {
    /// JSON schema handed to the LLM client as the required output shape.
    ///
    /// The schema is strict-mode compatible: every property is required, no
    /// extra properties are allowed and no `default` keywords remain.
    /// Deserialisation stays lenient and still accepts a missing field.
    pub fn schema() -> serde_json::Value {
        // Serialising a derived schema cannot fail.
        let mut schema = serde_json::to_value(schemars::schema_for!(InvalidatedEdges))
            .unwrap_or(serde_json::Value::Null);
        make_strict(&mut schema);
        schema
    }

    /// Validate an already-decoded JSON value against the schema.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GraphitiError::SchemaValidation(e.to_string()))
    }

    /// Parse raw model text, tolerating markdown fences or surrounding prose.
    pub fn from_response(raw: &str) -> Result<Self> {
        let json = extract_json_object(raw).ok_or_else(|| {
            GraphitiError::SchemaValidation("no JSON object in model response".to_string())
        })?;
        serde_json::from_str(json).map_err(|e| GraphitiError::SchemaValidation(e.to_string()))
    }

    /// True when the model found no contradictions.
    pub fn is_empty(&self) -> bool {
        self.contradicted_facts.is_empty()
    }

    /// Returned ids that were never offered to the model, in response order.
    ///
    /// Every id must come from the rendered `existing_edges`; enforcing that is
    /// up to the consumer.
    pub fn unknown_ids(&self, offered: &[i64]) -> Vec<i64> {
        self.contradicted_facts
            .iter()
            .copied()
            .filter(|id| !offered.contains(id))
            .collect()
    }
}

/// Tighten an object schema for strict structured output.
fn make_strict(schema: &mut serde_json::Value) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };
    let Some(props) = obj.get_mut("properties").and_then(|p| p.as_object_mut()) else {
        return;
    };

    let mut required = Vec::with_capacity(props.len());
    for (name, prop) in props.iter_mut() {
        if let Some(prop) = prop.as_object_mut() {
            prop.remove("default");
        }
        required.push(serde_json::Value::String(name.clone()));
    }

    obj.insert("required".to_string(), serde_json::Value::Array(required));
    obj.insert("additionalProperties".to_string(), serde_json::Value::Bool(false));
}

// ── Versions ──────────────────────────────────────────────────────────────────

/// Registered rendering strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    V1,
    V2,
}

impl Version {
    pub const ALL: [Version; 2] = [Version::V1, Version::V2];

    /// Registry key of this version (`"v1"`, `"v2"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V1 => "v1",
            Version::V2 => "v2",
        }
    }

    /// The prompt function registered for this version.
    pub fn prompt_function(self) -> PromptFunction {
        VERSIONS.get(self)
    }

    /// Render this version's messages from `context`.
    ///
    /// Fails with [`GraphitiError::MissingContext`] when a key the version
    /// interpolates is absent.
    pub fn render(self, context: &PromptContext) -> Result<Vec<Message>> {
        let messages = (self.prompt_function())(context)?;
        debug!(
            version = self.as_str(),
            messages = messages.len(),
            user_chars = messages.last().map(|m| m.content().len()).unwrap_or(0),
            "rendered invalidate_edges prompt"
        );
        Ok(messages)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = GraphitiError;

    fn from_str(key: &str) -> Result<Self> {
        Version::ALL
            .into_iter()
            .find(|v| v.as_str() == key)
            .ok_or_else(|| GraphitiError::UnknownPromptVersion(key.to_string()))
    }
}

/// The version registry: exactly one prompt function per [`Version`].
#[derive(Clone, Copy)]
pub struct Versions {
    pub v1: PromptFunction,
    pub v2: PromptFunction,
}

impl fmt::Debug for Versions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Versions")
            .field("keys", &Version::ALL)
            .finish_non_exhaustive()
    }
}

impl Versions {
    /// The prompt function registered for `version`.
    pub fn get(&self, version: Version) -> PromptFunction {
        match version {
            Version::V1 => self.v1,
            Version::V2 => self.v2,
        }
    }
}

/// Registered edge invalidation prompts.
pub static VERSIONS: Versions = Versions { v1, v2 };

/// Render the prompt registered under `version_key`.
///
/// Fails with [`GraphitiError::UnknownPromptVersion`] for an unregistered key
/// and [`GraphitiError::MissingContext`] when `context` lacks a key the
/// version interpolates.
pub fn render(version_key: &str, context: &PromptContext) -> Result<Vec<Message>> {
    let version = version_key.parse::<Version>().map_err(|e| {
        warn!(key = version_key, "unknown invalidate_edges prompt version");
        e
    })?;
    version.render(context)
}

/// Render `version` and ask `client` for the structured decision.
///
/// Output that does not decode as [`InvalidatedEdges`] fails with
/// [`GraphitiError::SchemaValidation`], whichever way the client reports it.
pub async fn invalidate_edges<C: LlmClient>(
    client: &C,
    version: Version,
    context: &PromptContext,
) -> Result<InvalidatedEdges> {
    let messages = version.render(context)?;
    client
        .generate_structured::<InvalidatedEdges>(&messages)
        .await
        .map_err(|e| match e {
            GraphitiError::Serialization(e) => GraphitiError::SchemaValidation(e.to_string()),
            other => other,
        })
}

// ── v1 ────────────────────────────────────────────────────────────────────────

/// Context for [`Version::V1`]. Every field is a pre-formatted text block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidateEdgesV1Context {
    pub previous_episodes: String,
    pub current_episode: String,
    /// Edge lines, newest first.
    pub existing_edges: String,
    pub new_edges: String,
}

impl TryFrom<&PromptContext> for InvalidateEdgesV1Context {
    type Error = GraphitiError;

    fn try_from(ctx: &PromptContext) -> Result<Self> {
        let v = Version::V1.as_str();
        Ok(Self {
            previous_episodes: ctx.require(v, "previous_episodes")?,
            current_episode: ctx.require(v, "current_episode")?,
            existing_edges: ctx.require(v, "existing_edges")?,
            new_edges: ctx.require(v, "new_edges")?,
        })
    }
}

impl InvalidateEdgesV1Context {
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(
                "You are an AI assistant that helps determine which relationships in a knowledge graph should be invalidated based solely on explicit contradictions in newer information.",
            ),
            Message::user(format!(
                r#"Based on the provided existing edges and new edges with their timestamps, determine which relationships, if any, should be marked as expired due to contradictions or updates in the newer edges.
Use the start and end dates of the edges to determine which edges are to be marked expired.
Only mark a relationship as invalid if there is clear evidence from other edges that the relationship is no longer true.
Do not invalidate relationships merely because they weren't mentioned in the episodes. You may use the current episode and previous episodes as well as the facts of each edge to understand the context of the relationships.

Previous Episodes:
{previous_episodes}

Current Episode:
{current_episode}

Existing Edges (sorted by timestamp, newest first):
{existing_edges}

New Edges:
{new_edges}

{edge_format}
"#,
                previous_episodes = self.previous_episodes,
                current_episode = self.current_episode,
                existing_edges = self.existing_edges,
                new_edges = self.new_edges,
                edge_format = EDGE_FORMAT_LINE,
            )),
        ]
    }
}

/// Closing line of the v1 user message; it documents [`crate::edges::EdgeLine`]'s layout.
pub const EDGE_FORMAT_LINE: &str = r#"Each edge is formatted as: "UUID | SOURCE_NODE - EDGE_NAME - TARGET_NODE (fact: EDGE_FACT), START_DATE (END_DATE, optional))""#;

fn v1(context: &PromptContext) -> Result<Vec<Message>> {
    Ok(InvalidateEdgesV1Context::try_from(context)?.messages())
}

// ── v2 ────────────────────────────────────────────────────────────────────────

/// Context for [`Version::V2`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidateEdgesV2Context {
    /// Existing facts, one per line, each led by the id the model should return.
    pub existing_edges: String,
    /// The single new fact.
    pub new_edge: String,
}

impl TryFrom<&PromptContext> for InvalidateEdgesV2Context {
    type Error = GraphitiError;

    fn try_from(ctx: &PromptContext) -> Result<Self> {
        let v = Version::V2.as_str();
        Ok(Self {
            existing_edges: ctx.require(v, "existing_edges")?,
            new_edge: ctx.require(v, "new_edge")?,
        })
    }
}

impl InvalidateEdgesV2Context {
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(
                "You are an AI assistant that identifies contradictions between facts in a knowledge graph, with special attention to information that evolves over time and belongs to specific entities.",
            ),
            Message::user(format!(
                r#"Determine which existing facts are contradicted by the new fact. A contradiction occurs when:

1. Facts contain directly conflicting information about the same attribute of the same entity (e.g., different values, status changes)
2. Facts represent different states of the same entity or relationship that cannot be simultaneously true
3. The new fact explicitly updates or supersedes an older fact about the same entity
4. The new fact implies organizational or structural changes that make previous representations invalid
5. Facts contain temporal indicators like "now", "previously", "changed to" that signal a state change

Pay special attention to:
- User ownership: Facts about different users should not contradict each other
- Domain specificity: Changes in one domain (phones, books, food) should not affect other domains
- Entity boundaries: Only consider contradictions within the same entity boundary

Do not mark facts as contradictory if they:
- Provide complementary information about different attributes
- Represent partial information that can coexist with the new fact
- Merely add detail without invalidating previous information
- Belong to different users or entities
- Represent preferences in different domains

Return the IDs of all existing facts that are contradicted by the new fact. If no contradictions exist, return an empty list.

<EXISTING FACTS>
{existing_edges}
</EXISTING FACTS>

<NEW FACT>
{new_edge}
</NEW FACT>
"#,
                existing_edges = self.existing_edges,
                new_edge = self.new_edge,
            )),
        ]
    }
}

fn v2(context: &PromptContext) -> Result<Vec<Message>> {
    Ok(InvalidateEdgesV2Context::try_from(context)?.messages())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Role;
    use serde_json::json;

    fn v1_context() -> PromptContext {
        PromptContext::new()
            .with("previous_episodes", "")
            .with("current_episode", "Alice moved to Berlin.")
            .with(
                "existing_edges",
                "1 | Alice - LIVES_IN - Paris (fact: Alice lives in Paris), 2023-01-01",
            )
            .with(
                "new_edges",
                "2 | Alice - LIVES_IN - Berlin (fact: Alice lives in Berlin), 2024-01-01",
            )
    }

    fn v2_context() -> PromptContext {
        PromptContext::new()
            .with("existing_edges", "1 | Alice - PREFERS - Tea (fact: Alice prefers tea)")
            .with("new_edge", "Alice now prefers coffee.")
    }

    // ── schema ────────────────────────────────────────────────────────────────

    #[test]
    fn test_invalidated_edges_empty() {
        let parsed = InvalidatedEdges::from_value(json!({ "contradicted_facts": [] }))
            .expect("empty list is valid");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_invalidated_edges_preserves_order() {
        let parsed = InvalidatedEdges::from_value(json!({ "contradicted_facts": [2, 1, 2] }))
            .expect("ints are valid");
        assert_eq!(parsed.contradicted_facts, vec![2, 1, 2]);
    }

    #[test]
    fn test_invalidated_edges_defaults_when_absent() {
        let parsed = InvalidatedEdges::from_value(json!({})).expect("field defaults");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_invalidated_edges_rejects_non_integers() {
        let err = InvalidatedEdges::from_value(json!({ "contradicted_facts": ["a"] })).unwrap_err();
        assert!(matches!(err, GraphitiError::SchemaValidation(_)));
    }

    #[test]
    fn test_from_response_fenced() {
        let raw = "```json\n{\"contradicted_facts\": [0]}\n```";
        let parsed = InvalidatedEdges::from_response(raw).expect("fenced JSON parses");
        assert_eq!(parsed.contradicted_facts, vec![0]);
    }

    #[test]
    fn test_from_response_without_json() {
        let err = InvalidatedEdges::from_response("none of them").unwrap_err();
        assert!(matches!(err, GraphitiError::SchemaValidation(_)));
    }

    #[test]
    fn test_schema_names_field() {
        let schema = InvalidatedEdges::schema();
        assert!(schema["properties"]["contradicted_facts"].is_object());
    }

    #[test]
    fn test_schema_is_strict() {
        let schema = InvalidatedEdges::schema();
        assert_eq!(schema["required"], json!(["contradicted_facts"]));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert!(schema["properties"]["contradicted_facts"].get("default").is_none());
        assert_eq!(schema["properties"]["contradicted_facts"]["type"], json!("array"));
    }

    #[test]
    fn test_versions_debug_lists_keys() {
        let dbg = format!("{:?}", VERSIONS);
        assert!(dbg.contains("V1"));
        assert!(dbg.contains("V2"));
    }

    #[test]
    fn test_unknown_ids() {
        let decision = InvalidatedEdges {
            contradicted_facts: vec![0, 5, 1, 9],
        };
        assert_eq!(decision.unknown_ids(&[0, 1, 2]), vec![5, 9]);
    }

    // ── registry ──────────────────────────────────────────────────────────────

    #[test]
    fn test_version_keys_round_trip() {
        for version in Version::ALL {
            assert_eq!(version.as_str().parse::<Version>().unwrap(), version);
        }
    }

    #[test]
    fn test_unknown_version_key() {
        let err = render("v3", &v1_context()).unwrap_err();
        assert!(matches!(err, GraphitiError::UnknownPromptVersion(ref k) if k == "v3"));
        assert!("V1".parse::<Version>().is_err());
    }

    #[test]
    fn test_registry_dispatches_per_version() {
        let v1_msgs = VERSIONS.get(Version::V1)(&v1_context()).expect("v1 renders");
        let v2_msgs = VERSIONS.get(Version::V2)(&v2_context()).expect("v2 renders");
        assert_ne!(v1_msgs[0], v2_msgs[0]);
    }

    #[test]
    fn test_version_serde() {
        assert_eq!(serde_json::to_string(&Version::V2).unwrap(), "\"v2\"");
        let v: Version = serde_json::from_str("\"v1\"").unwrap();
        assert_eq!(v, Version::V1);
    }

    // ── v1 ────────────────────────────────────────────────────────────────────

    #[test]
    fn test_v1_shape() {
        let msgs = render("v1", &v1_context()).expect("v1 renders");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role(), Role::System);
        assert_eq!(msgs[1].role(), Role::User);
        assert!(msgs[0].content().contains("solely on explicit contradictions"));
    }

    #[test]
    fn test_v1_block_order() {
        let msgs = render("v1", &v1_context()).unwrap();
        let user = msgs[1].content();
        let pos = |needle: &str| user.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(pos("Previous Episodes:") < pos("Current Episode:"));
        assert!(pos("Current Episode:") < pos("Existing Edges (sorted by timestamp, newest first):"));
        assert!(pos("Existing Edges") < pos("New Edges:"));
        assert!(pos("New Edges:") < pos(EDGE_FORMAT_LINE));
    }

    #[test]
    fn test_v1_missing_key() {
        let ctx = PromptContext::new()
            .with("previous_episodes", "")
            .with("current_episode", "x")
            .with("existing_edges", "y");
        let err = render("v1", &ctx).unwrap_err();
        assert!(matches!(
            err,
            GraphitiError::MissingContext { version: "v1", key: "new_edges" }
        ));
    }

    // ── v2 ────────────────────────────────────────────────────────────────────

    #[test]
    fn test_v2_shape() {
        let msgs = render("v2", &v2_context()).expect("v2 renders");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role(), Role::System);
        assert_eq!(msgs[1].role(), Role::User);
    }

    #[test]
    fn test_v2_ignores_extra_keys() {
        let ctx = v2_context().with("current_episode", "unused");
        let with_extra = render("v2", &ctx).unwrap();
        assert_eq!(with_extra, render("v2", &v2_context()).unwrap());
    }

    #[test]
    fn test_v2_missing_key() {
        let ctx = PromptContext::new().with("existing_edges", "1 | a");
        let err = render("v2", &ctx).unwrap_err();
        assert!(matches!(
            err,
            GraphitiError::MissingContext { version: "v2", key: "new_edge" }
        ));
    }

    #[test]
    fn test_typed_context_matches_dynamic() {
        let typed = InvalidateEdgesV2Context {
            existing_edges: "1 | Alice - PREFERS - Tea (fact: Alice prefers tea)".to_string(),
            new_edge: "Alice now prefers coffee.".to_string(),
        };
        assert_eq!(typed.messages(), render("v2", &v2_context()).unwrap());
    }
}
