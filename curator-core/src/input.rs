//! Raw tool inputs
//!
//! Enum-like fields arrive as plain strings so that a bad value is reported by
//! [`crate::validation`] with the accepted set, instead of failing JSON decoding
//! with a generic message.

use crate::RelatedColumn;
use serde::{Deserialize, Serialize};

/// Arguments of the `capture_insight` tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureInsightInput {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub insight_text: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub entity_urns: Vec<String>,
    #[serde(default)]
    pub related_columns: Vec<RelatedColumn>,
    #[serde(default)]
    pub suggested_actions: Vec<SuggestedActionInput>,
}

/// A suggested action before its `action_type` is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedActionInput {
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_description: Option<String>,
}

/// An apply item before its `change_type` is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyChangeInput {
    #[serde(default)]
    pub change_type: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_description: Option<String>,
}

/// Arguments of the `apply_knowledge` tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyKnowledgeInput {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub entity_urn: String,
    #[serde(default)]
    pub insight_ids: Vec<String>,
    #[serde(default)]
    pub changes: Vec<ApplyChangeInput>,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub review_notes: String,
}

/// Edit request for a not-yet-applied insight. Empty strings mean "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InsightEditInput {
    #[serde(default)]
    pub insight_text: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub confidence: String,
}
