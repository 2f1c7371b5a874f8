//! Entity types for Curator records

use crate::{
    ActionType, Category, Confidence, InsightStatus, MetadataSnapshot, RecordId, RequestedChanges,
    Source, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// INSIGHT
// ============================================================================

/// A column an insight talks about.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RelatedColumn {
    /// Dataset URN
    pub urn: String,
    /// Column name
    pub column: String,
    /// How this column relates to the insight
    #[serde(default)]
    pub relevance: String,
}

/// A catalog edit proposed by the author of an insight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SuggestedAction {
    pub action_type: ActionType,
    /// Empty for entity level, `column:<name>` for a column, a URL for documentation
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_description: Option<String>,
}

/// A captured claim about one or more catalog entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Insight {
    pub id: RecordId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    /// Provenance: session, user and persona of the capturing caller.
    /// Empty when the caller carried no identity.
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub captured_by: String,
    #[serde(default)]
    pub persona: String,
    pub source: Source,
    pub category: Category,
    pub insight_text: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub entity_urns: Vec<String>,
    #[serde(default)]
    pub related_columns: Vec<RelatedColumn>,
    #[serde(default)]
    pub suggested_actions: Vec<SuggestedAction>,
    pub status: InsightStatus,

    // Set by review (approve/reject)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub reviewed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,

    // Set by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub applied_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changeset_ref: Option<RecordId>,
}

impl Insight {
    /// Whether `entity_urn` is one of the entities this insight references.
    pub fn references(&self, entity_urn: &str) -> bool {
        self.entity_urns.iter().any(|u| u == entity_urn)
    }
}

/// Edits to an insight that has not been applied yet. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightUpdate {
    pub insight_text: Option<String>,
    pub category: Option<Category>,
    pub confidence: Option<Confidence>,
}

impl InsightUpdate {
    pub fn is_empty(&self) -> bool {
        self.insight_text.is_none() && self.category.is_none() && self.confidence.is_none()
    }

    /// Apply the set fields to `insight`.
    pub fn apply_to(&self, insight: &mut Insight) {
        if let Some(text) = &self.insight_text {
            insight.insight_text = text.clone();
        }
        if let Some(category) = self.category {
            insight.category = category;
        }
        if let Some(confidence) = self.confidence {
            insight.confidence = confidence;
        }
    }
}

/// Aggregate counts over a filtered set of insights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InsightStats {
    pub total_pending: u64,
    pub by_status: BTreeMap<InsightStatus, u64>,
    pub by_category: BTreeMap<Category, u64>,
    pub by_confidence: BTreeMap<Confidence, u64>,
}

impl InsightStats {
    /// Count one insight into the aggregate.
    pub fn record(&mut self, insight: &Insight) {
        *self.by_status.entry(insight.status).or_default() += 1;
        *self.by_category.entry(insight.category).or_default() += 1;
        *self.by_confidence.entry(insight.confidence).or_default() += 1;
        if insight.status == InsightStatus::Pending {
            self.total_pending += 1;
        }
    }
}

/// Pending insights grouped under one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EntityInsightSummary {
    pub entity_urn: String,
    pub count: usize,
    /// Distinct categories, sorted
    pub categories: Vec<Category>,
    /// Most recent capture time in the sortable text encoding
    pub latest_at: String,
}

// ============================================================================
// APPLY / CHANGESET
// ============================================================================

/// A confirmed catalog edit inside an apply batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApplyChange {
    pub change_type: ActionType,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_description: Option<String>,
}

/// Prefix marking a column-level target.
pub const COLUMN_TARGET_PREFIX: &str = "column:";

/// Column named by a `column:<name>` target. A bare `column:` is entity-level.
pub fn column_target(target: &str) -> Option<&str> {
    target
        .strip_prefix(COLUMN_TARGET_PREFIX)
        .filter(|name| !name.is_empty())
}

/// Summary of the action types in one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSummary {
    Single(ActionType),
    Multiple,
}

impl ChangeSummary {
    const MULTIPLE: &'static str = "multiple";

    /// The single action type if the batch is homogeneous, `Multiple` otherwise.
    /// An empty batch never reaches the audit step; it summarizes as `Multiple`.
    pub fn from_changes(changes: &[ApplyChange]) -> Self {
        match changes.split_first() {
            Some((first, rest)) if rest.iter().all(|c| c.change_type == first.change_type) => {
                ChangeSummary::Single(first.change_type)
            }
            _ => ChangeSummary::Multiple,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            ChangeSummary::Single(action) => action.as_db_str(),
            ChangeSummary::Multiple => Self::MULTIPLE,
        }
    }

    pub fn from_db_str(s: &str) -> Result<Self, crate::EnumParseError> {
        if s == Self::MULTIPLE {
            Ok(ChangeSummary::Multiple)
        } else {
            ActionType::from_db_str(s).map(ChangeSummary::Single)
        }
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl Serialize for ChangeSummary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_db_str())
    }
}

impl<'de> Deserialize<'de> for ChangeSummary {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ChangeSummary::from_db_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Immutable audit record of one successfully applied batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Changeset {
    pub id: RecordId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    pub target_urn: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub change_type: ChangeSummary,
    /// Catalog state read before the first write
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub previous_value: MetadataSnapshot,
    /// The edits as requested, not a re-read of the catalog
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub new_value: RequestedChanges,
    pub source_insight_ids: Vec<RecordId>,
    #[serde(default)]
    pub approved_by: String,
    #[serde(default)]
    pub applied_by: String,
    #[serde(default)]
    pub rolled_back: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolled_back_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub rolled_back_at: Option<Timestamp>,
}

// ============================================================================
// CATALOG VIEW
// ============================================================================

/// Point-in-time read of one entity's metadata in the external catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EntityMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub glossary_terms: Vec<String>,
    #[serde(default)]
    pub owners: Vec<String>,
}

/// One reviewable edit produced by synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProposedChange {
    pub change_type: ActionType,
    pub target: String,
    /// Catalog's current description, only for `update_description`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    pub suggested_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_description: Option<String>,
    pub source_insight_ids: Vec<RecordId>,
}
