//! Enum types for Curator records
//!
//! Every enum round-trips through a lowercase snake_case string that is used
//! both on the wire and in the database. Parsing is exact and case-sensitive:
//! `"High"` is not a confidence level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// INSIGHT CATEGORY
// ============================================================================

/// What kind of knowledge an insight carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// An existing description or interpretation is wrong
    Correction,
    /// Business meaning not captured in metadata
    BusinessContext,
    /// Known quality problem or limitation
    DataQuality,
    /// How to query or interpret the data correctly
    UsageGuidance,
    /// Connection between datasets not captured in lineage
    Relationship,
    /// Suggested improvement to existing documentation
    Enhancement,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Correction,
        Category::BusinessContext,
        Category::DataQuality,
        Category::UsageGuidance,
        Category::Relationship,
        Category::Enhancement,
    ];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Category::Correction => "correction",
            Category::BusinessContext => "business_context",
            Category::DataQuality => "data_quality",
            Category::UsageGuidance => "usage_guidance",
            Category::Relationship => "relationship",
            Category::Enhancement => "enhancement",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_db_str() == s)
            .ok_or_else(|| EnumParseError::new("category", s, Self::valid_values()))
    }

    /// Comma-separated list of accepted values.
    pub fn valid_values() -> String {
        join_values(Self::ALL.iter().map(|c| c.as_db_str()))
    }
}

// ============================================================================
// CONFIDENCE
// ============================================================================

/// How confident the author is in an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_db_str() == s)
            .ok_or_else(|| EnumParseError::new("confidence", s, Self::valid_values()))
    }

    /// Comma-separated list of accepted values.
    pub fn valid_values() -> String {
        join_values(Self::ALL.iter().map(|c| c.as_db_str()))
    }
}

// ============================================================================
// SOURCE
// ============================================================================

/// Where an insight came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Explicitly shared by the user
    #[default]
    User,
    /// Worked out by the agent during exploration
    AgentDiscovery,
    /// A metadata gap flagged for administrator attention
    EnrichmentGap,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::User, Source::AgentDiscovery, Source::EnrichmentGap];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Source::User => "user",
            Source::AgentDiscovery => "agent_discovery",
            Source::EnrichmentGap => "enrichment_gap",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_db_str() == s)
            .ok_or_else(|| EnumParseError::new("source", s, Self::valid_values()))
    }

    /// Comma-separated list of accepted values.
    pub fn valid_values() -> String {
        join_values(Self::ALL.iter().map(|c| c.as_db_str()))
    }
}

// ============================================================================
// INSIGHT STATUS
// ============================================================================

/// Lifecycle status of an insight. Allowed moves live in [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Applied,
    Superseded,
    RolledBack,
}

impl InsightStatus {
    pub const ALL: [InsightStatus; 6] = [
        InsightStatus::Pending,
        InsightStatus::Approved,
        InsightStatus::Rejected,
        InsightStatus::Applied,
        InsightStatus::Superseded,
        InsightStatus::RolledBack,
    ];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            InsightStatus::Pending => "pending",
            InsightStatus::Approved => "approved",
            InsightStatus::Rejected => "rejected",
            InsightStatus::Applied => "applied",
            InsightStatus::Superseded => "superseded",
            InsightStatus::RolledBack => "rolled_back",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_db_str() == s)
            .ok_or_else(|| EnumParseError::new("status", s, Self::valid_values()))
    }

    /// Comma-separated list of accepted values.
    pub fn valid_values() -> String {
        join_values(Self::ALL.iter().map(|c| c.as_db_str()))
    }
}

// ============================================================================
// ACTION TYPE
// ============================================================================

/// A kind of catalog edit, used by suggested actions and apply batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    UpdateDescription,
    AddTag,
    RemoveTag,
    AddGlossaryTerm,
    FlagQualityIssue,
    AddDocumentation,
    AddCuratedQuery,
}

impl ActionType {
    pub const ALL: [ActionType; 7] = [
        ActionType::UpdateDescription,
        ActionType::AddTag,
        ActionType::RemoveTag,
        ActionType::AddGlossaryTerm,
        ActionType::FlagQualityIssue,
        ActionType::AddDocumentation,
        ActionType::AddCuratedQuery,
    ];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ActionType::UpdateDescription => "update_description",
            ActionType::AddTag => "add_tag",
            ActionType::RemoveTag => "remove_tag",
            ActionType::AddGlossaryTerm => "add_glossary_term",
            ActionType::FlagQualityIssue => "flag_quality_issue",
            ActionType::AddDocumentation => "add_documentation",
            ActionType::AddCuratedQuery => "add_curated_query",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_db_str() == s)
            .ok_or_else(|| EnumParseError::new("action_type", s, Self::valid_values()))
    }

    /// Comma-separated list of accepted values.
    pub fn valid_values() -> String {
        join_values(Self::ALL.iter().map(|c| c.as_db_str()))
    }

    /// Whether this action needs a `query_sql` body.
    pub fn requires_query_sql(&self) -> bool {
        matches!(self, ActionType::AddCuratedQuery)
    }
}

// ============================================================================
// KNOWLEDGE ACTION
// ============================================================================

/// Administrative action dispatched by the `apply_knowledge` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeAction {
    BulkReview,
    Review,
    Synthesize,
    Apply,
    Approve,
    Reject,
}

impl KnowledgeAction {
    pub const ALL: [KnowledgeAction; 6] = [
        KnowledgeAction::BulkReview,
        KnowledgeAction::Review,
        KnowledgeAction::Synthesize,
        KnowledgeAction::Apply,
        KnowledgeAction::Approve,
        KnowledgeAction::Reject,
    ];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            KnowledgeAction::BulkReview => "bulk_review",
            KnowledgeAction::Review => "review",
            KnowledgeAction::Synthesize => "synthesize",
            KnowledgeAction::Apply => "apply",
            KnowledgeAction::Approve => "approve",
            KnowledgeAction::Reject => "reject",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EnumParseError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_db_str() == s)
            .ok_or_else(|| EnumParseError::new("action", s, Self::valid_values()))
    }

    /// Comma-separated list of accepted values.
    pub fn valid_values() -> String {
        join_values(Self::ALL.iter().map(|c| c.as_db_str()))
    }
}

// ============================================================================
// DISPLAY / FROMSTR
// ============================================================================

macro_rules! impl_db_str_traits {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.as_db_str())
                }
            }

            impl FromStr for $ty {
                type Err = EnumParseError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::from_db_str(s)
                }
            }
        )*
    };
}

impl_db_str_traits!(Category, Confidence, Source, InsightStatus, ActionType, KnowledgeAction);

fn join_values<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(", ")
}

/// Error when parsing an enum value that is not in its accepted set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    /// Field name used in the message (`category`, `confidence`, ...)
    pub field: &'static str,
    /// The rejected input
    pub value: String,
    /// Accepted values, comma-separated
    pub valid: String,
}

impl EnumParseError {
    fn new(field: &'static str, value: &str, valid: String) -> Self {
        Self {
            field,
            value: value.to_string(),
            valid,
        }
    }
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} {:?}: must be one of: {}",
            self.field, self.value, self.valid
        )
    }
}

impl std::error::Error for EnumParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_through_db_str() {
        for c in Category::ALL {
            assert_eq!(Category::from_db_str(c.as_db_str()), Ok(c));
        }
    }

    #[test]
    fn test_parsing_is_case_sensitive() {
        assert!(Confidence::from_db_str("High").is_err());
        assert!(Category::from_db_str("Correction").is_err());
        assert!(Source::from_db_str(" user").is_err());
    }

    #[test]
    fn test_parse_error_message_lists_valid_values() {
        let err = Category::from_db_str("bogus").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid category \"bogus\": must be one of: correction, business_context, \
             data_quality, usage_guidance, relationship, enhancement"
        );
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&InsightStatus::RolledBack).unwrap();
        assert_eq!(json, "\"rolled_back\"");
        let parsed: ActionType = serde_json::from_str("\"add_curated_query\"").unwrap();
        assert_eq!(parsed, ActionType::AddCuratedQuery);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Confidence::default(), Confidence::Medium);
        assert_eq!(Source::default(), Source::User);
        assert_eq!(InsightStatus::default(), InsightStatus::Pending);
    }

    #[test]
    fn test_only_curated_query_requires_sql() {
        let needs_sql: Vec<_> = ActionType::ALL
            .into_iter()
            .filter(ActionType::requires_query_sql)
            .collect();
        assert_eq!(needs_sql, vec![ActionType::AddCuratedQuery]);
    }
}
