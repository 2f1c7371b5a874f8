//! Listing filters and pagination

use crate::{validation, Category, Changeset, Confidence, Insight, InsightStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// Clamp a requested page size: non-positive falls back to the default,
/// anything above the cap is cut to the cap.
pub fn effective_limit(limit: i64) -> i64 {
    if limit <= 0 {
        validation::DEFAULT_LIMIT
    } else {
        limit.min(validation::MAX_LIMIT)
    }
}

fn in_range(ts: &Timestamp, since: Option<&Timestamp>, until: Option<&Timestamp>) -> bool {
    since.map_or(true, |s| ts >= s) && until.map_or(true, |u| ts <= u)
}

// ============================================================================
// INSIGHT FILTER
// ============================================================================

/// Filter for listing insights. Unset dimensions match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightFilter {
    pub status: Option<InsightStatus>,
    pub category: Option<Category>,
    /// Membership test against the insight's related entities
    pub entity_urn: Option<String>,
    pub captured_by: Option<String>,
    pub confidence: Option<Confidence>,
    /// Inclusive lower bound on `created_at`
    pub since: Option<Timestamp>,
    /// Inclusive upper bound on `created_at`
    pub until: Option<Timestamp>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl InsightFilter {
    pub fn with_status(status: InsightStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn for_entity(mut self, entity_urn: impl Into<String>) -> Self {
        self.entity_urn = Some(entity_urn.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn effective_limit(&self) -> i64 {
        effective_limit(self.limit)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.max(0)
    }

    /// Whether `insight` passes every set dimension. Pagination is not applied.
    pub fn matches(&self, insight: &Insight) -> bool {
        self.status.map_or(true, |s| insight.status == s)
            && self.category.map_or(true, |c| insight.category == c)
            && self.confidence.map_or(true, |c| insight.confidence == c)
            && self
                .entity_urn
                .as_deref()
                .map_or(true, |urn| insight.references(urn))
            && self
                .captured_by
                .as_deref()
                .map_or(true, |by| insight.captured_by == by)
            && in_range(&insight.created_at, self.since.as_ref(), self.until.as_ref())
    }
}

// ============================================================================
// CHANGESET FILTER
// ============================================================================

/// Filter for listing changesets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesetFilter {
    pub entity_urn: Option<String>,
    pub applied_by: Option<String>,
    pub since: Option<Timestamp>,
    pub until: Option<Timestamp>,
    pub rolled_back: Option<bool>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl ChangesetFilter {
    pub fn effective_limit(&self) -> i64 {
        effective_limit(self.limit)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.max(0)
    }

    pub fn matches(&self, changeset: &Changeset) -> bool {
        self.entity_urn
            .as_deref()
            .map_or(true, |urn| changeset.target_urn == urn)
            && self
                .applied_by
                .as_deref()
                .map_or(true, |by| changeset.applied_by == by)
            && self.rolled_back.map_or(true, |rb| changeset.rolled_back == rb)
            && in_range(&changeset.created_at, self.since.as_ref(), self.until.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_effective_limit_boundaries() {
        assert_eq!(effective_limit(0), 20);
        assert_eq!(effective_limit(-5), 20);
        assert_eq!(effective_limit(1), 1);
        assert_eq!(effective_limit(100), 100);
        assert_eq!(effective_limit(101), 100);
    }

    #[test]
    fn test_filter_limit_uses_clamp() {
        let filter = InsightFilter::default().with_limit(500);
        assert_eq!(filter.effective_limit(), 100);
        assert_eq!(InsightFilter::default().effective_limit(), 20);
    }

    proptest! {
        #[test]
        fn prop_effective_limit_in_bounds(limit in any::<i64>()) {
            let clamped = effective_limit(limit);
            prop_assert!((1..=100).contains(&clamped));
            if limit > 0 && limit <= 100 {
                prop_assert_eq!(clamped, limit);
            }
        }
    }
}
