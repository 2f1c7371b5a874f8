//! Request and response types for the admin knowledge routes.

use chrono::{DateTime, Utc};
use curator_core::{
    effective_limit, validation, Category, Changeset, ChangesetFilter, Confidence, Insight,
    InsightFilter, InsightStatus, Timestamp,
};
use curator_knowledge::RollbackOutcome;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// PAGINATION
// ============================================================================

/// Page/per_page resolved into store limit and offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    /// Page defaults to 1; per_page defaults to 20 and is capped at 100.
    pub fn resolve(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(1),
            per_page: effective_limit(per_page.unwrap_or(validation::DEFAULT_LIMIT)),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

fn parse_enum<T: FromStr>(raw: Option<&str>) -> ApiResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ApiError::invalid_input(e.to_string())),
        None => Ok(None),
    }
}

fn parse_time(field: &str, raw: Option<&str>) -> ApiResult<Option<Timestamp>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| ApiError::invalid_format(field, "RFC 3339 timestamp")),
        None => Ok(None),
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ============================================================================
// INSIGHTS
// ============================================================================

/// Query parameters for listing insights and insight stats.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct InsightListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub entity_urn: Option<String>,
    pub captured_by: Option<String>,
    pub confidence: Option<String>,
    /// RFC 3339
    pub since: Option<String>,
    /// RFC 3339
    pub until: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl InsightListQuery {
    pub fn page(&self) -> Page {
        Page::resolve(self.page, self.per_page)
    }

    pub fn to_filter(&self) -> ApiResult<InsightFilter> {
        let page = self.page();
        Ok(InsightFilter {
            status: parse_enum::<InsightStatus>(self.status.as_deref())?,
            category: parse_enum::<Category>(self.category.as_deref())?,
            confidence: parse_enum::<Confidence>(self.confidence.as_deref())?,
            entity_urn: non_empty(self.entity_urn.clone()),
            captured_by: non_empty(self.captured_by.clone()),
            since: parse_time("since", self.since.as_deref())?,
            until: parse_time("until", self.until.as_deref())?,
            limit: page.per_page,
            offset: page.offset(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InsightListResponse {
    pub data: Vec<Insight>,
    pub total: u64,
    pub page: i64,
    pub per_page: i64,
}

/// Body of `PUT /insights/{id}/status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateStatusRequest {
    /// `approved` or `rejected`
    pub status: String,
    #[serde(default)]
    pub review_notes: String,
}

// ============================================================================
// CHANGESETS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ChangesetListQuery {
    pub entity_urn: Option<String>,
    pub applied_by: Option<String>,
    pub rolled_back: Option<bool>,
    /// RFC 3339
    pub since: Option<String>,
    /// RFC 3339
    pub until: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ChangesetListQuery {
    pub fn page(&self) -> Page {
        Page::resolve(self.page, self.per_page)
    }

    pub fn to_filter(&self) -> ApiResult<ChangesetFilter> {
        let page = self.page();
        Ok(ChangesetFilter {
            entity_urn: non_empty(self.entity_urn.clone()),
            applied_by: non_empty(self.applied_by.clone()),
            rolled_back: self.rolled_back,
            since: parse_time("since", self.since.as_deref())?,
            until: parse_time("until", self.until.as_deref())?,
            limit: page.per_page,
            offset: page.offset(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChangesetListResponse {
    pub data: Vec<Changeset>,
    pub total: u64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RollbackResponse {
    pub changeset_id: String,
    pub description_restored: bool,
    pub insights_rolled_back: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<RollbackOutcome> for RollbackResponse {
    fn from(outcome: RollbackOutcome) -> Self {
        Self {
            warnings: outcome.soft_errors.messages(),
            changeset_id: outcome.changeset_id,
            description_restored: outcome.description_restored,
            insights_rolled_back: outcome.insights_rolled_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use proptest::prelude::*;

    #[test]
    fn test_page_defaults_and_cap() {
        assert_eq!(Page::resolve(None, None), Page { page: 1, per_page: 20 });
        assert_eq!(Page::resolve(Some(0), Some(500)), Page { page: 1, per_page: 100 });
        assert_eq!(Page::resolve(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_insight_query_to_filter() {
        let query = InsightListQuery {
            status: Some("approved".to_string()),
            entity_urn: Some("urn:li:dataset:x".to_string()),
            since: Some("2026-01-01T00:00:00Z".to_string()),
            page: Some(2),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.status, Some(InsightStatus::Approved));
        assert_eq!(filter.entity_urn.as_deref(), Some("urn:li:dataset:x"));
        assert!(filter.since.is_some());
        assert_eq!((filter.limit, filter.offset), (20, 20));
    }

    #[test]
    fn test_bad_filter_values_are_rejected() {
        let query = InsightListQuery {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().unwrap_err().code, ErrorCode::InvalidInput);

        let query = ChangesetListQuery {
            until: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().unwrap_err().code, ErrorCode::InvalidFormat);
    }

    proptest! {
        #[test]
        fn prop_page_is_always_in_bounds(page in any::<Option<i64>>(), per_page in any::<Option<i64>>()) {
            let resolved = Page::resolve(page, per_page);
            prop_assert!(resolved.page >= 1);
            prop_assert!((1..=100).contains(&resolved.per_page));
            prop_assert!(resolved.offset() >= 0);
        }
    }
}
