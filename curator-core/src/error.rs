//! Error types for Curator operations
//!
//! Messages are user-facing: tool callers see them verbatim inside the
//! `{"error": "..."}` payload, so they name the offending field, value and
//! accepted range.

use crate::{validation, Category, EnumParseError, InsightStatus, RecordId};
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("insight not found: {id}")]
    InsightNotFound { id: RecordId },

    #[error("changeset not found: {id}")]
    ChangesetNotFound { id: RecordId },

    #[error("insight not found or already applied: {id}")]
    InsightNotEditable { id: RecordId },

    #[error("changeset not found or already rolled back: {id}")]
    ChangesetNotRollbackable { id: RecordId },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: RecordId },

    #[error("no fields to update")]
    NoFieldsToUpdate,

    #[error("corrupt {kind} row {id}: {reason}")]
    CorruptRecord {
        kind: &'static str,
        id: RecordId,
        reason: String,
    },

    #[error("storage backend error: {reason}")]
    Backend { reason: String },
}

impl StorageError {
    /// Whether this error means the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::InsightNotFound { .. } | StorageError::ChangesetNotFound { .. }
        )
    }
}

/// Input validation errors. Raised before any store or catalog access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("category is required and must be one of: {}", Category::valid_values())]
    MissingCategory,

    #[error(transparent)]
    InvalidEnum(#[from] EnumParseError),

    #[error(
        "insight_text is required (minimum {} characters)",
        validation::MIN_INSIGHT_TEXT_LEN
    )]
    MissingInsightText,

    #[error(
        "insight_text must be at least {} characters (got {len})",
        validation::MIN_INSIGHT_TEXT_LEN
    )]
    InsightTextTooShort { len: usize },

    #[error(
        "insight_text must be at most {} characters (got {len})",
        validation::MAX_INSIGHT_TEXT_LEN
    )]
    InsightTextTooLong { len: usize },

    #[error("{field} exceeds maximum of {max} (got {got})")]
    TooMany {
        field: &'static str,
        max: usize,
        got: usize,
    },

    #[error("{field}[{index}]: {reason}")]
    Item {
        field: &'static str,
        index: usize,
        reason: Box<ValidationError>,
    },

    #[error("query_sql is required for add_curated_query")]
    MissingQuerySql,

    #[error("add_curated_query is not available: no query registrar is configured")]
    QueryRegistrarUnavailable,

    #[error("changes is required and must not be empty")]
    EmptyChanges,

    #[error("action is required and must be one of: {}", crate::KnowledgeAction::valid_values())]
    MissingAction,

    #[error("{field} is required for {action} action")]
    RequiredFor { field: &'static str, action: String },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Status state machine errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: InsightStatus,
        to: InsightStatus,
    },

    #[error("cannot edit an applied insight")]
    AppliedNotEditable { id: RecordId },
}

/// External catalog read/write errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The operation reached the catalog and failed.
    #[error("{operation}: {reason}")]
    Request { operation: String, reason: String },

    /// The catalog answered with something we could not interpret.
    #[error("{operation}: invalid response: {reason}")]
    InvalidResponse { operation: String, reason: String },

    #[error("{what} is not configured")]
    NotConfigured { what: &'static str },
}

/// Failures of the batched apply routine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("failed to get current metadata: {0}")]
    Snapshot(CatalogError),

    /// 1-based `index` of the change that failed out of `total`.
    #[error(
        "catalog write failed for change {index} of {total}: {source}{}",
        already_written_note(.index)
    )]
    Write {
        index: usize,
        total: usize,
        source: CatalogError,
    },

    /// Catalog writes succeeded but the audit record could not be stored.
    #[error("failed to record changeset: {0} (all {1} catalog changes were already written)")]
    Audit(StorageError, usize),
}

fn already_written_note(index: &usize) -> String {
    match index {
        0 | 1 => "; no earlier changes in this batch were written".to_string(),
        2 => "; change 1 was already written and has not been reverted".to_string(),
        n => format!(
            "; changes 1-{} were already written and have not been reverted",
            n - 1
        ),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Curator errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CuratorError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<EnumParseError> for CuratorError {
    fn from(err: EnumParseError) -> Self {
        CuratorError::Validation(err.into())
    }
}

/// Result type alias for Curator operations.
pub type CuratorResult<T> = Result<T, CuratorError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        let err = StorageError::InsightNotFound { id: "abc".into() };
        assert_eq!(err.to_string(), "insight not found: abc");
        assert!(err.is_not_found());

        let err = StorageError::ChangesetNotRollbackable { id: "cs1".into() };
        assert_eq!(
            err.to_string(),
            "changeset not found or already rolled back: cs1"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_item_error_prefixes_index() {
        let err = ValidationError::Item {
            field: "changes",
            index: 2,
            reason: Box::new(ValidationError::MissingQuerySql),
        };
        assert_eq!(
            err.to_string(),
            "changes[2]: query_sql is required for add_curated_query"
        );
    }

    #[test]
    fn test_write_error_reports_position_and_partial_state() {
        let err = ApplyError::Write {
            index: 2,
            total: 3,
            source: CatalogError::Request {
                operation: "adding tag urn:li:tag:pii to urn:x".into(),
                reason: "HTTP 500".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("2 of 3"));
        assert!(msg.contains("change 1 was already written"));
        assert!(!msg.contains("no changes were applied"));
    }

    #[test]
    fn test_first_write_failure_says_nothing_was_written() {
        let err = ApplyError::Write {
            index: 1,
            total: 4,
            source: CatalogError::NotConfigured { what: "catalog" },
        };
        assert!(err.to_string().contains("no earlier changes"));
    }

    #[test]
    fn test_master_error_is_transparent() {
        let err: CuratorError = StorageError::NoFieldsToUpdate.into();
        assert_eq!(err.to_string(), "no fields to update");
    }

    #[test]
    fn test_missing_category_lists_values() {
        assert_eq!(
            ValidationError::MissingCategory.to_string(),
            "category is required and must be one of: correction, business_context, \
             data_quality, usage_guidance, relationship, enhancement"
        );
    }
}
