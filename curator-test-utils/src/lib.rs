//! Curator Test Utilities
//!
//! Shared test infrastructure for the Curator workspace:
//! - Proptest generators for insights, changes and enum values
//! - Fixtures for common scenarios
//! - Instrumented doubles: a recording catalog writer with failure
//!   injection, a recording query registrar, and stores that fail on demand
//! - Assertions on the error taxonomy

pub use curator_storage::{InMemoryChangesetStore, InMemoryInsightStore};

pub use curator_core::{
    ActionType, Actor, ApplyChange, Category, Changeset, ChangesetFilter, Confidence,
    CuratorError, CuratorResult, EntityMetadata, Insight, InsightFilter, InsightStats,
    InsightStatus, InsightUpdate, RecordId, Source, StorageError, SuggestedAction, Timestamp,
};

use async_trait::async_trait;
use curator_catalog::{CatalogWriter, CuratedQuery, QueryRegistrar};
use curator_core::CatalogError;
use curator_storage::{ChangesetStore, InsightStore};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Curator types.

    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    pub fn arb_category() -> impl Strategy<Value = Category> {
        proptest::sample::select(Category::ALL.to_vec())
    }

    pub fn arb_confidence() -> impl Strategy<Value = Confidence> {
        prop_oneof![
            Just(Confidence::High),
            Just(Confidence::Medium),
            Just(Confidence::Low),
        ]
    }

    pub fn arb_source() -> impl Strategy<Value = Source> {
        prop_oneof![
            Just(Source::User),
            Just(Source::AgentDiscovery),
            Just(Source::EnrichmentGap),
        ]
    }

    pub fn arb_status() -> impl Strategy<Value = InsightStatus> {
        prop_oneof![
            Just(InsightStatus::Pending),
            Just(InsightStatus::Approved),
            Just(InsightStatus::Rejected),
            Just(InsightStatus::Applied),
            Just(InsightStatus::Superseded),
            Just(InsightStatus::RolledBack),
        ]
    }

    pub fn arb_action_type() -> impl Strategy<Value = ActionType> {
        proptest::sample::select(ActionType::ALL.to_vec())
    }

    /// Timestamps between 2020 and 2030, whole seconds.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64).prop_map(|secs| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .unwrap_or_else(Utc::now)
        })
    }

    /// Insight text that passes the length bounds.
    pub fn arb_insight_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ,.]{10,200}"
    }

    pub fn arb_dataset_urn() -> impl Strategy<Value = String> {
        "[a-z_]{3,12}\\.[a-z_]{3,12}".prop_map(|name| {
            format!("urn:li:dataset:(urn:li:dataPlatform:postgres,{name},PROD)")
        })
    }

    /// Free text that may contain anything a tag name must not.
    pub fn arb_free_text() -> impl Strategy<Value = String> {
        ".{0,120}"
    }

    /// A valid apply change. Curated queries always carry SQL.
    pub fn arb_apply_change() -> impl Strategy<Value = ApplyChange> {
        (arb_action_type(), "[a-z_]{0,12}", "[a-zA-Z ]{1,40}").prop_map(
            |(change_type, column, detail)| ApplyChange {
                change_type,
                target: if column.is_empty() {
                    String::new()
                } else {
                    format!("column:{column}")
                },
                detail,
                query_sql: change_type
                    .requires_query_sql()
                    .then(|| "SELECT 1".to_string()),
                query_description: None,
            },
        )
    }

    pub fn arb_insight() -> impl Strategy<Value = Insight> {
        (
            arb_timestamp(),
            arb_category(),
            arb_confidence(),
            arb_source(),
            arb_insight_text(),
            proptest::collection::vec(arb_dataset_urn(), 0..4),
            arb_status(),
        )
            .prop_map(
                |(created_at, category, confidence, source, text, urns, status)| Insight {
                    status,
                    created_at,
                    category,
                    confidence,
                    source,
                    entity_urns: urns,
                    ..fixtures::insight_with_text(&text)
                },
            )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common scenarios.

    use super::*;
    use chrono::Utc;

    pub const ORDERS_URN: &str = "urn:li:dataset:(urn:li:dataPlatform:postgres,shop.orders,PROD)";
    pub const CUSTOMERS_URN: &str =
        "urn:li:dataset:(urn:li:dataPlatform:postgres,shop.customers,PROD)";

    pub fn analyst() -> Actor {
        Actor::new("sess-analyst", "ana@example.com", "analyst")
    }

    pub fn admin() -> Actor {
        Actor::new("sess-admin", "root@example.com", "admin")
    }

    /// A pending insight with no entities, captured now.
    pub fn insight_with_text(text: &str) -> Insight {
        Insight {
            id: curator_core::new_record_id(),
            created_at: Utc::now(),
            session_id: "sess-analyst".to_string(),
            captured_by: "ana@example.com".to_string(),
            persona: "analyst".to_string(),
            source: Source::User,
            category: Category::BusinessContext,
            insight_text: text.to_string(),
            confidence: Confidence::Medium,
            entity_urns: Vec::new(),
            related_columns: Vec::new(),
            suggested_actions: Vec::new(),
            status: InsightStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            applied_by: None,
            applied_at: None,
            changeset_ref: None,
        }
    }

    /// An insight about `entity_urn` in the given status.
    pub fn insight_for(entity_urn: &str, status: InsightStatus) -> Insight {
        Insight {
            entity_urns: vec![entity_urn.to_string()],
            status,
            ..insight_with_text("The amount column is stored in cents, not dollars.")
        }
    }

    pub fn suggested(action_type: ActionType, target: &str, detail: &str) -> SuggestedAction {
        SuggestedAction {
            action_type,
            target: target.to_string(),
            detail: detail.to_string(),
            query_sql: action_type
                .requires_query_sql()
                .then(|| "SELECT 1".to_string()),
            query_description: None,
        }
    }

    pub fn change(change_type: ActionType, target: &str, detail: &str) -> ApplyChange {
        ApplyChange {
            change_type,
            target: target.to_string(),
            detail: detail.to_string(),
            query_sql: change_type
                .requires_query_sql()
                .then(|| "SELECT 1".to_string()),
            query_description: None,
        }
    }

    pub fn orders_metadata() -> EntityMetadata {
        EntityMetadata {
            description: "Orders placed in the web shop".to_string(),
            tags: vec!["urn:li:tag:sales".to_string()],
            glossary_terms: Vec::new(),
            owners: vec!["urn:li:corpuser:ana".to_string()],
        }
    }
}

// ============================================================================
// CATALOG DOUBLES
// ============================================================================

/// One catalog write as seen by [`RecordingCatalogWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWrite {
    Description {
        entity_urn: String,
        description: String,
    },
    ColumnDescription {
        entity_urn: String,
        column: String,
        description: String,
    },
    AddTag {
        entity_urn: String,
        tag_urn: String,
    },
    RemoveTag {
        entity_urn: String,
        tag_urn: String,
    },
    AddGlossaryTerm {
        entity_urn: String,
        term_urn: String,
    },
    DocumentationLink {
        entity_urn: String,
        url: String,
        description: String,
    },
}

/// Catalog writer that records successful writes and fails on request.
///
/// Metadata reads return whatever was seeded with [`with_metadata`]
/// (empty otherwise). `fail_on_write(n)` makes the n-th write (1-based)
/// fail; failed writes are not recorded.
///
/// [`with_metadata`]: RecordingCatalogWriter::with_metadata
#[derive(Debug, Default)]
pub struct RecordingCatalogWriter {
    metadata: Mutex<HashMap<String, EntityMetadata>>,
    writes: Mutex<Vec<CatalogWrite>>,
    attempts: AtomicUsize,
    reads: AtomicUsize,
    fail_on_write: Option<usize>,
    fail_reads: bool,
}

impl RecordingCatalogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(self, entity_urn: &str, metadata: EntityMetadata) -> Self {
        if let Ok(mut map) = self.metadata.lock() {
            map.insert(entity_urn.to_string(), metadata);
        }
        self
    }

    pub fn fail_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }

    pub fn fail_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Successful writes, in order.
    pub fn writes(&self) -> Vec<CatalogWrite> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Number of metadata reads attempted.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Tag URNs written by `add_tag`, in order.
    pub fn added_tags(&self) -> Vec<String> {
        self.writes()
            .into_iter()
            .filter_map(|w| match w {
                CatalogWrite::AddTag { tag_urn, .. } => Some(tag_urn),
                _ => None,
            })
            .collect()
    }

    fn record(&self, operation: String, write: CatalogWrite) -> Result<(), CatalogError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_write == Some(attempt) {
            return Err(CatalogError::Request {
                operation,
                reason: "injected failure".to_string(),
            });
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(write);
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogWriter for RecordingCatalogWriter {
    async fn get_current_metadata(&self, entity_urn: &str) -> Result<EntityMetadata, CatalogError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(CatalogError::Request {
                operation: format!("getting entity {entity_urn}"),
                reason: "injected failure".to_string(),
            });
        }
        Ok(self
            .metadata
            .lock()
            .ok()
            .and_then(|m| m.get(entity_urn).cloned())
            .unwrap_or_default())
    }

    async fn update_description(
        &self,
        entity_urn: &str,
        description: &str,
    ) -> Result<(), CatalogError> {
        self.record(
            format!("updating description for {entity_urn}"),
            CatalogWrite::Description {
                entity_urn: entity_urn.to_string(),
                description: description.to_string(),
            },
        )
    }

    async fn update_column_description(
        &self,
        entity_urn: &str,
        column: &str,
        description: &str,
    ) -> Result<(), CatalogError> {
        self.record(
            format!("updating column description for {entity_urn}.{column}"),
            CatalogWrite::ColumnDescription {
                entity_urn: entity_urn.to_string(),
                column: column.to_string(),
                description: description.to_string(),
            },
        )
    }

    async fn add_tag(&self, entity_urn: &str, tag_urn: &str) -> Result<(), CatalogError> {
        self.record(
            format!("adding tag {tag_urn} to {entity_urn}"),
            CatalogWrite::AddTag {
                entity_urn: entity_urn.to_string(),
                tag_urn: tag_urn.to_string(),
            },
        )
    }

    async fn remove_tag(&self, entity_urn: &str, tag_urn: &str) -> Result<(), CatalogError> {
        self.record(
            format!("removing tag {tag_urn} from {entity_urn}"),
            CatalogWrite::RemoveTag {
                entity_urn: entity_urn.to_string(),
                tag_urn: tag_urn.to_string(),
            },
        )
    }

    async fn add_glossary_term(
        &self,
        entity_urn: &str,
        term_urn: &str,
    ) -> Result<(), CatalogError> {
        self.record(
            format!("adding glossary term {term_urn} to {entity_urn}"),
            CatalogWrite::AddGlossaryTerm {
                entity_urn: entity_urn.to_string(),
                term_urn: term_urn.to_string(),
            },
        )
    }

    async fn add_documentation_link(
        &self,
        entity_urn: &str,
        url: &str,
        description: &str,
    ) -> Result<(), CatalogError> {
        self.record(
            format!("adding link to {entity_urn}"),
            CatalogWrite::DocumentationLink {
                entity_urn: entity_urn.to_string(),
                url: url.to_string(),
                description: description.to_string(),
            },
        )
    }
}

/// Query registrar that records registrations and hands out sequential URNs.
#[derive(Debug, Default)]
pub struct RecordingQueryRegistrar {
    registered: Mutex<Vec<(String, CuratedQuery)>>,
}

impl RecordingQueryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(entity_urn, query)` pairs in registration order.
    pub fn registered(&self) -> Vec<(String, CuratedQuery)> {
        self.registered.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QueryRegistrar for RecordingQueryRegistrar {
    async fn register_query(
        &self,
        entity_urn: &str,
        query: &CuratedQuery,
    ) -> Result<String, CatalogError> {
        let mut registered = self.registered.lock().map_err(|_| CatalogError::Request {
            operation: format!("creating query {} for {entity_urn}", query.name),
            reason: "registrar poisoned".to_string(),
        })?;
        registered.push((entity_urn.to_string(), query.clone()));
        Ok(format!("urn:li:query:{}", registered.len()))
    }
}

// ============================================================================
// STORE DOUBLES
// ============================================================================

fn injected(operation: &str) -> CuratorError {
    StorageError::Backend {
        reason: format!("injected failure in {operation}"),
    }
    .into()
}

/// In-memory insight store whose `mark_applied` fails for chosen ids.
#[derive(Debug, Clone, Default)]
pub struct FlakyInsightStore {
    inner: InMemoryInsightStore,
    fail_mark_applied: HashSet<RecordId>,
}

impl FlakyInsightStore {
    pub fn new(inner: InMemoryInsightStore) -> Self {
        Self {
            inner,
            fail_mark_applied: HashSet::new(),
        }
    }

    pub fn failing_mark_applied_for(mut self, id: impl Into<RecordId>) -> Self {
        self.fail_mark_applied.insert(id.into());
        self
    }
}

#[async_trait]
impl InsightStore for FlakyInsightStore {
    async fn get(&self, id: &str) -> CuratorResult<Insight> {
        self.inner.get(id).await
    }

    async fn list(&self, filter: &InsightFilter) -> CuratorResult<(Vec<Insight>, u64)> {
        self.inner.list(filter).await
    }

    async fn stats(&self, filter: &InsightFilter) -> CuratorResult<InsightStats> {
        self.inner.stats(filter).await
    }

    async fn insert(&self, insight: &Insight) -> CuratorResult<()> {
        self.inner.insert(insight).await
    }

    async fn update_status(
        &self,
        id: &str,
        status: InsightStatus,
        reviewed_by: &str,
        review_notes: &str,
    ) -> CuratorResult<()> {
        self.inner
            .update_status(id, status, reviewed_by, review_notes)
            .await
    }

    async fn update(&self, id: &str, update: &InsightUpdate) -> CuratorResult<()> {
        self.inner.update(id, update).await
    }

    async fn mark_applied(
        &self,
        id: &str,
        applied_by: &str,
        changeset_ref: &str,
    ) -> CuratorResult<()> {
        if self.fail_mark_applied.contains(id) {
            return Err(injected("mark_applied"));
        }
        self.inner.mark_applied(id, applied_by, changeset_ref).await
    }

    async fn supersede(&self, entity_urn: &str, exclude_id: &str) -> CuratorResult<u64> {
        self.inner.supersede(entity_urn, exclude_id).await
    }
}

/// Changeset store that fails every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingChangesetStore;

#[async_trait]
impl ChangesetStore for FailingChangesetStore {
    async fn insert_changeset(&self, _changeset: &Changeset) -> CuratorResult<()> {
        Err(injected("insert_changeset"))
    }

    async fn get_changeset(&self, _id: &str) -> CuratorResult<Changeset> {
        Err(injected("get_changeset"))
    }

    async fn list_changesets(
        &self,
        _filter: &ChangesetFilter,
    ) -> CuratorResult<(Vec<Changeset>, u64)> {
        Err(injected("list_changesets"))
    }

    async fn rollback_changeset(&self, _id: &str, _rolled_back_by: &str) -> CuratorResult<()> {
        Err(injected("rollback_changeset"))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on Curator results.

    use super::*;

    /// Assert that a result is a validation error whose message equals `expected`.
    #[track_caller]
    pub fn assert_validation_message<T: std::fmt::Debug>(
        result: &CuratorResult<T>,
        expected: &str,
    ) {
        match result {
            Err(err @ CuratorError::Validation(_)) => assert_eq!(err.to_string(), expected),
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a result is a not-found storage error.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &CuratorResult<T>) {
        match result {
            Err(CuratorError::Storage(err)) if err.is_not_found() => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    /// Assert that a result is a lifecycle (transition) error.
    #[track_caller]
    pub fn assert_lifecycle_error<T: std::fmt::Debug>(result: &CuratorResult<T>) {
        match result {
            Err(CuratorError::Lifecycle(_)) => {}
            other => panic!("Expected Lifecycle error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_status(insight: &Insight, expected: InsightStatus) {
        assert_eq!(
            insight.status, expected,
            "insight {} has status {}, expected {}",
            insight.id, insight.status, expected
        );
    }
}
