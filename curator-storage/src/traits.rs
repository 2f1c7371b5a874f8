//! Async store traits for insights and changesets.
//!
//! Both traits are object safe and meant to be held as `Arc<dyn ...>`.
//! Implementations must be safe for concurrent use by multiple callers.

use async_trait::async_trait;
use curator_core::{
    Changeset, ChangesetFilter, CuratorResult, Insight, InsightFilter, InsightStats,
    InsightStatus, InsightUpdate,
};

/// Durable storage of captured insights.
#[async_trait]
pub trait InsightStore: Send + Sync {
    // ========================================================================
    // READS
    // ========================================================================

    /// Get one insight. Fails with `insight not found: <id>`.
    async fn get(&self, id: &str) -> CuratorResult<Insight>;

    /// List insights newest first. Returns the requested page and the total
    /// number of matches before pagination.
    async fn list(&self, filter: &InsightFilter) -> CuratorResult<(Vec<Insight>, u64)>;

    /// Counts by status, category and confidence over the filtered set.
    /// Pagination fields of the filter are ignored.
    async fn stats(&self, filter: &InsightFilter) -> CuratorResult<InsightStats>;

    // ========================================================================
    // WRITES
    // ========================================================================

    async fn insert(&self, insight: &Insight) -> CuratorResult<()>;

    /// Set status and review fields. The transition table is not consulted here.
    async fn update_status(
        &self,
        id: &str,
        status: InsightStatus,
        reviewed_by: &str,
        review_notes: &str,
    ) -> CuratorResult<()>;

    /// Apply the set fields of `update`. Fails when nothing is set, and when
    /// the insight is absent or already `applied`.
    async fn update(&self, id: &str, update: &InsightUpdate) -> CuratorResult<()>;

    /// Move an insight to `applied` and link it to its changeset.
    async fn mark_applied(&self, id: &str, applied_by: &str, changeset_ref: &str)
        -> CuratorResult<()>;

    /// Move every other `pending` insight referencing `entity_urn` to
    /// `superseded`. Returns how many were moved.
    async fn supersede(&self, entity_urn: &str, exclude_id: &str) -> CuratorResult<u64>;
}

/// Append-mostly log of applied batches.
#[async_trait]
pub trait ChangesetStore: Send + Sync {
    async fn insert_changeset(&self, changeset: &Changeset) -> CuratorResult<()>;

    /// Fails with `changeset not found: <id>`.
    async fn get_changeset(&self, id: &str) -> CuratorResult<Changeset>;

    /// List changesets newest first with the total match count.
    async fn list_changesets(
        &self,
        filter: &ChangesetFilter,
    ) -> CuratorResult<(Vec<Changeset>, u64)>;

    /// Flag a changeset as rolled back. Fails with
    /// `changeset not found or already rolled back: <id>`.
    async fn rollback_changeset(&self, id: &str, rolled_back_by: &str) -> CuratorResult<()>;
}
