//! Stores for deployments without a database.
//!
//! Writes succeed silently, lookups fail with not-found and listings are empty.

use crate::{ChangesetStore, InsightStore};
use async_trait::async_trait;
use curator_core::{
    Changeset, ChangesetFilter, CuratorResult, Insight, InsightFilter, InsightStats,
    InsightStatus, InsightUpdate, StorageError,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInsightStore;

#[async_trait]
impl InsightStore for NoopInsightStore {
    async fn get(&self, id: &str) -> CuratorResult<Insight> {
        Err(StorageError::InsightNotFound { id: id.to_string() }.into())
    }

    async fn list(&self, _filter: &InsightFilter) -> CuratorResult<(Vec<Insight>, u64)> {
        Ok((Vec::new(), 0))
    }

    async fn stats(&self, _filter: &InsightFilter) -> CuratorResult<InsightStats> {
        Ok(InsightStats::default())
    }

    async fn insert(&self, _insight: &Insight) -> CuratorResult<()> {
        Ok(())
    }

    async fn update_status(
        &self,
        _id: &str,
        _status: InsightStatus,
        _reviewed_by: &str,
        _review_notes: &str,
    ) -> CuratorResult<()> {
        Ok(())
    }

    async fn update(&self, _id: &str, _update: &InsightUpdate) -> CuratorResult<()> {
        Ok(())
    }

    async fn mark_applied(
        &self,
        _id: &str,
        _applied_by: &str,
        _changeset_ref: &str,
    ) -> CuratorResult<()> {
        Ok(())
    }

    async fn supersede(&self, _entity_urn: &str, _exclude_id: &str) -> CuratorResult<u64> {
        Ok(0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChangesetStore;

#[async_trait]
impl ChangesetStore for NoopChangesetStore {
    async fn insert_changeset(&self, _changeset: &Changeset) -> CuratorResult<()> {
        Ok(())
    }

    async fn get_changeset(&self, id: &str) -> CuratorResult<Changeset> {
        Err(StorageError::ChangesetNotFound { id: id.to_string() }.into())
    }

    async fn list_changesets(
        &self,
        _filter: &ChangesetFilter,
    ) -> CuratorResult<(Vec<Changeset>, u64)> {
        Ok((Vec::new(), 0))
    }

    async fn rollback_changeset(&self, _id: &str, _rolled_back_by: &str) -> CuratorResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_insight_store_contract() {
        let store = NoopInsightStore;
        let err = store.get("abc").await.unwrap_err();
        assert_eq!(err.to_string(), "insight not found: abc");

        let (page, total) = store.list(&InsightFilter::default()).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 0);
        assert_eq!(
            store.stats(&InsightFilter::default()).await.unwrap(),
            InsightStats::default()
        );
        store
            .update_status("abc", InsightStatus::Approved, "ana", "")
            .await
            .unwrap();
        assert_eq!(store.supersede("urn:x", "abc").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_noop_changeset_store_contract() {
        let store = NoopChangesetStore;
        let err = store.get_changeset("cs1").await.unwrap_err();
        assert_eq!(err.to_string(), "changeset not found: cs1");
        let (page, total) = store
            .list_changesets(&ChangesetFilter::default())
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 0);
        store.rollback_changeset("cs1", "ana").await.unwrap();
    }
}
