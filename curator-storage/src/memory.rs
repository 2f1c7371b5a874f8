//! In-memory stores.
//!
//! Used when `CURATOR_STORE=memory` and by tests. Every mutation holds the
//! write lock for its whole check-then-write, so conditional updates hold
//! under concurrent callers the same way the SQL `WHERE` guards do.

use crate::{ChangesetStore, InsightStore};
use async_trait::async_trait;
use chrono::Utc;
use curator_core::{
    lifecycle, Changeset, ChangesetFilter, CuratorResult, Insight, InsightFilter, InsightStats,
    InsightStatus, InsightUpdate, RecordId, StorageError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

fn page<T>(mut items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    items.truncate(limit);
    items
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// ============================================================================
// INSIGHTS
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryInsightStore {
    insights: Arc<RwLock<HashMap<RecordId, Insight>>>,
}

impl InMemoryInsightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored insights.
    pub async fn len(&self) -> usize {
        self.insights.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.insights.read().await.is_empty()
    }

    fn matching(insights: &HashMap<RecordId, Insight>, filter: &InsightFilter) -> Vec<Insight> {
        let mut hits: Vec<Insight> = insights
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        hits
    }
}

#[async_trait]
impl InsightStore for InMemoryInsightStore {
    async fn get(&self, id: &str) -> CuratorResult<Insight> {
        let insights = self.insights.read().await;
        insights
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::InsightNotFound { id: id.to_string() }.into())
    }

    async fn list(&self, filter: &InsightFilter) -> CuratorResult<(Vec<Insight>, u64)> {
        let insights = self.insights.read().await;
        let hits = Self::matching(&insights, filter);
        let total = hits.len() as u64;
        Ok((
            page(hits, filter.effective_limit(), filter.effective_offset()),
            total,
        ))
    }

    async fn stats(&self, filter: &InsightFilter) -> CuratorResult<InsightStats> {
        let insights = self.insights.read().await;
        let mut stats = InsightStats::default();
        for insight in insights.values().filter(|i| filter.matches(i)) {
            stats.record(insight);
        }
        Ok(stats)
    }

    async fn insert(&self, insight: &Insight) -> CuratorResult<()> {
        let mut insights = self.insights.write().await;
        if insights.contains_key(&insight.id) {
            return Err(StorageError::AlreadyExists {
                kind: "insight",
                id: insight.id.clone(),
            }
            .into());
        }
        insights.insert(insight.id.clone(), insight.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: InsightStatus,
        reviewed_by: &str,
        review_notes: &str,
    ) -> CuratorResult<()> {
        let mut insights = self.insights.write().await;
        let insight = insights
            .get_mut(id)
            .ok_or_else(|| StorageError::InsightNotFound { id: id.to_string() })?;
        insight.status = status;
        insight.reviewed_by = non_empty(reviewed_by);
        insight.reviewed_at = Some(Utc::now());
        insight.review_notes = non_empty(review_notes);
        Ok(())
    }

    async fn update(&self, id: &str, update: &InsightUpdate) -> CuratorResult<()> {
        if update.is_empty() {
            return Err(StorageError::NoFieldsToUpdate.into());
        }
        let mut insights = self.insights.write().await;
        match insights.get_mut(id) {
            Some(insight) if lifecycle::is_editable(insight.status) => {
                update.apply_to(insight);
                Ok(())
            }
            _ => Err(StorageError::InsightNotEditable { id: id.to_string() }.into()),
        }
    }

    async fn mark_applied(
        &self,
        id: &str,
        applied_by: &str,
        changeset_ref: &str,
    ) -> CuratorResult<()> {
        let mut insights = self.insights.write().await;
        let insight = insights
            .get_mut(id)
            .ok_or_else(|| StorageError::InsightNotFound { id: id.to_string() })?;
        lifecycle::validate_transition(insight.status, InsightStatus::Applied)?;
        insight.status = InsightStatus::Applied;
        insight.applied_by = Some(applied_by.to_string());
        insight.applied_at = Some(Utc::now());
        insight.changeset_ref = Some(changeset_ref.to_string());
        Ok(())
    }

    async fn supersede(&self, entity_urn: &str, exclude_id: &str) -> CuratorResult<u64> {
        let mut insights = self.insights.write().await;
        let mut moved = 0;
        for insight in insights.values_mut().filter(|i| {
            i.status == InsightStatus::Pending && i.id != exclude_id && i.references(entity_urn)
        }) {
            insight.status = InsightStatus::Superseded;
            moved += 1;
        }
        Ok(moved)
    }
}

// ============================================================================
// CHANGESETS
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryChangesetStore {
    changesets: Arc<RwLock<HashMap<RecordId, Changeset>>>,
}

impl InMemoryChangesetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded changesets.
    pub async fn len(&self) -> usize {
        self.changesets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.changesets.read().await.is_empty()
    }
}

#[async_trait]
impl ChangesetStore for InMemoryChangesetStore {
    async fn insert_changeset(&self, changeset: &Changeset) -> CuratorResult<()> {
        let mut changesets = self.changesets.write().await;
        if changesets.contains_key(&changeset.id) {
            return Err(StorageError::AlreadyExists {
                kind: "changeset",
                id: changeset.id.clone(),
            }
            .into());
        }
        changesets.insert(changeset.id.clone(), changeset.clone());
        Ok(())
    }

    async fn get_changeset(&self, id: &str) -> CuratorResult<Changeset> {
        let changesets = self.changesets.read().await;
        changesets
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::ChangesetNotFound { id: id.to_string() }.into())
    }

    async fn list_changesets(
        &self,
        filter: &ChangesetFilter,
    ) -> CuratorResult<(Vec<Changeset>, u64)> {
        let changesets = self.changesets.read().await;
        let mut hits: Vec<Changeset> = changesets
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        let total = hits.len() as u64;
        Ok((
            page(hits, filter.effective_limit(), filter.effective_offset()),
            total,
        ))
    }

    async fn rollback_changeset(&self, id: &str, rolled_back_by: &str) -> CuratorResult<()> {
        let mut changesets = self.changesets.write().await;
        match changesets.get_mut(id) {
            Some(changeset) if !changeset.rolled_back => {
                changeset.rolled_back = true;
                changeset.rolled_back_by = Some(rolled_back_by.to_string());
                changeset.rolled_back_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(StorageError::ChangesetNotRollbackable { id: id.to_string() }.into()),
        }
    }
}
