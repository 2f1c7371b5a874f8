//! Contract tests for the in-memory stores.

use chrono::{Duration, TimeZone, Utc};
use curator_core::{
    ActionType, ApplyChange, Category, ChangeSummary, Changeset, ChangesetFilter, Confidence,
    CuratorError, Insight, InsightFilter, InsightStatus, InsightUpdate, MetadataSnapshot,
    RequestedChanges, Source, StorageError, Timestamp,
};
use curator_storage::{ChangesetStore, InMemoryChangesetStore, InMemoryInsightStore, InsightStore};
use proptest::prelude::*;

fn at(minutes: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn insight(id: &str, minutes: i64, urns: &[&str]) -> Insight {
    Insight {
        id: id.to_string(),
        created_at: at(minutes),
        session_id: "sess-1".into(),
        captured_by: "ana@example.com".into(),
        persona: "analyst".into(),
        source: Source::User,
        category: Category::BusinessContext,
        insight_text: "orders are booked in the warehouse timezone".into(),
        confidence: Confidence::Medium,
        entity_urns: urns.iter().map(|u| u.to_string()).collect(),
        related_columns: vec![],
        suggested_actions: vec![],
        status: InsightStatus::Pending,
        reviewed_by: None,
        reviewed_at: None,
        review_notes: None,
        applied_by: None,
        applied_at: None,
        changeset_ref: None,
    }
}

fn changeset(id: &str, urn: &str, minutes: i64) -> Changeset {
    Changeset {
        id: id.to_string(),
        created_at: at(minutes),
        target_urn: urn.to_string(),
        change_type: ChangeSummary::Single(ActionType::AddTag),
        previous_value: MetadataSnapshot::default(),
        new_value: RequestedChanges(vec![ApplyChange {
            change_type: ActionType::AddTag,
            target: String::new(),
            detail: "pii".into(),
            query_sql: None,
            query_description: None,
        }]),
        source_insight_ids: vec![],
        approved_by: "admin".into(),
        applied_by: "admin".into(),
        rolled_back: false,
        rolled_back_by: None,
        rolled_back_at: None,
    }
}

const ORDERS: &str = "urn:li:dataset:(urn:li:dataPlatform:trino,sales.orders,PROD)";
const USERS: &str = "urn:li:dataset:(urn:li:dataPlatform:trino,crm.users,PROD)";

#[tokio::test]
async fn test_list_is_newest_first_with_total() {
    let store = InMemoryInsightStore::new();
    for (i, id) in ["a", "b", "c"].iter().enumerate() {
        store.insert(&insight(id, i as i64, &[ORDERS])).await.unwrap();
    }

    let filter = InsightFilter::default().with_limit(2);
    let (page, total) = store.list(&filter).await.unwrap();
    assert_eq!(total, 3);
    let ids: Vec<_> = page.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b"]);

    let next = InsightFilter {
        offset: 2,
        ..filter
    };
    let (page, total) = store.list(&next).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, "a");
}

#[tokio::test]
async fn test_entity_filter_is_membership_test() {
    let store = InMemoryInsightStore::new();
    store.insert(&insight("a", 0, &[ORDERS, USERS])).await.unwrap();
    store.insert(&insight("b", 1, &[USERS])).await.unwrap();

    let (page, total) = store
        .list(&InsightFilter::default().for_entity(ORDERS))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].id, "a");
}

#[tokio::test]
async fn test_duplicate_insert_is_rejected() {
    let store = InMemoryInsightStore::new();
    store.insert(&insight("a", 0, &[])).await.unwrap();
    let err = store.insert(&insight("a", 0, &[])).await.unwrap_err();
    assert!(matches!(
        err,
        CuratorError::Storage(StorageError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn test_update_status_records_review_fields() {
    let store = InMemoryInsightStore::new();
    store.insert(&insight("a", 0, &[])).await.unwrap();
    store
        .update_status("a", InsightStatus::Approved, "admin", "looks right")
        .await
        .unwrap();

    let stored = store.get("a").await.unwrap();
    assert_eq!(stored.status, InsightStatus::Approved);
    assert_eq!(stored.reviewed_by.as_deref(), Some("admin"));
    assert_eq!(stored.review_notes.as_deref(), Some("looks right"));
    assert!(stored.reviewed_at.is_some());
    assert!(stored.applied_at.is_none());

    let err = store
        .update_status("missing", InsightStatus::Approved, "admin", "")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "insight not found: missing");
}

#[tokio::test]
async fn test_update_guards() {
    let store = InMemoryInsightStore::new();
    store.insert(&insight("a", 0, &[])).await.unwrap();

    let err = store.update("a", &InsightUpdate::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "no fields to update");

    let edit = InsightUpdate {
        confidence: Some(Confidence::High),
        ..Default::default()
    };
    store.update("a", &edit).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().confidence, Confidence::High);

    store
        .update_status("a", InsightStatus::Approved, "admin", "")
        .await
        .unwrap();
    store.mark_applied("a", "admin", "cs1").await.unwrap();
    let err = store.update("a", &edit).await.unwrap_err();
    assert_eq!(err.to_string(), "insight not found or already applied: a");

    let err = store.update("missing", &edit).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "insight not found or already applied: missing"
    );
}

#[tokio::test]
async fn test_mark_applied_links_changeset() {
    let store = InMemoryInsightStore::new();
    store.insert(&insight("a", 0, &[])).await.unwrap();
    store
        .update_status("a", InsightStatus::Approved, "admin", "")
        .await
        .unwrap();
    store.mark_applied("a", "admin", "cs-9").await.unwrap();

    let stored = store.get("a").await.unwrap();
    assert_eq!(stored.status, InsightStatus::Applied);
    assert_eq!(stored.changeset_ref.as_deref(), Some("cs-9"));
    assert_eq!(stored.applied_by.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_mark_applied_requires_approval() {
    let store = InMemoryInsightStore::new();
    store.insert(&insight("pending", 0, &[])).await.unwrap();
    let err = store.mark_applied("pending", "admin", "cs-1").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid status transition from pending to applied"
    );
    let stored = store.get("pending").await.unwrap();
    assert_eq!(stored.status, InsightStatus::Pending);
    assert_eq!(stored.changeset_ref, None);

    let mut applied = insight("applied", 0, &[]);
    applied.status = InsightStatus::Applied;
    applied.changeset_ref = Some("cs-old".to_string());
    store.insert(&applied).await.unwrap();
    assert!(store.mark_applied("applied", "admin", "cs-new").await.is_err());
    assert_eq!(
        store.get("applied").await.unwrap().changeset_ref.as_deref(),
        Some("cs-old")
    );

    let err = store.mark_applied("missing", "admin", "cs-1").await.unwrap_err();
    assert_eq!(err.to_string(), "insight not found: missing");
}

#[tokio::test]
async fn test_supersede_moves_other_pending_for_entity() {
    let store = InMemoryInsightStore::new();
    store.insert(&insight("keep", 3, &[ORDERS])).await.unwrap();
    store.insert(&insight("old-1", 1, &[ORDERS])).await.unwrap();
    store.insert(&insight("old-2", 2, &[ORDERS, USERS])).await.unwrap();
    store.insert(&insight("other", 0, &[USERS])).await.unwrap();
    store.insert(&insight("approved", 0, &[ORDERS])).await.unwrap();
    store
        .update_status("approved", InsightStatus::Approved, "admin", "")
        .await
        .unwrap();

    let moved = store.supersede(ORDERS, "keep").await.unwrap();
    assert_eq!(moved, 2);
    assert_eq!(store.get("keep").await.unwrap().status, InsightStatus::Pending);
    assert_eq!(store.get("old-1").await.unwrap().status, InsightStatus::Superseded);
    assert_eq!(store.get("other").await.unwrap().status, InsightStatus::Pending);
    assert_eq!(store.get("approved").await.unwrap().status, InsightStatus::Approved);
}

#[tokio::test]
async fn test_stats_group_counts() {
    let store = InMemoryInsightStore::new();
    store.insert(&insight("a", 0, &[])).await.unwrap();
    let mut high = insight("b", 1, &[]);
    high.confidence = Confidence::High;
    high.category = Category::DataQuality;
    store.insert(&high).await.unwrap();
    store
        .update_status("b", InsightStatus::Rejected, "admin", "")
        .await
        .unwrap();

    let stats = store.stats(&InsightFilter::default()).await.unwrap();
    assert_eq!(stats.total_pending, 1);
    assert_eq!(stats.by_status.get(&InsightStatus::Rejected), Some(&1));
    assert_eq!(stats.by_category.get(&Category::DataQuality), Some(&1));
    assert_eq!(stats.by_confidence.get(&Confidence::Medium), Some(&1));
}

#[tokio::test]
async fn test_changeset_rollback_once() {
    let store = InMemoryChangesetStore::new();
    store.insert_changeset(&changeset("cs1", ORDERS, 0)).await.unwrap();

    store.rollback_changeset("cs1", "admin").await.unwrap();
    let stored = store.get_changeset("cs1").await.unwrap();
    assert!(stored.rolled_back);
    assert_eq!(stored.rolled_back_by.as_deref(), Some("admin"));

    let err = store.rollback_changeset("cs1", "admin").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "changeset not found or already rolled back: cs1"
    );
    let err = store.rollback_changeset("nope", "admin").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "changeset not found or already rolled back: nope"
    );
}

#[tokio::test]
async fn test_changeset_filters() {
    let store = InMemoryChangesetStore::new();
    store.insert_changeset(&changeset("cs1", ORDERS, 0)).await.unwrap();
    store.insert_changeset(&changeset("cs2", USERS, 1)).await.unwrap();
    store.insert_changeset(&changeset("cs3", ORDERS, 2)).await.unwrap();
    store.rollback_changeset("cs3", "admin").await.unwrap();

    let filter = ChangesetFilter {
        entity_urn: Some(ORDERS.into()),
        rolled_back: Some(false),
        ..Default::default()
    };
    let (page, total) = store.list_changesets(&filter).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].id, "cs1");

    let since = ChangesetFilter {
        since: Some(at(1)),
        ..Default::default()
    };
    let (page, _) = store.list_changesets(&since).await.unwrap();
    let ids: Vec<_> = page.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["cs3", "cs2"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_get_and_list_are_idempotent(count in 0usize..30, limit in -5i64..120, offset in 0i64..40) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let store = InMemoryInsightStore::new();
            for i in 0..count {
                store.insert(&insight(&format!("id-{i:03}"), i as i64, &[ORDERS])).await.unwrap();
            }
            let filter = InsightFilter { limit, offset, ..Default::default() };

            let first = store.list(&filter).await.unwrap();
            let second = store.list(&filter).await.unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.1, count as u64);
            prop_assert!(first.0.len() as i64 <= filter.effective_limit());

            if count > 0 {
                let a = store.get("id-000").await.unwrap();
                let b = store.get("id-000").await.unwrap();
                prop_assert_eq!(a, b);
            }
            Ok(())
        })?;
    }
}
