//! PostgreSQL store tests. Run with `--features db-tests` against a database
//! reachable through the `CURATOR_DB_*` variables.

#![cfg(feature = "db-tests")]

use chrono::{SubsecRound, Utc};
use curator_core::{
    new_record_id, Category, Confidence, Insight, InsightFilter, InsightStatus, InsightUpdate,
    Source,
};
use curator_storage::{bootstrap, InsightStore, PgInsightStore};
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

fn pool() -> Pool {
    let mut cfg = Config::new();
    cfg.host = Some(std::env::var("CURATOR_DB_HOST").unwrap_or_else(|_| "localhost".into()));
    cfg.port = std::env::var("CURATOR_DB_PORT").ok().and_then(|p| p.parse().ok());
    cfg.dbname = Some(std::env::var("CURATOR_DB_NAME").unwrap_or_else(|_| "curator".into()));
    cfg.user = Some(std::env::var("CURATOR_DB_USER").unwrap_or_else(|_| "postgres".into()));
    cfg.password = std::env::var("CURATOR_DB_PASSWORD").ok();
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.create_pool(Some(Runtime::Tokio1), NoTls).unwrap()
}

fn insight(urn: &str) -> Insight {
    Insight {
        id: new_record_id(),
        created_at: Utc::now().trunc_subsecs(6),
        session_id: String::new(),
        captured_by: "db-test".into(),
        persona: String::new(),
        source: Source::AgentDiscovery,
        category: Category::Correction,
        insight_text: "the amount column is stored in cents".into(),
        confidence: Confidence::High,
        entity_urns: vec![urn.to_string()],
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

#[tokio::test]
async fn test_insert_get_and_entity_listing() {
    let pool = pool();
    bootstrap(&pool).await.unwrap();
    let store = PgInsightStore::new(pool);

    let urn = format!("urn:li:dataset:db-test-{}", new_record_id());
    let original = insight(&urn);
    store.insert(&original).await.unwrap();

    assert_eq!(store.get(&original.id).await.unwrap(), original);

    let (page, total) = store
        .list(&InsightFilter::default().for_entity(urn.as_str()))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].id, original.id);
}

#[tokio::test]
async fn test_update_refused_after_apply() {
    let pool = pool();
    bootstrap(&pool).await.unwrap();
    let store = PgInsightStore::new(pool);

    let mut original = insight("urn:li:dataset:db-test-apply");
    original.status = InsightStatus::Approved;
    store.insert(&original).await.unwrap();
    store
        .mark_applied(&original.id, "db-test", "cs-db")
        .await
        .unwrap();

    let edit = InsightUpdate {
        category: Some(Category::Enhancement),
        ..Default::default()
    };
    let err = store.update(&original.id, &edit).await.unwrap_err();
    assert!(err.to_string().starts_with("insight not found or already applied"));
}

#[tokio::test]
async fn test_mark_applied_refuses_unapproved() {
    let pool = pool();
    bootstrap(&pool).await.unwrap();
    let store = PgInsightStore::new(pool);

    let pending = insight("urn:li:dataset:db-test-unapproved");
    store.insert(&pending).await.unwrap();
    let err = store
        .mark_applied(&pending.id, "db-test", "cs-db")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid status transition from pending to applied"
    );
    let stored = store.get(&pending.id).await.unwrap();
    assert_eq!(stored.status, InsightStatus::Pending);
    assert_eq!(stored.changeset_ref, None);

    let err = store
        .mark_applied("db-test-missing", "db-test", "cs-db")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "insight not found: db-test-missing");
}
