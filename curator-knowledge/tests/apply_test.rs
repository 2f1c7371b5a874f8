//! Apply engine: ordering, failure priority and audit trail.

use curator_core::{
    ActionType, ApplyError, ChangeSummary, ChangesetFilter, CuratorError, InsightStatus,
    KnowledgeConfig, ValidationError,
};
use curator_knowledge::{ApplyRequest, ApplyResult, KnowledgeEngine, SoftErrorStage};
use curator_storage::{ChangesetStore, InsightStore};
use curator_test_utils::fixtures::*;
use curator_test_utils::{
    CatalogWrite, FailingChangesetStore, FlakyInsightStore, InMemoryChangesetStore,
    InMemoryInsightStore, RecordingCatalogWriter, RecordingQueryRegistrar,
};
use std::sync::Arc;

struct Harness {
    engine: KnowledgeEngine,
    insights: InMemoryInsightStore,
    changesets: InMemoryChangesetStore,
    catalog: Arc<RecordingCatalogWriter>,
}

fn harness(catalog: RecordingCatalogWriter) -> Harness {
    let insights = InMemoryInsightStore::new();
    let changesets = InMemoryChangesetStore::new();
    let catalog = Arc::new(catalog);
    let engine = KnowledgeEngine::new(
        Arc::new(insights.clone()),
        Arc::new(changesets.clone()),
        catalog.clone(),
    );
    Harness {
        engine,
        insights,
        changesets,
        catalog,
    }
}

fn request(changes: Vec<curator_core::ApplyChange>, insight_ids: Vec<String>) -> ApplyRequest {
    ApplyRequest {
        entity_urn: ORDERS_URN.to_string(),
        changes,
        insight_ids,
        confirm: true,
    }
}

#[tokio::test]
async fn preview_without_confirm_touches_nothing() {
    let h = harness(RecordingCatalogWriter::new());
    let mut req = request(vec![change(ActionType::AddTag, "", "pii")], vec![]);
    req.confirm = false;

    let outcome = h.engine.apply(req, &admin()).await.unwrap();
    assert_eq!(
        outcome.result,
        ApplyResult::ConfirmationRequired {
            entity_urn: ORDERS_URN.to_string(),
            changes_count: 1,
        }
    );
    assert_eq!(h.catalog.reads(), 0);
    assert!(h.catalog.writes().is_empty());
    assert!(h.changesets.is_empty().await);
}

#[tokio::test]
async fn confirmation_can_be_disabled() {
    let h = harness(RecordingCatalogWriter::new());
    let engine = h.engine.clone().with_config(KnowledgeConfig {
        apply_enabled: true,
        require_confirmation: false,
    });
    let mut req = request(vec![change(ActionType::AddTag, "", "pii")], vec![]);
    req.confirm = false;

    let outcome = engine.apply(req, &admin()).await.unwrap();
    assert!(matches!(outcome.result, ApplyResult::Applied(_)));
    assert_eq!(h.catalog.added_tags(), vec!["urn:li:tag:pii"]);
}

#[tokio::test]
async fn second_write_failure_stops_batch_without_audit() {
    let h = harness(RecordingCatalogWriter::new().fail_on_write(2));
    let approved = insight_for(ORDERS_URN, InsightStatus::Approved);
    h.insights.insert(&approved).await.unwrap();

    let changes = vec![
        change(ActionType::AddTag, "", "pii"),
        change(ActionType::UpdateDescription, "", "Orders placed online"),
        change(ActionType::AddGlossaryTerm, "", "Revenue"),
    ];
    let err = h
        .engine
        .apply(request(changes, vec![approved.id.clone()]), &admin())
        .await
        .unwrap_err();

    match &err {
        CuratorError::Apply(ApplyError::Write { index, total, .. }) => {
            assert_eq!((*index, *total), (2, 3));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("change 1 was already written"));
    assert_eq!(h.catalog.writes().len(), 1);
    assert!(h.changesets.is_empty().await);
    assert_eq!(
        h.insights.get(&approved.id).await.unwrap().status,
        InsightStatus::Approved
    );
}

#[tokio::test]
async fn successful_batch_records_changeset_and_marks_insights() {
    let h = harness(RecordingCatalogWriter::new().with_metadata(ORDERS_URN, orders_metadata()));
    let a = insight_for(ORDERS_URN, InsightStatus::Approved);
    let b = insight_for(ORDERS_URN, InsightStatus::Approved);
    h.insights.insert(&a).await.unwrap();
    h.insights.insert(&b).await.unwrap();

    let changes = vec![
        change(ActionType::UpdateDescription, "column:amount", "Amount in cents"),
        change(ActionType::AddTag, "", "urn:li:tag:finance"),
    ];
    let outcome = h
        .engine
        .apply(request(changes.clone(), vec![a.id.clone(), b.id.clone()]), &admin())
        .await
        .unwrap();

    let ApplyResult::Applied(applied) = outcome.result else {
        panic!("expected applied result");
    };
    assert!(outcome.soft_errors.is_empty());
    assert_eq!(applied.changes_applied, 2);
    assert_eq!(applied.insights_marked_applied, 2);

    let (all, total) = h
        .changesets
        .list_changesets(&ChangesetFilter::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    let changeset = &all[0];
    assert_eq!(changeset.id, applied.changeset_id);
    assert_eq!(changeset.source_insight_ids, vec![a.id.clone(), b.id.clone()]);
    assert_eq!(changeset.change_type, ChangeSummary::Multiple);
    assert_eq!(changeset.previous_value.description, "Orders placed in the web shop");
    assert_eq!(changeset.new_value.changes(), changes.as_slice());
    assert_eq!(changeset.applied_by, "root@example.com");

    for id in [&a.id, &b.id] {
        let insight = h.insights.get(id).await.unwrap();
        assert_eq!(insight.status, InsightStatus::Applied);
        assert_eq!(insight.changeset_ref.as_deref(), Some(applied.changeset_id.as_str()));
        assert_eq!(insight.applied_by.as_deref(), Some("root@example.com"));
    }

    assert_eq!(
        h.catalog.writes(),
        vec![
            CatalogWrite::ColumnDescription {
                entity_urn: ORDERS_URN.to_string(),
                column: "amount".to_string(),
                description: "Amount in cents".to_string(),
            },
            CatalogWrite::AddTag {
                entity_urn: ORDERS_URN.to_string(),
                tag_urn: "urn:li:tag:finance".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn homogeneous_batch_summarizes_single_type() {
    let h = harness(RecordingCatalogWriter::new());
    let outcome = h
        .engine
        .apply(
            request(
                vec![
                    change(ActionType::AddTag, "", "pii"),
                    change(ActionType::AddTag, "", "gdpr"),
                ],
                vec![],
            ),
            &admin(),
        )
        .await
        .unwrap();
    let ApplyResult::Applied(applied) = outcome.result else {
        panic!("expected applied result");
    };
    let changeset = h.changesets.get_changeset(&applied.changeset_id).await.unwrap();
    assert_eq!(changeset.change_type, ChangeSummary::Single(ActionType::AddTag));
    assert!(changeset.source_insight_ids.is_empty());
}

#[tokio::test]
async fn snapshot_failure_aborts_before_writes() {
    let h = harness(RecordingCatalogWriter::new().fail_reads());
    let err = h
        .engine
        .apply(request(vec![change(ActionType::AddTag, "", "pii")], vec![]), &admin())
        .await
        .unwrap_err();
    assert!(matches!(err, CuratorError::Apply(ApplyError::Snapshot(_))));
    assert!(err.to_string().starts_with("failed to get current metadata"));
    assert!(h.catalog.writes().is_empty());
}

#[tokio::test]
async fn audit_failure_is_reported_after_writes() {
    let catalog = Arc::new(RecordingCatalogWriter::new());
    let insights = InMemoryInsightStore::new();
    let approved = insight_for(ORDERS_URN, InsightStatus::Approved);
    insights.insert(&approved).await.unwrap();
    let engine = KnowledgeEngine::new(
        Arc::new(insights.clone()),
        Arc::new(FailingChangesetStore),
        catalog.clone(),
    );

    let err = engine
        .apply(
            request(vec![change(ActionType::AddTag, "", "pii")], vec![approved.id.clone()]),
            &admin(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CuratorError::Apply(ApplyError::Audit(_, 1))));
    assert_eq!(catalog.writes().len(), 1);
    assert_eq!(
        insights.get(&approved.id).await.unwrap().status,
        InsightStatus::Approved
    );
}

#[tokio::test]
async fn mark_applied_failures_become_warnings() {
    let inner = InMemoryInsightStore::new();
    let a = insight_for(ORDERS_URN, InsightStatus::Approved);
    let b = insight_for(ORDERS_URN, InsightStatus::Approved);
    inner.insert(&a).await.unwrap();
    inner.insert(&b).await.unwrap();
    let flaky = FlakyInsightStore::new(inner.clone()).failing_mark_applied_for(a.id.clone());
    let changesets = InMemoryChangesetStore::new();
    let engine = KnowledgeEngine::new(
        Arc::new(flaky),
        Arc::new(changesets.clone()),
        Arc::new(RecordingCatalogWriter::new()),
    );

    let outcome = engine
        .apply(
            request(
                vec![change(ActionType::AddTag, "", "pii")],
                vec![a.id.clone(), b.id.clone()],
            ),
            &admin(),
        )
        .await
        .unwrap();

    let ApplyResult::Applied(applied) = outcome.result else {
        panic!("expected applied result");
    };
    assert_eq!(applied.insights_marked_applied, 1);
    assert_eq!(outcome.soft_errors.len(), 1);
    let soft = outcome.soft_errors.iter().next().unwrap();
    assert_eq!(soft.insight_id, a.id);
    assert_eq!(soft.stage, SoftErrorStage::MarkApplied);
    assert_eq!(changesets.len().await, 1);
    assert_eq!(inner.get(&b.id).await.unwrap().status, InsightStatus::Applied);
}

#[tokio::test]
async fn only_approved_insights_are_marked_applied() {
    let h = harness(RecordingCatalogWriter::new());
    let approved = insight_for(ORDERS_URN, InsightStatus::Approved);
    let pending = insight_for(ORDERS_URN, InsightStatus::Pending);
    let rejected = insight_for(ORDERS_URN, InsightStatus::Rejected);
    let rolled_back = insight_for(ORDERS_URN, InsightStatus::RolledBack);
    let mut applied = insight_for(ORDERS_URN, InsightStatus::Applied);
    applied.changeset_ref = Some("cs-earlier".to_string());
    for insight in [&approved, &pending, &rejected, &rolled_back, &applied] {
        h.insights.insert(insight).await.unwrap();
    }

    let ids = vec![
        approved.id.clone(),
        pending.id.clone(),
        rejected.id.clone(),
        rolled_back.id.clone(),
        applied.id.clone(),
    ];
    let outcome = h
        .engine
        .apply(request(vec![change(ActionType::AddTag, "", "pii")], ids), &admin())
        .await
        .unwrap();

    let ApplyResult::Applied(result) = outcome.result else {
        panic!("expected applied result");
    };
    assert_eq!(result.insights_marked_applied, 1);
    assert_eq!(h.changesets.len().await, 1);

    let refused: Vec<_> = outcome.soft_errors.iter().collect();
    assert_eq!(refused.len(), 4);
    assert!(refused.iter().all(|e| e.stage == SoftErrorStage::MarkApplied));
    assert_eq!(refused[0].insight_id, pending.id);
    assert_eq!(
        refused[0].message,
        "invalid status transition from pending to applied"
    );

    let stored = h.insights.get(&approved.id).await.unwrap();
    assert_eq!(stored.status, InsightStatus::Applied);
    assert_eq!(stored.changeset_ref.as_deref(), Some(result.changeset_id.as_str()));
    for (insight, status) in [
        (&pending, InsightStatus::Pending),
        (&rejected, InsightStatus::Rejected),
        (&rolled_back, InsightStatus::RolledBack),
        (&applied, InsightStatus::Applied),
    ] {
        assert_eq!(h.insights.get(&insight.id).await.unwrap().status, status);
    }
    assert_eq!(
        h.insights.get(&applied.id).await.unwrap().changeset_ref.as_deref(),
        Some("cs-earlier")
    );
}

#[tokio::test]
async fn write_routing_normalizes_identifiers() {
    let h = harness(RecordingCatalogWriter::new());
    let changes = vec![
        change(ActionType::RemoveTag, "", "legacy"),
        change(ActionType::AddGlossaryTerm, "", "Revenue"),
        change(ActionType::AddDocumentation, "https://wiki.example.com/orders", "Runbook"),
        change(ActionType::UpdateDescription, "column:", "Orders placed online"),
    ];
    h.engine.apply(request(changes, vec![]), &admin()).await.unwrap();

    assert_eq!(
        h.catalog.writes(),
        vec![
            CatalogWrite::RemoveTag {
                entity_urn: ORDERS_URN.to_string(),
                tag_urn: "urn:li:tag:legacy".to_string(),
            },
            CatalogWrite::AddGlossaryTerm {
                entity_urn: ORDERS_URN.to_string(),
                term_urn: "urn:li:glossaryTerm:Revenue".to_string(),
            },
            CatalogWrite::DocumentationLink {
                entity_urn: ORDERS_URN.to_string(),
                url: "https://wiki.example.com/orders".to_string(),
                description: "Runbook".to_string(),
            },
            CatalogWrite::Description {
                entity_urn: ORDERS_URN.to_string(),
                description: "Orders placed online".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn curated_query_without_registrar_is_rejected_up_front() {
    let h = harness(RecordingCatalogWriter::new());
    let err = h
        .engine
        .apply(
            request(
                vec![
                    change(ActionType::AddTag, "", "pii"),
                    change(ActionType::AddCuratedQuery, "", "daily revenue"),
                ],
                vec![],
            ),
            &admin(),
        )
        .await
        .unwrap_err();
    match err {
        CuratorError::Validation(ValidationError::Item { index, reason, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(*reason, ValidationError::QueryRegistrarUnavailable);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.catalog.reads(), 0);
    assert!(h.catalog.writes().is_empty());
}

#[tokio::test]
async fn curated_query_goes_to_registrar() {
    let h = harness(RecordingCatalogWriter::new());
    let registrar = Arc::new(RecordingQueryRegistrar::new());
    let engine = h.engine.clone().with_registrar(registrar.clone());
    let mut query = change(ActionType::AddCuratedQuery, "", "daily revenue");
    query.query_sql = Some("SELECT day, sum(amount) FROM orders GROUP BY day".to_string());
    query.query_description = Some("Revenue per day".to_string());

    engine.apply(request(vec![query], vec![]), &admin()).await.unwrap();

    let registered = registrar.registered();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].0, ORDERS_URN);
    assert_eq!(registered[0].1.name, "daily revenue");
    assert_eq!(registered[0].1.description.as_deref(), Some("Revenue per day"));
    assert!(h.catalog.writes().is_empty());
}
