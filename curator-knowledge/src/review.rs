//! Review, bulk review and synthesis

use crate::KnowledgeEngine;
use curator_core::{
    sortable_timestamp, validation, ActionType, Category, Confidence, CuratorResult,
    EntityInsightSummary, EntityMetadata, Insight, InsightFilter, InsightStatus, ProposedChange,
    ValidationError,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Shown by synthesize when no insight carried suggested actions.
pub const NO_PROPOSALS_NOTE: &str = "These insights were captured without suggested_actions. \
Review the insight text above and the current metadata, then construct changes for the apply action.";

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkReview {
    pub total_pending: u64,
    pub by_entity: Vec<EntityInsightSummary>,
    pub by_category: BTreeMap<Category, u64>,
    pub by_confidence: BTreeMap<Confidence, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReview {
    pub entity_urn: String,
    /// `None` when the catalog read failed
    pub current_metadata: Option<EntityMetadata>,
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synthesis {
    pub entity_urn: String,
    pub current_metadata: Option<EntityMetadata>,
    pub approved_insights: Vec<Insight>,
    pub proposed_changes: Vec<ProposedChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Group insights under every entity they reference.
///
/// Output is sorted by entity URN with categories sorted by name. `latest_at`
/// compares the fixed-width text encoding of `created_at`.
pub fn build_entity_summaries(insights: &[Insight]) -> Vec<EntityInsightSummary> {
    let mut by_entity: BTreeMap<&str, EntityInsightSummary> = BTreeMap::new();

    for insight in insights {
        let ts = sortable_timestamp(&insight.created_at);
        for urn in &insight.entity_urns {
            let summary = by_entity
                .entry(urn.as_str())
                .or_insert_with(|| EntityInsightSummary {
                    entity_urn: urn.clone(),
                    count: 0,
                    categories: Vec::new(),
                    latest_at: String::new(),
                });
            summary.count += 1;
            if !summary.categories.contains(&insight.category) {
                summary.categories.push(insight.category);
            }
            if summary.latest_at.is_empty() || ts > summary.latest_at {
                summary.latest_at = ts.clone();
            }
        }
    }

    by_entity
        .into_values()
        .map(|mut summary| {
            summary.categories.sort_by_key(|c| c.as_db_str());
            summary
        })
        .collect()
}

/// Expand suggested actions into proposed changes, one per action, in
/// insight order. `update_description` entries carry the current
/// description when metadata is known.
pub fn build_proposed_changes(
    insights: &[Insight],
    metadata: Option<&EntityMetadata>,
) -> Vec<ProposedChange> {
    insights
        .iter()
        .flat_map(|insight| {
            insight.suggested_actions.iter().map(move |action| ProposedChange {
                change_type: action.action_type,
                target: action.target.clone(),
                current_value: match (action.action_type, metadata) {
                    (ActionType::UpdateDescription, Some(meta)) => Some(meta.description.clone()),
                    _ => None,
                },
                suggested_value: action.detail.clone(),
                query_sql: action.query_sql.clone(),
                query_description: action.query_description.clone(),
                source_insight_ids: vec![insight.id.clone()],
            })
        })
        .collect()
}

fn require_entity(entity_urn: &str, action: &str) -> Result<(), ValidationError> {
    if entity_urn.is_empty() {
        return Err(ValidationError::RequiredFor {
            field: "entity_urn",
            action: action.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// ENGINE
// ============================================================================

impl KnowledgeEngine {
    /// Aggregate view of everything still pending.
    pub async fn bulk_review(&self) -> CuratorResult<BulkReview> {
        let pending = InsightFilter::with_status(InsightStatus::Pending);
        let stats = self.insights.stats(&pending).await?;
        let (insights, _) = self
            .insights
            .list(&pending.with_limit(validation::MAX_LIMIT))
            .await?;

        Ok(BulkReview {
            total_pending: stats.total_pending,
            by_entity: build_entity_summaries(&insights),
            by_category: stats.by_category,
            by_confidence: stats.by_confidence,
        })
    }

    /// All insights about one entity, in any status, plus its current metadata.
    pub async fn review(&self, entity_urn: &str) -> CuratorResult<EntityReview> {
        require_entity(entity_urn, "review")?;
        let filter = InsightFilter::default()
            .for_entity(entity_urn)
            .with_limit(validation::MAX_LIMIT);
        let (insights, _) = self.insights.list(&filter).await?;

        Ok(EntityReview {
            entity_urn: entity_urn.to_string(),
            current_metadata: self.metadata_best_effort(entity_urn).await,
            insights,
        })
    }

    /// Proposal built from approved insights about one entity.
    ///
    /// A non-empty `insight_ids` narrows the approved set to those ids.
    pub async fn synthesize(
        &self,
        entity_urn: &str,
        insight_ids: &[String],
    ) -> CuratorResult<Synthesis> {
        require_entity(entity_urn, "synthesize")?;
        validation::validate_insight_ids(insight_ids)?;

        let filter = InsightFilter::with_status(InsightStatus::Approved)
            .for_entity(entity_urn)
            .with_limit(validation::MAX_LIMIT);
        let (mut approved, _) = self.insights.list(&filter).await?;
        if !insight_ids.is_empty() {
            let wanted: HashSet<&str> = insight_ids.iter().map(String::as_str).collect();
            approved.retain(|i| wanted.contains(i.id.as_str()));
        }

        let current_metadata = self.metadata_best_effort(entity_urn).await;
        let proposed_changes = build_proposed_changes(&approved, current_metadata.as_ref());
        let note = proposed_changes.is_empty().then_some(NO_PROPOSALS_NOTE);

        Ok(Synthesis {
            entity_urn: entity_urn.to_string(),
            current_metadata,
            approved_insights: approved,
            proposed_changes,
            note,
        })
    }

    /// Catalog read whose failure is logged and swallowed.
    async fn metadata_best_effort(&self, entity_urn: &str) -> Option<EntityMetadata> {
        match self.catalog.get_current_metadata(entity_urn).await {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!(entity_urn, error = %e, "Current metadata unavailable");
                None
            }
        }
    }
}
