//! Approve / reject in batches, admin status changes and edits, supersede

use crate::KnowledgeEngine;
use curator_core::{
    lifecycle, validation, Actor, CuratorError, CuratorResult, InsightEditInput, InsightStatus,
    KnowledgeAction, LifecycleError, RecordId, ValidationError,
};
use serde::Serialize;

/// The two review verdicts an administrator can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn target_status(self) -> InsightStatus {
        match self {
            ReviewDecision::Approve => InsightStatus::Approved,
            ReviewDecision::Reject => InsightStatus::Rejected,
        }
    }

    pub fn action(self) -> KnowledgeAction {
        match self {
            ReviewDecision::Approve => KnowledgeAction::Approve,
            ReviewDecision::Reject => KnowledgeAction::Reject,
        }
    }

    /// The decision that moves an insight into `status`, if any.
    pub fn for_status(status: InsightStatus) -> Option<Self> {
        match status {
            InsightStatus::Approved => Some(ReviewDecision::Approve),
            InsightStatus::Rejected => Some(ReviewDecision::Reject),
            _ => None,
        }
    }
}

/// Partial-success report of a batch review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReviewOutcome {
    pub action: ReviewDecision,
    pub updated: usize,
    pub total: usize,
    /// `"<id>: <reason>"` per failed id
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl KnowledgeEngine {
    /// Approve or reject each id independently.
    ///
    /// A missing id or a disallowed transition is recorded against that id
    /// and the batch carries on with the rest.
    pub async fn review_batch(
        &self,
        decision: ReviewDecision,
        insight_ids: &[RecordId],
        review_notes: &str,
        actor: &Actor,
    ) -> CuratorResult<BatchReviewOutcome> {
        if insight_ids.is_empty() {
            return Err(ValidationError::RequiredFor {
                field: "insight_ids",
                action: decision.action().to_string(),
            }
            .into());
        }
        validation::validate_insight_ids(insight_ids)?;

        let target = decision.target_status();
        let mut updated = 0;
        let mut errors = Vec::new();

        for id in insight_ids {
            let insight = match self.insights.get(id).await {
                Ok(insight) => insight,
                Err(CuratorError::Storage(e)) if e.is_not_found() => {
                    errors.push(format!("{id}: not found"));
                    continue;
                }
                Err(e) => {
                    errors.push(format!("{id}: {e}"));
                    continue;
                }
            };
            if let Err(e) = lifecycle::validate_transition(insight.status, target) {
                errors.push(format!("{id}: {e}"));
                continue;
            }
            if let Err(e) = self
                .insights
                .update_status(id, target, &actor.user_id, review_notes)
                .await
            {
                errors.push(format!("{id}: {e}"));
                continue;
            }
            updated += 1;
        }

        tracing::info!(
            action = %decision.action(),
            updated,
            total = insight_ids.len(),
            failed = errors.len(),
            "Batch review finished"
        );

        Ok(BatchReviewOutcome {
            action: decision,
            updated,
            total: insight_ids.len(),
            errors,
        })
    }

    /// Single-insight status change from the admin surface. Only approved
    /// and rejected are accepted as targets.
    pub async fn set_status(
        &self,
        id: &str,
        status: InsightStatus,
        review_notes: &str,
        actor: &Actor,
    ) -> CuratorResult<()> {
        if ReviewDecision::for_status(status).is_none() {
            return Err(ValidationError::InvalidValue {
                field: "status",
                reason: "status must be 'approved' or 'rejected'".to_string(),
            }
            .into());
        }
        let insight = self.insights.get(id).await?;
        lifecycle::validate_transition(insight.status, status)?;
        self.insights
            .update_status(id, status, &actor.user_id, review_notes)
            .await?;
        tracing::info!(insight_id = %id, status = %status, "Insight status updated");
        Ok(())
    }

    /// Edit text, category or confidence of an insight that is not applied.
    pub async fn edit(&self, id: &str, input: InsightEditInput) -> CuratorResult<()> {
        let update = validation::validate_insight_edit(input)?;
        let insight = self.insights.get(id).await?;
        if !lifecycle::is_editable(insight.status) {
            return Err(LifecycleError::AppliedNotEditable { id: insight.id }.into());
        }
        self.insights.update(id, &update).await
    }

    /// Mark every other pending insight about `entity_urn` superseded.
    /// Returns how many were transitioned.
    pub async fn supersede(&self, entity_urn: &str, exclude_id: &str) -> CuratorResult<u64> {
        if entity_urn.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "entity_urn",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        let count = self.insights.supersede(entity_urn, exclude_id).await?;
        if count > 0 {
            tracing::info!(entity_urn, exclude_id, count, "Superseded pending insights");
        }
        Ok(count)
    }
}
