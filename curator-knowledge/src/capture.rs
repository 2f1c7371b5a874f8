//! Insight capture

use crate::KnowledgeEngine;
use chrono::Utc;
use curator_core::{
    new_record_id, validation, Actor, CaptureInsightInput, CuratorResult, InsightStatus, RecordId,
};
use serde::Serialize;

pub const CAPTURE_MESSAGE: &str =
    "Insight captured. It will be reviewed by a data catalog administrator.";

/// Returned to the capturing caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureReceipt {
    pub insight_id: RecordId,
    pub status: InsightStatus,
    pub message: &'static str,
}

impl KnowledgeEngine {
    /// Validate and persist a new insight in `pending` status.
    ///
    /// Validation runs before the store is touched; an invalid request never
    /// reaches it. Provenance comes from `actor` and may be empty.
    pub async fn capture(
        &self,
        input: CaptureInsightInput,
        actor: &Actor,
    ) -> CuratorResult<CaptureReceipt> {
        let validated = validation::validate_capture(input)?;
        let insight = validated.into_insight(new_record_id(), Utc::now(), actor);

        self.insights.insert(&insight).await?;
        tracing::info!(
            insight_id = %insight.id,
            category = %insight.category,
            source = %insight.source,
            entities = insight.entity_urns.len(),
            "Insight captured"
        );

        Ok(CaptureReceipt {
            insight_id: insight.id,
            status: InsightStatus::Pending,
            message: CAPTURE_MESSAGE,
        })
    }
}
