//! Changeset rollback

use crate::{KnowledgeEngine, SoftErrorStage, SoftErrors};
use curator_core::{lifecycle, Actor, CuratorResult, InsightStatus, RecordId, StorageError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackOutcome {
    pub changeset_id: RecordId,
    /// Whether the snapshotted description was written back
    pub description_restored: bool,
    pub insights_rolled_back: usize,
    #[serde(rename = "warnings", skip_serializing_if = "SoftErrors::is_empty")]
    pub soft_errors: SoftErrors,
}

impl KnowledgeEngine {
    /// Roll a changeset back.
    ///
    /// Only the entity-level description is restored in the catalog, and
    /// only when the snapshot held one. Tags, terms, links and queries added
    /// by the batch stay. A catalog failure aborts before the changeset is
    /// flagged; insight transitions afterwards are best effort.
    pub async fn rollback_changeset(&self, id: &str, actor: &Actor) -> CuratorResult<RollbackOutcome> {
        let changeset = self.changesets.get_changeset(id).await?;
        if changeset.rolled_back {
            return Err(StorageError::ChangesetNotRollbackable { id: changeset.id }.into());
        }

        let description_restored = match changeset.previous_value.description() {
            Some(description) => {
                self.catalog
                    .update_description(&changeset.target_urn, description)
                    .await?;
                true
            }
            None => false,
        };

        self.changesets
            .rollback_changeset(&changeset.id, &actor.user_id)
            .await?;

        let notes = format!("rolled back with changeset {}", changeset.id);
        let mut soft_errors = SoftErrors::new();
        let mut rolled_back = 0;
        for insight_id in &changeset.source_insight_ids {
            let result = async {
                let insight = self.insights.get(insight_id).await?;
                if insight.status != InsightStatus::Applied {
                    return Ok(false);
                }
                lifecycle::validate_transition(insight.status, InsightStatus::RolledBack)?;
                self.insights
                    .update_status(insight_id, InsightStatus::RolledBack, &actor.user_id, &notes)
                    .await?;
                Ok::<_, curator_core::CuratorError>(true)
            }
            .await;

            match result {
                Ok(true) => rolled_back += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        insight_id = %insight_id,
                        changeset_id = %changeset.id,
                        error = %e,
                        "Failed to roll back insight"
                    );
                    soft_errors.push(insight_id, SoftErrorStage::RollbackInsight, e.to_string());
                }
            }
        }

        tracing::info!(
            changeset_id = %changeset.id,
            entity_urn = %changeset.target_urn,
            description_restored,
            insights = rolled_back,
            "Changeset rolled back"
        );

        Ok(RollbackOutcome {
            changeset_id: changeset.id,
            description_restored,
            insights_rolled_back: rolled_back,
            soft_errors,
        })
    }
}
