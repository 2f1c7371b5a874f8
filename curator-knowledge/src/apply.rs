//! Batched apply with audit trail
//!
//! Order of effects, and which failures surface:
//!
//! 1. validate the whole batch (nothing touched on failure)
//! 2. confirmation gate (nothing touched, preview returned)
//! 3. snapshot current metadata (abort on failure)
//! 4. write each change in order, stop at the first failure
//! 5. record the changeset (failure surfaces, catalog already written)
//! 6. mark source insights applied (failures, and insights that are not
//!    approved, become soft errors)
//!
//! There is no cross-store transaction. Earlier writes of a batch that
//! fails at step 4 stay in the catalog, and the error names the failing
//! item so the operator can see how far the batch got.

use crate::{KnowledgeEngine, SoftErrorStage, SoftErrors};
use chrono::Utc;
use curator_catalog::{
    normalize_glossary_term_urn, normalize_tag_urn, CuratedQuery, QUALITY_ISSUE_TAG_URN,
};
use curator_core::{
    column_target, new_record_id, validation, ActionType, Actor, ApplyChange, ApplyChangeInput,
    ApplyError, CatalogError, ChangeSummary, Changeset, CuratorError, CuratorResult,
    MetadataSnapshot, RecordId, RequestedChanges, StorageError, ValidationError,
};
use serde::Serialize;

// ============================================================================
// REQUEST / OUTCOME
// ============================================================================

/// A validated apply call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    pub entity_urn: String,
    pub changes: Vec<ApplyChange>,
    /// Insights the batch originated from
    pub insight_ids: Vec<RecordId>,
    pub confirm: bool,
}

impl ApplyRequest {
    /// Validate raw tool arguments into a request.
    pub fn from_input(
        entity_urn: &str,
        changes: Vec<ApplyChangeInput>,
        insight_ids: Vec<RecordId>,
        confirm: bool,
    ) -> Result<Self, ValidationError> {
        if entity_urn.is_empty() {
            return Err(ValidationError::RequiredFor {
                field: "entity_urn",
                action: "apply".to_string(),
            });
        }
        let changes = validation::validate_apply_changes(changes)?;
        validation::validate_insight_ids(&insight_ids)?;
        Ok(Self {
            entity_urn: entity_urn.to_string(),
            changes,
            insight_ids,
            confirm,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChangeset {
    pub changeset_id: RecordId,
    pub entity_urn: String,
    pub changes_applied: usize,
    /// Successful `mark_applied` calls
    pub insights_marked_applied: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// Confirmation is required and was not given; nothing was read or written.
    ConfirmationRequired {
        entity_urn: String,
        changes_count: usize,
    },
    Applied(AppliedChangeset),
}

/// Primary result plus the failures that did not fail the apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub result: ApplyResult,
    pub soft_errors: SoftErrors,
}

// ============================================================================
// ENGINE
// ============================================================================

impl KnowledgeEngine {
    /// Apply a batch of changes to one entity and record the audit trail.
    pub async fn apply(&self, request: ApplyRequest, actor: &Actor) -> CuratorResult<ApplyOutcome> {
        self.check_batch(&request.changes)?;

        if self.config.require_confirmation && !request.confirm {
            return Ok(ApplyOutcome {
                result: ApplyResult::ConfirmationRequired {
                    changes_count: request.changes.len(),
                    entity_urn: request.entity_urn,
                },
                soft_errors: SoftErrors::new(),
            });
        }

        let snapshot = self
            .catalog
            .get_current_metadata(&request.entity_urn)
            .await
            .map_err(ApplyError::Snapshot)?;

        let total = request.changes.len();
        for (i, change) in request.changes.iter().enumerate() {
            if let Err(source) = self.write_change(&request.entity_urn, change).await {
                tracing::error!(
                    entity_urn = %request.entity_urn,
                    index = i + 1,
                    total,
                    error = %source,
                    "Catalog write failed, batch stopped"
                );
                return Err(ApplyError::Write {
                    index: i + 1,
                    total,
                    source,
                }
                .into());
            }
        }

        let changeset = Changeset {
            id: new_record_id(),
            created_at: Utc::now(),
            target_urn: request.entity_urn.clone(),
            change_type: ChangeSummary::from_changes(&request.changes),
            previous_value: MetadataSnapshot::from(snapshot),
            new_value: RequestedChanges::from(request.changes),
            source_insight_ids: request.insight_ids,
            approved_by: actor.user_id.clone(),
            applied_by: actor.user_id.clone(),
            rolled_back: false,
            rolled_back_by: None,
            rolled_back_at: None,
        };

        self.changesets
            .insert_changeset(&changeset)
            .await
            .map_err(|e| ApplyError::Audit(storage_cause(e), total))?;

        tracing::info!(
            changeset_id = %changeset.id,
            entity_urn = %changeset.target_urn,
            change_type = %changeset.change_type,
            changes = total,
            "Changeset recorded"
        );

        let mut soft_errors = SoftErrors::new();
        let mut marked = 0;
        for insight_id in &changeset.source_insight_ids {
            match self
                .insights
                .mark_applied(insight_id, &actor.user_id, &changeset.id)
                .await
            {
                Ok(()) => marked += 1,
                Err(e) => {
                    tracing::warn!(
                        insight_id = %insight_id,
                        changeset_id = %changeset.id,
                        error = %e,
                        "Failed to mark insight applied"
                    );
                    soft_errors.push(insight_id, SoftErrorStage::MarkApplied, e.to_string());
                }
            }
        }

        Ok(ApplyOutcome {
            result: ApplyResult::Applied(AppliedChangeset {
                changeset_id: changeset.id,
                entity_urn: changeset.target_urn,
                changes_applied: total,
                insights_marked_applied: marked,
            }),
            soft_errors,
        })
    }

    /// Checks that depend on engine wiring rather than the input alone.
    fn check_batch(&self, changes: &[ApplyChange]) -> Result<(), ValidationError> {
        if changes.is_empty() {
            return Err(ValidationError::EmptyChanges);
        }
        if changes.len() > validation::MAX_APPLY_CHANGES {
            return Err(ValidationError::TooMany {
                field: "changes",
                max: validation::MAX_APPLY_CHANGES,
                got: changes.len(),
            });
        }
        if self.registrar.is_none() {
            if let Some(index) = changes
                .iter()
                .position(|c| c.change_type == ActionType::AddCuratedQuery)
            {
                return Err(ValidationError::Item {
                    field: "changes",
                    index,
                    reason: Box::new(ValidationError::QueryRegistrarUnavailable),
                });
            }
        }
        Ok(())
    }

    /// Route one change to the catalog.
    async fn write_change(&self, entity_urn: &str, change: &ApplyChange) -> Result<(), CatalogError> {
        match change.change_type {
            ActionType::UpdateDescription => match column_target(&change.target) {
                Some(column) => {
                    self.catalog
                        .update_column_description(entity_urn, column, &change.detail)
                        .await
                }
                None => self.catalog.update_description(entity_urn, &change.detail).await,
            },
            ActionType::AddTag => {
                self.catalog
                    .add_tag(entity_urn, &normalize_tag_urn(&change.detail))
                    .await
            }
            ActionType::RemoveTag => {
                self.catalog
                    .remove_tag(entity_urn, &normalize_tag_urn(&change.detail))
                    .await
            }
            ActionType::AddGlossaryTerm => {
                self.catalog
                    .add_glossary_term(entity_urn, &normalize_glossary_term_urn(&change.detail))
                    .await
            }
            ActionType::AddDocumentation => {
                self.catalog
                    .add_documentation_link(entity_urn, &change.target, &change.detail)
                    .await
            }
            // The detail stays in the changeset; it never becomes a tag name.
            ActionType::FlagQualityIssue => self.catalog.add_tag(entity_urn, QUALITY_ISSUE_TAG_URN).await,
            ActionType::AddCuratedQuery => {
                let registrar = self.registrar.as_ref().ok_or(CatalogError::NotConfigured {
                    what: "query registrar",
                })?;
                let query = CuratedQuery {
                    name: change.detail.clone(),
                    sql: change.query_sql.clone().unwrap_or_default(),
                    description: change.query_description.clone(),
                };
                let query_urn = registrar.register_query(entity_urn, &query).await?;
                tracing::debug!(entity_urn, query_urn = %query_urn, "Curated query registered");
                Ok(())
            }
        }
    }
}

fn storage_cause(err: CuratorError) -> StorageError {
    match err {
        CuratorError::Storage(e) => e,
        other => StorageError::Backend {
            reason: other.to_string(),
        },
    }
}
