//! Tool-call surface: `capture_insight` and `apply_knowledge`
//!
//! Tools never fail at the transport level. Every outcome, including
//! malformed arguments, comes back as a [`ToolOutput`] whose payload is a
//! JSON object; failures are `{"error": "..."}` with `is_error` set.

use crate::{ApplyRequest, ApplyResult, KnowledgeEngine, ReviewDecision};
use curator_core::{
    validation, ActionType, Actor, ApplyKnowledgeInput, CaptureInsightInput, Category, Confidence,
    CuratorError, CuratorResult, KnowledgeAction, Source, ValidationError,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value as JsonValue};

pub const CAPTURE_INSIGHT_TOOL: &str = "capture_insight";
pub const APPLY_KNOWLEDGE_TOOL: &str = "apply_knowledge";

const CONFIRMATION_MESSAGE: &str = "Set confirm: true to apply these changes.";

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub payload: JsonValue,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(payload: JsonValue) -> Self {
        Self {
            payload,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            payload: json!({ "error": message.into() }),
            is_error: true,
        }
    }

    fn from_serializable<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(payload) => Self::success(payload),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize tool result");
                Self::error("internal error marshaling response")
            }
        }
    }

    /// Pretty JSON text for a text content block.
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(&self.payload).unwrap_or_else(|_| self.payload.to_string())
    }
}

fn parse_arguments<T: DeserializeOwned + Default>(arguments: JsonValue) -> Result<T, ToolOutput> {
    if arguments.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(arguments)
        .map_err(|e| ToolOutput::error(format!("invalid arguments: {e}")))
}

// ============================================================================
// DEFINITIONS
// ============================================================================

/// Name, description and input schema of one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: JsonValue,
}

fn valid_values(values: String) -> String {
    format!("Valid values: {values}")
}

fn change_item_schema(kind_field: &str) -> JsonValue {
    let mut properties = serde_json::Map::new();
    properties.insert(
        kind_field.to_string(),
        json!({
            "type": "string",
            "description": format!("Type of catalog change. {}", valid_values(ActionType::valid_values())),
        }),
    );
    properties.insert(
        "target".into(),
        json!({
            "type": "string",
            "description": "Where to apply the change. 'column:<fieldPath>' for a column description, the URL for add_documentation, empty for the dataset itself",
        }),
    );
    properties.insert(
        "detail".into(),
        json!({
            "type": "string",
            "description": "Description text, tag name or URN (e.g. 'pii' or 'urn:li:tag:pii'), glossary term name or URN, quality issue note, link description, or query name for add_curated_query",
        }),
    );
    properties.insert(
        "query_sql".into(),
        json!({"type": "string", "description": "SQL of the curated query (required for add_curated_query)"}),
    );
    properties.insert(
        "query_description".into(),
        json!({"type": "string", "description": "Optional description of the curated query"}),
    );
    json!({
        "type": "object",
        "required": [kind_field, "target", "detail"],
        "properties": properties,
    })
}

/// Enum-like fields list their values in descriptions instead of `enum`
/// constraints so invalid values reach server-side validation and get a
/// descriptive error.
pub fn capture_insight_definition() -> ToolDefinition {
    ToolDefinition {
        name: CAPTURE_INSIGHT_TOOL,
        description: "Records domain knowledge shared during a session for later admin review and \
            catalog integration. Use it for metadata corrections, business context, data quality \
            observations, usage tips, or relationships between datasets. Set source to \
            'agent_discovery' for insights you worked out yourself or 'enrichment_gap' to flag \
            metadata gaps; it defaults to 'user'.",
        input_schema: json!({
            "type": "object",
            "required": ["category", "insight_text"],
            "additionalProperties": false,
            "properties": {
                "category": {
                    "type": "string",
                    "description": format!("Type of insight. {}", valid_values(Category::valid_values())),
                },
                "insight_text": {
                    "type": "string",
                    "description": format!(
                        "The insight ({}-{} characters)",
                        validation::MIN_INSIGHT_TEXT_LEN,
                        validation::MAX_INSIGHT_TEXT_LEN
                    ),
                    "minLength": validation::MIN_INSIGHT_TEXT_LEN,
                    "maxLength": validation::MAX_INSIGHT_TEXT_LEN,
                },
                "confidence": {
                    "type": "string",
                    "description": format!("Defaults to 'medium'. {}", valid_values(Confidence::valid_values())),
                },
                "source": {
                    "type": "string",
                    "description": format!("Defaults to 'user'. {}", valid_values(Source::valid_values())),
                },
                "entity_urns": {
                    "type": "array",
                    "description": "Catalog entity URNs the insight is about",
                    "items": {"type": "string"},
                    "maxItems": validation::MAX_ENTITY_URNS,
                },
                "related_columns": {
                    "type": "array",
                    "description": "Columns related to the insight",
                    "items": {
                        "type": "object",
                        "required": ["urn", "column", "relevance"],
                        "properties": {
                            "urn": {"type": "string", "description": "Dataset URN"},
                            "column": {"type": "string", "description": "Column name"},
                            "relevance": {"type": "string", "description": "How the column relates to the insight"},
                        },
                    },
                    "maxItems": validation::MAX_RELATED_COLUMNS,
                },
                "suggested_actions": {
                    "type": "array",
                    "description": "Proposed catalog changes",
                    "items": change_item_schema("action_type"),
                    "maxItems": validation::MAX_SUGGESTED_ACTIONS,
                },
            },
        }),
    }
}

pub fn apply_knowledge_definition() -> ToolDefinition {
    ToolDefinition {
        name: APPLY_KNOWLEDGE_TOOL,
        description: "Reviews, synthesizes and applies captured insights to the data catalog. \
            Admin only. Actions: bulk_review, review, synthesize, apply, approve, reject. \
            For update_description use target 'column:<fieldPath>' for a column, empty for the \
            dataset. Tags and glossary terms accept a name or a full URN. flag_quality_issue adds \
            the fixed QualityIssue tag; its detail is kept only in the knowledge store. For \
            add_documentation the target is the URL and the detail the link label.",
        input_schema: json!({
            "type": "object",
            "required": ["action"],
            "additionalProperties": false,
            "properties": {
                "action": {
                    "type": "string",
                    "description": format!("The action to perform. {}", valid_values(KnowledgeAction::valid_values())),
                },
                "entity_urn": {
                    "type": "string",
                    "description": "Target entity URN (required for review, synthesize, apply)",
                },
                "insight_ids": {
                    "type": "array",
                    "description": "Insight ids (required for approve and reject; optional filter for synthesize; source insights for apply)",
                    "items": {"type": "string"},
                    "maxItems": validation::MAX_INSIGHT_IDS,
                },
                "changes": {
                    "type": "array",
                    "description": "Changes to apply (required for apply)",
                    "items": change_item_schema("change_type"),
                    "maxItems": validation::MAX_APPLY_CHANGES,
                },
                "confirm": {
                    "type": "boolean",
                    "description": "Set to true to confirm an apply when confirmation is required",
                },
                "review_notes": {
                    "type": "string",
                    "description": "Notes recorded with approve and reject",
                },
            },
        }),
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

impl KnowledgeEngine {
    /// Tools this engine offers. `apply_knowledge` only when apply is enabled.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut tools = vec![capture_insight_definition()];
        if self.config.apply_enabled {
            tools.push(apply_knowledge_definition());
        }
        tools
    }

    /// Dispatch a tool call by name. `None` for tools this engine does not offer.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonValue,
        actor: &Actor,
    ) -> Option<ToolOutput> {
        match name {
            CAPTURE_INSIGHT_TOOL => Some(self.call_capture_insight(arguments, actor).await),
            APPLY_KNOWLEDGE_TOOL if self.config.apply_enabled => {
                Some(self.call_apply_knowledge(arguments, actor).await)
            }
            _ => None,
        }
    }

    pub async fn call_capture_insight(&self, arguments: JsonValue, actor: &Actor) -> ToolOutput {
        let input: CaptureInsightInput = match parse_arguments(arguments) {
            Ok(input) => input,
            Err(output) => return output,
        };
        match self.capture(input, actor).await {
            Ok(receipt) => ToolOutput::from_serializable(&receipt),
            Err(CuratorError::Validation(e)) => ToolOutput::error(e.to_string()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to save insight");
                ToolOutput::error(format!("failed to save insight: {e}"))
            }
        }
    }

    pub async fn call_apply_knowledge(&self, arguments: JsonValue, actor: &Actor) -> ToolOutput {
        let input: ApplyKnowledgeInput = match parse_arguments(arguments) {
            Ok(input) => input,
            Err(output) => return output,
        };
        match self.apply_knowledge(input, actor).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, "apply_knowledge failed");
                ToolOutput::error(e.to_string())
            }
        }
    }

    /// Run one `apply_knowledge` action. The action is checked before any
    /// store access.
    pub async fn apply_knowledge(
        &self,
        input: ApplyKnowledgeInput,
        actor: &Actor,
    ) -> CuratorResult<ToolOutput> {
        if input.action.is_empty() {
            return Err(ValidationError::MissingAction.into());
        }
        let action = KnowledgeAction::from_db_str(&input.action)?;
        tracing::debug!(action = %action, entity_urn = %input.entity_urn, "apply_knowledge");

        let output = match action {
            KnowledgeAction::BulkReview => ToolOutput::from_serializable(&self.bulk_review().await?),
            KnowledgeAction::Review => {
                ToolOutput::from_serializable(&self.review(&input.entity_urn).await?)
            }
            KnowledgeAction::Synthesize => ToolOutput::from_serializable(
                &self.synthesize(&input.entity_urn, &input.insight_ids).await?,
            ),
            KnowledgeAction::Apply => {
                let request = ApplyRequest::from_input(
                    &input.entity_urn,
                    input.changes,
                    input.insight_ids,
                    input.confirm,
                )?;
                let outcome = self.apply(request, actor).await?;
                ToolOutput::success(apply_payload(outcome))
            }
            KnowledgeAction::Approve | KnowledgeAction::Reject => {
                let decision = if action == KnowledgeAction::Approve {
                    ReviewDecision::Approve
                } else {
                    ReviewDecision::Reject
                };
                let outcome = self
                    .review_batch(decision, &input.insight_ids, &input.review_notes, actor)
                    .await?;
                ToolOutput::from_serializable(&outcome)
            }
        };
        Ok(output)
    }
}

fn apply_payload(outcome: crate::ApplyOutcome) -> JsonValue {
    match outcome.result {
        ApplyResult::ConfirmationRequired {
            entity_urn,
            changes_count,
        } => json!({
            "confirmation_required": true,
            "entity_urn": entity_urn,
            "changes_count": changes_count,
            "message": CONFIRMATION_MESSAGE,
        }),
        ApplyResult::Applied(applied) => {
            let mut payload = json!({
                "changeset_id": applied.changeset_id,
                "entity_urn": applied.entity_urn,
                "changes_applied": applied.changes_applied,
                "insights_marked_applied": applied.insights_marked_applied,
                "message": format!(
                    "Changes applied to the catalog. Changeset {} recorded for rollback.",
                    applied.changeset_id
                ),
            });
            if !outcome.soft_errors.is_empty() {
                payload["warnings"] = json!(outcome.soft_errors.messages());
            }
            payload
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_output_shape() {
        let out = ToolOutput::error("insight_text is required (minimum 10 characters)");
        assert!(out.is_error);
        assert_eq!(
            out.payload,
            json!({"error": "insight_text is required (minimum 10 characters)"})
        );
    }

    #[test]
    fn test_schemas_have_no_enum_constraints() {
        for def in [capture_insight_definition(), apply_knowledge_definition()] {
            let text = def.input_schema.to_string();
            assert!(!text.contains("\"enum\""), "{} declares an enum", def.name);
        }
        let capture = capture_insight_definition().input_schema;
        let description = capture["properties"]["category"]["description"]
            .as_str()
            .unwrap();
        assert!(description.contains("business_context"));
    }

    #[test]
    fn test_change_items_use_their_kind_key() {
        let apply = apply_knowledge_definition().input_schema;
        assert_eq!(
            apply["properties"]["changes"]["items"]["required"][0],
            "change_type"
        );
        let capture = capture_insight_definition().input_schema;
        assert_eq!(
            capture["properties"]["suggested_actions"]["items"]["required"][0],
            "action_type"
        );
    }
}
