//! Input validation
//!
//! Every check here runs before any store or catalog access. The first
//! failing check wins, in field order.

use crate::{
    ActionType, Actor, ApplyChange, ApplyChangeInput, CaptureInsightInput, Category, Confidence,
    EnumParseError, Insight, InsightEditInput, InsightStatus, InsightUpdate, RecordId,
    RelatedColumn, Source, SuggestedAction, SuggestedActionInput, Timestamp, ValidationError,
};

// ============================================================================
// LIMITS
// ============================================================================

/// Minimum insight text length in bytes.
pub const MIN_INSIGHT_TEXT_LEN: usize = 10;
/// Maximum insight text length in bytes.
pub const MAX_INSIGHT_TEXT_LEN: usize = 4000;
pub const MAX_ENTITY_URNS: usize = 10;
pub const MAX_RELATED_COLUMNS: usize = 20;
pub const MAX_SUGGESTED_ACTIONS: usize = 5;
pub const MAX_APPLY_CHANGES: usize = 20;
pub const MAX_INSIGHT_IDS: usize = 50;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

// ============================================================================
// FIELD VALIDATORS
// ============================================================================

pub fn validate_insight_text(text: &str) -> Result<(), ValidationError> {
    let len = text.len();
    if len == 0 {
        Err(ValidationError::MissingInsightText)
    } else if len < MIN_INSIGHT_TEXT_LEN {
        Err(ValidationError::InsightTextTooShort { len })
    } else if len > MAX_INSIGHT_TEXT_LEN {
        Err(ValidationError::InsightTextTooLong { len })
    } else {
        Ok(())
    }
}

/// Category is required.
pub fn parse_category(raw: &str) -> Result<Category, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    Ok(Category::from_db_str(raw)?)
}

/// Empty confidence means `medium`.
pub fn parse_confidence(raw: &str) -> Result<Confidence, ValidationError> {
    if raw.is_empty() {
        return Ok(Confidence::default());
    }
    Ok(Confidence::from_db_str(raw)?)
}

/// Empty source means `user`.
pub fn parse_source(raw: &str) -> Result<Source, ValidationError> {
    if raw.is_empty() {
        return Ok(Source::default());
    }
    Ok(Source::from_db_str(raw)?)
}

fn check_max(field: &'static str, got: usize, max: usize) -> Result<(), ValidationError> {
    if got > max {
        Err(ValidationError::TooMany { field, max, got })
    } else {
        Ok(())
    }
}

fn item_error(field: &'static str, index: usize, reason: ValidationError) -> ValidationError {
    ValidationError::Item {
        field,
        index,
        reason: Box::new(reason),
    }
}

fn parse_action(field: &'static str, raw: &str) -> Result<ActionType, ValidationError> {
    ActionType::from_db_str(raw).map_err(|err| {
        ValidationError::InvalidEnum(EnumParseError { field, ..err })
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn validate_entity_urns(urns: &[String]) -> Result<(), ValidationError> {
    check_max("entity_urns", urns.len(), MAX_ENTITY_URNS)
}

pub fn validate_related_columns(columns: &[RelatedColumn]) -> Result<(), ValidationError> {
    check_max("related_columns", columns.len(), MAX_RELATED_COLUMNS)
}

pub fn validate_suggested_actions(
    actions: Vec<SuggestedActionInput>,
) -> Result<Vec<SuggestedAction>, ValidationError> {
    check_max("suggested_actions", actions.len(), MAX_SUGGESTED_ACTIONS)?;
    actions
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            let action_type = parse_action("action_type", &a.action_type)
                .map_err(|e| item_error("suggested_actions", i, e))?;
            let query_sql = non_empty(a.query_sql);
            if action_type.requires_query_sql() && query_sql.is_none() {
                return Err(item_error("suggested_actions", i, ValidationError::MissingQuerySql));
            }
            Ok(SuggestedAction {
                action_type,
                target: a.target,
                detail: a.detail,
                query_sql,
                query_description: non_empty(a.query_description),
            })
        })
        .collect()
}

/// Validate an apply batch: non-empty, at most [`MAX_APPLY_CHANGES`] items,
/// every `change_type` known, and `query_sql` present for curated queries.
pub fn validate_apply_changes(
    changes: Vec<ApplyChangeInput>,
) -> Result<Vec<ApplyChange>, ValidationError> {
    if changes.is_empty() {
        return Err(ValidationError::EmptyChanges);
    }
    check_max("changes", changes.len(), MAX_APPLY_CHANGES)?;
    changes
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let change_type = parse_action("change_type", &c.change_type)
                .map_err(|e| item_error("changes", i, e))?;
            let query_sql = non_empty(c.query_sql);
            if change_type.requires_query_sql() && query_sql.is_none() {
                return Err(item_error("changes", i, ValidationError::MissingQuerySql));
            }
            Ok(ApplyChange {
                change_type,
                target: c.target,
                detail: c.detail,
                query_sql,
                query_description: non_empty(c.query_description),
            })
        })
        .collect()
}

pub fn validate_insight_ids(ids: &[RecordId]) -> Result<(), ValidationError> {
    check_max("insight_ids", ids.len(), MAX_INSIGHT_IDS)
}

// ============================================================================
// CAPTURE
// ============================================================================

/// A capture request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCapture {
    pub category: Category,
    pub insight_text: String,
    pub confidence: Confidence,
    pub source: Source,
    pub entity_urns: Vec<String>,
    pub related_columns: Vec<RelatedColumn>,
    pub suggested_actions: Vec<SuggestedAction>,
}

impl ValidatedCapture {
    /// Build the stored record: status `pending`, no lifecycle fields.
    pub fn into_insight(self, id: RecordId, created_at: Timestamp, actor: &Actor) -> Insight {
        Insight {
            id,
            created_at,
            session_id: actor.session_id.clone(),
            captured_by: actor.user_id.clone(),
            persona: actor.persona.clone(),
            source: self.source,
            category: self.category,
            insight_text: self.insight_text,
            confidence: self.confidence,
            entity_urns: self.entity_urns,
            related_columns: self.related_columns,
            suggested_actions: self.suggested_actions,
            status: InsightStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            applied_by: None,
            applied_at: None,
            changeset_ref: None,
        }
    }
}

/// Validate `capture_insight` arguments in field order.
pub fn validate_capture(input: CaptureInsightInput) -> Result<ValidatedCapture, ValidationError> {
    let category = parse_category(&input.category)?;
    validate_insight_text(&input.insight_text)?;
    let confidence = parse_confidence(&input.confidence)?;
    let source = parse_source(&input.source)?;
    validate_entity_urns(&input.entity_urns)?;
    validate_related_columns(&input.related_columns)?;
    let suggested_actions = validate_suggested_actions(input.suggested_actions)?;

    Ok(ValidatedCapture {
        category,
        insight_text: input.insight_text,
        confidence,
        source,
        entity_urns: input.entity_urns,
        related_columns: input.related_columns,
        suggested_actions,
    })
}

/// Validate an edit. Empty fields are left unchanged; set text obeys the
/// same bounds as capture.
pub fn validate_insight_edit(input: InsightEditInput) -> Result<InsightUpdate, ValidationError> {
    let insight_text = if input.insight_text.is_empty() {
        None
    } else {
        validate_insight_text(&input.insight_text)?;
        Some(input.insight_text)
    };
    let category = if input.category.is_empty() {
        None
    } else {
        Some(Category::from_db_str(&input.category)?)
    };
    let confidence = if input.confidence.is_empty() {
        None
    } else {
        Some(Confidence::from_db_str(&input.confidence)?)
    };
    Ok(InsightUpdate {
        insight_text,
        category,
        confidence,
    })
}
