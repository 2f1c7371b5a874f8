//! Failures that are reported but do not fail the operation.
//!
//! Once catalog writes and the changeset are durable, per-insight
//! bookkeeping is best effort. Its failures are collected here and handed
//! back next to the primary result instead of disappearing into the log.

use curator_core::RecordId;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftErrorStage {
    /// Marking a source insight applied after an apply
    MarkApplied,
    /// Moving a source insight to rolled_back after a changeset rollback
    RollbackInsight,
}

impl fmt::Display for SoftErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SoftErrorStage::MarkApplied => "mark_applied",
            SoftErrorStage::RollbackInsight => "rollback_insight",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftError {
    pub insight_id: RecordId,
    pub stage: SoftErrorStage,
    pub message: String,
}

impl fmt::Display for SoftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed for insight {}: {}", self.stage, self.insight_id, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SoftErrors(Vec<SoftError>);

impl SoftErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, insight_id: &str, stage: SoftErrorStage, message: impl Into<String>) {
        self.0.push(SoftError {
            insight_id: insight_id.to_string(),
            stage,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SoftError> {
        self.0.iter()
    }

    /// One line per error, for `warnings` payloads.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_insight_and_stage() {
        let mut errors = SoftErrors::new();
        assert!(errors.is_empty());
        errors.push("ins1", SoftErrorStage::MarkApplied, "storage backend error: timeout");
        assert_eq!(
            errors.messages(),
            vec!["mark_applied failed for insight ins1: storage backend error: timeout"]
        );
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json[0]["stage"], "mark_applied");
        assert_eq!(json[0]["insight_id"], "ins1");
    }
}
