//! Curator Knowledge - Insight Lifecycle Engine
//!
//! Turns captured insights into catalog edits:
//!
//! ```text
//! capture ──► pending ──approve──► approved ──synthesize──► proposal
//!                                                             │
//!                        changeset ◄── audit ◄── writes ◄── apply
//!                            │
//!                            └──► mark_applied (best effort)
//! ```
//!
//! [`KnowledgeEngine`] owns no state of its own. Every operation is a
//! request/response over the insight store, the changeset store and the
//! catalog writer it was built with.

pub mod apply;
pub mod approval;
pub mod capture;
pub mod engine;
pub mod prompt;
pub mod review;
pub mod rollback;
pub mod soft_errors;
pub mod tools;

pub use apply::{AppliedChangeset, ApplyOutcome, ApplyRequest, ApplyResult};
pub use approval::{BatchReviewOutcome, ReviewDecision};
pub use capture::CaptureReceipt;
pub use engine::KnowledgeEngine;
pub use prompt::{
    KNOWLEDGE_CAPTURE_GUIDANCE, KNOWLEDGE_CAPTURE_PROMPT, KNOWLEDGE_CAPTURE_PROMPT_DESCRIPTION,
};
pub use review::{build_entity_summaries, build_proposed_changes, BulkReview, EntityReview, Synthesis};
pub use rollback::RollbackOutcome;
pub use soft_errors::{SoftError, SoftErrorStage, SoftErrors};
pub use tools::{ToolDefinition, ToolOutput, APPLY_KNOWLEDGE_TOOL, CAPTURE_INSIGHT_TOOL};
