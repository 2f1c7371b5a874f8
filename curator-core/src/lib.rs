//! Curator Core - Data Model
//!
//! Pure data structures and rules with no I/O. All other crates depend on this.
//!
//! - identifiers and timestamps ([`identity`])
//! - closed enums with exact string forms ([`enums`])
//! - insight, changeset and catalog entities ([`entities`], [`diff`])
//! - the insight status state machine ([`lifecycle`])
//! - listing filters and pagination ([`filter`])
//! - raw tool inputs and their validators ([`input`], [`validation`])
//! - the error taxonomy ([`error`]) and engine configuration ([`config`])

pub mod config;
pub mod diff;
pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;
pub mod identity;
pub mod input;
pub mod lifecycle;
pub mod validation;

pub use config::KnowledgeConfig;
pub use diff::{MetadataSnapshot, RequestedChanges};
pub use entities::{
    column_target, ApplyChange, ChangeSummary, Changeset, EntityInsightSummary, EntityMetadata,
    Insight, InsightStats, InsightUpdate, ProposedChange, RelatedColumn, SuggestedAction,
    COLUMN_TARGET_PREFIX,
};
pub use enums::{
    ActionType, Category, Confidence, EnumParseError, InsightStatus, KnowledgeAction, Source,
};
pub use error::{
    ApplyError, CatalogError, ConfigError, CuratorError, CuratorResult, LifecycleError,
    StorageError, ValidationError,
};
pub use filter::{effective_limit, ChangesetFilter, InsightFilter};
pub use identity::{new_record_id, sortable_timestamp, Actor, RecordId, Timestamp};
pub use input::{
    ApplyChangeInput, ApplyKnowledgeInput, CaptureInsightInput, InsightEditInput,
    SuggestedActionInput,
};
pub use lifecycle::{
    allowed_transitions, can_transition, is_editable, is_terminal, predecessors, validate_transition,
};
pub use validation::ValidatedCapture;
