//! Curator Storage - Insight and Changeset Stores
//!
//! Defines the persistence contracts used by the knowledge engine and three
//! families of implementations:
//!
//! - [`noop`]: no database; writes succeed, reads are empty or not-found
//! - [`memory`]: process-local maps behind async locks
//! - [`postgres`]: `knowledge_insights` / `knowledge_changesets` tables

pub mod memory;
pub mod noop;
pub mod postgres;
pub mod traits;

pub use memory::{InMemoryChangesetStore, InMemoryInsightStore};
pub use noop::{NoopChangesetStore, NoopInsightStore};
pub use postgres::{bootstrap, PgChangesetStore, PgInsightStore, BOOTSTRAP_SQL};
pub use traits::{ChangesetStore, InsightStore};
