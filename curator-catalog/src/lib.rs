//! Curator Catalog - External Metadata Catalog Access
//!
//! The knowledge engine never talks to a catalog directly. It goes through
//! [`CatalogWriter`] for metadata reads and edits and, when available,
//! [`QueryRegistrar`] for curated query registration.
//!
//! Implementations:
//! - [`NoopCatalogWriter`]: empty metadata, every write succeeds
//! - [`DataHubClient`]: DataHub GraphQL API, implements both traits

pub mod datahub;
pub mod noop;
pub mod urn;

pub use datahub::{DataHubClient, DataHubConfig};
pub use noop::NoopCatalogWriter;
pub use urn::{
    normalize_glossary_term_urn, normalize_tag_urn, GLOSSARY_TERM_URN_PREFIX,
    QUALITY_ISSUE_TAG_URN, TAG_URN_PREFIX,
};

use async_trait::async_trait;
use curator_core::{CatalogError, EntityMetadata};
use serde::{Deserialize, Serialize};

// ============================================================================
// CATALOG WRITER TRAIT
// ============================================================================

/// Read and edit metadata of catalog entities.
/// Implementations must be thread-safe (Send + Sync).
///
/// Tag and glossary-term arguments are fully qualified URNs; callers
/// normalize them with [`normalize_tag_urn`] / [`normalize_glossary_term_urn`].
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Current description, tags, glossary terms and owners of an entity.
    async fn get_current_metadata(&self, entity_urn: &str) -> Result<EntityMetadata, CatalogError>;

    /// Replace the entity-level description.
    async fn update_description(
        &self,
        entity_urn: &str,
        description: &str,
    ) -> Result<(), CatalogError>;

    /// Replace the description of one column (field path) of the entity.
    async fn update_column_description(
        &self,
        entity_urn: &str,
        column: &str,
        description: &str,
    ) -> Result<(), CatalogError>;

    async fn add_tag(&self, entity_urn: &str, tag_urn: &str) -> Result<(), CatalogError>;

    async fn remove_tag(&self, entity_urn: &str, tag_urn: &str) -> Result<(), CatalogError>;

    async fn add_glossary_term(&self, entity_urn: &str, term_urn: &str)
        -> Result<(), CatalogError>;

    /// Attach a documentation link with a human-readable label.
    async fn add_documentation_link(
        &self,
        entity_urn: &str,
        url: &str,
        description: &str,
    ) -> Result<(), CatalogError>;
}

// ============================================================================
// QUERY REGISTRAR TRAIT
// ============================================================================

/// A named SQL query to attach to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedQuery {
    pub name: String,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Registers curated queries with the query-execution side of the catalog.
#[async_trait]
pub trait QueryRegistrar: Send + Sync {
    /// Register `query` against `entity_urn`. Returns the new query's URN.
    async fn register_query(
        &self,
        entity_urn: &str,
        query: &CuratedQuery,
    ) -> Result<String, CatalogError>;
}
