//! Knowledge engine handle

use curator_catalog::{CatalogWriter, NoopCatalogWriter, QueryRegistrar};
use curator_core::KnowledgeConfig;
use curator_storage::{ChangesetStore, InsightStore, NoopChangesetStore, NoopInsightStore};
use std::sync::Arc;

/// Orchestrates the insight lifecycle over its collaborators.
///
/// Cheap to clone; every collaborator is shared. Concurrent calls are not
/// serialized against each other: two applies on the same entity may
/// interleave their catalog writes and each record its own changeset.
#[derive(Clone)]
pub struct KnowledgeEngine {
    pub(crate) insights: Arc<dyn InsightStore>,
    pub(crate) changesets: Arc<dyn ChangesetStore>,
    pub(crate) catalog: Arc<dyn CatalogWriter>,
    pub(crate) registrar: Option<Arc<dyn QueryRegistrar>>,
    pub(crate) config: KnowledgeConfig,
}

impl KnowledgeEngine {
    pub fn new(
        insights: Arc<dyn InsightStore>,
        changesets: Arc<dyn ChangesetStore>,
        catalog: Arc<dyn CatalogWriter>,
    ) -> Self {
        Self {
            insights,
            changesets,
            catalog,
            registrar: None,
            config: KnowledgeConfig::default(),
        }
    }

    /// Engine with no database and no catalog. Captures are accepted and
    /// dropped, reads come back empty.
    pub fn noop() -> Self {
        Self::new(
            Arc::new(NoopInsightStore),
            Arc::new(NoopChangesetStore),
            Arc::new(NoopCatalogWriter),
        )
    }

    /// Enable `add_curated_query` by supplying a registrar.
    pub fn with_registrar(mut self, registrar: Arc<dyn QueryRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn with_config(mut self, config: KnowledgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> KnowledgeConfig {
        self.config
    }

    pub fn insights(&self) -> &Arc<dyn InsightStore> {
        &self.insights
    }

    pub fn changesets(&self) -> &Arc<dyn ChangesetStore> {
        &self.changesets
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogWriter> {
        &self.catalog
    }

    pub fn has_query_registrar(&self) -> bool {
        self.registrar.is_some()
    }
}

impl std::fmt::Debug for KnowledgeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeEngine")
            .field("config", &self.config)
            .field("query_registrar", &self.registrar.is_some())
            .finish_non_exhaustive()
    }
}
