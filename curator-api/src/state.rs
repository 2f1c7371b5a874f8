//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use curator_catalog::{CatalogWriter, DataHubClient, NoopCatalogWriter};
use curator_core::{CuratorError, KnowledgeConfig};
use curator_knowledge::KnowledgeEngine;
use curator_storage::{
    bootstrap, InMemoryChangesetStore, InMemoryInsightStore, NoopChangesetStore,
    NoopInsightStore, PgChangesetStore, PgInsightStore,
};
use deadpool_postgres::Pool;

use crate::config::{CatalogConfig, StoreBackend};
use crate::db::DbConfig;
use crate::error::ApiResult;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub engine: KnowledgeEngine,
    /// Present only on the postgres backend; readiness checks it.
    pub db: Option<Pool>,
    pub start_time: Instant,
}

crate::impl_from_ref!(KnowledgeEngine, engine);
crate::impl_from_ref!(Option<Pool>, db);
crate::impl_from_ref!(Instant, start_time);

impl AppState {
    /// State around an already assembled engine, with no database.
    pub fn new(engine: KnowledgeEngine) -> Self {
        Self {
            engine,
            db: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_db(mut self, pool: Pool) -> Self {
        self.db = Some(pool);
        self
    }

    /// Assemble the engine from configuration.
    ///
    /// On the postgres backend the schema is bootstrapped before the stores
    /// are handed out. Without a DataHub URL the catalog is the no-op writer
    /// and no query registrar is attached.
    pub async fn from_config(
        backend: StoreBackend,
        db_config: &DbConfig,
        catalog_config: &CatalogConfig,
        knowledge_config: KnowledgeConfig,
    ) -> ApiResult<Self> {
        let catalog: Option<Arc<DataHubClient>> = match &catalog_config.datahub {
            Some(datahub) => Some(Arc::new(
                DataHubClient::new(datahub).map_err(CuratorError::from)?,
            )),
            None => {
                tracing::warn!("CURATOR_DATAHUB_URL not set; catalog writes are discarded");
                None
            }
        };
        let writer: Arc<dyn CatalogWriter> = match &catalog {
            Some(client) => client.clone(),
            None => Arc::new(NoopCatalogWriter),
        };

        let (engine, db) = match backend {
            StoreBackend::Postgres => {
                let pool = db_config.create_pool()?;
                bootstrap(&pool).await?;
                let engine = KnowledgeEngine::new(
                    Arc::new(PgInsightStore::new(pool.clone())),
                    Arc::new(PgChangesetStore::new(pool.clone())),
                    writer,
                );
                (engine, Some(pool))
            }
            StoreBackend::Memory => (
                KnowledgeEngine::new(
                    Arc::new(InMemoryInsightStore::new()),
                    Arc::new(InMemoryChangesetStore::new()),
                    writer,
                ),
                None,
            ),
            StoreBackend::Noop => (
                KnowledgeEngine::new(
                    Arc::new(NoopInsightStore),
                    Arc::new(NoopChangesetStore),
                    writer,
                ),
                None,
            ),
        };

        let engine = match catalog {
            Some(client) => engine.with_registrar(client),
            None => engine,
        }
        .with_config(knowledge_config);

        tracing::info!(
            store = ?backend,
            catalog = catalog_config.datahub.is_some(),
            apply_enabled = knowledge_config.apply_enabled,
            require_confirmation = knowledge_config.require_confirmation,
            "Knowledge engine ready"
        );

        Ok(Self {
            engine,
            db,
            start_time: Instant::now(),
        })
    }
}
