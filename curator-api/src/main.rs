//! Curator API Server Entry Point
//!
//! Reads configuration from the environment, assembles the knowledge
//! engine and serves the Axum router until ctrl-c.

use curator_api::telemetry::{init_tracer, TelemetryConfig};
use curator_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, CatalogConfig, DbConfig,
    StoreBackend,
};
use curator_core::{CuratorError, KnowledgeConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracer(&TelemetryConfig::from_env()?)?;

    let api_config = ApiConfig::from_env()?;
    let backend = StoreBackend::from_env()?;
    let db_config = DbConfig::from_env();
    let catalog_config = CatalogConfig::from_env();
    let knowledge_config = KnowledgeConfig::from_env().map_err(CuratorError::from)?;

    let state =
        AppState::from_config(backend, &db_config, &catalog_config, knowledge_config).await?;
    let app = create_api_router(state, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting Curator API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
