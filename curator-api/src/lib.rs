//! Curator API - MCP and admin HTTP layer
//!
//! Serves the knowledge engine's `capture_insight` and `apply_knowledge`
//! tools over MCP-style HTTP endpoints, plus an admin REST surface for
//! reviewing insights and rolling back changesets.

#[macro_use]
pub mod macros;

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{ApiConfig, CatalogConfig, StoreBackend};
pub use db::DbConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use extractors::ActorExtractor;
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
