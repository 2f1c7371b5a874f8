//! HTTP Routes Module
//!
//! Includes:
//! - MCP (Model Context Protocol) tool and prompt endpoints under /mcp
//! - Admin REST surface under /api/v1/admin/knowledge
//! - Health check endpoints
//! - OpenAPI spec and Swagger UI
//! - CORS support for browser-based admin clients

pub mod admin;
pub mod health;
pub mod mcp;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
#[cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::extractors::{PERSONA_HEADER, SESSION_ID_HEADER, USER_ID_HEADER};
#[cfg(feature = "openapi")]
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub use admin::create_router as admin_router;
pub use health::create_router as health_router;
pub use mcp::create_router as mcp_router;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint. Swagger UI serves the same path
/// itself when that feature is on.
#[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(SESSION_ID_HEADER),
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(PERSONA_HEADER),
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete router:
/// - MCP server at /mcp/*
/// - Admin REST at /api/v1/admin/knowledge/*
/// - Health checks at /health and /health/ready
/// - OpenAPI spec at /openapi.json (when the openapi feature is enabled)
/// - Swagger UI at /swagger-ui (when the swagger-ui feature is enabled)
///
/// Layer order (outer to inner): CORS, trace, timeout.
pub fn create_api_router(state: AppState, api_config: &ApiConfig) -> Router {
    let mut router: Router<AppState> = Router::new()
        .merge(mcp::create_router())
        .nest(admin::ADMIN_PREFIX, admin::create_router())
        .merge(health::create_router());

    #[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
    {
        router = router.route("/openapi.json", axum::routing::get(openapi_json));
    }

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(TimeoutLayer::new(api_config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config))
        .with_state(state)
}
