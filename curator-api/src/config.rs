//! API Configuration Module
//!
//! Server, store backend and catalog settings. Configuration is loaded from
//! environment variables with sensible defaults for development.

use crate::error::{ApiError, ApiResult};
use curator_catalog::DataHubConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    /// Example: "https://catalog.example.com,https://admin.example.com"
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Per-request timeout. Apply batches talk to the catalog once per
    /// change, so this bounds the whole batch.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: 86400,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `CURATOR_API_BIND`: interface to bind (default: 0.0.0.0)
    /// - `PORT` or `CURATOR_API_PORT`: listen port (default: 3000)
    /// - `CURATOR_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `CURATOR_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `CURATOR_REQUEST_TIMEOUT_SECS`: per-request timeout (default: 30)
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();

        let bind_host = std::env::var("CURATOR_API_BIND").unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("CURATOR_API_PORT").ok())
        {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => defaults.port,
        };

        let cors_origins = std::env::var("CURATOR_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("CURATOR_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let request_timeout = std::env::var("CURATOR_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_max_age_secs,
            request_timeout,
        })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }
}

// ============================================================================
// STORE BACKEND
// ============================================================================

/// Which insight/changeset store the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    Postgres,
    /// Process-local, lost on restart
    #[default]
    Memory,
    /// Accepts writes and forgets them
    Noop,
}

impl FromStr for StoreBackend {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" | "" => Ok(StoreBackend::Memory),
            "noop" => Ok(StoreBackend::Noop),
            other => Err(ApiError::invalid_input(format!(
                "Invalid CURATOR_STORE value: {} (expected postgres, memory or noop)",
                other
            ))),
        }
    }
}

impl StoreBackend {
    /// Read `CURATOR_STORE` (default: memory).
    pub fn from_env() -> ApiResult<Self> {
        std::env::var("CURATOR_STORE")
            .map(|s| s.parse())
            .unwrap_or(Ok(StoreBackend::Memory))
    }
}

// ============================================================================
// CATALOG CONFIGURATION
// ============================================================================

/// DataHub connection settings. No URL means no catalog: writes go to the
/// no-op writer and curated queries are unavailable.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub datahub: Option<DataHubConfig>,
}

impl CatalogConfig {
    /// Environment variables:
    /// - `CURATOR_DATAHUB_URL`: DataHub base URL (GMS or frontend)
    /// - `CURATOR_DATAHUB_TOKEN`: personal access token
    /// - `CURATOR_DATAHUB_TIMEOUT_SECS`: HTTP timeout (default: 30)
    pub fn from_env() -> Self {
        let Some(url) = std::env::var("CURATOR_DATAHUB_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
        else {
            return Self::default();
        };

        let mut config = DataHubConfig::new(url.trim());
        if let Some(token) = std::env::var("CURATOR_DATAHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
        {
            config = config.with_token(token);
        }
        if let Some(secs) = std::env::var("CURATOR_DATAHUB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Self {
            datahub: Some(config),
        }
    }
}
