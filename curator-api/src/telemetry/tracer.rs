//! Tracing subscriber initialization

use std::str::FromStr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str =
    "curator_api=debug,curator_knowledge=debug,tower_http=debug,info";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(ApiError::invalid_input(format!(
                "Invalid CURATOR_LOG_FORMAT value: {} (expected json or pretty)",
                other
            ))),
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup record
    pub service_name: String,
    pub service_version: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "curator-api".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            format: LogFormat::default(),
        }
    }
}

impl TelemetryConfig {
    /// Environment variables:
    /// - `CURATOR_SERVICE_NAME` (default: curator-api)
    /// - `CURATOR_LOG_FORMAT`: `json` or `pretty` (default: json)
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();
        let format = match std::env::var("CURATOR_LOG_FORMAT") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => defaults.format,
        };
        Ok(Self {
            service_name: std::env::var("CURATOR_SERVICE_NAME")
                .unwrap_or(defaults.service_name),
            service_version: defaults.service_version,
            format,
        })
    }
}

/// Install the global tracing subscriber.
///
/// Must be called once at startup, before anything logs. A second call
/// fails because a global subscriber is already set.
pub fn init_tracer(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init(),
    };
    result.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = config.service_name,
        service_version = config.service_version,
        format = ?config.format,
        "Telemetry initialized"
    );

    Ok(())
}
