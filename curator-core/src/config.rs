//! Engine configuration

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Knobs of the knowledge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct KnowledgeConfig {
    /// Whether the `apply_knowledge` tool is offered at all
    pub apply_enabled: bool,
    /// Whether `apply` returns a preview until the caller sets `confirm`
    pub require_confirmation: bool,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            apply_enabled: true,
            require_confirmation: true,
        }
    }
}

impl KnowledgeConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `CURATOR_APPLY_ENABLED`: offer the apply tool (default: true)
    /// - `CURATOR_REQUIRE_CONFIRMATION`: preview before applying (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            apply_enabled: bool_from_env("CURATOR_APPLY_ENABLED", defaults.apply_enabled)?,
            require_confirmation: bool_from_env(
                "CURATOR_REQUIRE_CONFIRMATION",
                defaults.require_confirmation,
            )?,
        })
    }
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no`, `on/off`
/// in any case. Unset or blank yields `default`.
pub fn parse_bool_flag(field: &str, raw: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean (true/false)".to_string(),
        }),
    }
}

/// Read a boolean flag from the environment.
pub fn bool_from_env(name: &str, default: bool) -> Result<bool, ConfigError> {
    let raw = std::env::var(name).ok();
    parse_bool_flag(name, raw.as_deref(), default)
}
