//! Error Types for the Curator API
//!
//! This module defines error handling for the HTTP layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//! - conversions from the engine's `CuratorError` taxonomy
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! MCP tool calls never reach this type: the engine renders their failures
//! into the tool payload instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use curator_core::{CuratorError, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Field format is incorrect
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested insight does not exist
    InsightNotFound,

    /// Requested changeset does not exist
    ChangesetNotFound,

    /// Requested tool, prompt or other named entity does not exist
    EntityNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Record with the same identifier already exists
    EntityAlreadyExists,

    /// Operation conflicts with the record's current state
    StateConflict,

    // ========================================================================
    // Upstream Errors (502)
    // ========================================================================
    /// The metadata catalog rejected or failed a request
    CatalogError,

    // ========================================================================
    // Server Errors (500, 503, 504)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// Database connection pool exhausted
    ConnectionPoolExhausted,

    /// Operation timed out
    Timeout,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed | ErrorCode::InvalidInput | ErrorCode::InvalidFormat => {
                StatusCode::BAD_REQUEST
            }

            ErrorCode::InsightNotFound
            | ErrorCode::ChangesetNotFound
            | ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::EntityAlreadyExists | ErrorCode::StateConflict => StatusCode::CONFLICT,

            ErrorCode::CatalogError => StatusCode::BAD_GATEWAY,

            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::InsightNotFound => "Insight not found",
            ErrorCode::ChangesetNotFound => "Changeset not found",
            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::EntityAlreadyExists => "Entity already exists",
            ErrorCode::StateConflict => "Operation conflicts with current state",
            ErrorCode::CatalogError => "Catalog request failed",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::ConnectionPoolExhausted => "Connection pool exhausted",
            ErrorCode::Timeout => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    /// Create a generic not found error with custom message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityNotFound, message)
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Create a ConnectionPoolExhausted error.
    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Map the engine's error taxonomy onto HTTP semantics.
///
/// Validation is 400, missing records 404, lifecycle and guard violations
/// 409, catalog and apply failures 502. Storage backend details are logged
/// and replaced by a generic message.
impl From<CuratorError> for ApiError {
    fn from(err: CuratorError) -> Self {
        match err {
            CuratorError::Validation(e) => ApiError::validation_failed(e.to_string()),
            CuratorError::Storage(e) => match e {
                StorageError::InsightNotFound { .. } => {
                    ApiError::new(ErrorCode::InsightNotFound, e.to_string())
                }
                StorageError::ChangesetNotFound { .. } => {
                    ApiError::new(ErrorCode::ChangesetNotFound, e.to_string())
                }
                StorageError::InsightNotEditable { .. }
                | StorageError::ChangesetNotRollbackable { .. } => {
                    ApiError::state_conflict(e.to_string())
                }
                StorageError::AlreadyExists { .. } => {
                    ApiError::new(ErrorCode::EntityAlreadyExists, e.to_string())
                }
                StorageError::NoFieldsToUpdate => ApiError::validation_failed(e.to_string()),
                StorageError::CorruptRecord { .. } | StorageError::Backend { .. } => {
                    tracing::error!(error = %e, "Storage error");
                    ApiError::from_code(ErrorCode::DatabaseError)
                }
            },
            CuratorError::Lifecycle(e) => ApiError::state_conflict(e.to_string()),
            CuratorError::Catalog(e) => ApiError::new(ErrorCode::CatalogError, e.to_string()),
            CuratorError::Apply(e) => ApiError::new(ErrorCode::CatalogError, e.to_string()),
            CuratorError::Config(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Convert from tokio_postgres::Error to ApiError.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        // Log the full error; the response stays generic.
        tracing::error!("Database error: {:?}", err);
        ApiError::database_error("Database operation failed")
    }
}

/// Convert from deadpool_postgres::PoolError to ApiError.
impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("Connection pool error: {:?}", err);

        match err {
            deadpool_postgres::PoolError::Timeout(_) => ApiError::connection_pool_exhausted(),
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Database connection pool is closed")
            }
            _ => ApiError::database_error("Failed to acquire database connection"),
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use curator_core::{
        ApplyError, CatalogError, InsightStatus, LifecycleError, ValidationError,
    };

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InsightNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::StateConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::CatalogError.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::ServiceUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ErrorCode::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_curator_errors_map_to_statuses() {
        let cases: Vec<(CuratorError, StatusCode)> = vec![
            (ValidationError::EmptyChanges.into(), StatusCode::BAD_REQUEST),
            (
                StorageError::InsightNotFound { id: "i1".into() }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                StorageError::ChangesetNotFound { id: "c1".into() }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                StorageError::ChangesetNotRollbackable { id: "c1".into() }.into(),
                StatusCode::CONFLICT,
            ),
            (
                LifecycleError::InvalidTransition {
                    from: InsightStatus::Rejected,
                    to: InsightStatus::Approved,
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                LifecycleError::AppliedNotEditable { id: "i1".into() }.into(),
                StatusCode::CONFLICT,
            ),
            (
                CatalogError::NotConfigured { what: "catalog" }.into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApplyError::Snapshot(CatalogError::NotConfigured { what: "catalog" }).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                StorageError::Backend { reason: "boom".into() }.into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let api: ApiError = err.clone().into();
            assert_eq!(api.status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_lifecycle_message_is_kept() {
        let api: ApiError = CuratorError::from(LifecycleError::AppliedNotEditable {
            id: "i1".into(),
        })
        .into();
        assert_eq!(api.message, "cannot edit an applied insight");
    }

    #[test]
    fn test_backend_details_are_hidden() {
        let api: ApiError = CuratorError::from(StorageError::Backend {
            reason: "password authentication failed".into(),
        })
        .into();
        assert_eq!(api.code, ErrorCode::DatabaseError);
        assert!(!api.message.contains("password"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::state_conflict("cannot edit an applied insight");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("STATE_CONFLICT"));
        assert!(json.contains("cannot edit an applied insight"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
