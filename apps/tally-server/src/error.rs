//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally POS                              │
//! │                                                                         │
//! │  Browser                     Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  POST /api/sales                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  ApiResult<Json<T>>                                              │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation Error? ─── CoreError::EmptySale ───────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Database Error? ─── DbError::NotFound { .. } ─── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  HTTP 404                                                               │
//! │  { "error": "Product not found: 42", "code": "NOT_FOUND" }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Database failures keep the raw SQLite message in `error`: the ad-hoc SQL
//! console shows it to the operator as-is.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use tally_db::DbError;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error returned from handlers.
///
/// ## Serialization
/// This is what the browser receives when a request fails:
/// ```json
/// {
///   "error": "quantity must be positive",
///   "code": "VALIDATION_ERROR"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: ErrorCode,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = ?self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorBody {
            error: &self.message,
            code: self.code,
        };
        (status, Json(body)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::Rejected(e) => e.into(),
            DbError::ForeignKeyViolation { message } | DbError::QueryFailed(message) => {
                ApiError::new(ErrorCode::DatabaseError, message)
            }
            DbError::ConnectionFailed(_) | DbError::MigrationFailed(_) | DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, err.to_string())
            }
            DbError::Internal(_) => ApiError::new(ErrorCode::Internal, err.to_string()),
        }
    }
}

/// Converts core errors to API errors. Every business rule violation is the
/// caller's fault.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = DbError::not_found("Sale", 9).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Sale not found: 9");
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_query_failure_keeps_raw_message() {
        let err: ApiError = DbError::QueryFailed("no such table: nope".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "no such table: nope");
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_core_errors_are_validation_errors() {
        let err: ApiError = CoreError::EmptySale.into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err: ApiError = CoreError::Validation(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        })
        .into();
        assert_eq!(err.message, "quantity must be positive");
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rejected_transaction_is_a_validation_error() {
        let err: ApiError = DbError::Rejected(CoreError::AmountOverflow).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Sale total is too large");
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_db_error_is_internal() {
        let err: ApiError = DbError::Internal("decode failed".to_string()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_value(ErrorCode::ValidationError).unwrap();
        assert_eq!(json, "VALIDATION_ERROR");
    }
}
