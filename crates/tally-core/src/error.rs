//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  tally-server errors (in app)                                          │
//! │  └── ApiError         - What the browser sees (JSON body + status)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP 400               │
//! │        DbError → ApiError → HTTP 404 / 500                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations detected before anything touches the database.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale was submitted with no lines.
    #[error("Sale must contain at least one item")]
    EmptySale,

    /// A sale was submitted with more lines than the till accepts.
    #[error("Sale cannot have more than {max} items")]
    TooManySaleLines { max: usize },

    /// An item withdrawal must name the product taken off the shelf.
    #[error("Item withdrawal requires a product_id")]
    ItemWithdrawalWithoutProduct,

    /// A sale line or total does not fit in the money range.
    #[error("Sale total is too large")]
    AmountOverflow,

    /// A product update carried no fields.
    #[error("Update contains no fields")]
    EmptyUpdate,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value exceeds the largest accepted amount.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., a malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TooManySaleLines { max: 100 };
        assert_eq!(err.to_string(), "Sale cannot have more than 100 items");

        assert_eq!(CoreError::AmountOverflow.to_string(), "Sale total is too large");
        assert_eq!(
            CoreError::ItemWithdrawalWithoutProduct.to_string(),
            "Item withdrawal requires a product_id"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustNotBeNegative {
            field: "cost_price".to_string(),
        };
        assert_eq!(err.to_string(), "cost_price must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sql".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
