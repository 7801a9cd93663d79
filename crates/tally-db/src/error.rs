//! # Database Errors
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! sqlx::Error ──► DbError ──► ApiError (server) ──► JSON response
//!
//! RowNotFound / missing id    → NotFound        → 404
//! CoreError mid-transaction   → Rejected        → 400
//! constraint / syntax error   → QueryFailed     → 500 (raw SQLite message)
//! pool timeout / closed       → Pool*/Connection → 500
//! ```

use tally_core::CoreError;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - A sale line or item withdrawal names a product that doesn't exist
    /// - Undoing a sale, withdrawal or arrival that was already removed
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A business rule failed once the database supplied the missing
    /// facts, e.g. a sale total that overflows at the current cost price.
    /// The transaction is rolled back.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Ad-hoc SQL deleting a product that still has history
    /// - Ad-hoc SQL inserting a line for a missing sale
    #[error("{message}")]
    ForeignKeyViolation { message: String },

    /// Statement rejected by SQLite. Carries the raw database message.
    #[error("{0}")]
    QueryFailed(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created (permissions, missing volume)
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True for [`DbError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → ForeignKeyViolation or QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports FK failures as "FOREIGN KEY constraint failed"
                if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Sale", 42);
        assert_eq!(err.to_string(), "Sale not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_core_error_is_rejected() {
        let err: DbError = CoreError::AmountOverflow.into();
        assert!(matches!(err, DbError::Rejected(CoreError::AmountOverflow)));
        assert_eq!(err.to_string(), "Sale total is too large");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));
    }
}
