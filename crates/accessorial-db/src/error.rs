//! # Database Error Types
//!
//! Error types for database operations and for line-item resolution.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       ├── while writing a dimension / address record                   │
//! │       │        └──► ResolveError::DependentWrite { record, source }     │
//! │       └── anywhere else ──► ResolveError::Db                            │
//! │                                                                         │
//! │  CoreError (missing data, bad dimension, ...) ──► ResolveError::Core    │
//! │                                                                         │
//! │  Any ResolveError drops the unit of work: nothing is committed.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use accessorial_core::CoreError;
use std::fmt;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and caller feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - Line item id doesn't exist
    /// - An update touched zero rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two line items pointing at the same dimension or address record
    /// - Duplicate primary key
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Line item referencing a dimension or address row that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed (constraint checks, SQL errors).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not be started, committed or rolled back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
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

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
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

// =============================================================================
// Resolution Errors
// =============================================================================

/// The dependent record a failed write was meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentRecord {
    ItemDimensions,
    CrateDimensions,
    Address,
}

impl fmt::Display for DependentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependentRecord::ItemDimensions => f.write_str("item dimensions"),
            DependentRecord::CrateDimensions => f.write_str("crate dimensions"),
            DependentRecord::Address => f.write_str("address"),
        }
    }
}

/// Errors from resolving and persisting a line item.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Pricing rule or validation failure; nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Writing a dimension or address record failed.
    #[error("Failed to save {record}: {source}")]
    DependentWrite {
        record: DependentRecord,
        #[source]
        source: DbError,
    },

    /// Any other database failure (line item write, commit, lookup).
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependent_write_names_record() {
        let err = ResolveError::DependentWrite {
            record: DependentRecord::CrateDimensions,
            source: DbError::QueryFailed("CHECK constraint failed: width > 0".into()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to save crate dimensions: Query failed: CHECK constraint failed: width > 0"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: ResolveError = CoreError::missing("4A", &["Quantity1"]).into();
        assert_eq!(err.to_string(), "Quantity1 required for item code 4A");
    }
}
