//! Custom error types for the common library
//!
//! This module defines the data-layer error taxonomy shared by every
//! repository in the gallery services. Constraint violations are classified
//! here so callers never have to inspect raw driver messages.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A UNIQUE constraint rejected the write
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(#[source] SqlxError),

    /// A FOREIGN KEY constraint rejected the write
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify a query failure, separating constraint violations from
    /// everything else.
    pub fn from_query(err: SqlxError) -> Self {
        let (unique, foreign_key) = match &err {
            SqlxError::Database(db_err) => {
                (db_err.is_unique_violation(), db_err.is_foreign_key_violation())
            }
            _ => (false, false),
        };

        if unique {
            DatabaseError::UniqueViolation(err)
        } else if foreign_key {
            DatabaseError::ForeignKeyViolation(err)
        } else {
            DatabaseError::Query(err)
        }
    }

    /// True for either kind of constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::UniqueViolation(_) | DatabaseError::ForeignKeyViolation(_)
        )
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
