//! Database error types for lift-db.

use lift_core::errors::CoreError;
use lift_engine::GatewayError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data that could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., a reorder naming a missing entry).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An entry failed field validation before reaching SQL.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DatabaseError> for GatewayError {
    fn from(error: DatabaseError) -> Self {
        Self(anyhow::Error::new(error))
    }
}
