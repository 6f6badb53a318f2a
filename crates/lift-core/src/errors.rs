//! Cross-cutting error types for liftlog.
//!
//! This module defines errors that can originate from any crate in the system.
//! Domain-specific errors (e.g., `DatabaseError`, `SessionError`) are defined in
//! their respective crates and converge into `anyhow` at the CLI.

use thiserror::Error;

/// Errors that can be raised by any liftlog crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A draft row index does not exist in the session form.
    #[error("Draft row {index} out of range (form has {len} rows)")]
    DraftOutOfRange { index: usize, len: usize },

    /// Data failed validation (field constraints, date ranges).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
