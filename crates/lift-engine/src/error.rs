//! Error types for the session engine.
//!
//! Every error maps onto an [`ErrorKind`] so the controller can surface a
//! category on the published projection without the UI matching variants.

use std::fmt;

use lift_core::enums::ErrorKind;
use lift_core::errors::CoreError;
use lift_core::ids::{EntryId, ExerciseId};
use thiserror::Error;

/// A persistence call failed.
///
/// Gateways wrap whatever their backend raises; the engine only needs to know
/// that the call did not succeed.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct GatewayError(#[from] pub anyhow::Error);

impl GatewayError {
    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self(anyhow::Error::msg(message))
    }
}

/// A session form cannot be turned into a save plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A row was filled in but no exercise was picked.
    #[error("Draft row {index} has no exercise selected")]
    MissingExercise { index: usize },

    /// A numeric field is out of range.
    #[error("Draft row {index}: {reason}")]
    InvalidField { index: usize, reason: String },

    /// Two rows pick the same exercise for the same day.
    #[error("Exercise {exercise_id} appears in draft rows {first} and {second}")]
    DuplicateExercise {
        exercise_id: ExerciseId,
        first: usize,
        second: usize,
    },
}

/// Reconciliation refused to produce a plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The plan would delete every persisted entry without inserting any.
    #[error("Saving would delete all {deletes} entries for the day; confirm to clear it")]
    ConfirmationRequired { deletes: usize },
}

impl ReconcileError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::ConfirmationRequired { .. } => ErrorKind::ConfirmationRequired,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    #[error("Entry {0} is not on this day")]
    EntryNotFound(EntryId),

    #[error("Group numbers start at 1")]
    InvalidGroup,
}

/// The first gateway call that failed while executing a save plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedOperation {
    Delete(EntryId),
    Insert(ExerciseId),
    Reorder { updates: usize },
}

impl fmt::Display for FailedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete(id) => write!(f, "delete of entry {id}"),
            Self::Insert(exercise_id) => write!(f, "insert of exercise {exercise_id}"),
            Self::Reorder { updates } => write!(f, "reorder of {updates} entries"),
        }
    }
}

/// Errors returned by [`crate::SessionController`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No person selected")]
    NoPersonSelected,

    #[error("No day is open")]
    NoDayOpen,

    #[error(transparent)]
    Draft(#[from] CoreError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Reorder(#[from] ReorderError),

    #[error("Entry {0} is not on the open day")]
    EntryNotFound(EntryId),

    #[error("Failed to load entries: {0}")]
    Fetch(#[source] GatewayError),

    /// An optimistic change was undone because persisting it failed.
    #[error("{operation} failed and was rolled back: {source}")]
    RolledBack {
        operation: &'static str,
        #[source]
        source: GatewayError,
    },

    /// A multi-call change stopped after some calls went through. The day
    /// was reloaded instead of undone.
    #[error("{operation} stopped after {completed} completed calls: {source}")]
    Interrupted {
        operation: &'static str,
        completed: usize,
        resynced: bool,
        #[source]
        source: GatewayError,
    },

    /// A save stopped at its first failed call. Earlier calls were not undone.
    #[error("Save stopped at {failed} after {completed} completed operations: {source}")]
    SaveFailed {
        failed: FailedOperation,
        completed: usize,
        resynced: bool,
        #[source]
        source: GatewayError,
    },
}

impl SessionError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Reconcile(err) => err.kind(),
            Self::Fetch(_)
            | Self::RolledBack { .. }
            | Self::Interrupted { .. }
            | Self::SaveFailed { .. } => ErrorKind::Transport,
            Self::NoPersonSelected
            | Self::NoDayOpen
            | Self::Draft(_)
            | Self::Reorder(_)
            | Self::EntryNotFound(_) => ErrorKind::Validation,
        }
    }
}
