//! # lift-engine
//!
//! The workout-session engine for liftlog.
//!
//! - [`grouping`] partitions a day's entries into ordered groups and tracks
//!   client-only empty-group placeholders.
//! - [`reorder`] computes new order indices and group assignments for a drop.
//! - [`reconcile`] diffs an edited session form against persisted entries.
//! - [`command`] models an optimistic change together with its inverse.
//! - [`controller`] applies commands immediately, persists them through a
//!   [`gateway::PersistenceGateway`], and rolls back on failure.

pub mod command;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod grouping;
pub mod reconcile;
pub mod reorder;

#[cfg(test)]
mod test_support;

pub use controller::{Projection, SaveReport, SessionController, SessionOptions};
pub use error::{GatewayError, ReconcileError, ReorderError, SessionError, ValidationError};
pub use gateway::PersistenceGateway;
