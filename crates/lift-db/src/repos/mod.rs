//! Repository modules implementing queries for liftlog entities.
//!
//! Each module adds methods to `LiftService` via `impl LiftService` blocks.

pub mod workout_entry;
