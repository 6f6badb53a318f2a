//! # lift-core
//!
//! Core types and error types for liftlog.
//!
//! This crate provides the foundational types shared across all liftlog crates:
//! - Persisted workout entries and their id-less insert form
//! - Editor-local drafts and the per-day session form
//! - Derived groups ("supersets") and inclusive date ranges
//! - ID newtypes for entries, people, and exercises
//! - The user-facing error taxonomy and cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
