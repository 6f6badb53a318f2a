//! Entity structs for all liftlog domain objects.
//!
//! `WorkoutEntry` maps to the `workout_entries` table. Drafts, forms and groups
//! are client-side only. All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON roundtrip and schema validation.

mod draft;
mod entry;
mod group;
mod range;

pub use draft::{DaySessionForm, DraftDefaults, DraftUpdate, EntryDraft};
pub use entry::{DEFAULT_GROUP_NUMBER, NewWorkoutEntry, OrderUpdate, WorkoutEntry};
pub use group::Group;
pub use range::DateRange;

/// Treat empty or whitespace-only notes as absent.
pub(crate) fn normalize_notes(notes: Option<&str>) -> Option<&str> {
    notes.filter(|text| !text.trim().is_empty())
}
