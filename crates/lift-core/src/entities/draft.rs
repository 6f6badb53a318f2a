use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entry::{DEFAULT_GROUP_NUMBER, WorkoutEntry, validate_amounts};
use super::normalize_notes;
use crate::errors::CoreError;
use crate::ids::ExerciseId;

const fn default_amount() -> u32 {
    1
}

const fn default_group_number() -> u32 {
    DEFAULT_GROUP_NUMBER
}

/// Values a freshly added draft row starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftDefaults {
    pub sets: u32,
    pub reps: u32,
}

impl Default for DraftDefaults {
    fn default() -> Self {
        Self { sets: 1, reps: 1 }
    }
}

/// An in-progress edit of one exercise within an open session form.
///
/// Drafts have no stable identity; the reconciliation engine matches them to
/// persisted entries by exercise.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EntryDraft {
    /// Selected exercise; `None` or `0` while nothing is selected.
    #[serde(default)]
    pub exercise_id: Option<ExerciseId>,
    #[serde(default = "default_amount")]
    pub sets: u32,
    #[serde(default = "default_amount")]
    pub reps: u32,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_group_number")]
    pub group_number: u32,
}

impl EntryDraft {
    #[must_use]
    pub const fn blank(defaults: DraftDefaults) -> Self {
        Self {
            exercise_id: None,
            sets: defaults.sets,
            reps: defaults.reps,
            weight: None,
            notes: None,
            group_number: DEFAULT_GROUP_NUMBER,
        }
    }

    #[must_use]
    pub fn from_entry(entry: &WorkoutEntry) -> Self {
        Self {
            exercise_id: Some(entry.exercise_id),
            sets: entry.sets,
            reps: entry.reps,
            weight: entry.weight,
            notes: entry.notes.clone(),
            group_number: entry.group_number,
        }
    }

    /// The exercise this draft refers to, if one is actually selected.
    #[must_use]
    pub fn selected_exercise(&self) -> Option<ExerciseId> {
        self.exercise_id.filter(|id| id.is_set())
    }

    /// An untouched row: no exercise and every other field at its default.
    #[must_use]
    pub fn is_blank(&self, defaults: DraftDefaults) -> bool {
        self.selected_exercise().is_none()
            && self.sets == defaults.sets
            && self.reps == defaults.reps
            && self.weight.is_none_or(|w| w == 0.0)
            && self.normalized_notes().is_none()
            && self.group_number == DEFAULT_GROUP_NUMBER
    }

    #[must_use]
    pub fn normalized_notes(&self) -> Option<&str> {
        normalize_notes(self.notes.as_deref())
    }

    /// Whether the persisted entry already holds exactly this draft's content.
    ///
    /// Compares sets, reps, weight, notes, and group. Order is not part of the
    /// comparison.
    #[must_use]
    pub fn matches_entry(&self, entry: &WorkoutEntry) -> bool {
        self.sets == entry.sets
            && self.reps == entry.reps
            && self.weight == entry.weight
            && self.normalized_notes() == normalize_notes(entry.notes.as_deref())
            && self.group_number == entry.group_number
    }

    /// Check the numeric fields. Exercise selection is checked by the caller,
    /// since a blank row is allowed to have none.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate_fields(&self) -> Result<(), CoreError> {
        validate_amounts(self.sets, self.reps, self.weight, self.group_number)
    }

    pub fn apply(&mut self, update: DraftUpdate) {
        match update {
            DraftUpdate::Exercise(exercise_id) => self.exercise_id = exercise_id,
            DraftUpdate::Sets(sets) => self.sets = sets,
            DraftUpdate::Reps(reps) => self.reps = reps,
            DraftUpdate::Weight(weight) => self.weight = weight,
            DraftUpdate::Notes(notes) => self.notes = notes,
            DraftUpdate::Group(group_number) => self.group_number = group_number,
        }
    }
}

/// A single field change on a draft row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum DraftUpdate {
    Exercise(Option<ExerciseId>),
    Sets(u32),
    Reps(u32),
    Weight(Option<f64>),
    Notes(Option<String>),
    Group(u32),
}

/// The editable state of one date, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DaySessionForm {
    pub date: NaiveDate,
    #[serde(default)]
    pub drafts: Vec<EntryDraft>,
}

impl DaySessionForm {
    #[must_use]
    pub const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            drafts: Vec::new(),
        }
    }

    /// Build a form from persisted entries, ordered by group then order index.
    ///
    /// An empty day starts with one blank row.
    #[must_use]
    pub fn from_entries(date: NaiveDate, entries: &[WorkoutEntry], defaults: DraftDefaults) -> Self {
        let mut sorted: Vec<&WorkoutEntry> = entries.iter().filter(|e| e.date == date).collect();
        sorted.sort_by_key(|e| (e.group_number, e.order_index, e.id));

        let mut drafts: Vec<EntryDraft> = sorted.into_iter().map(EntryDraft::from_entry).collect();
        if drafts.is_empty() {
            drafts.push(EntryDraft::blank(defaults));
        }
        Self { date, drafts }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn add_row(&mut self, defaults: DraftDefaults) {
        self.drafts.push(EntryDraft::blank(defaults));
    }

    /// # Errors
    ///
    /// Returns `CoreError::DraftOutOfRange` if `index` is past the end.
    pub fn remove_row(&mut self, index: usize) -> Result<EntryDraft, CoreError> {
        if index >= self.drafts.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.drafts.remove(index))
    }

    /// # Errors
    ///
    /// Returns `CoreError::DraftOutOfRange` if `index` is past the end.
    pub fn update_row(&mut self, index: usize, update: DraftUpdate) -> Result<(), CoreError> {
        let len = self.drafts.len();
        let draft = self
            .drafts
            .get_mut(index)
            .ok_or(CoreError::DraftOutOfRange { index, len })?;
        draft.apply(update);
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> CoreError {
        CoreError::DraftOutOfRange {
            index,
            len: self.drafts.len(),
        }
    }
}
