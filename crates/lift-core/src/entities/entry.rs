use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{EntryId, ExerciseId, PersonId};

/// Group assigned to entries that never chose one.
pub const DEFAULT_GROUP_NUMBER: u32 = 1;

const fn default_group_number() -> u32 {
    DEFAULT_GROUP_NUMBER
}

/// An exercise assigned to a person on a date.
///
/// Within one `(date, group_number)` bucket the `order_index` values form the
/// dense range `0..n`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct WorkoutEntry {
    pub id: EntryId,
    pub person_id: PersonId,
    pub exercise_id: ExerciseId,
    pub date: NaiveDate,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default = "default_group_number")]
    pub group_number: u32,
}

impl WorkoutEntry {
    /// The `(date, group_number)` bucket this entry is ordered within.
    #[must_use]
    pub const fn bucket(&self) -> (NaiveDate, u32) {
        (self.date, self.group_number)
    }

    /// Copy every field except the id.
    #[must_use]
    pub fn without_id(&self) -> NewWorkoutEntry {
        NewWorkoutEntry {
            person_id: self.person_id,
            exercise_id: self.exercise_id,
            date: self.date,
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            notes: self.notes.clone(),
            order_index: self.order_index,
            group_number: self.group_number,
        }
    }
}

/// A workout entry that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewWorkoutEntry {
    pub person_id: PersonId,
    pub exercise_id: ExerciseId,
    pub date: NaiveDate,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default = "default_group_number")]
    pub group_number: u32,
}

impl NewWorkoutEntry {
    /// Attach the id handed out by the persistence layer.
    #[must_use]
    pub fn with_id(self, id: EntryId) -> WorkoutEntry {
        WorkoutEntry {
            id,
            person_id: self.person_id,
            exercise_id: self.exercise_id,
            date: self.date,
            sets: self.sets,
            reps: self.reps,
            weight: self.weight,
            notes: self.notes,
            order_index: self.order_index,
            group_number: self.group_number,
        }
    }

    /// Check field constraints before the entry is sent anywhere.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.person_id.is_valid() {
            return Err(CoreError::Validation(format!(
                "invalid person id {}",
                self.person_id
            )));
        }
        if !self.exercise_id.is_set() {
            return Err(CoreError::Validation(format!(
                "invalid exercise id {}",
                self.exercise_id
            )));
        }
        validate_amounts(self.sets, self.reps, self.weight, self.group_number)
    }
}

/// One `(id, order_index)` pair of a batch reorder.
///
/// `group_number` is only set for the entry a drag moved into another group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: EntryId,
    pub order_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_number: Option<u32>,
}

impl OrderUpdate {
    #[must_use]
    pub const fn new(id: EntryId, order_index: u32) -> Self {
        Self {
            id,
            order_index,
            group_number: None,
        }
    }

    #[must_use]
    pub const fn regrouped(id: EntryId, order_index: u32, group_number: u32) -> Self {
        Self {
            id,
            order_index,
            group_number: Some(group_number),
        }
    }

    /// Apply this update to the matching entry. Returns false if ids differ.
    pub fn apply_to(&self, entry: &mut WorkoutEntry) -> bool {
        if entry.id != self.id {
            return false;
        }
        entry.order_index = self.order_index;
        if let Some(group_number) = self.group_number {
            entry.group_number = group_number;
        }
        true
    }
}

pub(crate) fn validate_amounts(
    sets: u32,
    reps: u32,
    weight: Option<f64>,
    group_number: u32,
) -> Result<(), CoreError> {
    if sets == 0 {
        return Err(CoreError::Validation("sets must be greater than 0".into()));
    }
    if reps == 0 {
        return Err(CoreError::Validation("reps must be greater than 0".into()));
    }
    if let Some(weight) = weight
        && (weight.is_nan() || weight < 0.0)
    {
        return Err(CoreError::Validation(format!(
            "weight cannot be negative (got {weight})"
        )));
    }
    if group_number == 0 {
        return Err(CoreError::Validation(
            "group number must be at least 1".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewWorkoutEntry {
        NewWorkoutEntry {
            person_id: PersonId(1),
            exercise_id: ExerciseId(5),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            sets: 3,
            reps: 10,
            weight: Some(40.0),
            notes: None,
            order_index: 0,
            group_number: 1,
        }
    }

    #[test]
    fn valid_entry_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_zero_sets_and_reps() {
        let mut entry = sample();
        entry.sets = 0;
        assert!(entry.validate().is_err());

        let mut entry = sample();
        entry.reps = 0;
        assert!(entry.validate().is_err());
    }

    #[test]
    fn rejects_negative_weight() {
        let mut entry = sample();
        entry.weight = Some(-2.5);
        let err = entry.validate().unwrap_err();
        assert!(err.to_string().contains("weight"));
    }

    #[test]
    fn rejects_unset_exercise_and_person() {
        let mut entry = sample();
        entry.exercise_id = ExerciseId(0);
        assert!(entry.validate().is_err());

        let mut entry = sample();
        entry.person_id = PersonId(0);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn with_id_then_without_id_preserves_fields() {
        let entry = sample().with_id(EntryId(9));
        assert_eq!(entry.id, EntryId(9));
        assert_eq!(entry.without_id(), sample());
    }

    #[test]
    fn plain_order_update_omits_group() {
        let json = serde_json::to_string(&OrderUpdate::new(EntryId(7), 0)).unwrap();
        assert_eq!(json, r#"{"id":7,"order_index":0}"#);
    }

    #[test]
    fn regrouped_update_moves_entry() {
        let mut entry = sample().with_id(EntryId(4));
        assert!(!OrderUpdate::new(EntryId(5), 2).apply_to(&mut entry));
        assert!(OrderUpdate::regrouped(EntryId(4), 2, 3).apply_to(&mut entry));
        assert_eq!((entry.order_index, entry.group_number), (2, 3));
    }

    #[test]
    fn missing_group_defaults_to_one() {
        let json = r#"{
            "id": 1, "person_id": 1, "exercise_id": 2, "date": "2026-03-02",
            "sets": 3, "reps": 8
        }"#;
        let entry: WorkoutEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.group_number, DEFAULT_GROUP_NUMBER);
        assert_eq!(entry.order_index, 0);
        assert_eq!(entry.weight, None);
    }
}
