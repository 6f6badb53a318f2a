//! Diff an edited session form against what is persisted for its date.
//!
//! Drafts carry no ids, so matching is by exercise: at most one entry per
//! exercise per day. A draft whose content already equals its entry produces
//! no delete or insert; if only its position moved it is re-indexed in place.

use std::collections::{HashMap, HashSet};

use lift_core::entities::{
    DaySessionForm, DraftDefaults, EntryDraft, NewWorkoutEntry, OrderUpdate, WorkoutEntry,
};
use lift_core::errors::CoreError;
use lift_core::ids::{EntryId, ExerciseId, PersonId};
use serde::Serialize;

use crate::error::{ReconcileError, ValidationError};

/// The gateway calls that bring persisted state in line with a form.
///
/// Executed in field order: deletes, then inserts, then one batch reorder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionPlan {
    pub to_delete: Vec<EntryId>,
    pub to_insert: Vec<NewWorkoutEntry>,
    pub to_reorder: Vec<OrderUpdate>,
}

impl SessionPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_insert.is_empty() && self.to_reorder.is_empty()
    }

    /// Number of gateway calls the plan needs.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.to_delete.len() + self.to_insert.len() + usize::from(!self.to_reorder.is_empty())
    }

    /// Replay the plan on a local entry list, pairing inserts with the ids the
    /// gateway handed back. Inserts without an id are skipped.
    pub fn apply_to(&self, entries: &mut Vec<WorkoutEntry>, inserted: &[EntryId]) {
        entries.retain(|e| !self.to_delete.contains(&e.id));
        for (new, id) in self.to_insert.iter().zip(inserted) {
            entries.push(new.clone().with_id(*id));
        }
        for update in &self.to_reorder {
            for entry in entries.iter_mut() {
                update.apply_to(entry);
            }
        }
    }
}

/// A draft that survived validation, with its position inside its group.
struct KeptDraft<'a> {
    draft: &'a EntryDraft,
    exercise_id: ExerciseId,
    order_index: u32,
}

/// Builds [`SessionPlan`]s for one person.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    person_id: PersonId,
    defaults: DraftDefaults,
}

impl Reconciler {
    #[must_use]
    pub const fn new(person_id: PersonId, defaults: DraftDefaults) -> Self {
        Self {
            person_id,
            defaults,
        }
    }

    /// Plan the save of `form` over `persisted`.
    ///
    /// Entries in `persisted` dated other than `form.date` are ignored. Blank
    /// rows are dropped before matching. When the result would delete every
    /// persisted entry and insert nothing, `confirmed_clear` must be set.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Validation` for an invalid form, or
    /// `ReconcileError::ConfirmationRequired` for an unconfirmed day clear.
    pub fn plan(
        &self,
        form: &DaySessionForm,
        persisted: &[WorkoutEntry],
        confirmed_clear: bool,
    ) -> Result<SessionPlan, ReconcileError> {
        let kept = self.validate(form)?;

        let mut day: Vec<&WorkoutEntry> =
            persisted.iter().filter(|e| e.date == form.date).collect();
        day.sort_by_key(|e| (e.group_number, e.order_index, e.id));

        // Legacy data may hold the same exercise twice; only the first is matchable.
        let mut by_exercise: HashMap<ExerciseId, &WorkoutEntry> = HashMap::new();
        let mut plan = SessionPlan::default();
        for &entry in &day {
            if by_exercise.contains_key(&entry.exercise_id) {
                plan.to_delete.push(entry.id);
            } else {
                by_exercise.insert(entry.exercise_id, entry);
            }
        }

        let mut wanted: HashSet<ExerciseId> = HashSet::new();
        for kept_draft in &kept {
            wanted.insert(kept_draft.exercise_id);
            match by_exercise.get(&kept_draft.exercise_id) {
                Some(entry) if kept_draft.draft.matches_entry(entry) => {
                    if entry.order_index != kept_draft.order_index {
                        plan.to_reorder
                            .push(OrderUpdate::new(entry.id, kept_draft.order_index));
                    }
                }
                Some(entry) => {
                    plan.to_delete.push(entry.id);
                    plan.to_insert.push(self.materialize(form, kept_draft));
                }
                None => plan.to_insert.push(self.materialize(form, kept_draft)),
            }
        }

        for &entry in &day {
            let matchable = by_exercise
                .get(&entry.exercise_id)
                .is_some_and(|first| first.id == entry.id);
            if matchable && !wanted.contains(&entry.exercise_id) {
                plan.to_delete.push(entry.id);
            }
        }

        let clears_day =
            !day.is_empty() && plan.to_insert.is_empty() && plan.to_delete.len() == day.len();
        if clears_day && !confirmed_clear {
            return Err(ReconcileError::ConfirmationRequired {
                deletes: plan.to_delete.len(),
            });
        }

        Ok(plan)
    }

    /// Drop blank rows, then check the rest. Assigns each kept draft its
    /// index inside its group, in form order.
    fn validate<'a>(
        &self,
        form: &'a DaySessionForm,
    ) -> Result<Vec<KeptDraft<'a>>, ValidationError> {
        let mut kept = Vec::new();
        let mut first_row: HashMap<ExerciseId, usize> = HashMap::new();
        let mut next_index: HashMap<u32, u32> = HashMap::new();

        for (index, draft) in form.drafts.iter().enumerate() {
            if draft.is_blank(self.defaults) {
                continue;
            }
            let exercise_id = draft
                .selected_exercise()
                .ok_or(ValidationError::MissingExercise { index })?;
            draft
                .validate_fields()
                .map_err(|err| ValidationError::InvalidField {
                    index,
                    reason: field_reason(&err),
                })?;
            if let Some(&first) = first_row.get(&exercise_id) {
                return Err(ValidationError::DuplicateExercise {
                    exercise_id,
                    first,
                    second: index,
                });
            }
            first_row.insert(exercise_id, index);

            let slot = next_index.entry(draft.group_number).or_insert(0);
            kept.push(KeptDraft {
                draft,
                exercise_id,
                order_index: *slot,
            });
            *slot += 1;
        }
        Ok(kept)
    }

    fn materialize(&self, form: &DaySessionForm, kept: &KeptDraft<'_>) -> NewWorkoutEntry {
        NewWorkoutEntry {
            person_id: self.person_id,
            exercise_id: kept.exercise_id,
            date: form.date,
            sets: kept.draft.sets,
            reps: kept.draft.reps,
            weight: kept.draft.weight,
            notes: kept.draft.normalized_notes().map(str::to_owned),
            order_index: kept.order_index,
            group_number: kept.draft.group_number,
        }
    }
}

fn field_reason(err: &CoreError) -> String {
    match err {
        CoreError::Validation(reason) => reason.clone(),
        other => other.to_string(),
    }
}
