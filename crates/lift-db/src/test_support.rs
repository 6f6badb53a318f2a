//! Shared test utilities for lift-db.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::NaiveDate;
    use lift_core::entities::NewWorkoutEntry;
    use lift_core::ids::{EntryId, ExerciseId, PersonId};

    use crate::service::LiftService;

    /// Create an in-memory `LiftService`.
    pub async fn test_service() -> LiftService {
        LiftService::new_local(":memory:").await.unwrap()
    }

    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    pub fn new_entry(exercise: i64, group: u32, order: u32) -> NewWorkoutEntry {
        NewWorkoutEntry {
            person_id: PersonId(1),
            exercise_id: ExerciseId(exercise),
            date: monday(),
            sets: 3,
            reps: 10,
            weight: None,
            notes: None,
            order_index: order,
            group_number: group,
        }
    }

    /// Insert an entry and return its id.
    pub async fn seed(svc: &LiftService, entry: NewWorkoutEntry) -> EntryId {
        svc.insert_entry(&entry).await.unwrap().id
    }
}
