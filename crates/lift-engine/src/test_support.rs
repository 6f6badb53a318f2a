//! Shared fixtures and an in-memory gateway for engine tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use lift_core::entities::{
        DateRange, EntryDraft, NewWorkoutEntry, OrderUpdate, WorkoutEntry,
    };
    use lift_core::ids::{EntryId, ExerciseId, PersonId};

    use crate::error::GatewayError;
    use crate::gateway::PersistenceGateway;

    pub fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    pub fn other_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()
    }

    pub fn entry_on(date: NaiveDate, id: i64, exercise: i64, group: u32, order: u32) -> WorkoutEntry {
        WorkoutEntry {
            id: EntryId(id),
            person_id: PersonId(1),
            exercise_id: ExerciseId(exercise),
            date,
            sets: 3,
            reps: 10,
            weight: None,
            notes: None,
            order_index: order,
            group_number: group,
        }
    }

    pub fn entry(id: i64, exercise: i64, group: u32, order: u32) -> WorkoutEntry {
        entry_on(day(), id, exercise, group, order)
    }

    pub fn draft(exercise: i64, group: u32) -> EntryDraft {
        EntryDraft {
            exercise_id: Some(ExerciseId(exercise)),
            sets: 3,
            reps: 10,
            weight: None,
            notes: None,
            group_number: group,
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum CallKind {
        Create,
        Delete,
        Reorder,
        Fetch,
    }

    /// A gateway call as the engine issued it.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Create(NewWorkoutEntry),
        Delete(EntryId),
        Reorder(Vec<OrderUpdate>),
        Fetch(PersonId, DateRange),
    }

    /// Gateway over a `BTreeMap`, with per-call-kind failure switches and
    /// optional yields so tests can interleave concurrent operations.
    pub struct MemoryGateway {
        rows: Mutex<BTreeMap<EntryId, WorkoutEntry>>,
        next_id: Mutex<i64>,
        failing: Mutex<HashSet<CallKind>>,
        calls: Mutex<Vec<Call>>,
        in_flight: Mutex<Vec<&'static str>>,
        yields: usize,
    }

    impl MemoryGateway {
        pub fn new(rows: Vec<WorkoutEntry>) -> Self {
            let next_id = rows.iter().map(|e| e.id.get()).max().unwrap_or(0) + 1;
            Self {
                rows: Mutex::new(rows.into_iter().map(|e| (e.id, e)).collect()),
                next_id: Mutex::new(next_id),
                failing: Mutex::new(HashSet::new()),
                calls: Mutex::new(Vec::new()),
                in_flight: Mutex::new(Vec::new()),
                yields: 0,
            }
        }

        /// Yield to the scheduler this many times inside every write.
        pub fn with_yields(mut self, yields: usize) -> Self {
            self.yields = yields;
            self
        }

        pub fn fail(&self, kind: CallKind) {
            self.failing.lock().unwrap().insert(kind);
        }

        pub fn heal(&self) {
            self.failing.lock().unwrap().clear();
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn writes(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| !matches!(c, Call::Fetch(..)))
                .collect()
        }

        /// Start/end markers for every write, in the order they happened.
        pub fn trace(&self) -> Vec<&'static str> {
            self.in_flight.lock().unwrap().clone()
        }

        pub fn rows(&self) -> Vec<WorkoutEntry> {
            self.rows.lock().unwrap().values().cloned().collect()
        }

        fn check(&self, kind: CallKind) -> Result<(), GatewayError> {
            if self.failing.lock().unwrap().contains(&kind) {
                return Err(GatewayError::msg(format!("{kind:?} rejected")));
            }
            Ok(())
        }

        async fn pause(&self) {
            self.in_flight.lock().unwrap().push("start");
            for _ in 0..self.yields {
                tokio::task::yield_now().await;
            }
            self.in_flight.lock().unwrap().push("end");
        }
    }

    impl PersistenceGateway for MemoryGateway {
        async fn create_entry(&self, entry: &NewWorkoutEntry) -> Result<EntryId, GatewayError> {
            self.calls.lock().unwrap().push(Call::Create(entry.clone()));
            self.pause().await;
            self.check(CallKind::Create)?;
            let id = {
                let mut next = self.next_id.lock().unwrap();
                let id = EntryId(*next);
                *next += 1;
                id
            };
            self.rows
                .lock()
                .unwrap()
                .insert(id, entry.clone().with_id(id));
            Ok(id)
        }

        async fn delete_entry(&self, id: EntryId) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(Call::Delete(id));
            self.pause().await;
            self.check(CallKind::Delete)?;
            self.rows.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn batch_reorder(&self, updates: &[OrderUpdate]) -> Result<(), GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Reorder(updates.to_vec()));
            self.pause().await;
            self.check(CallKind::Reorder)?;
            let mut rows = self.rows.lock().unwrap();
            for update in updates {
                if let Some(entry) = rows.get_mut(&update.id) {
                    update.apply_to(entry);
                }
            }
            Ok(())
        }

        async fn fetch_entries(
            &self,
            person_id: PersonId,
            range: DateRange,
        ) -> Result<Vec<WorkoutEntry>, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Fetch(person_id, range));
            self.check(CallKind::Fetch)?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|e| e.person_id == person_id && range.contains(e.date))
                .cloned()
                .collect())
        }
    }
}
