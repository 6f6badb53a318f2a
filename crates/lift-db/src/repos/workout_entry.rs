//! Workout entry repository: CRUD, batch reorder, and per-day maintenance.

use chrono::NaiveDate;
use lift_core::entities::{DateRange, NewWorkoutEntry, OrderUpdate, WorkoutEntry};
use lift_core::ids::{EntryId, ExerciseId, PersonId};

use crate::error::DatabaseError;
use crate::helpers::{format_date, get_opt_string, get_u32, parse_date};
use crate::service::LiftService;

const SELECT_COLS: &str =
    "id, person_id, exercise_id, date, sets, reps, weight, notes, order_index, group_number";

fn row_to_entry(row: &libsql::Row) -> Result<WorkoutEntry, DatabaseError> {
    Ok(WorkoutEntry {
        id: EntryId(row.get(0)?),
        person_id: PersonId(row.get(1)?),
        exercise_id: ExerciseId(row.get(2)?),
        date: parse_date(&row.get::<String>(3)?)?,
        sets: get_u32(row, 4, "sets")?,
        reps: get_u32(row, 5, "reps")?,
        weight: row.get::<Option<f64>>(6)?,
        notes: get_opt_string(row, 7)?,
        order_index: get_u32(row, 8, "order_index")?,
        group_number: get_u32(row, 9, "group_number")?,
    })
}

impl LiftService {
    /// Validate and insert an entry, returning it with its new id.
    ///
    /// # Errors
    ///
    /// `DatabaseError::Validation` for bad fields, or a query error.
    pub async fn insert_entry(
        &self,
        entry: &NewWorkoutEntry,
    ) -> Result<WorkoutEntry, DatabaseError> {
        entry.validate()?;
        let _write = self.write_guard().await;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO workout_entries
                        (person_id, exercise_id, date, sets, reps, weight, notes,
                         order_index, group_number)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    entry.person_id.get(),
                    entry.exercise_id.get(),
                    format_date(entry.date),
                    i64::from(entry.sets),
                    i64::from(entry.reps),
                    entry.weight,
                    entry.notes.as_deref().filter(|n| !n.trim().is_empty()),
                    i64::from(entry.order_index),
                    i64::from(entry.group_number)
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let created = row_to_entry(&row)?;
        tracing::debug!(id = %created.id, date = %created.date, "entry inserted");
        Ok(created)
    }

    /// # Errors
    ///
    /// `DatabaseError::NoResult` if no entry has `id`.
    pub async fn get_entry(&self, id: EntryId) -> Result<WorkoutEntry, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM workout_entries WHERE id = ?1"),
                [id.get()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_entry(&row)
    }

    /// Delete one entry. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns a query error if the delete fails.
    pub async fn remove_entry(&self, id: EntryId) -> Result<bool, DatabaseError> {
        let _write = self.write_guard().await;
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM workout_entries WHERE id = ?1", [id.get()])
            .await?;
        Ok(affected > 0)
    }

    /// Apply every update or none of them.
    ///
    /// # Errors
    ///
    /// `DatabaseError::InvalidState` if an update names a missing entry; the
    /// whole batch is rolled back.
    pub async fn reorder_entries(&self, updates: &[OrderUpdate]) -> Result<(), DatabaseError> {
        let _write = self.write_guard().await;
        let tx = self.db().conn().transaction().await?;

        for update in updates {
            let affected = tx
                .execute(
                    "UPDATE workout_entries
                     SET order_index = ?1,
                         group_number = COALESCE(?2, group_number),
                         updated_at = datetime('now')
                     WHERE id = ?3",
                    libsql::params![
                        i64::from(update.order_index),
                        update.group_number.map(i64::from),
                        update.id.get()
                    ],
                )
                .await?;
            if affected == 0 {
                tx.rollback().await?;
                return Err(DatabaseError::InvalidState(format!(
                    "reorder names missing entry {}",
                    update.id
                )));
            }
        }

        tx.commit().await?;
        tracing::debug!(count = updates.len(), "entries reordered");
        Ok(())
    }

    /// Entries for one person across `range`, ordered by date, group, then
    /// order index.
    ///
    /// # Errors
    ///
    /// Returns a query or decode error.
    pub async fn list_entries(
        &self,
        person_id: PersonId,
        range: DateRange,
    ) -> Result<Vec<WorkoutEntry>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM workout_entries
                     WHERE person_id = ?1 AND date BETWEEN ?2 AND ?3
                     ORDER BY date, group_number, order_index, id"
                ),
                libsql::params![
                    person_id.get(),
                    format_date(range.start),
                    format_date(range.end)
                ],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Compact a day's group numbers to `1..=k`, keeping their order.
    ///
    /// Returns the `(old, new)` pairs that changed.
    ///
    /// # Errors
    ///
    /// Returns a query error; nothing is changed in that case.
    pub async fn renumber_groups(
        &self,
        person_id: PersonId,
        date: NaiveDate,
    ) -> Result<Vec<(u32, u32)>, DatabaseError> {
        let _write = self.write_guard().await;
        let tx = self.db().conn().transaction().await?;
        let day = format_date(date);

        let mut groups = Vec::new();
        {
            let mut rows = tx
                .query(
                    "SELECT DISTINCT group_number FROM workout_entries
                     WHERE person_id = ?1 AND date = ?2
                     ORDER BY group_number",
                    libsql::params![person_id.get(), day.as_str()],
                )
                .await?;
            while let Some(row) = rows.next().await? {
                groups.push(get_u32(&row, 0, "group_number")?);
            }
        }

        // Ascending order means a group only ever moves onto a number that
        // has already been vacated.
        let mut changes = Vec::new();
        for (new, old) in (1_u32..).zip(groups) {
            if new == old {
                continue;
            }
            tx.execute(
                "UPDATE workout_entries
                 SET group_number = ?1, updated_at = datetime('now')
                 WHERE person_id = ?2 AND date = ?3 AND group_number = ?4",
                libsql::params![
                    i64::from(new),
                    person_id.get(),
                    day.as_str(),
                    i64::from(old)
                ],
            )
            .await?;
            changes.push((old, new));
        }

        tx.commit().await?;
        Ok(changes)
    }

    /// Delete every entry for one person on one date. Returns the count.
    ///
    /// # Errors
    ///
    /// Returns a query error if the delete fails.
    pub async fn delete_entries_for_day(
        &self,
        person_id: PersonId,
        date: NaiveDate,
    ) -> Result<u64, DatabaseError> {
        let _write = self.write_guard().await;
        let affected = self
            .db()
            .conn()
            .execute(
                "DELETE FROM workout_entries WHERE person_id = ?1 AND date = ?2",
                libsql::params![person_id.get(), format_date(date)],
            )
            .await?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{monday, new_entry, seed, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn insert_then_get() {
        let svc = test_service().await;
        let mut entry = new_entry(5, 1, 0);
        entry.weight = Some(62.5);
        entry.notes = Some("belt on top set".into());

        let created = svc.insert_entry(&entry).await.unwrap();
        assert!(created.id.get() > 0);
        assert_eq!(created.without_id(), entry);

        let fetched = svc.get_entry(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn blank_notes_are_stored_as_null() {
        let svc = test_service().await;
        let mut entry = new_entry(5, 1, 0);
        entry.notes = Some("  ".into());
        let created = svc.insert_entry(&entry).await.unwrap();
        assert_eq!(created.notes, None);
    }

    #[tokio::test]
    async fn invalid_entry_never_reaches_sql() {
        let svc = test_service().await;
        let mut entry = new_entry(5, 1, 0);
        entry.sets = 0;
        let err = svc.insert_entry(&entry).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn get_missing_entry_is_no_result() {
        let svc = test_service().await;
        let err = svc.get_entry(EntryId(99)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }

    #[tokio::test]
    async fn remove_reports_whether_a_row_went() {
        let svc = test_service().await;
        let id = seed(&svc, new_entry(5, 1, 0)).await;
        assert!(svc.remove_entry(id).await.unwrap());
        assert!(!svc.remove_entry(id).await.unwrap());
    }

    #[tokio::test]
    async fn reorder_applies_indices_and_group_moves() {
        let svc = test_service().await;
        let a = seed(&svc, new_entry(5, 1, 0)).await;
        let b = seed(&svc, new_entry(6, 1, 1)).await;

        svc.reorder_entries(&[OrderUpdate::new(a, 0), OrderUpdate::regrouped(b, 0, 2)])
            .await
            .unwrap();

        let moved = svc.get_entry(b).await.unwrap();
        assert_eq!((moved.group_number, moved.order_index), (2, 0));
    }

    #[tokio::test]
    async fn reorder_is_all_or_nothing() {
        let svc = test_service().await;
        let a = seed(&svc, new_entry(5, 1, 0)).await;

        let err = svc
            .reorder_entries(&[OrderUpdate::new(a, 4), OrderUpdate::new(EntryId(404), 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert_eq!(svc.get_entry(a).await.unwrap().order_index, 0);
    }

    #[tokio::test]
    async fn list_filters_by_person_and_range() {
        let svc = test_service().await;
        seed(&svc, new_entry(5, 2, 0)).await;
        seed(&svc, new_entry(6, 1, 0)).await;
        let mut other_person = new_entry(7, 1, 0);
        other_person.person_id = PersonId(2);
        seed(&svc, other_person).await;
        let mut next_week = new_entry(8, 1, 0);
        next_week.date = monday() + chrono::Days::new(7);
        seed(&svc, next_week).await;

        let week = DateRange::spanning(monday(), 7).unwrap();
        let entries = svc.list_entries(PersonId(1), week).await.unwrap();
        let exercises: Vec<ExerciseId> = entries.iter().map(|e| e.exercise_id).collect();
        assert_eq!(exercises, vec![ExerciseId(6), ExerciseId(5)]);
    }

    #[tokio::test]
    async fn renumber_closes_gaps_in_order() {
        let svc = test_service().await;
        seed(&svc, new_entry(5, 2, 0)).await;
        seed(&svc, new_entry(6, 5, 0)).await;
        seed(&svc, new_entry(7, 5, 1)).await;

        let changes = svc.renumber_groups(PersonId(1), monday()).await.unwrap();
        assert_eq!(changes, vec![(2, 1), (5, 2)]);

        let day = DateRange::single(monday());
        let groups: Vec<(i64, u32)> = svc
            .list_entries(PersonId(1), day)
            .await
            .unwrap()
            .iter()
            .map(|e| (e.exercise_id.get(), e.group_number))
            .collect();
        assert_eq!(groups, vec![(5, 1), (6, 2), (7, 2)]);

        assert!(svc.renumber_groups(PersonId(1), monday()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_for_day_leaves_other_days() {
        let svc = test_service().await;
        seed(&svc, new_entry(5, 1, 0)).await;
        seed(&svc, new_entry(6, 1, 1)).await;
        let mut tuesday = new_entry(7, 1, 0);
        tuesday.date = monday() + chrono::Days::new(1);
        seed(&svc, tuesday).await;

        assert_eq!(svc.delete_entries_for_day(PersonId(1), monday()).await.unwrap(), 2);
        let week = DateRange::spanning(monday(), 7).unwrap();
        assert_eq!(svc.list_entries(PersonId(1), week).await.unwrap().len(), 1);
    }
}
