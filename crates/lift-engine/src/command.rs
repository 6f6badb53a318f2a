//! Optimistic changes with their inverse.
//!
//! A command is applied to the local entry list before its gateway calls are
//! made. If the first call fails, `undo` puts the list back the way it was.

use std::fmt;

use chrono::NaiveDate;
use lift_core::entities::{OrderUpdate, WorkoutEntry};
use lift_core::ids::EntryId;

use crate::error::GatewayError;
use crate::gateway::PersistenceGateway;
use crate::reorder::{ReorderOutcome, close_gap};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A drag within or across groups on one date.
    Reorder {
        date: NaiveDate,
        before: Vec<WorkoutEntry>,
        after: Vec<WorkoutEntry>,
        updates: Vec<OrderUpdate>,
    },
    /// Removal of one entry. `updates` close the gap it leaves in its group.
    Delete {
        date: NaiveDate,
        id: EntryId,
        before: Vec<WorkoutEntry>,
        after: Vec<WorkoutEntry>,
        updates: Vec<OrderUpdate>,
    },
}

/// A commit that stopped at a gateway error.
#[derive(Debug)]
pub struct CommitFailure {
    /// Calls that went through before `source`.
    pub completed: usize,
    pub source: GatewayError,
}

impl CommitFailure {
    fn after(completed: usize) -> impl FnOnce(GatewayError) -> Self {
        move |source| Self { completed, source }
    }
}

impl fmt::Display for CommitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} calls)", self.source, self.completed)
    }
}

impl Command {
    #[must_use]
    pub fn reorder(date: NaiveDate, before: &[WorkoutEntry], outcome: ReorderOutcome) -> Self {
        Self::Reorder {
            date,
            before: before.to_vec(),
            after: outcome.entries,
            updates: outcome.updates,
        }
    }

    /// `None` if no entry in `entries` has `id`.
    #[must_use]
    pub fn delete(date: NaiveDate, entries: &[WorkoutEntry], id: EntryId) -> Option<Self> {
        let removed = entries.iter().find(|e| e.id == id)?;
        let updates = close_gap(entries, removed);

        let mut after: Vec<WorkoutEntry> =
            entries.iter().filter(|e| e.id != id).cloned().collect();
        for update in &updates {
            for entry in &mut after {
                update.apply_to(entry);
            }
        }

        Some(Self::Delete {
            date,
            id,
            before: entries.to_vec(),
            after,
            updates,
        })
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Reorder { date, .. } | Self::Delete { date, .. } => *date,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Reorder { .. } => "reorder",
            Self::Delete { .. } => "delete",
        }
    }

    pub fn apply(&self, entries: &mut Vec<WorkoutEntry>) {
        match self {
            Self::Reorder { after, .. } | Self::Delete { after, .. } => after.clone_into(entries),
        }
    }

    pub fn undo(&self, entries: &mut Vec<WorkoutEntry>) {
        match self {
            Self::Reorder { before, .. } | Self::Delete { before, .. } => {
                before.clone_into(entries);
            }
        }
    }

    /// Persist the change.
    ///
    /// A delete is one call, plus a reorder batch when other members of its
    /// group shift down.
    ///
    /// # Errors
    ///
    /// Returns the first gateway error along with how many calls preceded it.
    pub async fn commit<G: PersistenceGateway>(&self, gateway: &G) -> Result<(), CommitFailure> {
        match self {
            Self::Reorder { updates, .. } => {
                gateway.batch_reorder(updates).await.map_err(CommitFailure::after(0))
            }
            Self::Delete { id, updates, .. } => {
                gateway.delete_entry(*id).await.map_err(CommitFailure::after(0))?;
                if updates.is_empty() {
                    return Ok(());
                }
                gateway.batch_reorder(updates).await.map_err(CommitFailure::after(1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reorder::reorder;
    use crate::test_support::helpers::{day, entry};
    use pretty_assertions::assert_eq;

    #[test]
    fn reorder_undo_restores_snapshot() {
        let before = vec![entry(5, 50, 1, 0), entry(7, 70, 1, 1)];
        let outcome = reorder(&before, EntryId(7), 1, Some(0)).unwrap();
        let command = Command::reorder(day(), &before, outcome);

        let mut entries = before.clone();
        command.apply(&mut entries);
        assert_ne!(entries, before);
        command.undo(&mut entries);
        assert_eq!(entries, before);
    }

    #[test]
    fn delete_shifts_later_members_and_undo_restores_them() {
        let before = vec![
            entry(1, 10, 1, 0),
            entry(2, 20, 1, 1),
            entry(3, 30, 1, 2),
            entry(4, 40, 2, 0),
        ];
        let command = Command::delete(day(), &before, EntryId(1)).unwrap();

        let mut entries = before.clone();
        command.apply(&mut entries);
        let placed: Vec<(i64, u32, u32)> = entries
            .iter()
            .map(|e| (e.id.get(), e.group_number, e.order_index))
            .collect();
        assert_eq!(placed, vec![(2, 1, 0), (3, 1, 1), (4, 2, 0)]);

        command.undo(&mut entries);
        assert_eq!(entries, before);
    }

    #[test]
    fn deleting_a_last_member_needs_no_reorder() {
        let before = vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1)];
        let Some(Command::Delete { updates, .. }) = Command::delete(day(), &before, EntryId(2))
        else {
            panic!("expected a delete");
        };
        assert!(updates.is_empty());
    }

    #[test]
    fn delete_of_unknown_entry_is_none() {
        assert!(Command::delete(day(), &[entry(1, 10, 1, 0)], EntryId(4)).is_none());
    }
}
