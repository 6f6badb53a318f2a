use std::collections::HashMap;

use chrono::NaiveDate;
use lift_core::entities::{DaySessionForm, DraftDefaults, WorkoutEntry};
use lift_core::enums::ErrorKind;
use lift_core::ids::PersonId;

use super::projection::Projection;
use crate::command::Command;
use crate::error::SessionError;
use crate::grouping::{EmptyGroups, group_entries};

pub(crate) type DayKey = (PersonId, NaiveDate);

/// Identifies the context an operation started in.
///
/// `generation` changes whenever the person or day does, so a result that
/// arrives late can still update the entry store without republishing a
/// projection for a context the user already left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket {
    pub key: DayKey,
    pub generation: u64,
}

impl Ticket {
    pub const fn person_id(&self) -> PersonId {
        self.key.0
    }

    pub const fn date(&self) -> NaiveDate {
        self.key.1
    }
}

#[derive(Debug, Default)]
pub(crate) struct EditorState {
    pub person_id: Option<PersonId>,
    pub date: Option<NaiveDate>,
    pub generation: u64,
    pub form: Option<DaySessionForm>,
    pub form_dirty: bool,
    pub empty_groups: EmptyGroups,
    pub last_error: Option<ErrorKind>,
    store: HashMap<DayKey, Vec<WorkoutEntry>>,
    revisions: HashMap<DayKey, u64>,
    pending: HashMap<DayKey, usize>,
}

impl EditorState {
    /// Move to a new person/day. Drops the form and every empty-group
    /// placeholder. Stored days survive only while open or busy.
    pub fn switch_context(&mut self, person_id: Option<PersonId>, date: Option<NaiveDate>) {
        self.person_id = person_id;
        self.date = date;
        self.generation += 1;
        self.form = None;
        self.form_dirty = false;
        self.empty_groups.clear();
        self.last_error = None;
        self.evict_idle();
    }

    fn evict_idle(&mut self) {
        let open = self.open_key();
        let pending = &self.pending;
        let keep = |key: &DayKey| open == Some(*key) || pending.contains_key(key);
        self.store.retain(|key, _| keep(key));
        self.revisions.retain(|key, _| keep(key));
    }

    pub fn holds_day(&self, key: DayKey) -> bool {
        self.store.contains_key(&key)
    }

    #[cfg(test)]
    pub fn stored_days(&self) -> usize {
        self.store.len()
    }

    pub fn open_key(&self) -> Option<DayKey> {
        Some((self.person_id?, self.date?))
    }

    pub fn ticket(&self) -> Result<Ticket, SessionError> {
        let person_id = self.person_id.ok_or(SessionError::NoPersonSelected)?;
        let date = self.date.ok_or(SessionError::NoDayOpen)?;
        Ok(Ticket {
            key: (person_id, date),
            generation: self.generation,
        })
    }

    pub const fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation == ticket.generation
    }

    pub fn entries(&self, key: DayKey) -> &[WorkoutEntry] {
        self.store.get(&key).map_or(&[][..], Vec::as_slice)
    }

    fn entries_mut(&mut self, key: DayKey) -> &mut Vec<WorkoutEntry> {
        *self.revisions.entry(key).or_default() += 1;
        self.store.entry(key).or_default()
    }

    pub fn revision(&self, key: DayKey) -> u64 {
        self.revisions.get(&key).copied().unwrap_or(0)
    }

    pub fn replace_day(&mut self, key: DayKey, entries: Vec<WorkoutEntry>) {
        *self.entries_mut(key) = entries;
        self.after_change(key);
    }

    /// Apply a command optimistically. Returns placeholders it filled.
    pub fn apply_command(&mut self, key: DayKey, command: &Command) -> Vec<u32> {
        command.apply(self.entries_mut(key));
        self.after_change(key)
    }

    pub fn undo_command(&mut self, ticket: &Ticket, command: &Command, filled: &[u32]) {
        command.undo(self.entries_mut(ticket.key));
        if self.is_current(ticket) {
            let entries = self.store.get(&ticket.key).map_or(&[][..], Vec::as_slice);
            self.empty_groups.restore(ticket.date(), filled, entries);
        }
    }

    fn after_change(&mut self, key: DayKey) -> Vec<u32> {
        if self.open_key() != Some(key) {
            return Vec::new();
        }
        let entries = self.store.get(&key).map_or(&[][..], Vec::as_slice);
        self.empty_groups.collect_garbage(key.1, entries)
    }

    /// Rebuild the form from the store unless it holds unsaved edits.
    pub fn refresh_form(&mut self, key: DayKey, defaults: DraftDefaults) {
        if self.open_key() != Some(key) || (self.form.is_some() && self.form_dirty) {
            return;
        }
        self.form = Some(DaySessionForm::from_entries(
            key.1,
            self.entries(key),
            defaults,
        ));
        self.form_dirty = false;
    }

    pub fn begin_pending(&mut self, key: DayKey) {
        *self.pending.entry(key).or_default() += 1;
    }

    pub fn end_pending(&mut self, key: DayKey) {
        if let Some(count) = self.pending.get_mut(&key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.pending.remove(&key);
            }
        }
    }

    pub fn is_busy(&self, key: DayKey) -> bool {
        self.pending.contains_key(&key)
    }

    pub fn projection(&self) -> Projection {
        let Some(key) = self.open_key() else {
            return Projection {
                person_id: self.person_id,
                last_error: self.last_error,
                ..Projection::default()
            };
        };
        Projection {
            person_id: Some(key.0),
            date: Some(key.1),
            groups: group_entries(self.entries(key), &self.empty_groups.for_date(key.1)),
            drafts: self
                .form
                .as_ref()
                .map(|form| form.drafts.clone())
                .unwrap_or_default(),
            dirty: self.form_dirty,
            busy: self.is_busy(key),
            last_error: self.last_error,
        }
    }
}
