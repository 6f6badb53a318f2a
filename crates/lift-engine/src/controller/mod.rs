//! The session controller: optimistic edits over a persistence gateway.
//!
//! Every change is applied to the local entry store first and published as a
//! fresh [`Projection`]. The gateway calls happen afterwards. If the first
//! call fails the change is undone; if a later one fails the day is reloaded.
//! Either way the error kind lands on the projection.
//!
//! Writes to one `(person, date)` are serialized. Reads and writes for other
//! days proceed independently. The state mutex is never held across an await.

mod locks;
mod projection;
mod state;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use lift_core::entities::{DateRange, DraftDefaults, DraftUpdate, Group, WorkoutEntry};
use lift_core::ids::{EntryId, PersonId};
use serde::Serialize;
use tokio::sync::watch;

use crate::command::{Command, CommitFailure};
use crate::error::{FailedOperation, GatewayError, SessionError};
use crate::gateway::PersistenceGateway;
use crate::grouping::group_entries;
use crate::reconcile::{Reconciler, SessionPlan};
use crate::reorder::reorder;

pub use projection::Projection;
use locks::DayLocks;
use state::{EditorState, Ticket};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub draft_defaults: DraftDefaults,
}

/// Outcome of a successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub deleted: Vec<EntryId>,
    pub inserted: Vec<EntryId>,
    pub reordered: usize,
}

impl SaveReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.inserted.is_empty() && self.reordered == 0
    }

    /// Gateway calls that went through.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.deleted.len() + self.inserted.len() + usize::from(self.reordered > 0)
    }
}

struct Inner<G> {
    gateway: G,
    options: SessionOptions,
    state: Mutex<EditorState>,
    locks: DayLocks,
    projection: watch::Sender<Projection>,
}

/// Cheap to clone; clones share one editor.
pub struct SessionController<G> {
    inner: Arc<Inner<G>>,
}

impl<G> Clone for SessionController<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Keeps a day marked busy until the operation holding it returns.
struct PendingGuard<'a, G> {
    controller: &'a SessionController<G>,
    ticket: Ticket,
}

impl<G> Drop for PendingGuard<'_, G> {
    fn drop(&mut self) {
        let mut state = self.controller.lock_state();
        state.end_pending(self.ticket.key);
        self.controller.publish_if_current(&state, &self.ticket);
    }
}

// ---------------------------------------------------------------------------
// State plumbing
// ---------------------------------------------------------------------------

impl<G> SessionController<G> {
    #[must_use]
    pub fn new(gateway: G, options: SessionOptions) -> Self {
        let (projection, _) = watch::channel(Projection::default());
        Self {
            inner: Arc::new(Inner {
                gateway,
                options,
                state: Mutex::new(EditorState::default()),
                locks: DayLocks::default(),
                projection,
            }),
        }
    }

    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    /// Receive every projection published from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Projection> {
        self.inner.projection.subscribe()
    }

    /// The projection for the current context, computed now.
    #[must_use]
    pub fn projection(&self) -> Projection {
        self.lock_state().projection()
    }

    fn lock_state(&self) -> MutexGuard<'_, EditorState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn defaults(&self) -> DraftDefaults {
        self.inner.options.draft_defaults
    }

    fn publish(&self, state: &EditorState) {
        self.inner.projection.send_replace(state.projection());
    }

    fn publish_if_current(&self, state: &EditorState, ticket: &Ticket) {
        if state.is_current(ticket) {
            self.publish(state);
        } else {
            tracing::debug!(date = %ticket.date(), "context changed; result not published");
        }
    }

    fn record_error(
        &self,
        state: &mut EditorState,
        ticket: &Ticket,
        error: SessionError,
    ) -> SessionError {
        if state.is_current(ticket) {
            state.last_error = Some(error.kind());
        }
        self.publish_if_current(state, ticket);
        error
    }

    fn begin_pending(&self, ticket: Ticket) -> PendingGuard<'_, G> {
        let mut state = self.lock_state();
        state.begin_pending(ticket.key);
        self.publish_if_current(&state, &ticket);
        PendingGuard {
            controller: self,
            ticket,
        }
    }

    fn current_ticket(&self) -> Result<Ticket, SessionError> {
        self.lock_state().ticket()
    }

    /// Run a synchronous edit against the open form.
    fn edit_form(
        &self,
        edit: impl FnOnce(&mut EditorState) -> Result<(), SessionError>,
    ) -> Result<Projection, SessionError> {
        let mut state = self.lock_state();
        if state.form.is_none() {
            return Err(SessionError::NoDayOpen);
        }
        match edit(&mut state) {
            Ok(()) => {
                state.form_dirty = true;
                state.last_error = None;
                self.publish(&state);
                Ok(state.projection())
            }
            Err(error) => {
                state.last_error = Some(error.kind());
                self.publish(&state);
                Err(error)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Context
    // -----------------------------------------------------------------------

    /// Switch to another person. Closes any open day.
    pub fn select_person(&self, person_id: PersonId) -> Projection {
        let mut state = self.lock_state();
        state.switch_context(Some(person_id), None);
        tracing::debug!(%person_id, "person selected");
        self.publish(&state);
        state.projection()
    }

    /// Close the open day, discarding unsaved edits and empty groups.
    pub fn close_day(&self) -> Projection {
        let mut state = self.lock_state();
        let person_id = state.person_id;
        state.switch_context(person_id, None);
        self.publish(&state);
        state.projection()
    }

    // -----------------------------------------------------------------------
    // Draft edits
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// `NoDayOpen`, or `Draft` if `index` is out of range.
    pub fn update_draft(
        &self,
        index: usize,
        update: DraftUpdate,
    ) -> Result<Projection, SessionError> {
        self.edit_form(|state| {
            let form = state.form.as_mut().ok_or(SessionError::NoDayOpen)?;
            form.update_row(index, update)?;
            Ok(())
        })
    }

    /// # Errors
    ///
    /// `NoDayOpen` if no day is open.
    pub fn add_draft_row(&self) -> Result<Projection, SessionError> {
        let defaults = self.defaults();
        self.edit_form(|state| {
            let form = state.form.as_mut().ok_or(SessionError::NoDayOpen)?;
            form.add_row(defaults);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// `NoDayOpen`, or `Draft` if `index` is out of range.
    pub fn remove_draft_row(&self, index: usize) -> Result<Projection, SessionError> {
        self.edit_form(|state| {
            let form = state.form.as_mut().ok_or(SessionError::NoDayOpen)?;
            form.remove_row(index)?;
            Ok(())
        })
    }

    /// Add an empty group to the open day and return its number.
    ///
    /// The group lives only on this controller until an entry is dragged in.
    ///
    /// # Errors
    ///
    /// `NoPersonSelected` or `NoDayOpen`.
    pub fn create_group(&self) -> Result<u32, SessionError> {
        let mut state = self.lock_state();
        let ticket = state.ticket()?;
        let entries = state.entries(ticket.key).to_vec();
        let number = state.empty_groups.create_group(ticket.date(), &entries);
        tracing::debug!(date = %ticket.date(), group = number, "empty group created");
        self.publish(&state);
        Ok(number)
    }
}

// ---------------------------------------------------------------------------
// Gateway-backed operations
// ---------------------------------------------------------------------------

impl<G: PersistenceGateway> SessionController<G> {
    /// Open `date` for the selected person and load its entries.
    ///
    /// # Errors
    ///
    /// `NoPersonSelected`, or `Fetch` if loading fails. On a fetch failure
    /// the day stays open with whatever the store already held.
    pub async fn open_day(&self, date: NaiveDate) -> Result<Projection, SessionError> {
        let ticket = {
            let mut state = self.lock_state();
            let person_id = state.person_id.ok_or(SessionError::NoPersonSelected)?;
            state.switch_context(Some(person_id), Some(date));
            state.ticket()?
        };
        tracing::debug!(%date, "opening day");

        {
            let _pending = self.begin_pending(ticket);
            let _day = self.inner.locks.acquire(ticket.key).await;
            let fetched = self
                .inner
                .gateway
                .fetch_entries(ticket.person_id(), DateRange::single(date))
                .await;

            let mut state = self.lock_state();
            let result = match fetched {
                Ok(entries) => {
                    state.replace_day(ticket.key, entries);
                    Ok(())
                }
                Err(source) => {
                    tracing::warn!(%date, error = %source, "failed to load day");
                    Err(SessionError::Fetch(source))
                }
            };
            state.refresh_form(ticket.key, self.defaults());
            if let Err(error) = result {
                return Err(self.record_error(&mut state, &ticket, error));
            }
            self.publish_if_current(&state, &ticket);
        }
        Ok(self.projection())
    }

    /// Drop `source_id` at `destination_position` inside `destination_group`.
    ///
    /// The move shows up immediately. A failed persist restores the day as it
    /// was before the drag.
    ///
    /// # Errors
    ///
    /// `Reorder` for an unknown entry or group 0, `RolledBack` if the gateway
    /// rejected the batch.
    pub async fn begin_drag(
        &self,
        source_id: EntryId,
        destination_group: u32,
        destination_position: Option<usize>,
    ) -> Result<Projection, SessionError> {
        let ticket = self.current_ticket()?;
        self.run_command(ticket, |entries| {
            let outcome = reorder(entries, source_id, destination_group, destination_position)?;
            if outcome.changed {
                Ok(Some(Command::reorder(ticket.date(), entries, outcome)))
            } else {
                Ok(None)
            }
        })
        .await?;
        Ok(self.projection())
    }

    /// Remove one entry from the open day and close the gap in its group.
    ///
    /// # Errors
    ///
    /// `EntryNotFound` if the entry is not on the open day, `RolledBack` if
    /// the gateway rejected the delete, `Interrupted` if the delete went
    /// through but the follow-up reorder did not.
    pub async fn delete_entry(&self, id: EntryId) -> Result<Projection, SessionError> {
        let ticket = self.current_ticket()?;
        self.run_command(ticket, |entries| {
            Command::delete(ticket.date(), entries, id)
                .map(Some)
                .ok_or(SessionError::EntryNotFound(id))
        })
        .await?;
        Ok(self.projection())
    }

    /// Persist the open form.
    ///
    /// Plans the minimal set of calls, runs them one at a time, then reloads
    /// the day. A failure stops the run; calls already made stay made and the
    /// day is reloaded so the store matches the backend.
    ///
    /// # Errors
    ///
    /// `Reconcile` for an invalid form or an unconfirmed clear, `SaveFailed`
    /// when a gateway call fails.
    pub async fn save_session(&self, confirmed_clear: bool) -> Result<SaveReport, SessionError> {
        let ticket = self.current_ticket()?;
        let _pending = self.begin_pending(ticket);
        let _day = self.inner.locks.acquire(ticket.key).await;

        let plan = {
            let mut state = self.lock_state();
            if !state.is_current(&ticket) {
                return Err(SessionError::NoDayOpen);
            }
            let form = state.form.clone().ok_or(SessionError::NoDayOpen)?;
            let reconciler = Reconciler::new(ticket.person_id(), self.defaults());
            let planned = reconciler.plan(&form, state.entries(ticket.key), confirmed_clear);
            match planned {
                Ok(plan) => plan,
                Err(error) => {
                    tracing::debug!(date = %ticket.date(), %error, "save refused");
                    return Err(self.record_error(&mut state, &ticket, error.into()));
                }
            }
        };

        if plan.is_empty() {
            let mut state = self.lock_state();
            state.form_dirty = false;
            state.last_error = None;
            self.publish(&state);
            return Ok(SaveReport::default());
        }

        tracing::info!(
            date = %ticket.date(),
            deletes = plan.to_delete.len(),
            inserts = plan.to_insert.len(),
            reorders = plan.to_reorder.len(),
            "saving session"
        );
        let mut report = SaveReport::default();
        let executed = self.execute_plan(&plan, &mut report).await;
        let refreshed = self
            .inner
            .gateway
            .fetch_entries(ticket.person_id(), DateRange::single(ticket.date()))
            .await;

        let mut state = self.lock_state();
        match executed {
            Ok(()) => {
                let entries = refreshed.unwrap_or_else(|error| {
                    tracing::warn!(%error, "reload after save failed; using local result");
                    let mut local = state.entries(ticket.key).to_vec();
                    plan.apply_to(&mut local, &report.inserted);
                    local
                });
                state.replace_day(ticket.key, entries);
                if state.is_current(&ticket) {
                    state.form_dirty = false;
                    state.last_error = None;
                }
                state.refresh_form(ticket.key, self.defaults());
                self.publish_if_current(&state, &ticket);
                Ok(report)
            }
            Err((failed, source)) => {
                tracing::warn!(
                    %failed,
                    error = %source,
                    completed = report.completed(),
                    "save failed"
                );
                let resynced = match refreshed {
                    Ok(entries) => {
                        state.replace_day(ticket.key, entries);
                        true
                    }
                    Err(error) => {
                        tracing::warn!(%error, "reload after failed save also failed");
                        false
                    }
                };
                let error = SessionError::SaveFailed {
                    failed,
                    completed: report.completed(),
                    resynced,
                    source,
                };
                Err(self.record_error(&mut state, &ticket, error))
            }
        }
    }

    /// Load every day in `range` for the selected person, grouped.
    ///
    /// Days with a write in flight, or written to while the fetch ran, keep
    /// their local entries.
    ///
    /// # Errors
    ///
    /// `NoPersonSelected`, or `Fetch` if loading fails.
    pub async fn fetch_range(
        &self,
        range: DateRange,
    ) -> Result<BTreeMap<NaiveDate, Vec<Group>>, SessionError> {
        let (person_id, generation, revisions) = {
            let state = self.lock_state();
            let person_id = state.person_id.ok_or(SessionError::NoPersonSelected)?;
            let revisions: BTreeMap<NaiveDate, u64> = range
                .days()
                .map(|date| (date, state.revision((person_id, date))))
                .collect();
            (person_id, state.generation, revisions)
        };

        let fetched = self.inner.gateway.fetch_entries(person_id, range).await;
        let mut state = self.lock_state();
        let ticket = Ticket {
            key: (person_id, range.start),
            generation,
        };
        let fetched = match fetched {
            Ok(entries) => entries,
            Err(source) => {
                tracing::warn!(
                    start = %range.start,
                    end = %range.end,
                    error = %source,
                    "failed to load range"
                );
                return Err(self.record_error(&mut state, &ticket, SessionError::Fetch(source)));
            }
        };

        let mut by_date: BTreeMap<NaiveDate, Vec<WorkoutEntry>> =
            range.days().map(|date| (date, Vec::new())).collect();
        for entry in fetched {
            if let Some(day) = by_date.get_mut(&entry.date) {
                day.push(entry);
            }
        }

        let mut view = BTreeMap::new();
        for (date, entries) in by_date {
            let key = (person_id, date);
            let untouched = revisions.get(&date) == Some(&state.revision(key));
            if (untouched || !state.holds_day(key)) && !state.is_busy(key) {
                state.replace_day(key, entries);
                state.refresh_form(key, self.defaults());
            }
            let placeholders = if state.open_key() == Some(key) {
                state.empty_groups.for_date(date)
            } else {
                BTreeSet::new()
            };
            view.insert(date, group_entries(state.entries(key), &placeholders));
        }
        self.publish_if_current(&state, &ticket);
        Ok(view)
    }

    /// Apply `build`'s command locally, persist it, and undo it on failure.
    async fn run_command<F>(&self, ticket: Ticket, build: F) -> Result<(), SessionError>
    where
        F: FnOnce(&[WorkoutEntry]) -> Result<Option<Command>, SessionError>,
    {
        let _pending = self.begin_pending(ticket);
        let _day = self.inner.locks.acquire(ticket.key).await;

        let (command, filled) = {
            let mut state = self.lock_state();
            let built = build(state.entries(ticket.key));
            let command = match built {
                Ok(Some(command)) => command,
                Ok(None) => return Ok(()),
                Err(error) => return Err(self.record_error(&mut state, &ticket, error)),
            };
            let filled = state.apply_command(ticket.key, &command);
            state.refresh_form(ticket.key, self.defaults());
            self.publish_if_current(&state, &ticket);
            (command, filled)
        };

        tracing::debug!(operation = command.name(), date = %command.date(), "persisting change");
        let committed = command.commit(&self.inner.gateway).await;
        // Part of the change is already stored, so undoing it locally would lie.
        let refreshed = match &committed {
            Err(failure) if failure.completed > 0 => Some(
                self.inner
                    .gateway
                    .fetch_entries(ticket.person_id(), DateRange::single(ticket.date()))
                    .await,
            ),
            _ => None,
        };

        let mut state = self.lock_state();
        let Err(CommitFailure { completed, source }) = committed else {
            if state.is_current(&ticket) {
                state.last_error = None;
            }
            self.publish_if_current(&state, &ticket);
            return Ok(());
        };

        let error = if completed == 0 {
            tracing::warn!(operation = command.name(), error = %source, "rolling back");
            state.undo_command(&ticket, &command, &filled);
            SessionError::RolledBack {
                operation: command.name(),
                source,
            }
        } else {
            tracing::warn!(
                operation = command.name(),
                completed,
                error = %source,
                "change interrupted; reloading day"
            );
            let resynced = match refreshed {
                Some(Ok(entries)) => {
                    state.replace_day(ticket.key, entries);
                    true
                }
                Some(Err(error)) => {
                    tracing::warn!(%error, "reload after interrupted change failed");
                    false
                }
                None => false,
            };
            SessionError::Interrupted {
                operation: command.name(),
                completed,
                resynced,
                source,
            }
        };
        state.refresh_form(ticket.key, self.defaults());
        Err(self.record_error(&mut state, &ticket, error))
    }

    /// Deletes, then inserts, then one reorder batch. Stops at the first
    /// failure.
    async fn execute_plan(
        &self,
        plan: &SessionPlan,
        report: &mut SaveReport,
    ) -> Result<(), (FailedOperation, GatewayError)> {
        let gateway = &self.inner.gateway;
        for &id in &plan.to_delete {
            gateway
                .delete_entry(id)
                .await
                .map_err(|error| (FailedOperation::Delete(id), error))?;
            report.deleted.push(id);
        }
        for entry in &plan.to_insert {
            let id = gateway
                .create_entry(entry)
                .await
                .map_err(|error| (FailedOperation::Insert(entry.exercise_id), error))?;
            report.inserted.push(id);
        }
        if !plan.to_reorder.is_empty() {
            let updates = plan.to_reorder.len();
            gateway
                .batch_reorder(&plan.to_reorder)
                .await
                .map_err(|error| (FailedOperation::Reorder { updates }, error))?;
            report.reordered = updates;
        }
        Ok(())
    }
}
