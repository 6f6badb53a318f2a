use chrono::NaiveDate;
use lift_core::entities::{EntryDraft, Group};
use lift_core::enums::ErrorKind;
use lift_core::ids::PersonId;
use serde::Serialize;

/// What the UI renders for the open day.
///
/// Published on every state change of the current context. A fresh value
/// replaces the previous one; there is no partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub person_id: Option<PersonId>,
    pub date: Option<NaiveDate>,
    pub groups: Vec<Group>,
    pub drafts: Vec<EntryDraft>,
    /// The form has edits not yet saved.
    pub dirty: bool,
    /// A write for the open day is in flight or queued.
    pub busy: bool,
    pub last_error: Option<ErrorKind>,
}

impl Projection {
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }
}
