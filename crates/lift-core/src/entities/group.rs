use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entry::WorkoutEntry;

/// A numbered bucket of one date's entries, rendered together as a superset.
///
/// Derived on demand; never stored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Group {
    pub group_number: u32,
    pub entries: Vec<WorkoutEntry>,
}

impl Group {
    #[must_use]
    pub const fn placeholder(group_number: u32) -> Self {
        Self {
            group_number,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
