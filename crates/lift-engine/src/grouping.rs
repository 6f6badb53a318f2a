//! Partition one day's entries into numbered groups.
//!
//! Groups are derived, never stored. An empty group only exists as a
//! client-side placeholder in [`EmptyGroups`] until an entry lands in it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use lift_core::entities::{Group, WorkoutEntry};

/// Group `entries` by `group_number`, adding an empty group for each
/// placeholder number that has no entries.
///
/// Groups come back in ascending number order; entries within a group in
/// ascending `order_index`, ties broken by id.
#[must_use]
pub fn group_entries(entries: &[WorkoutEntry], placeholders: &BTreeSet<u32>) -> Vec<Group> {
    let mut buckets: BTreeMap<u32, Vec<WorkoutEntry>> = BTreeMap::new();
    for entry in entries {
        buckets
            .entry(entry.group_number)
            .or_default()
            .push(entry.clone());
    }
    for &number in placeholders {
        buckets.entry(number).or_default();
    }

    buckets
        .into_iter()
        .map(|(group_number, mut entries)| {
            entries.sort_by_key(|e| (e.order_index, e.id));
            Group {
                group_number,
                entries,
            }
        })
        .collect()
}

/// Highest group number any entry uses, or 0 for an empty day.
#[must_use]
pub fn max_group_number(entries: &[WorkoutEntry]) -> u32 {
    entries.iter().map(|e| e.group_number).max().unwrap_or(0)
}

/// Per-date set of group numbers the user created but has not filled yet.
#[derive(Debug, Clone, Default)]
pub struct EmptyGroups {
    by_date: BTreeMap<NaiveDate, BTreeSet<u32>>,
}

impl EmptyGroups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder numbers for `date`.
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> BTreeSet<u32> {
        self.by_date.get(&date).cloned().unwrap_or_default()
    }

    /// Add a placeholder one past every number in use on `date`, counting
    /// both entries and existing placeholders. Returns the new number.
    pub fn create_group(&mut self, date: NaiveDate, entries: &[WorkoutEntry]) -> u32 {
        let placeholders = self.by_date.entry(date).or_default();
        let highest = placeholders
            .last()
            .copied()
            .unwrap_or(0)
            .max(max_group_number(entries));
        let number = highest + 1;
        placeholders.insert(number);
        number
    }

    /// Drop placeholders for `date` that now have entries. Returns the
    /// numbers removed.
    pub fn collect_garbage(&mut self, date: NaiveDate, entries: &[WorkoutEntry]) -> Vec<u32> {
        let Some(placeholders) = self.by_date.get_mut(&date) else {
            return Vec::new();
        };
        let used: BTreeSet<u32> = entries.iter().map(|e| e.group_number).collect();
        let removed: Vec<u32> = placeholders.intersection(&used).copied().collect();
        for number in &removed {
            placeholders.remove(number);
        }
        if placeholders.is_empty() {
            self.by_date.remove(&date);
        }
        removed
    }

    /// Put back placeholders removed by a change that was later undone.
    pub fn restore(&mut self, date: NaiveDate, numbers: &[u32], entries: &[WorkoutEntry]) {
        let used: BTreeSet<u32> = entries.iter().map(|e| e.group_number).collect();
        for number in numbers.iter().filter(|n| !used.contains(n)) {
            self.by_date.entry(date).or_default().insert(*number);
        }
    }

    pub fn clear(&mut self) {
        self.by_date.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
