//! Compute new placement for a dragged entry.
//!
//! Pure: takes a snapshot of one day's entries and returns the snapshot after
//! the drop plus the minimal `(id, order_index)` batch that persists it.

use std::collections::HashMap;

use lift_core::entities::{OrderUpdate, WorkoutEntry};
use lift_core::ids::EntryId;

use crate::error::ReorderError;

/// Result of dropping one entry somewhere on its day.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderOutcome {
    /// Every input entry, with affected ones moved and re-indexed.
    pub entries: Vec<WorkoutEntry>,
    /// One update per entry in the affected group(s), in final order.
    pub updates: Vec<OrderUpdate>,
    pub source_group: u32,
    pub destination_group: u32,
    /// False when the drop left every entry where it was.
    pub changed: bool,
}

/// Move `source_id` to `destination_position` within `destination_group`.
///
/// The position is the entry's final index inside the destination group and
/// is clamped to the group's length; `None` appends. Only the source and
/// destination groups are re-indexed, each to the dense range `0..n`. Entries
/// on other dates or in other groups are returned unchanged.
///
/// # Errors
///
/// Returns `ReorderError::EntryNotFound` if no entry has `source_id`, or
/// `ReorderError::InvalidGroup` for group 0.
pub fn reorder(
    entries: &[WorkoutEntry],
    source_id: EntryId,
    destination_group: u32,
    destination_position: Option<usize>,
) -> Result<ReorderOutcome, ReorderError> {
    if destination_group == 0 {
        return Err(ReorderError::InvalidGroup);
    }
    let source = entries
        .iter()
        .find(|e| e.id == source_id)
        .ok_or(ReorderError::EntryNotFound(source_id))?;
    let date = source.date;
    let source_group = source.group_number;

    let bucket = |group_number: u32| -> Vec<WorkoutEntry> {
        let mut members: Vec<WorkoutEntry> = entries
            .iter()
            .filter(|e| e.bucket() == (date, group_number))
            .cloned()
            .collect();
        members.sort_by_key(|e| (e.order_index, e.id));
        members
    };

    let mut source_bucket = bucket(source_group);
    let from = source_bucket
        .iter()
        .position(|e| e.id == source_id)
        .ok_or(ReorderError::EntryNotFound(source_id))?;
    let mut moved = source_bucket.remove(from);

    let mut updates = Vec::new();
    if destination_group == source_group {
        let at = clamp_position(destination_position, source_bucket.len());
        source_bucket.insert(at, moved);
        updates.extend(reindex(&source_bucket, None));
    } else {
        moved.group_number = destination_group;
        let mut destination_bucket = bucket(destination_group);
        let at = clamp_position(destination_position, destination_bucket.len());
        destination_bucket.insert(at, moved);
        updates.extend(reindex(&source_bucket, None));
        updates.extend(reindex(
            &destination_bucket,
            Some((source_id, destination_group)),
        ));
    }

    let by_id: HashMap<EntryId, OrderUpdate> = updates.iter().map(|u| (u.id, *u)).collect();
    let mut after = entries.to_vec();
    for entry in &mut after {
        if let Some(update) = by_id.get(&entry.id) {
            update.apply_to(entry);
        }
    }
    let changed = after.as_slice() != entries;

    Ok(ReorderOutcome {
        entries: after,
        updates,
        source_group,
        destination_group,
        changed,
    })
}

/// Updates that keep `removed`'s group dense once `removed` is gone.
///
/// Only members whose index shifts get an update, so removing the last entry
/// of a group yields none.
#[must_use]
pub fn close_gap(entries: &[WorkoutEntry], removed: &WorkoutEntry) -> Vec<OrderUpdate> {
    let mut remaining: Vec<&WorkoutEntry> = entries
        .iter()
        .filter(|e| e.bucket() == removed.bucket() && e.id != removed.id)
        .collect();
    remaining.sort_by_key(|e| (e.order_index, e.id));

    (0_u32..)
        .zip(remaining)
        .filter(|(order_index, entry)| entry.order_index != *order_index)
        .map(|(order_index, entry)| OrderUpdate::new(entry.id, order_index))
        .collect()
}

fn clamp_position(position: Option<usize>, len: usize) -> usize {
    position.map_or(len, |p| p.min(len))
}

fn reindex(bucket: &[WorkoutEntry], regrouped: Option<(EntryId, u32)>) -> Vec<OrderUpdate> {
    (0_u32..)
        .zip(bucket)
        .map(|(order_index, entry)| match regrouped {
            Some((id, group_number)) if id == entry.id => {
                OrderUpdate::regrouped(id, order_index, group_number)
            }
            _ => OrderUpdate::new(entry.id, order_index),
        })
        .collect()
}
