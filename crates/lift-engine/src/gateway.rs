//! The persistence boundary the session engine writes through.

use lift_core::entities::{DateRange, NewWorkoutEntry, OrderUpdate, WorkoutEntry};
use lift_core::ids::{EntryId, PersonId};

use crate::error::GatewayError;

/// Asynchronous store of workout entries.
///
/// Each call either succeeds or fails as a unit. The engine never assumes two
/// calls are atomic together; `batch_reorder` is the only multi-row call and
/// implementations must apply it all-or-nothing.
#[allow(async_fn_in_trait)]
pub trait PersistenceGateway {
    /// Persist a new entry and return its assigned id.
    async fn create_entry(&self, entry: &NewWorkoutEntry) -> Result<EntryId, GatewayError>;

    async fn delete_entry(&self, id: EntryId) -> Result<(), GatewayError>;

    /// Rewrite order indices (and group, where set) for several entries at once.
    async fn batch_reorder(&self, updates: &[OrderUpdate]) -> Result<(), GatewayError>;

    /// Every entry for `person_id` whose date falls in `range`.
    async fn fetch_entries(
        &self,
        person_id: PersonId,
        range: DateRange,
    ) -> Result<Vec<WorkoutEntry>, GatewayError>;
}
