//! `PersistenceGateway` over the libSQL repository.

use lift_core::entities::{DateRange, NewWorkoutEntry, OrderUpdate, WorkoutEntry};
use lift_core::ids::{EntryId, PersonId};
use lift_engine::{GatewayError, PersistenceGateway};

use crate::service::LiftService;

impl PersistenceGateway for LiftService {
    async fn create_entry(&self, entry: &NewWorkoutEntry) -> Result<EntryId, GatewayError> {
        Ok(self.insert_entry(entry).await?.id)
    }

    async fn delete_entry(&self, id: EntryId) -> Result<(), GatewayError> {
        if !self.remove_entry(id).await? {
            tracing::debug!(%id, "delete of an entry that was already gone");
        }
        Ok(())
    }

    async fn batch_reorder(&self, updates: &[OrderUpdate]) -> Result<(), GatewayError> {
        if updates.is_empty() {
            return Ok(());
        }
        self.reorder_entries(updates).await?;
        Ok(())
    }

    async fn fetch_entries(
        &self,
        person_id: PersonId,
        range: DateRange,
    ) -> Result<Vec<WorkoutEntry>, GatewayError> {
        Ok(self.list_entries(person_id, range).await?)
    }
}
