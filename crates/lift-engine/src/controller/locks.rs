use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::state::DayKey;

/// One async mutex per `(person, date)`.
///
/// Writes to a day queue here, so a second command on a busy day runs only
/// after the first settles and sees its result. Different days never wait on
/// each other. Locks nobody holds or waits on are dropped on the next
/// acquire.
#[derive(Debug, Default)]
pub(crate) struct DayLocks {
    locks: Mutex<HashMap<DayKey, Arc<AsyncMutex<()>>>>,
}

impl DayLocks {
    pub(crate) async fn acquire(&self, key: DayKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|held, lock| *held == key || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
