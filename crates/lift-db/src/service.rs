//! Service layer over [`LiftDb`].
//!
//! `LiftService` owns the database handle and a write lock. Repo methods are
//! implemented as `impl LiftService` blocks under [`crate::repos`].

use tokio::sync::{Mutex, MutexGuard};

use crate::LiftDb;
use crate::error::DatabaseError;

/// Workout-entry store backed by one libSQL connection.
///
/// Writes are serialized through `write_lock`: the connection is shared, so a
/// transaction on one day must not swallow a concurrent statement for another.
pub struct LiftService {
    db: LiftDb,
    write_lock: Mutex<()>,
}

impl LiftService {
    /// Open a local database and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = LiftDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create from an existing `LiftDb`.
    #[must_use]
    pub fn from_db(db: LiftDb) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LiftDb {
        &self.db
    }

    pub(crate) async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}
