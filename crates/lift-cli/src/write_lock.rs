//! One writing `lift` process per database.
//!
//! The lock is a `<database>.lock` file created with `create_new`. It records
//! who holds it as JSON, so a waiting process can name the command it is
//! waiting on. A holder older than [`ABANDONED_AFTER`] is taken to have
//! crashed and its file is replaced.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const WAIT_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_millis(200);
const ABANDONED_AFTER: chrono::TimeDelta = chrono::TimeDelta::minutes(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub command: String,
    pub acquired_at: DateTime<Utc>,
}

impl LockHolder {
    fn current(command: &str) -> Self {
        Self {
            pid: std::process::id(),
            command: command.to_string(),
            acquired_at: Utc::now(),
        }
    }

    fn is_abandoned(&self, now: DateTime<Utc>) -> bool {
        now - self.acquired_at > ABANDONED_AFTER
    }
}

/// Removes the lock file when dropped.
#[derive(Debug)]
pub struct WriteLock {
    path: PathBuf,
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), %error, "failed to release write lock");
        }
    }
}

#[derive(Debug)]
enum Attempt {
    Acquired(WriteLock),
    Held(LockHolder),
    /// The file exists but could not be parsed; it may be mid-write.
    Unreadable,
}

/// Lock path for the database at `db_path`.
pub fn lock_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    db_path.with_file_name(name)
}

/// Take the write lock for `db_path` on behalf of `command`, waiting for a
/// live holder to finish.
pub async fn acquire(db_path: &Path, command: &str) -> anyhow::Result<WriteLock> {
    let path = lock_path(db_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let started = std::time::Instant::now();

    loop {
        let waited_out = started.elapsed() >= WAIT_TIMEOUT;
        match try_acquire(&path, command)? {
            Attempt::Acquired(lock) => {
                tracing::debug!(path = %path.display(), command, "write lock acquired");
                return Ok(lock);
            }
            Attempt::Held(holder) if holder.is_abandoned(Utc::now()) => {
                tracing::warn!(
                    pid = holder.pid,
                    command = %holder.command,
                    since = %holder.acquired_at,
                    "replacing abandoned write lock"
                );
                remove_if_present(&path)?;
            }
            Attempt::Held(holder) if waited_out => anyhow::bail!(
                "`lift {}` (pid {}) has been writing since {}; try again once it finishes",
                holder.command,
                holder.pid,
                holder.acquired_at.format("%H:%M:%S")
            ),
            Attempt::Unreadable if waited_out => anyhow::bail!(
                "write lock {} is unreadable; delete it if no lift command is running",
                path.display()
            ),
            Attempt::Held(_) | Attempt::Unreadable => {
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

fn try_acquire(path: &Path, command: &str) -> anyhow::Result<Attempt> {
    match OpenOptions::new().create_new(true).write(true).open(path) {
        Ok(mut file) => {
            let lock = WriteLock {
                path: path.to_path_buf(),
            };
            let holder = serde_json::to_vec(&LockHolder::current(command))?;
            file.write_all(&holder)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(Attempt::Acquired(lock))
        }
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            let holder = std::fs::read(path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<LockHolder>(&bytes).ok());
            Ok(holder.map_or(Attempt::Unreadable, Attempt::Held))
        }
        Err(error) => {
            Err(error).with_context(|| format!("failed to create write lock {}", path.display()))
        }
    }
}

fn remove_if_present(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Err(error) if error.kind() != ErrorKind::NotFound => {
            Err(error).with_context(|| format!("failed to remove {}", path.display()))
        }
        _ => Ok(()),
    }
}
