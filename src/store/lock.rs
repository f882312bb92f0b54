//! Per-path lock table
//!
//! Every resolved document path gets its own async mutex, created the first
//! time the path is touched. Waiters queue on that mutex and are woken in
//! arrival order, so operations on one path run strictly one after another
//! while different paths never contend.
//!
//! Locks are in-memory only: they do not survive a restart and do not guard
//! against other processes touching the same files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Exclusive access to one document path; released on drop
pub type PathGuard = OwnedMutexGuard<()>;

/// Table mapping physical paths to their mutual-exclusion primitive
#[derive(Debug, Default)]
pub struct LockTable {
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl LockTable {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `path`.
    ///
    /// The returned guard releases the path when dropped, which covers every
    /// early return and error path in the caller.
    pub async fn acquire(&self, path: &Path) -> PathGuard {
        let lock = self.lock_for(path);
        lock.lock_owned().await
    }

    /// Whether `path` is currently held by some operation
    pub fn is_locked(&self, path: &Path) -> bool {
        let locks = self.locks.lock();
        locks
            .get(path)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of distinct paths ever locked through this table
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Whether no path has been locked yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_for(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        // The sync map lock is never held across an await
        let mut locks = self.locks.lock();
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
