//! Per-server serialization of configuration writes.

use crate::license_server::domain::ServerId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

/// Async mutexes keyed by server.
///
/// Writes for one server run one at a time; writes for different servers and
/// all reads proceed without waiting.
#[derive(Debug, Default)]
pub struct ServerLocks {
    locks: Mutex<HashMap<ServerId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ServerLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the caller holds the write lock for `server_id`.
    pub async fn acquire(&self, server_id: ServerId) -> OwnedMutexGuard<()> {
        let lock = {
            // The table only holds handles, so a poisoned guard is still usable.
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(server_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drops the lock entry of a deleted server.
    pub fn forget(&self, server_id: ServerId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.remove(&server_id);
    }

    /// Returns how many servers currently have a lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when no server has a lock entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
