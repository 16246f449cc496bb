//! Per-user exclusive access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex, MutexGuard, PoisonError};

use common::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = HashMap<UserId, Arc<Mutex<()>>>;

/// One async mutex per user, created on first use.
///
/// Operations for different users never wait on each other. An entry lives
/// only while some operation holds or waits for that user's lock, so the
/// registry holds at most one entry per concurrently active user.
#[derive(Clone, Default)]
pub struct UserLocks {
    // Never held across an await.
    locks: Arc<SyncMutex<LockMap>>,
}

/// Held while an operation owns a user's aggregates. Released on drop.
pub struct UserGuard {
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<SyncMutex<LockMap>>,
}

impl UserGuard {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        // Release first so the entry's only remaining owner is the map,
        // unless another operation is already waiting on it.
        drop(self.guard.take());

        let mut locks = lock_map(&self.locks);
        if let Some(lock) = locks.get(&self.user_id)
            && Arc::strong_count(lock) == 1
        {
            locks.remove(&self.user_id);
        }
    }
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other operation holds `user_id`, then takes it.
    pub async fn acquire(&self, user_id: UserId) -> UserGuard {
        let lock = Arc::clone(lock_map(&self.locks).entry(user_id).or_default());
        UserGuard {
            user_id,
            guard: Some(lock.lock_owned().await),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of users currently holding or waiting for their lock.
    pub fn len(&self) -> usize {
        lock_map(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_map(locks: &SyncMutex<LockMap>) -> MutexGuard<'_, LockMap> {
    // The map stays consistent even if a holder panicked.
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}
