//! Per-user asynchronous lock table.
//!
//! Serializes all balance reads and mutations for one user: a second
//! request for the same user waits on the first's lock instead of
//! computing from a stale pre-image, the classic double-spend race.
//! Different users never contend. A multi-instance deployment replaces
//! this with a distributed lock or a transactional read at the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

use pairplay_types::UserId;

/// Map from user to that user's serialization lock.
#[derive(Default)]
pub struct LockTable {
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl LockTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for one user, created on first use.
    ///
    /// The inner `std` mutex only guards the map itself and is never held
    /// across an await point.
    #[must_use]
    pub fn user_lock(&self, user_id: UserId) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(locks.entry(user_id).or_default())
    }

    /// Number of users with a lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn same_user_gets_same_lock() {
        let table = LockTable::new();
        let user = UserId::new();
        let a = table.user_lock(user);
        let b = table.user_lock(user);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn different_users_get_different_locks() {
        let table = LockTable::new();
        let a = table.user_lock(UserId::new());
        let b = table.user_lock(UserId::new());
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn lock_serializes_critical_sections() {
        let table = Arc::new(LockTable::new());
        let user = UserId::new();
        let in_section = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let table = Arc::clone(&table);
            let in_section = Arc::clone(&in_section);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let lock = table.user_lock(user);
                let _guard = lock.lock().await;
                let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1, "critical section overlapped");
    }
}
