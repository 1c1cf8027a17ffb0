//! Account storage abstraction.
//!
//! The engine dictates the record shape; the storage technology is an
//! external collaborator. `MemoryStore` serves a single-process
//! deployment; a multi-instance deployment implements [`AccountStore`]
//! over a transactional store instead, behind the same contract.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::RwLock;

use pairplay_types::{LedgerAccount, UserId};

/// Keyed storage for ledger accounts.
///
/// Callers must hold the per-user lock (see [`crate::LockTable`]) across a
/// load/save pair; the store itself only guarantees that individual calls
/// are safe.
pub trait AccountStore: Send + Sync {
    /// Load the stored account, if one exists.
    fn load(&self, user_id: UserId) -> impl Future<Output = Option<LedgerAccount>> + Send;

    /// Persist the account record.
    fn save(&self, user_id: UserId, account: LedgerAccount) -> impl Future<Output = ()> + Send;
}

/// In-memory account store for single-process deployments and tests.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<UserId, LedgerAccount>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn load(&self, user_id: UserId) -> impl Future<Output = Option<LedgerAccount>> + Send {
        async move { self.accounts.read().await.get(&user_id).cloned() }
    }

    fn save(&self, user_id: UserId, account: LedgerAccount) -> impl Future<Output = ()> + Send {
        async move {
            self.accounts.write().await.insert(user_id, account);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn load_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.load(UserId::new()).await.is_none());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let mut acct = LedgerAccount::new(Utc::now());
        acct.balance = Decimal::new(150, 0);
        store.save(user, acct.clone()).await;
        assert_eq!(store.load(user).await, Some(acct));
    }

    #[tokio::test]
    async fn save_overwrites() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let mut acct = LedgerAccount::new(Utc::now());
        store.save(user, acct.clone()).await;
        acct.balance = Decimal::ONE;
        store.save(user, acct.clone()).await;
        assert_eq!(store.load(user).await.unwrap().balance, Decimal::ONE);
    }
}
