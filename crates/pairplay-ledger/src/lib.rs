//! # pairplay-ledger
//!
//! **Ledger plane**: the authoritative per-user financial state.
//!
//! ## Architecture
//!
//! 1. **store**: `AccountStore` trait + in-memory implementation, the
//!    swap point for a transactional store in multi-instance deployments
//! 2. **lock_table**: per-user async mutex table; every balance read and
//!    mutation for one user observes a total order
//! 3. **journal**: append-only transaction log with replay-protected
//!    timestamps and daily / rolling aggregates
//! 4. **ledger**: the atomic operations themselves, with corrupted-state
//!    self-healing
//!
//! ## Atomicity model
//!
//! Each public `Ledger` operation is independently atomic: it acquires the
//! user's lock, re-reads the stored pre-image, validates, writes, and
//! journals, all before releasing. No multi-step read/compute/write
//! sequence is ever exposed to interleaving.

pub mod journal;
pub mod ledger;
pub mod lock_table;
pub mod store;

pub use journal::{DepositStats, TransactionJournal};
pub use ledger::Ledger;
pub use lock_table::LockTable;
pub use store::{AccountStore, MemoryStore};
