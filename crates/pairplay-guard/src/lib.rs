//! # pairplay-guard
//!
//! Hard gate in front of every money movement. The guard canonicalizes
//! client amounts, enforces per-operation ranges and the daily withdrawal
//! cap, and watches deposit velocity for anomalies. It is advisory about
//! balances: the [`pairplay_ledger::Ledger`] re-validates under the
//! per-user lock, so a stale guard answer can delay an operation but
//! never corrupt one.
//!
//! ```text
//!   client amount ──> FinancialGuard ──ok──> Ledger (authoritative)
//!                          │
//!                          └─rejected──> PairplayError (server-computed
//!                                        figures only, never an echo of
//!                                        the client's value)
//! ```

pub mod deposit_watch;
pub mod guard;

pub use deposit_watch::DepositDecision;
pub use guard::FinancialGuard;
