//! # pairplay-types
//!
//! Shared types, errors, and configuration for the **PairPlay** game
//! integrity and financial ledger engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`SessionId`], [`TransactionId`]
//! - **Game model**: [`CardLayout`], [`Move`], [`LayoutDigest`]
//! - **Session model**: [`GameSession`], [`SessionStatus`], [`LayoutSecret`]
//! - **Ledger model**: [`LedgerAccount`], [`WithdrawableView`], [`BalanceSnapshot`]
//! - **Audit model**: [`Transaction`], [`TransactionKind`], [`TimestampPolicy`]
//! - **Configuration**: [`GameConfig`], [`LimitsConfig`], [`ValidationMode`]
//! - **Errors**: [`PairplayError`] with `PP_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod account;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod layout;
pub mod session;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use pairplay_types::{GameSession, LedgerAccount, Move, ...};

pub use account::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use layout::*;
pub use session::*;
pub use transaction::*;

// Constants are accessed via `pairplay_types::constants::FOO`
// (not re-exported to avoid name collisions).
