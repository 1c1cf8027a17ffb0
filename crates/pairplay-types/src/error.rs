//! Error types for the PairPlay engine.
//!
//! All errors use the `PP_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors (safe to describe to the caller)
//! - 2xx: Conflict errors (safe to describe to the caller)
//! - 3xx: Security violations (full detail logged server-side; the caller
//!   only ever sees a generic denial, via [`PairplayError::client_message`])
//! - 4xx: Ledger / balance errors
//! - 5xx: Not-found errors
//! - 9xx: General / internal errors
//!
//! Losing a game is **not** an error; a validated loss is an ordinary
//! successful outcome.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{SessionId, UserId};

/// Coarse reason code attached to a rejected outcome claim.
///
/// Deliberately coarse: a client probing the validator must not learn which
/// specific heuristic tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionCode {
    /// The move trace is structurally invalid (bounds, ordering, duplicates,
    /// budgets, impossible timing).
    MalformedTrace,
    /// The claimed result does not agree with the server-side authority.
    ClaimMismatch,
}

impl std::fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTrace => write!(f, "MALFORMED_TRACE"),
            Self::ClaimMismatch => write!(f, "CLAIM_MISMATCH"),
        }
    }
}

/// Central error enum for all PairPlay operations.
#[derive(Debug, Error)]
pub enum PairplayError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// A monetary amount failed validation (non-positive, wrong scale, ...).
    #[error("PP_ERR_100: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// A bet is outside the configured bounds.
    #[error("PP_ERR_101: Bet out of range: allowed {min}..={max}")]
    BetOutOfRange { min: Decimal, max: Decimal },

    /// A deposit is outside the configured bounds.
    #[error("PP_ERR_102: Deposit out of range: allowed {min}..={max}")]
    DepositOutOfRange { min: Decimal, max: Decimal },

    /// A withdrawal is outside the configured bounds.
    #[error("PP_ERR_103: Withdrawal out of range: allowed {min}..={max}")]
    WithdrawalOutOfRange { min: Decimal, max: Decimal },

    /// A reported outcome was rejected. Carries only a coarse reason code.
    #[error("PP_ERR_104: Outcome rejected: {code}")]
    ClaimRejected { code: RejectionCode },

    /// The card layout is structurally invalid (wrong length or multiset).
    #[error("PP_ERR_105: Invalid layout: {reason}")]
    InvalidLayout { reason: String },

    // =================================================================
    // Conflict Errors (2xx)
    // =================================================================
    /// The user already holds an Active session.
    #[error("PP_ERR_200: User {0} already has an active session")]
    SessionAlreadyActive(UserId),

    /// The session has already reached a terminal state. Blocks claiming
    /// the same win twice.
    #[error("PP_ERR_201: Session already finalized: {0}")]
    SessionAlreadyFinalized(SessionId),

    // =================================================================
    // Security Violations (3xx): never described to the caller
    // =================================================================
    /// A session was addressed by a user who does not own it.
    #[error("PP_ERR_300: Ownership mismatch: session {session_id} does not belong to user {user_id}")]
    OwnershipMismatch {
        session_id: SessionId,
        user_id: UserId,
    },

    /// Behavioral trust score fell below the configured cutoff.
    #[error("PP_ERR_301: Trust score {score:.3} below cutoff {cutoff:.3}")]
    TrustBelowCutoff { score: f64, cutoff: f64 },

    /// The sealed envelope failed authentication on unseal.
    #[error("PP_ERR_302: Envelope authentication failed")]
    EnvelopeAuthFailed,

    /// A transaction timestamp fell outside the replay-protection window.
    #[error("PP_ERR_303: Transaction timestamp outside allowed window ({drift_secs}s drift)")]
    TimestampOutOfBounds { drift_secs: i64 },

    // =================================================================
    // Ledger / Balance Errors (4xx)
    // =================================================================
    /// Not enough spendable balance to perform the operation.
    #[error("PP_ERR_400: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// Withdrawal request exceeds the withdrawable amount.
    #[error("PP_ERR_401: Withdrawal {requested} exceeds withdrawable {withdrawable}")]
    WithdrawableExceeded {
        requested: Decimal,
        withdrawable: Decimal,
    },

    /// The daily withdrawal cap would be exceeded.
    #[error("PP_ERR_402: Daily withdrawal cap exceeded: {requested} requested, {remaining} remaining today")]
    DailyCapExceeded {
        requested: Decimal,
        remaining: Decimal,
    },

    /// The amount exceeds the absolute plausibility ceiling.
    #[error("PP_ERR_403: Amount {amount} exceeds ceiling {ceiling}")]
    AmountCeilingExceeded { amount: Decimal, ceiling: Decimal },

    /// A stored numeric field was corrupted. Self-healed by the Ledger and
    /// never propagated past it; this variant exists for internal signaling
    /// and tests.
    #[error("PP_ERR_404: Corrupted stored value in field {field}")]
    CorruptedState { field: &'static str },

    // =================================================================
    // Not-Found Errors (5xx)
    // =================================================================
    /// The session does not exist (or vanished mid-check via the reaper).
    #[error("PP_ERR_500: Session not found: {0}")]
    SessionNotFound(SessionId),

    /// No ledger account exists for the user.
    #[error("PP_ERR_501: Account not found: {0}")]
    AccountNotFound(UserId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// The OS entropy source failed. Fatal to session creation.
    #[error("PP_ERR_900: Entropy source failure: {0}")]
    EntropyFailure(String),

    /// Sealing the layout failed.
    #[error("PP_ERR_901: Seal failure: {0}")]
    SealFailure(String),

    /// Unrecoverable internal error.
    #[error("PP_ERR_902: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PP_ERR_903: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid thresholds, missing fields, etc.).
    #[error("PP_ERR_904: Configuration error: {0}")]
    Configuration(String),
}

/// Broad classification used by the propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Security,
    Ledger,
    NotFound,
    Internal,
}

impl PairplayError {
    /// Classify this error for the propagation policy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount { .. }
            | Self::BetOutOfRange { .. }
            | Self::DepositOutOfRange { .. }
            | Self::WithdrawalOutOfRange { .. }
            | Self::ClaimRejected { .. }
            | Self::InvalidLayout { .. } => ErrorKind::Validation,
            Self::SessionAlreadyActive(_) | Self::SessionAlreadyFinalized(_) => ErrorKind::Conflict,
            Self::OwnershipMismatch { .. }
            | Self::TrustBelowCutoff { .. }
            | Self::EnvelopeAuthFailed
            | Self::TimestampOutOfBounds { .. } => ErrorKind::Security,
            Self::InsufficientBalance { .. }
            | Self::WithdrawableExceeded { .. }
            | Self::DailyCapExceeded { .. }
            | Self::AmountCeilingExceeded { .. }
            | Self::CorruptedState { .. } => ErrorKind::Ledger,
            Self::SessionNotFound(_) | Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::EntropyFailure(_)
            | Self::SealFailure(_)
            | Self::Internal(_)
            | Self::Serialization(_)
            | Self::Configuration(_) => ErrorKind::Internal,
        }
    }

    /// The message safe to show the caller.
    ///
    /// Security violations collapse to a generic denial so a probing client
    /// cannot learn which detector fired. Everything else keeps its reason.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self.kind() {
            ErrorKind::Security => "request denied".to_string(),
            ErrorKind::Internal => "internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PairplayError>;
