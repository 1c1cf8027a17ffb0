//! Append-only transaction records and the timestamp replay policy.
//!
//! Every balance-affecting event produces exactly one immutable
//! [`Transaction`] row carrying the pre- and post-mutation balance, so the
//! journal alone can reconstruct any account.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TS_MAX_FUTURE_SECS, DEFAULT_TS_MAX_PAST_SECS};
use crate::error::{PairplayError, Result};
use crate::ids::{TransactionId, UserId};

/// The kind of balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Stake debited at game start.
    StakeDebit,
    /// Validated winnings credited as earnings.
    WinningsCredit,
    /// Promotional credit (never withdrawable).
    BonusCredit,
    /// External deposit landed.
    Deposit,
    /// Withdrawal handed to the payment collaborator.
    Withdrawal,
    /// Operator balance adjustment.
    BalanceAdjust,
}

/// Immutable journal row. Created for every balance mutation; never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Replay-protection bounds on transaction timestamps.
///
/// An explicit policy object rather than constants scattered across call
/// sites: a record stamped far in the past (replayed) or the future
/// (backdated against a later audit) is rejected before it reaches the
/// journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampPolicy {
    /// Maximum allowed age, in seconds.
    pub max_past_secs: i64,
    /// Maximum allowed clock skew into the future, in seconds.
    pub max_future_secs: i64,
}

impl Default for TimestampPolicy {
    fn default() -> Self {
        Self {
            max_past_secs: DEFAULT_TS_MAX_PAST_SECS,
            max_future_secs: DEFAULT_TS_MAX_FUTURE_SECS,
        }
    }
}

impl TimestampPolicy {
    /// Validate a timestamp against the window around `now`.
    pub fn validate(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        let drift = (now - created_at).num_seconds();
        if created_at < now - Duration::seconds(self.max_past_secs)
            || created_at > now + Duration::seconds(self.max_future_secs)
        {
            return Err(PairplayError::TimestampOutOfBounds { drift_secs: drift });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_timestamp_passes() {
        let policy = TimestampPolicy::default();
        let now = Utc::now();
        assert!(policy.validate(now, now).is_ok());
    }

    #[test]
    fn slightly_old_timestamp_passes() {
        let policy = TimestampPolicy::default();
        let now = Utc::now();
        assert!(policy.validate(now - Duration::seconds(60), now).is_ok());
    }

    #[test]
    fn far_past_timestamp_rejected() {
        let policy = TimestampPolicy::default();
        let now = Utc::now();
        let err = policy
            .validate(now - Duration::seconds(3600), now)
            .unwrap_err();
        assert!(matches!(err, PairplayError::TimestampOutOfBounds { .. }));
    }

    #[test]
    fn far_future_timestamp_rejected() {
        let policy = TimestampPolicy::default();
        let now = Utc::now();
        let err = policy
            .validate(now + Duration::seconds(600), now)
            .unwrap_err();
        assert!(matches!(err, PairplayError::TimestampOutOfBounds { .. }));
    }

    #[test]
    fn custom_bounds_respected() {
        let policy = TimestampPolicy {
            max_past_secs: 10,
            max_future_secs: 0,
        };
        let now = Utc::now();
        assert!(policy.validate(now - Duration::seconds(5), now).is_ok());
        assert!(policy.validate(now - Duration::seconds(30), now).is_err());
        assert!(policy.validate(now + Duration::seconds(5), now).is_err());
    }

    #[test]
    fn transaction_serde_roundtrip() {
        let tx = Transaction {
            id: TransactionId::new(),
            user_id: UserId::new(),
            kind: TransactionKind::WinningsCredit,
            amount: Decimal::new(2500, 2),
            balance_before: Decimal::new(1000, 2),
            balance_after: Decimal::new(3500, 2),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }
}
