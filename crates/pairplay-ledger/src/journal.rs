//! Append-only transaction journal.
//!
//! Every balance-affecting event lands here exactly once, keyed by user
//! and time. Rows are immutable; the journal alone can reconstruct any
//! account, and its aggregates feed the Financial Guard's daily caps and
//! deposit-velocity checks.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use pairplay_types::{Result, TimestampPolicy, Transaction, TransactionKind, UserId};

/// Rolling deposit activity for one user, for anomaly detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositStats {
    /// Deposits inside the trailing 24-hour window.
    pub count_24h: usize,
    pub volume_24h: Decimal,
    /// Deposits over the account's whole history.
    pub lifetime_count: usize,
    pub lifetime_volume: Decimal,
}

impl DepositStats {
    /// Mean historical deposit size; zero for an empty history.
    #[must_use]
    pub fn mean_deposit(&self) -> Decimal {
        if self.lifetime_count == 0 {
            Decimal::ZERO
        } else {
            self.lifetime_volume / Decimal::from(self.lifetime_count)
        }
    }
}

/// Per-user append-only transaction log.
pub struct TransactionJournal {
    entries: RwLock<HashMap<UserId, Vec<Transaction>>>,
    policy: TimestampPolicy,
}

impl TransactionJournal {
    #[must_use]
    pub fn new(policy: TimestampPolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// Append a row. The timestamp must sit inside the replay-protection
    /// window around now; no far-future or far-past entries.
    pub async fn append(&self, tx: Transaction) -> Result<()> {
        self.policy.validate(tx.created_at, Utc::now())?;
        self.entries
            .write()
            .await
            .entry(tx.user_id)
            .or_default()
            .push(tx);
        Ok(())
    }

    /// Full history for a user, oldest first.
    pub async fn history(&self, user_id: UserId) -> Vec<Transaction> {
        self.entries
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Sum of completed withdrawals on a UTC calendar day.
    pub async fn withdrawn_on(&self, user_id: UserId, day: NaiveDate) -> Decimal {
        self.entries
            .read()
            .await
            .get(&user_id)
            .map(|rows| {
                rows.iter()
                    .filter(|tx| {
                        tx.kind == TransactionKind::Withdrawal && tx.created_at.date_naive() == day
                    })
                    .map(|tx| tx.amount)
                    .sum()
            })
            .unwrap_or(Decimal::ZERO)
    }

    /// Deposit activity aggregates as of `now`.
    pub async fn deposit_stats(&self, user_id: UserId, now: DateTime<Utc>) -> DepositStats {
        let window_start = now - Duration::hours(24);
        let entries = self.entries.read().await;
        let mut stats = DepositStats {
            count_24h: 0,
            volume_24h: Decimal::ZERO,
            lifetime_count: 0,
            lifetime_volume: Decimal::ZERO,
        };
        if let Some(rows) = entries.get(&user_id) {
            for tx in rows.iter().filter(|tx| tx.kind == TransactionKind::Deposit) {
                stats.lifetime_count += 1;
                stats.lifetime_volume += tx.amount;
                if tx.created_at >= window_start {
                    stats.count_24h += 1;
                    stats.volume_24h += tx.amount;
                }
            }
        }
        stats
    }
}
