//! The authoritative ledger: atomic per-user balance operations.
//!
//! Every operation independently acquires the user's lock, re-reads the
//! stored pre-image, self-heals corruption, validates the amount, appends
//! a journal row, and writes the account before releasing. A rejected
//! journal row aborts the operation with the stored account untouched.
//! Concurrent
//! requests for one user observe a total order; requests for different
//! users never contend.

use chrono::Utc;
use rust_decimal::Decimal;

use pairplay_types::{
    LedgerAccount, LimitsConfig, PairplayError, Result, Transaction, TransactionId,
    TransactionKind, UserId, WithdrawableView,
};

use crate::journal::{DepositStats, TransactionJournal};
use crate::lock_table::LockTable;
use crate::store::AccountStore;

/// Authoritative per-user financial state over a pluggable store.
pub struct Ledger<S: AccountStore> {
    store: S,
    locks: LockTable,
    journal: TransactionJournal,
    limits: LimitsConfig,
}

impl<S: AccountStore> Ledger<S> {
    #[must_use]
    pub fn new(store: S, limits: LimitsConfig) -> Self {
        let journal = TransactionJournal::new(limits.timestamp_policy);
        Self {
            store,
            locks: LockTable::new(),
            journal,
            limits,
        }
    }

    /// Race-free withdrawable computation.
    ///
    /// Serialized per user: a concurrent caller waits for the in-flight
    /// computation instead of reading a stale pre-image, so two requests
    /// can never derive diverging answers from the same funds.
    pub async fn get_withdrawable(&self, user_id: UserId) -> WithdrawableView {
        let lock = self.locks.user_lock(user_id);
        let _guard = lock.lock_owned().await;
        let account = self.load_healed(user_id).await;
        WithdrawableView::of(&account)
    }

    /// Credit validated winnings: raises both balance and earnings, which
    /// makes the amount withdrawable.
    pub async fn credit_earnings(&self, user_id: UserId, amount: Decimal) -> Result<Transaction> {
        self.validate_amount(amount, false)?;
        self.mutate(user_id, TransactionKind::WinningsCredit, amount, |acct| {
            acct.balance += amount;
            acct.total_earnings += amount;
            Ok(())
        })
        .await
    }

    /// Credit promotional funds: spendable, never withdrawable.
    pub async fn credit_bonus(&self, user_id: UserId, amount: Decimal) -> Result<Transaction> {
        self.validate_amount(amount, false)?;
        self.mutate(user_id, TransactionKind::BonusCredit, amount, |acct| {
            acct.balance += amount;
            acct.bonus_balance += amount;
            Ok(())
        })
        .await
    }

    /// Land an external deposit into the spendable balance.
    pub async fn credit_deposit(&self, user_id: UserId, amount: Decimal) -> Result<Transaction> {
        self.validate_amount(amount, false)?;
        self.mutate(user_id, TransactionKind::Deposit, amount, |acct| {
            acct.balance += amount;
            Ok(())
        })
        .await
    }

    /// Debit a game stake from the spendable balance.
    pub async fn debit_stake(&self, user_id: UserId, amount: Decimal) -> Result<Transaction> {
        self.validate_amount(amount, false)?;
        self.mutate(user_id, TransactionKind::StakeDebit, amount, |acct| {
            if acct.balance < amount {
                return Err(PairplayError::InsufficientBalance {
                    needed: amount,
                    available: acct.balance,
                });
            }
            acct.balance -= amount;
            Ok(())
        })
        .await
    }

    /// Record a withdrawal. Re-validates the withdrawable amount and the
    /// daily cap under the lock. These re-checks, not the guard's advisory
    /// ones, are what make a concurrent double-spend or joint cap breach
    /// impossible.
    pub async fn record_withdrawal(&self, user_id: UserId, amount: Decimal) -> Result<Transaction> {
        self.validate_amount(amount, false)?;
        let lock = self.locks.user_lock(user_id);
        let _guard = lock.lock_owned().await;

        let mut account = self.load_healed(user_id).await;
        let withdrawable = account.withdrawable();
        if amount > withdrawable {
            return Err(PairplayError::WithdrawableExceeded {
                requested: amount,
                withdrawable,
            });
        }
        if account.balance < amount {
            return Err(PairplayError::InsufficientBalance {
                needed: amount,
                available: account.balance,
            });
        }

        let now = Utc::now();
        let withdrawn_today = self.journal.withdrawn_on(user_id, now.date_naive()).await;
        let remaining =
            (self.limits.daily_withdrawal_cap - withdrawn_today).max(Decimal::ZERO);
        if amount > remaining {
            return Err(PairplayError::DailyCapExceeded {
                requested: amount,
                remaining,
            });
        }

        let balance_before = account.balance;
        account.balance -= amount;
        account.total_withdrawals += amount;
        account.updated_at = now;
        let tx = Transaction {
            id: TransactionId::new(),
            user_id,
            kind: TransactionKind::Withdrawal,
            amount,
            balance_before,
            balance_after: account.balance,
            created_at: now,
        };
        self.journal.append(tx.clone()).await?;
        self.store.save(user_id, account).await;
        Ok(tx)
    }

    /// Operator adjustment: overwrite the spendable balance outright.
    /// Zero is allowed; negative and above-ceiling values are not.
    pub async fn set_balance(&self, user_id: UserId, amount: Decimal) -> Result<Transaction> {
        self.validate_amount(amount, true)?;
        self.mutate(user_id, TransactionKind::BalanceAdjust, amount, |acct| {
            acct.balance = amount;
            Ok(())
        })
        .await
    }

    /// Full journal history for a user.
    pub async fn history(&self, user_id: UserId) -> Vec<Transaction> {
        self.journal.history(user_id).await
    }

    /// Sum of withdrawals completed today (UTC).
    pub async fn withdrawn_today(&self, user_id: UserId) -> Decimal {
        self.journal
            .withdrawn_on(user_id, Utc::now().date_naive())
            .await
    }

    /// Rolling deposit aggregates for anomaly detection.
    pub async fn deposit_stats(&self, user_id: UserId) -> DepositStats {
        self.journal.deposit_stats(user_id, Utc::now()).await
    }

    /// The limits this ledger enforces.
    #[must_use]
    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    // -- internals ---------------------------------------------------------

    fn validate_amount(&self, amount: Decimal, allow_zero: bool) -> Result<()> {
        if amount.is_sign_negative() {
            return Err(PairplayError::InvalidAmount {
                reason: "amount must not be negative".to_string(),
            });
        }
        if amount.is_zero() && !allow_zero {
            return Err(PairplayError::InvalidAmount {
                reason: "amount must be positive".to_string(),
            });
        }
        if amount > self.limits.amount_ceiling {
            return Err(PairplayError::AmountCeilingExceeded {
                amount,
                ceiling: self.limits.amount_ceiling,
            });
        }
        Ok(())
    }

    /// Load the account, resetting any corrupted stored field to zero.
    /// Corruption is recovered here and never propagates past the Ledger.
    ///
    /// Must be called with the user's lock held.
    async fn load_healed(&self, user_id: UserId) -> LedgerAccount {
        let now = Utc::now();
        let mut account = match self.store.load(user_id).await {
            Some(acct) => acct,
            None => return LedgerAccount::new(now),
        };

        let mut healed = false;
        for (field, value) in [
            ("balance", &mut account.balance),
            ("bonus_balance", &mut account.bonus_balance),
            ("total_earnings", &mut account.total_earnings),
            ("total_withdrawals", &mut account.total_withdrawals),
        ] {
            if value.is_sign_negative() || *value > self.limits.amount_ceiling {
                tracing::warn!(user = %user_id, field, stored = %value, "corrupted stored value reset to zero");
                *value = Decimal::ZERO;
                healed = true;
            }
        }
        if healed {
            account.updated_at = now;
            self.store.save(user_id, account.clone()).await;
        }
        account
    }

    async fn mutate(
        &self,
        user_id: UserId,
        kind: TransactionKind,
        amount: Decimal,
        apply: impl FnOnce(&mut LedgerAccount) -> Result<()>,
    ) -> Result<Transaction> {
        let lock = self.locks.user_lock(user_id);
        let _guard = lock.lock_owned().await;

        let mut account = self.load_healed(user_id).await;
        let balance_before = account.balance;
        apply(&mut account)?;

        let now = Utc::now();
        account.updated_at = now;
        let tx = Transaction {
            id: TransactionId::new(),
            user_id,
            kind,
            amount,
            balance_before,
            balance_after: account.balance,
            created_at: now,
        };
        self.journal.append(tx.clone()).await?;
        self.store.save(user_id, account).await;
        Ok(tx)
    }
}
