//! Financial guard: fail-closed amount gates for bets, deposits, and
//! withdrawals.
//!
//! Every check follows the same shape: canonicalize the client amount,
//! run the numbered checks in order, reject on the first failure. Error
//! payloads carry the server's own limits and computed figures, never the
//! raw client value.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use pairplay_ledger::{AccountStore, Ledger};
use pairplay_types::{PairplayError, Result, UserId, constants};

use crate::deposit_watch::{self, DepositDecision};

/// Hard gate validating amounts before they reach the ledger.
pub struct FinancialGuard<S: AccountStore> {
    ledger: Arc<Ledger<S>>,
}

impl<S: AccountStore> FinancialGuard<S> {
    #[must_use]
    pub fn new(ledger: Arc<Ledger<S>>) -> Self {
        Self { ledger }
    }

    /// Canonical money form: truncated toward zero at two decimal places.
    /// Truncation, not banker's rounding, so a client can never round
    /// itself up into extra funds.
    #[must_use]
    pub fn canonical(amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(constants::MONEY_SCALE, RoundingStrategy::ToZero)
    }

    /// Validate a bet. Returns the canonical amount to debit.
    pub async fn check_bet(&self, user_id: UserId, amount: Decimal) -> Result<Decimal> {
        let amount = self.well_formed(amount)?;
        let limits = self.ledger.limits();

        // 1. Table range
        if amount < limits.min_bet || amount > limits.max_bet {
            return Err(PairplayError::BetOutOfRange {
                min: limits.min_bet,
                max: limits.max_bet,
            });
        }

        // 2. Spendable balance (advisory; debit_stake re-checks under lock)
        let view = self.ledger.get_withdrawable(user_id).await;
        if view.total < amount {
            return Err(PairplayError::InsufficientBalance {
                needed: amount,
                available: view.total,
            });
        }

        Ok(amount)
    }

    /// Validate a deposit. Anomalous deposits are flagged for review but
    /// never rejected on velocity alone; only range violations reject.
    pub async fn check_deposit(&self, user_id: UserId, amount: Decimal) -> Result<DepositDecision> {
        let amount = self.well_formed(amount)?;
        let limits = self.ledger.limits();

        // 1. Deposit range
        if amount < limits.min_deposit || amount > limits.max_deposit {
            return Err(PairplayError::DepositOutOfRange {
                min: limits.min_deposit,
                max: limits.max_deposit,
            });
        }

        // 2. Velocity and size anomaly watch
        let stats = self.ledger.deposit_stats(user_id).await;
        let flagged_for_review = deposit_watch::is_anomalous(amount, &stats);
        if flagged_for_review {
            tracing::warn!(
                target: "pairplay::security",
                user = %user_id,
                count_24h = stats.count_24h,
                lifetime_count = stats.lifetime_count,
                "deposit flagged for review"
            );
        }

        Ok(DepositDecision {
            amount,
            flagged_for_review,
        })
    }

    /// Validate a withdrawal. Returns the canonical amount to record.
    pub async fn check_withdrawal(&self, user_id: UserId, amount: Decimal) -> Result<Decimal> {
        let amount = self.well_formed(amount)?;
        let limits = self.ledger.limits();

        // 1. Withdrawal range
        if amount < limits.min_withdrawal || amount > limits.max_withdrawal {
            return Err(PairplayError::WithdrawalOutOfRange {
                min: limits.min_withdrawal,
                max: limits.max_withdrawal,
            });
        }

        // 2. Withdrawable funds (advisory; record_withdrawal re-checks
        //    under lock). Surfaces the server-computed figure.
        let view = self.ledger.get_withdrawable(user_id).await;
        if amount > view.withdrawable {
            return Err(PairplayError::WithdrawableExceeded {
                requested: amount,
                withdrawable: view.withdrawable,
            });
        }

        // 3. Daily cap over completed withdrawals, UTC calendar day
        //    (advisory; record_withdrawal re-checks under lock)
        let withdrawn_today = self.ledger.withdrawn_today(user_id).await;
        let remaining = (limits.daily_withdrawal_cap - withdrawn_today).max(Decimal::ZERO);
        if amount > remaining {
            return Err(PairplayError::DailyCapExceeded {
                requested: amount,
                remaining,
            });
        }

        Ok(amount)
    }

    // Shared first gate: canonical form, strictly positive, under the
    // absolute plausibility ceiling.
    fn well_formed(&self, amount: Decimal) -> Result<Decimal> {
        let amount = Self::canonical(amount);
        if amount.is_sign_negative() || amount.is_zero() {
            return Err(PairplayError::InvalidAmount {
                reason: "amount must be positive".to_string(),
            });
        }
        let ceiling = self.ledger.limits().amount_ceiling;
        if amount > ceiling {
            return Err(PairplayError::AmountCeilingExceeded { amount, ceiling });
        }
        Ok(amount)
    }
}
