//! Ledger account model and boundary snapshot.
//!
//! Invariant: `withdrawable == max(0, total_earnings - total_withdrawals)`.
//! The bonus balance is spendable but never withdrawable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Authoritative per-user financial state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    /// Spendable total: earnings + bonus + deposits − stakes − withdrawals.
    pub balance: Decimal,
    /// Promotional credit included in `balance`; never withdrawable.
    pub bonus_balance: Decimal,
    /// Cumulative validated winnings.
    pub total_earnings: Decimal,
    /// Cumulative completed withdrawals.
    pub total_withdrawals: Decimal,
    /// Last mutation time; written atomically with the balances.
    pub updated_at: DateTime<Utc>,
}

impl LedgerAccount {
    /// A fresh zeroed account.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            balance: Decimal::ZERO,
            bonus_balance: Decimal::ZERO,
            total_earnings: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
            updated_at: now,
        }
    }

    /// The withdrawable portion: validated earnings minus prior
    /// withdrawals, floored at zero. Bonus credit is excluded by
    /// construction.
    #[must_use]
    pub fn withdrawable(&self) -> Decimal {
        (self.total_earnings - self.total_withdrawals).max(Decimal::ZERO)
    }
}

/// Consistent view of one account's withdrawable state, computed under the
/// per-user lock so concurrent readers never see diverging answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawableView {
    pub withdrawable: Decimal,
    pub total: Decimal,
    pub bonus: Decimal,
    pub earnings: Decimal,
    pub total_withdrawn: Decimal,
}

impl WithdrawableView {
    #[must_use]
    pub fn of(account: &LedgerAccount) -> Self {
        Self {
            withdrawable: account.withdrawable(),
            total: account.balance,
            bonus: account.bonus_balance,
            earnings: account.total_earnings,
            total_withdrawn: account.total_withdrawals,
        }
    }
}

/// Boundary form of a balance query: every amount rendered as a fixed-point
/// decimal string so no floating-point drift crosses the API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub withdrawable: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub bonus: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub earnings: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_withdrawn: Decimal,
}

impl From<&WithdrawableView> for BalanceSnapshot {
    fn from(view: &WithdrawableView) -> Self {
        Self {
            balance: view.total,
            withdrawable: view.withdrawable,
            bonus: view.bonus,
            earnings: view.earnings,
            total_withdrawn: view.total_withdrawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_account_all_zero() {
        let acct = LedgerAccount::new(Utc::now());
        assert_eq!(acct.balance, Decimal::ZERO);
        assert_eq!(acct.withdrawable(), Decimal::ZERO);
    }

    #[test]
    fn withdrawable_is_earnings_minus_withdrawals() {
        let mut acct = LedgerAccount::new(Utc::now());
        acct.total_earnings = Decimal::new(100, 0);
        acct.total_withdrawals = Decimal::new(30, 0);
        assert_eq!(acct.withdrawable(), Decimal::new(70, 0));
    }

    #[test]
    fn withdrawable_floors_at_zero() {
        let mut acct = LedgerAccount::new(Utc::now());
        acct.total_earnings = Decimal::new(10, 0);
        acct.total_withdrawals = Decimal::new(30, 0);
        assert_eq!(acct.withdrawable(), Decimal::ZERO);
    }

    #[test]
    fn bonus_excluded_from_withdrawable() {
        let mut acct = LedgerAccount::new(Utc::now());
        acct.balance = Decimal::new(500, 0);
        acct.bonus_balance = Decimal::new(500, 0);
        assert_eq!(acct.withdrawable(), Decimal::ZERO);
    }

    #[test]
    fn snapshot_serializes_as_strings() {
        let mut acct = LedgerAccount::new(Utc::now());
        acct.balance = Decimal::new(12345, 2); // 123.45
        acct.total_earnings = Decimal::new(5000, 2);
        let view = WithdrawableView::of(&acct);
        let snap = BalanceSnapshot::from(&view);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"123.45\""), "Got: {json}");
        assert!(json.contains("\"50.00\""), "Got: {json}");
    }
}
