//! Deposit velocity and size anomaly detection.
//!
//! Flags are advisory. An anomalous deposit is recorded and surfaced for
//! manual review; legitimate high-roller behavior must not be blocked on
//! a statistical signal alone.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pairplay_ledger::DepositStats;
use pairplay_types::constants;

/// Outcome of a deposit check: the canonical amount plus the review flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositDecision {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub flagged_for_review: bool,
}

/// Whether a deposit looks anomalous against the user's history.
///
/// Two independent signals:
/// - velocity: this deposit would be the user's 11th or later inside a
///   trailing 24-hour window
/// - size: the amount is ten times the user's historical mean, once the
///   history holds enough samples to make a mean meaningful
#[must_use]
pub fn is_anomalous(amount: Decimal, stats: &DepositStats) -> bool {
    if stats.count_24h + 1 > constants::DEPOSIT_COUNT_FLAG_24H {
        return true;
    }
    if stats.lifetime_count >= constants::DEPOSIT_HISTORY_MIN_SAMPLES {
        let threshold =
            stats.mean_deposit() * Decimal::from(constants::DEPOSIT_SIZE_FLAG_MULTIPLE);
        if amount > threshold {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(count_24h: usize, lifetime_count: usize, lifetime_volume: Decimal) -> DepositStats {
        DepositStats {
            count_24h,
            volume_24h: lifetime_volume,
            lifetime_count,
            lifetime_volume,
        }
    }

    #[test]
    fn empty_history_never_flags_on_size() {
        let s = stats(0, 0, Decimal::ZERO);
        assert!(!is_anomalous(Decimal::new(9_999, 0), &s));
    }

    #[test]
    fn velocity_flag_at_eleventh_deposit_in_window() {
        let s = stats(10, 10, Decimal::new(200, 0));
        assert!(is_anomalous(Decimal::new(20, 0), &s));
        let s = stats(9, 9, Decimal::new(180, 0));
        assert!(!is_anomalous(Decimal::new(20, 0), &s));
    }

    #[test]
    fn size_flag_needs_enough_samples() {
        // Mean 10, deposit 500: flagged only once three samples exist.
        let s = stats(2, 2, Decimal::new(20, 0));
        assert!(!is_anomalous(Decimal::new(500, 0), &s));
        let s = stats(3, 3, Decimal::new(30, 0));
        assert!(is_anomalous(Decimal::new(500, 0), &s));
    }

    #[test]
    fn size_flag_boundary_is_strict() {
        // Mean 10, threshold 100: exactly 100 passes, 100.01 flags.
        let s = stats(3, 3, Decimal::new(30, 0));
        assert!(!is_anomalous(Decimal::new(100, 0), &s));
        assert!(is_anomalous(Decimal::new(10_001, 2), &s));
    }
}
