//! Configuration for game rules, validator thresholds, and economic limits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::transaction::TimestampPolicy;

/// Which outcome-validation strategy a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Server retains the true layout and replays the move trace.
    Replay,
    /// Server retains only a salted digest; behavioral scoring decides.
    HashSealed,
}

/// One step of the time-bonus schedule: finishing in under `under_secs`
/// earns `stake_fraction × stake` on top of the base payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBonusStep {
    pub under_secs: u64,
    pub stake_fraction: Decimal,
}

/// Game rules and validator thresholds. All budgets come from here, never
/// from anything the client sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub validation_mode: ValidationMode,
    /// Maximum moves per session.
    pub move_budget: usize,
    /// Maximum play time per session, seconds.
    pub time_budget_secs: u64,
    /// Claimed wins faster than this fraction of the time budget are
    /// rejected outright as humanly impossible.
    pub min_human_fraction: f64,
    /// Payout multiplier applied to the stake on a win.
    pub base_multiplier: Decimal,
    /// Hard cap on the whole payout, as a multiple of the stake.
    pub max_payout_multiple: Decimal,
    /// Time-bonus schedule, sorted ascending by `under_secs`; the first
    /// matching step applies.
    pub time_bonus_steps: Vec<TimeBonusStep>,
    /// Behavioral trust-score cutoff: sessions scoring below are rejected.
    pub trust_cutoff: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::Replay,
            move_budget: constants::DEFAULT_MOVE_BUDGET,
            time_budget_secs: constants::DEFAULT_TIME_BUDGET_SECS,
            min_human_fraction: constants::DEFAULT_MIN_HUMAN_FRACTION,
            base_multiplier: Decimal::from(constants::DEFAULT_BASE_MULTIPLIER),
            max_payout_multiple: Decimal::from(constants::DEFAULT_MAX_PAYOUT_MULTIPLE),
            time_bonus_steps: vec![
                TimeBonusStep {
                    under_secs: 30,
                    stake_fraction: Decimal::ONE,
                },
                TimeBonusStep {
                    under_secs: 60,
                    stake_fraction: Decimal::new(5, 1), // 0.5
                },
                TimeBonusStep {
                    under_secs: 90,
                    stake_fraction: Decimal::new(25, 2), // 0.25
                },
            ],
            trust_cutoff: constants::DEFAULT_TRUST_CUTOFF,
        }
    }
}

/// Economic limits enforced by the Financial Guard and the Ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub min_bet: Decimal,
    pub max_bet: Decimal,
    pub min_deposit: Decimal,
    pub max_deposit: Decimal,
    pub min_withdrawal: Decimal,
    pub max_withdrawal: Decimal,
    /// Cumulative withdrawals allowed per calendar day (UTC).
    pub daily_withdrawal_cap: Decimal,
    /// Absolute plausibility ceiling on any single amount.
    pub amount_ceiling: Decimal,
    /// Replay-protection bounds for journal timestamps.
    pub timestamp_policy: TimestampPolicy,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_bet: Decimal::ONE,
            max_bet: Decimal::new(1_000, 0),
            min_deposit: Decimal::new(5, 0),
            max_deposit: Decimal::new(10_000, 0),
            min_withdrawal: Decimal::TEN,
            max_withdrawal: Decimal::new(5_000, 0),
            daily_withdrawal_cap: Decimal::new(10_000, 0),
            amount_ceiling: Decimal::from(constants::MAX_AMOUNT_UNITS),
            timestamp_policy: TimestampPolicy::default(),
        }
    }
}
