//! Winnings calculation.
//!
//! Pure money math, shared by both validation strategies:
//! `winnings = floor(stake × base_multiplier) + time_bonus`, with the whole
//! payout capped at `max_payout_multiple × stake` regardless of bonuses.

use rust_decimal::Decimal;

use pairplay_types::GameConfig;

/// Winnings owed for a validated outcome. A loss pays zero.
#[must_use]
pub fn winnings(stake: Decimal, elapsed_secs: u64, won: bool, config: &GameConfig) -> Decimal {
    if !won {
        return Decimal::ZERO;
    }
    let base = (stake * config.base_multiplier).floor();
    let bonus = time_bonus(stake, elapsed_secs, config);
    let cap = stake * config.max_payout_multiple;
    (base + bonus).min(cap)
}

/// Step-function time bonus: the first schedule step whose threshold the
/// elapsed time beats applies; slower finishes earn nothing extra.
#[must_use]
pub fn time_bonus(stake: Decimal, elapsed_secs: u64, config: &GameConfig) -> Decimal {
    for step in &config.time_bonus_steps {
        if elapsed_secs < step.under_secs {
            return stake * step.stake_fraction;
        }
    }
    Decimal::ZERO
}
