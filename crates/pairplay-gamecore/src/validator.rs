//! Outcome validation: deciding whether a claimed game result is consistent
//! with a human playing the sealed layout, and what prize is owed.
//!
//! Two strategies behind one [`OutcomeValidator`] interface, selected by
//! deployment policy:
//!
//! - [`ReplayValidator`]: the server retained the true layout and
//!   re-derives the outcome by replaying the matching rule move by move.
//!   Any divergence from the claim is rejected.
//! - [`BehavioralValidator`]: the server retained only a salted digest
//!   (stronger secrecy: even a memory compromise cannot leak the layout
//!   after sealing), so validation checks necessary conditions and scores
//!   behavioral trust. Client-held offline play limits this path to
//!   statistical confidence, never certainty. That is an accepted risk
//!   tier, not an oversight.
//!
//! Both paths share the structural gate; checks are ordered and fail-closed.

use pairplay_types::constants::{
    DECK_SIZE, EARLY_MATCH_LIMIT, EARLY_TURN_WINDOW, MIN_LATENCY_VARIANCE_MS2,
    MIN_MEAN_LATENCY_MS, MIN_WIN_MOVES, PAIR_COUNT, PENALTY_EARLY_MATCHES, PENALTY_FAST_MEAN,
    PENALTY_LOW_VARIANCE, PENALTY_SEQUENTIAL_PAIRS, SEQUENTIAL_PAIR_LIMIT,
};
use pairplay_types::{
    GameConfig, GameSession, LayoutSecret, Move, PairplayError, RejectionCode, Result, SessionId,
    ValidationMode, validate_move_trace,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::payout;

/// The client's final result report for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeClaim {
    pub session_id: SessionId,
    pub won: bool,
    pub matched_pairs: u8,
    pub elapsed_secs: u64,
    pub moves: Vec<Move>,
}

/// A successfully validated outcome. Losing is a normal verdict, not an
/// error; `winnings` is simply zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub won: bool,
    pub matched_pairs: u8,
    pub winnings: Decimal,
    /// Present only on the behavioral path.
    pub trust_score: Option<f64>,
}

/// Strategy interface for outcome validation.
pub trait OutcomeValidator: Send + Sync {
    /// Validate a claim against a session the registry has already
    /// ownership-checked. Returns the verdict or a typed rejection.
    fn validate(&self, session: &GameSession, claim: &OutcomeClaim, config: &GameConfig)
    -> Result<Verdict>;
}

/// Pick the validator matching the deployment's validation mode.
#[must_use]
pub fn validator_for_mode(mode: ValidationMode) -> Box<dyn OutcomeValidator> {
    match mode {
        ValidationMode::Replay => Box::new(ReplayValidator),
        ValidationMode::HashSealed => Box::new(BehavioralValidator),
    }
}

fn reject(code: RejectionCode) -> PairplayError {
    PairplayError::ClaimRejected { code }
}

/// Necessary conditions common to both strategies. Fail-closed: the first
/// failing check rejects, nothing downstream runs.
fn structural_checks(session: &GameSession, claim: &OutcomeClaim, config: &GameConfig) -> Result<()> {
    // 1. Trace shape: bounds, strict timestamp order, no duplicates.
    validate_move_trace(&claim.moves)?;

    // 2. Budgets come from the session record, never the claim.
    if claim.moves.len() > session.move_budget {
        return Err(reject(RejectionCode::MalformedTrace));
    }
    if claim.elapsed_secs > session.time_budget_secs {
        return Err(reject(RejectionCode::MalformedTrace));
    }

    // 3. Claim self-consistency.
    if claim.matched_pairs > PAIR_COUNT {
        return Err(reject(RejectionCode::ClaimMismatch));
    }
    if claim.won && claim.matched_pairs != PAIR_COUNT {
        return Err(reject(RejectionCode::ClaimMismatch));
    }

    if claim.won {
        // 4. Clearing 8 pairs takes at least 16 flips, full stop.
        if claim.moves.len() < MIN_WIN_MOVES {
            return Err(reject(RejectionCode::MalformedTrace));
        }
        // 5. Instant wins are rejected regardless of any trust inputs.
        #[allow(clippy::cast_precision_loss)]
        let min_secs = config.min_human_fraction * session.time_budget_secs as f64;
        #[allow(clippy::cast_precision_loss)]
        if (claim.elapsed_secs as f64) < min_secs {
            return Err(reject(RejectionCode::MalformedTrace));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Deterministic replay against the retained true layout.
pub struct ReplayValidator;

impl OutcomeValidator for ReplayValidator {
    fn validate(
        &self,
        session: &GameSession,
        claim: &OutcomeClaim,
        config: &GameConfig,
    ) -> Result<Verdict> {
        structural_checks(session, claim, config)?;

        let LayoutSecret::Plain(layout) = &session.secret else {
            return Err(PairplayError::Configuration(
                "replay validation requires a retained layout".to_string(),
            ));
        };

        // Replay the matching rule: two revealed cards match iff their
        // layout values are equal; matched cards retire; an unmatched pair
        // hides again before the next flip.
        let mut retired = [false; DECK_SIZE];
        let mut pairs = 0u8;
        let mut face_up: Option<usize> = None;

        for mv in &claim.moves {
            let idx = usize::from(mv.card_index);
            if retired[idx] {
                // Flipping a retired card is physically impossible.
                return Err(reject(RejectionCode::MalformedTrace));
            }
            match face_up.take() {
                None => face_up = Some(idx),
                Some(first) => {
                    if first == idx {
                        return Err(reject(RejectionCode::MalformedTrace));
                    }
                    if layout.value_at(first) == layout.value_at(idx) {
                        retired[first] = true;
                        retired[idx] = true;
                        pairs += 1;
                    }
                }
            }
        }

        let won = pairs == PAIR_COUNT;
        if won != claim.won || pairs != claim.matched_pairs {
            tracing::debug!(
                session = %session.id,
                derived_won = won,
                derived_pairs = pairs,
                "replay diverged from claim"
            );
            return Err(reject(RejectionCode::ClaimMismatch));
        }

        Ok(Verdict {
            won,
            matched_pairs: pairs,
            winnings: payout::winnings(session.stake, claim.elapsed_secs, won, config),
            trust_score: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Behavioral
// ---------------------------------------------------------------------------

/// Behavioral scoring for the hash-sealed deployment.
///
/// Trust starts at 1.0 and each tripped heuristic subtracts a fixed
/// penalty, so multiple weak signals compound predictably.
/// Scores below the configured cutoff are rejected; the itemized violation
/// list goes to the server-side security log only.
pub struct BehavioralValidator;

impl OutcomeValidator for BehavioralValidator {
    fn validate(
        &self,
        session: &GameSession,
        claim: &OutcomeClaim,
        config: &GameConfig,
    ) -> Result<Verdict> {
        structural_checks(session, claim, config)?;

        // A win must flip every card at least once.
        if claim.won {
            let mut seen = [false; DECK_SIZE];
            for mv in &claim.moves {
                seen[usize::from(mv.card_index)] = true;
            }
            if seen.iter().any(|&s| !s) {
                return Err(reject(RejectionCode::ClaimMismatch));
            }
        }

        let mut score = 1.0f64;
        let mut violations: Vec<&'static str> = Vec::new();

        if let Some((mean, variance)) = latency_stats(&claim.moves) {
            if mean < MIN_MEAN_LATENCY_MS {
                score -= PENALTY_FAST_MEAN;
                violations.push("mean inter-move latency below human threshold");
            }
            if variance < MIN_LATENCY_VARIANCE_MS2 {
                score -= PENALTY_LOW_VARIANCE;
                violations.push("inter-move latency variance indicates scripted play");
            }
        }

        if claim.won {
            let matched = inferred_matched_turns(&claim.moves);
            if early_first_sight_matches(&claim.moves, &matched) >= EARLY_MATCH_LIMIT {
                score -= PENALTY_EARLY_MATCHES;
                violations.push("early-game first-sight match density too high");
            }
            let adjacent = matched
                .iter()
                .filter(|&&(a, b)| a.abs_diff(b) == 1)
                .count();
            if adjacent >= SEQUENTIAL_PAIR_LIMIT {
                score -= PENALTY_SEQUENTIAL_PAIRS;
                violations.push("sequential index pattern across matched pairs");
            }
        }

        let score = score.max(0.0);
        if score < config.trust_cutoff {
            tracing::error!(
                target: "pairplay::security",
                session = %session.id,
                user = %session.user_id,
                score,
                cutoff = config.trust_cutoff,
                violations = ?violations,
                "trust score below cutoff"
            );
            return Err(PairplayError::TrustBelowCutoff {
                score,
                cutoff: config.trust_cutoff,
            });
        }

        tracing::debug!(session = %session.id, score, "behavioral validation accepted");
        Ok(Verdict {
            won: claim.won,
            matched_pairs: claim.matched_pairs,
            winnings: payout::winnings(session.stake, claim.elapsed_secs, claim.won, config),
            trust_score: Some(score),
        })
    }
}

/// Mean and population variance of inter-move latencies, in ms / ms².
/// `None` for traces too short to have a latency at all.
#[allow(clippy::cast_precision_loss)]
fn latency_stats(moves: &[Move]) -> Option<(f64, f64)> {
    if moves.len() < 2 {
        return None;
    }
    let gaps: Vec<f64> = moves
        .windows(2)
        .map(|w| (w[1].timestamp_ms - w[0].timestamp_ms) as f64)
        .collect();
    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    Some((mean, variance))
}

/// Matched turns inferred from the trace alone, valid for win claims:
/// matched cards retire, so a turn whose two cards never reappear later
/// must have matched. Returns the (first, second) index pairs in turn order.
fn inferred_matched_turns(moves: &[Move]) -> Vec<(u8, u8)> {
    let mut matched = Vec::new();
    for (turn_idx, turn) in moves.chunks_exact(2).enumerate() {
        let (a, b) = (turn[0].card_index, turn[1].card_index);
        if a == b {
            continue;
        }
        let after = &moves[(turn_idx + 1) * 2..];
        let reappears = after
            .iter()
            .any(|mv| mv.card_index == a || mv.card_index == b);
        if !reappears {
            matched.push((a, b));
        }
    }
    matched
}

/// Matches inside the opening window where *neither* card had been seen
/// before: matching two never-seen cards repeatedly is luck an honest
/// player cannot manufacture, so a cluster of them means foreknowledge.
fn early_first_sight_matches(moves: &[Move], matched: &[(u8, u8)]) -> usize {
    let mut count = 0;
    for (turn_idx, turn) in moves.chunks_exact(2).enumerate().take(EARLY_TURN_WINDOW) {
        let (a, b) = (turn[0].card_index, turn[1].card_index);
        if !matched.contains(&(a, b)) {
            continue;
        }
        let before = &moves[..turn_idx * 2];
        let seen_before = before
            .iter()
            .any(|mv| mv.card_index == a || mv.card_index == b);
        if !seen_before {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pairplay_types::{CardLayout, SessionStatus, UserId};

    /// Layout where adjacent positions hold equal values: (0,1), (2,3), ...
    fn adjacent_pairs_layout() -> CardLayout {
        CardLayout::from_cards([0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7]).unwrap()
    }

    fn session_with(secret: LayoutSecret) -> GameSession {
        GameSession {
            id: SessionId::new(),
            user_id: UserId::new(),
            stake: Decimal::TEN,
            secret,
            started_at: Utc::now(),
            move_budget: 40,
            time_budget_secs: 120,
            status: SessionStatus::Active,
        }
    }

    fn replay_session() -> GameSession {
        session_with(LayoutSecret::Plain(adjacent_pairs_layout()))
    }

    fn behavioral_session() -> GameSession {
        let digest = crate::seal::commit(&adjacent_pairs_layout()).unwrap();
        session_with(LayoutSecret::Digest(digest))
    }

    /// Moves with human-looking jittered spacing starting at t=1000ms.
    fn spaced_moves(indices: &[u8]) -> Vec<Move> {
        let gaps = [2000u64, 3000, 2200, 2800, 2400, 2600];
        let mut ts = 1000u64;
        indices
            .iter()
            .enumerate()
            .map(|(i, &card_index)| {
                if i > 0 {
                    ts += gaps[i % gaps.len()];
                }
                Move {
                    card_index,
                    timestamp_ms: ts,
                }
            })
            .collect()
    }

    /// Winning trace on the adjacent-pairs layout: one failed opening turn,
    /// then eight perfect turns. 18 moves total.
    fn winning_replay_trace() -> Vec<Move> {
        let mut indices = vec![0u8, 2]; // values 0 vs 1: no match
        for pos in 0..16u8 {
            indices.push(pos);
        }
        spaced_moves(&indices)
    }

    fn win_claim(session: &GameSession, moves: Vec<Move>) -> OutcomeClaim {
        OutcomeClaim {
            session_id: session.id,
            won: true,
            matched_pairs: 8,
            elapsed_secs: 45,
            moves,
        }
    }

    // -- structural gate ---------------------------------------------------

    #[test]
    fn win_with_fewer_than_16_moves_always_rejected() {
        let session = replay_session();
        let moves = spaced_moves(&[0, 1, 2, 3, 4, 5]);
        let claim = win_claim(&session, moves);
        for validator in [
            validator_for_mode(ValidationMode::Replay),
            validator_for_mode(ValidationMode::HashSealed),
        ] {
            let err = validator
                .validate(&session, &claim, &GameConfig::default())
                .unwrap_err();
            assert!(matches!(err, PairplayError::ClaimRejected { .. }));
        }
    }

    #[test]
    fn win_below_minimum_human_time_always_rejected() {
        let session = replay_session();
        let mut claim = win_claim(&session, winning_replay_trace());
        claim.elapsed_secs = 10; // min is 0.25 * 120 = 30s
        let err = ReplayValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PairplayError::ClaimRejected {
                code: RejectionCode::MalformedTrace
            }
        ));
    }

    #[test]
    fn move_budget_enforced_from_session_not_claim() {
        let mut session = replay_session();
        session.move_budget = 17;
        let claim = win_claim(&session, winning_replay_trace()); // 18 moves
        let err = ReplayValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(err, PairplayError::ClaimRejected { .. }));
    }

    #[test]
    fn elapsed_beyond_time_budget_rejected() {
        let session = replay_session();
        let mut claim = win_claim(&session, winning_replay_trace());
        claim.elapsed_secs = 500;
        assert!(
            ReplayValidator
                .validate(&session, &claim, &GameConfig::default())
                .is_err()
        );
    }

    #[test]
    fn won_claim_with_partial_pairs_inconsistent() {
        let session = replay_session();
        let mut claim = win_claim(&session, winning_replay_trace());
        claim.matched_pairs = 5;
        let err = ReplayValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PairplayError::ClaimRejected {
                code: RejectionCode::ClaimMismatch
            }
        ));
    }

    // -- replay ------------------------------------------------------------

    #[test]
    fn replay_reference_scenario_pays_25() {
        let session = replay_session();
        let claim = win_claim(&session, winning_replay_trace());
        let verdict = ReplayValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap();
        assert!(verdict.won);
        assert_eq!(verdict.matched_pairs, 8);
        assert_eq!(verdict.winnings, Decimal::new(25, 0));
        assert_eq!(verdict.trust_score, None);
    }

    #[test]
    fn replay_rejects_claimed_win_on_losing_trace() {
        let session = replay_session();
        // 16 flips alternating across non-matching positions: zero pairs.
        let indices: Vec<u8> = (0..8u8).flat_map(|i| [i, i + 8]).collect();
        let mut claim = win_claim(&session, spaced_moves(&indices));
        claim.elapsed_secs = 45;
        let err = ReplayValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PairplayError::ClaimRejected {
                code: RejectionCode::ClaimMismatch
            }
        ));
    }

    #[test]
    fn replay_accepts_honest_loss_with_zero_winnings() {
        let session = replay_session();
        let indices: Vec<u8> = (0..8u8).flat_map(|i| [i, i + 8]).collect();
        let claim = OutcomeClaim {
            session_id: session.id,
            won: false,
            matched_pairs: 0,
            elapsed_secs: 80,
            moves: spaced_moves(&indices),
        };
        let verdict = ReplayValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap();
        assert!(!verdict.won);
        assert_eq!(verdict.winnings, Decimal::ZERO);
    }

    #[test]
    fn replay_rejects_flipping_retired_card() {
        let session = replay_session();
        // Match (0,1), then flip 0 again.
        let mut indices = vec![0u8, 1, 0];
        indices.extend(2..16u8);
        let claim = win_claim(&session, spaced_moves(&indices));
        let err = ReplayValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PairplayError::ClaimRejected {
                code: RejectionCode::MalformedTrace
            }
        ));
    }

    #[test]
    fn replay_requires_retained_layout() {
        let session = behavioral_session();
        let claim = win_claim(&session, winning_replay_trace());
        let err = ReplayValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(err, PairplayError::Configuration(_)));
    }

    // -- behavioral --------------------------------------------------------

    /// Win trace whose matched turns pair distant indices: one failed turn
    /// on (0,1), then turns (0,8),(1,9),...,(7,15).
    fn humanlike_behavioral_trace() -> Vec<Move> {
        let mut indices = vec![0u8, 1];
        for i in 0..8u8 {
            indices.push(i);
            indices.push(i + 8);
        }
        spaced_moves(&indices)
    }

    #[test]
    fn behavioral_accepts_humanlike_win() {
        let session = behavioral_session();
        let claim = win_claim(&session, humanlike_behavioral_trace());
        let verdict = BehavioralValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap();
        assert!(verdict.won);
        assert_eq!(verdict.winnings, Decimal::new(25, 0));
        let score = verdict.trust_score.unwrap();
        assert!(score >= GameConfig::default().trust_cutoff, "score={score}");
    }

    #[test]
    fn behavioral_rejects_mechanical_timing() {
        let session = behavioral_session();
        // Uniform 50ms gaps: sub-human mean AND zero variance.
        let mut indices = vec![0u8, 1];
        for i in 0..8u8 {
            indices.push(i);
            indices.push(i + 8);
        }
        let moves: Vec<Move> = indices
            .iter()
            .enumerate()
            .map(|(i, &card_index)| Move {
                card_index,
                timestamp_ms: 1000 + (i as u64) * 50,
            })
            .collect();
        let mut claim = win_claim(&session, moves);
        claim.elapsed_secs = 45;
        let err = BehavioralValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(err, PairplayError::TrustBelowCutoff { .. }));
    }

    #[test]
    fn behavioral_rejects_layout_foreknowledge_signature() {
        let session = behavioral_session();
        // Perfect sequential sweep (0,1),(2,3),...: every matched turn
        // adjacent and the first three all first-sight matches.
        let indices: Vec<u8> = (0..16u8).collect();
        let claim = win_claim(&session, spaced_moves(&indices));
        let err = BehavioralValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(err, PairplayError::TrustBelowCutoff { .. }));
    }

    #[test]
    fn behavioral_win_must_touch_every_card() {
        let session = behavioral_session();
        // 18 moves but card 15 never flipped.
        let mut indices = vec![0u8, 1, 0, 1];
        for i in 0..7u8 {
            indices.push(i + 1);
            indices.push(i + 8);
        }
        assert_eq!(indices.len(), 18);
        let claim = win_claim(&session, spaced_moves(&indices));
        let err = BehavioralValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PairplayError::ClaimRejected {
                code: RejectionCode::ClaimMismatch
            }
        ));
    }

    #[test]
    fn behavioral_loss_accepted_without_pattern_checks() {
        let session = behavioral_session();
        let claim = OutcomeClaim {
            session_id: session.id,
            won: false,
            matched_pairs: 3,
            elapsed_secs: 100,
            moves: spaced_moves(&[0, 1, 2, 3, 4, 5, 6, 7]),
        };
        let verdict = BehavioralValidator
            .validate(&session, &claim, &GameConfig::default())
            .unwrap();
        assert!(!verdict.won);
        assert_eq!(verdict.winnings, Decimal::ZERO);
    }

    // -- heuristic internals ----------------------------------------------

    #[test]
    fn latency_stats_short_trace_is_none() {
        assert!(latency_stats(&[]).is_none());
        assert!(
            latency_stats(&[Move {
                card_index: 0,
                timestamp_ms: 1
            }])
            .is_none()
        );
    }

    #[test]
    fn inferred_matches_require_no_reappearance() {
        // Turn (0,1) matched (never reappear); (2,3) not (2 reappears).
        let moves = spaced_moves(&[0, 1, 2, 3, 2, 4]);
        let matched = inferred_matched_turns(&moves);
        assert!(matched.contains(&(0, 1)));
        assert!(!matched.contains(&(2, 3)));
    }

    #[test]
    fn dispatch_picks_matching_strategy() {
        let session = replay_session();
        let claim = win_claim(&session, winning_replay_trace());
        let verdict = validator_for_mode(ValidationMode::Replay)
            .validate(&session, &claim, &GameConfig::default())
            .unwrap();
        assert!(verdict.trust_score.is_none());
    }
}
