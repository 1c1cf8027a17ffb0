//! System-wide constants for the PairPlay engine.

/// Number of cards on the board.
pub const DECK_SIZE: usize = 16;

/// Number of distinct pair values (each appears twice).
pub const PAIR_COUNT: u8 = 8;

/// Theoretical minimum number of moves to clear all pairs.
pub const MIN_WIN_MOVES: usize = 16;

/// Default maximum moves allowed in one session.
pub const DEFAULT_MOVE_BUDGET: usize = 40;

/// Default session time budget in seconds.
pub const DEFAULT_TIME_BUDGET_SECS: u64 = 120;

/// Default fraction of the time budget below which a claimed win is
/// considered humanly impossible.
pub const DEFAULT_MIN_HUMAN_FRACTION: f64 = 0.25;

/// Default payout multiplier applied to the stake on a win.
pub const DEFAULT_BASE_MULTIPLIER: u64 = 2;

/// Default hard cap on the full payout, as a multiple of the stake.
pub const DEFAULT_MAX_PAYOUT_MULTIPLE: u64 = 5;

/// Default trust-score cutoff for the behavioral validator.
pub const DEFAULT_TRUST_CUTOFF: f64 = 0.50;

/// How long terminal sessions are retained before the reaper evicts them.
pub const TERMINAL_RETENTION_SECS: u64 = 900;

/// Absolute ceiling on any single monetary amount. Anything above this is
/// rejected as implausible, and any stored value above it is treated as
/// corrupted state.
pub const MAX_AMOUNT_UNITS: u64 = 1_000_000;

/// Decimal places for canonical monetary amounts at the boundary.
pub const MONEY_SCALE: u32 = 2;

// ---------------------------------------------------------------------------
// Behavioral validator thresholds
// ---------------------------------------------------------------------------

/// Mean inter-move latency (ms) below which play looks mechanical.
pub const MIN_MEAN_LATENCY_MS: f64 = 350.0;

/// Inter-move latency variance (ms²) below which play looks scripted.
pub const MIN_LATENCY_VARIANCE_MS2: f64 = 2_500.0;

/// Number of opening turns inspected for foreknowledge of the layout.
pub const EARLY_TURN_WINDOW: usize = 3;

/// First-sight matches inside the opening window at or above this count
/// indicate prior knowledge of the layout.
pub const EARLY_MATCH_LIMIT: usize = 2;

/// Adjacent-index matched pairs at or above this count form the
/// sequential-scan signature of a layout leak.
pub const SEQUENTIAL_PAIR_LIMIT: usize = 3;

/// Trust deduction: mean inter-move latency below [`MIN_MEAN_LATENCY_MS`].
pub const PENALTY_FAST_MEAN: f64 = 0.35;

/// Trust deduction: latency variance below [`MIN_LATENCY_VARIANCE_MS2`].
pub const PENALTY_LOW_VARIANCE: f64 = 0.20;

/// Trust deduction: early-game first-sight match density too high.
pub const PENALTY_EARLY_MATCHES: f64 = 0.30;

/// Trust deduction: sequential-index signature across matched pairs.
pub const PENALTY_SEQUENTIAL_PAIRS: f64 = 0.45;

// ---------------------------------------------------------------------------
// Timestamp replay protection
// ---------------------------------------------------------------------------

/// Default maximum age of a transaction timestamp (seconds).
pub const DEFAULT_TS_MAX_PAST_SECS: i64 = 300;

/// Default maximum clock skew into the future (seconds).
pub const DEFAULT_TS_MAX_FUTURE_SECS: i64 = 30;

// ---------------------------------------------------------------------------
// Deposit anomaly detection
// ---------------------------------------------------------------------------

/// Deposits in a 24-hour window at or above this count are flagged for
/// review regardless of the user's history.
pub const DEPOSIT_COUNT_FLAG_24H: usize = 10;

/// A deposit this many times the user's own historical mean is flagged.
pub const DEPOSIT_SIZE_FLAG_MULTIPLE: u64 = 10;

/// Minimum deposit history before size-relative flagging applies.
pub const DEPOSIT_HISTORY_MIN_SAMPLES: usize = 3;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "PairPlay";
