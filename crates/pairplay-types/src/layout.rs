//! Card layout and move trace models.
//!
//! A [`CardLayout`] is the per-session secret: 16 positions holding the
//! values 0–7, each exactly twice. It is never serialized in cleartext to
//! the client; only the sealed envelope leaves the server.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DECK_SIZE, PAIR_COUNT};
use crate::error::{PairplayError, Result};

// ---------------------------------------------------------------------------
// CardLayout
// ---------------------------------------------------------------------------

/// The secret arrangement of the 16-card board.
///
/// Invariant: exactly [`PAIR_COUNT`] distinct values, each appearing exactly
/// twice. Enforced at construction; a `CardLayout` in hand is always valid.
///
/// Deliberately does **not** derive `Serialize` or `Debug`-print its
/// contents: the layout must never leak through a log line or a response
/// body by accident. Sealing reads the raw bytes via [`CardLayout::as_bytes`].
#[derive(Clone, PartialEq, Eq)]
pub struct CardLayout([u8; DECK_SIZE]);

impl CardLayout {
    /// Build a layout from raw cards, validating the pair multiset.
    pub fn from_cards(cards: [u8; DECK_SIZE]) -> Result<Self> {
        let mut counts = [0u8; PAIR_COUNT as usize];
        for &card in &cards {
            if card >= PAIR_COUNT {
                return Err(PairplayError::InvalidLayout {
                    reason: format!("card value {card} out of range"),
                });
            }
            counts[card as usize] += 1;
        }
        if counts.iter().any(|&c| c != 2) {
            return Err(PairplayError::InvalidLayout {
                reason: "each value must appear exactly twice".to_string(),
            });
        }
        Ok(Self(cards))
    }

    /// The value at a board position. Position must be `< DECK_SIZE`.
    #[must_use]
    pub fn value_at(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Raw bytes for sealing / digest commitment.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DECK_SIZE] {
        &self.0
    }
}

impl fmt::Debug for CardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redacted: the layout is the session secret.
        write!(f, "CardLayout([redacted])")
    }
}

// ---------------------------------------------------------------------------
// LayoutDigest
// ---------------------------------------------------------------------------

/// Salted commitment to a layout, retained in the hash-sealed deployment
/// where the server drops the cleartext layout after sealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDigest {
    /// SHA-256 over (salt ‖ layout).
    pub hash: [u8; 32],
    /// Per-session random salt.
    pub salt: [u8; 16],
}

impl fmt::Display for LayoutDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "digest:{}", hex::encode(&self.hash[..8]))
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// One card flip as reported by the client in the final result payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Board position flipped, `0..DECK_SIZE`.
    pub card_index: u8,
    /// Client-reported wall-clock timestamp in milliseconds.
    pub timestamp_ms: u64,
}

/// Structural validation of a move trace: index bounds, strictly increasing
/// timestamps, no duplicate (index, timestamp) pairs.
///
/// This is a necessary condition in both validation strategies; it says
/// nothing about whether the trace is honest.
pub fn validate_move_trace(moves: &[Move]) -> Result<()> {
    let mut prev_ts: Option<u64> = None;
    for mv in moves {
        if usize::from(mv.card_index) >= DECK_SIZE {
            return Err(PairplayError::ClaimRejected {
                code: crate::error::RejectionCode::MalformedTrace,
            });
        }
        if let Some(prev) = prev_ts {
            // Strict ordering also rules out duplicate (index, ts) pairs.
            if mv.timestamp_ms <= prev {
                return Err(PairplayError::ClaimRejected {
                    code: crate::error::RejectionCode::MalformedTrace,
                });
            }
        }
        prev_ts = Some(mv.timestamp_ms);
    }
    Ok(())
}
