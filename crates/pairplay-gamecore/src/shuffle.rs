//! Secret layout generation.
//!
//! A Fisher–Yates shuffle over the paired multiset {0,0,1,1,...,7,7},
//! driven by the OS entropy source. A predictable shuffle is a direct
//! cheat vector, so a general-purpose PRNG is not acceptable here; the
//! draw is also rejection-sampled to stay unbiased.

use rand::RngCore;
use rand::rngs::OsRng;

use pairplay_types::constants::{DECK_SIZE, PAIR_COUNT};
use pairplay_types::{CardLayout, PairplayError, Result};

/// Generate a fresh cryptographically-random layout.
///
/// # Errors
/// [`PairplayError::EntropyFailure`] if the OS entropy source fails.
/// Fatal to session creation; callers must abort the start.
pub fn create_layout() -> Result<CardLayout> {
    let mut cards = [0u8; DECK_SIZE];
    for value in 0..PAIR_COUNT {
        cards[usize::from(value) * 2] = value;
        cards[usize::from(value) * 2 + 1] = value;
    }

    let mut rng = OsRng;
    for i in (1..DECK_SIZE).rev() {
        let j = random_index(&mut rng, i + 1)?;
        cards.swap(i, j);
    }

    CardLayout::from_cards(cards)
}

/// Unbiased index in `0..bound` via rejection sampling.
#[allow(clippy::cast_possible_truncation)]
fn random_index(rng: &mut OsRng, bound: usize) -> Result<usize> {
    let bound = bound as u64;
    let zone = (u64::MAX / bound) * bound;
    loop {
        let mut buf = [0u8; 8];
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| PairplayError::EntropyFailure(e.to_string()))?;
        let draw = u64::from_le_bytes(buf);
        if draw < zone {
            return Ok((draw % bound) as usize);
        }
    }
}

/// Fill a buffer from the OS entropy source.
///
/// Shared by the sealer for key material, nonces, and salts.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| PairplayError::EntropyFailure(e.to_string()))
}
