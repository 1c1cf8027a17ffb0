//! # pairplay-gamecore
//!
//! **Game Integrity plane**: secret layout generation and sealing, the
//! session registry, and outcome validation.
//!
//! ## Architecture
//!
//! 1. **shuffle**: CSPRNG Fisher–Yates over the paired card multiset
//! 2. **seal**: per-session key derivation + AEAD envelope for the client
//! 3. **registry**: one live session per user, finalize-once, reaper sweep
//! 4. **validator**: replay and behavioral strategies behind one trait
//! 5. **payout**: winnings formula with time bonus and payout cap
//!
//! ## Game Flow
//!
//! ```text
//! start → shuffle::create_layout() → seal::seal() → SessionRegistry.insert
//!       → client plays offline → OutcomeValidator.validate()
//!       → SessionRegistry.finalize() → Ledger.credit_earnings()
//! ```
//!
//! The layout crosses the wire only inside an authenticated envelope, and
//! the server never trusts the client's account of what it contained.

pub mod payout;
pub mod registry;
pub mod seal;
pub mod shuffle;
pub mod validator;

pub use registry::SessionRegistry;
pub use seal::{SealedEnvelope, SessionKey};
pub use validator::{
    BehavioralValidator, OutcomeClaim, OutcomeValidator, ReplayValidator, Verdict,
    validator_for_mode,
};
