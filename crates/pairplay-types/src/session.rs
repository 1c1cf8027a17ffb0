//! Game session model and lifecycle state machine.
//!
//! State machine: `Active → Completed` (via validation, successful or not)
//! or `Active → Expired` (via the reaper's timeout sweep). Both are
//! terminal; a terminal session can never be validated again.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::ids::{SessionId, UserId};
use crate::layout::{CardLayout, LayoutDigest};

/// Lifecycle state of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionStatus {
    /// Game in progress; the only state a result can be validated against.
    Active,
    /// Result validated (win or loss) or explicitly ended. Terminal.
    Completed,
    /// Timed out past its budget and swept by the reaper. Terminal.
    Expired,
}

impl SessionStatus {
    /// Terminal states never transition again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// What the server retains about the secret layout, by deployment policy.
#[derive(Debug, Clone)]
pub enum LayoutSecret {
    /// Full layout retained; enables deterministic replay validation.
    Plain(CardLayout),
    /// Only a salted commitment retained. Stronger secrecy; validation
    /// falls back to behavioral scoring.
    Digest(LayoutDigest),
}

/// Server-side record of one in-progress or recently finished game.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub stake: Decimal,
    pub secret: LayoutSecret,
    pub started_at: DateTime<Utc>,
    /// Maximum moves allowed; drawn from server config, never the client.
    pub move_budget: usize,
    /// Maximum play time in seconds; drawn from server config.
    pub time_budget_secs: u64,
    pub status: SessionStatus,
}

impl GameSession {
    /// The instant this session's time budget runs out.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(i64::try_from(self.time_budget_secs).unwrap_or(i64::MAX))
    }

    /// Whether an Active session has outlived its time budget.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && now > self.expires_at()
    }
}
