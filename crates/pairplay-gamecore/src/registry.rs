//! Session registry: one live game per user, finalize-once, reaper sweep.
//!
//! The registry and the ledger are the only two pieces of mutable shared
//! state in the engine. All membership changes happen under one async
//! `RwLock` over the session map plus a user index, so "check then insert"
//! is a single critical section and opening many sessions to cherry-pick
//! the best one is impossible.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use pairplay_types::constants::TERMINAL_RETENTION_SECS;
use pairplay_types::{
    GameConfig, GameSession, LayoutSecret, PairplayError, Result, SessionId, SessionStatus, UserId,
    ValidationMode,
};

use crate::seal::{self, SealedEnvelope, SessionKey};
use crate::shuffle;

struct RegistryInner {
    sessions: HashMap<SessionId, GameSession>,
    /// Users with an Active session. Removed on finalize, never left stale.
    by_user: HashMap<UserId, SessionId>,
}

/// Tracks live and recently finished game sessions.
///
/// Single-process deployment; a multi-instance deployment replaces this
/// with a transactional session store behind the same surface.
pub struct SessionRegistry {
    inner: RwLock<RegistryInner>,
    config: GameConfig,
}

/// Everything `start_session` hands back to the caller: the session record,
/// the sealed envelope, and the separately-delivered key.
#[derive(Debug)]
pub struct StartedSession {
    pub session: GameSession,
    pub envelope: SealedEnvelope,
    pub key: SessionKey,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                sessions: HashMap::new(),
                by_user: HashMap::new(),
            }),
            config,
        }
    }

    /// Start a new game session for a user whose stake has already been
    /// debited.
    ///
    /// # Errors
    /// [`PairplayError::SessionAlreadyActive`] if the user still holds an
    /// Active session; entropy or seal failures abort the start.
    pub async fn start_session(&self, user_id: UserId, stake: Decimal) -> Result<StartedSession> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;

        if let Some(&existing_id) = inner.by_user.get(&user_id) {
            // A time-expired Active session is as good as reaped; expire it
            // inline instead of blocking the user until the next sweep.
            let expired = inner
                .sessions
                .get(&existing_id)
                .is_some_and(|s| s.is_expired(now));
            if expired {
                if let Some(session) = inner.sessions.get_mut(&existing_id) {
                    session.status = SessionStatus::Expired;
                }
                inner.by_user.remove(&user_id);
                tracing::warn!(user = %user_id, session = %existing_id, "expired stale session at start");
            } else {
                return Err(PairplayError::SessionAlreadyActive(user_id));
            }
        }

        let session_id = SessionId::new();
        let layout = shuffle::create_layout()?;
        let (envelope, key) = seal::seal(&layout, session_id)?;

        let secret = match self.config.validation_mode {
            ValidationMode::Replay => LayoutSecret::Plain(layout),
            ValidationMode::HashSealed => LayoutSecret::Digest(seal::commit(&layout)?),
        };

        let session = GameSession {
            id: session_id,
            user_id,
            stake,
            secret,
            started_at: now,
            move_budget: self.config.move_budget,
            time_budget_secs: self.config.time_budget_secs,
            status: SessionStatus::Active,
        };

        inner.sessions.insert(session_id, session.clone());
        inner.by_user.insert(user_id, session_id);
        tracing::debug!(user = %user_id, session = %session_id, "session started");

        Ok(StartedSession {
            session,
            envelope,
            key,
        })
    }

    /// Fetch a session for validation, enforcing ownership and liveness.
    ///
    /// # Errors
    /// - [`PairplayError::SessionNotFound`] if missing (including "vanished
    ///   mid-check" under a concurrent reaper sweep)
    /// - [`PairplayError::OwnershipMismatch`] if another user's session is
    ///   addressed; logged as a security event, never a mere not-found
    /// - [`PairplayError::SessionAlreadyFinalized`] if already terminal
    pub async fn take_for_validation(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<GameSession> {
        let inner = self.inner.read().await;
        let session = inner
            .sessions
            .get(&session_id)
            .ok_or(PairplayError::SessionNotFound(session_id))?;

        if session.user_id != user_id {
            tracing::error!(
                target: "pairplay::security",
                session = %session_id,
                claimed_by = %user_id,
                owner = %session.user_id,
                "ownership mismatch on result report"
            );
            return Err(PairplayError::OwnershipMismatch {
                session_id,
                user_id,
            });
        }
        if session.status.is_terminal() {
            return Err(PairplayError::SessionAlreadyFinalized(session_id));
        }
        Ok(session.clone())
    }

    /// Move a session into a terminal state. Exactly one caller wins; every
    /// later attempt gets a conflict, which is what blocks replaying a win.
    ///
    /// # Errors
    /// [`PairplayError::SessionNotFound`] /
    /// [`PairplayError::SessionAlreadyFinalized`].
    pub async fn finalize(&self, session_id: SessionId, status: SessionStatus) -> Result<()> {
        debug_assert!(status.is_terminal());
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or(PairplayError::SessionNotFound(session_id))?;
        if session.status.is_terminal() {
            return Err(PairplayError::SessionAlreadyFinalized(session_id));
        }
        session.status = status;
        let user_id = session.user_id;
        inner.by_user.remove(&user_id);
        Ok(())
    }

    /// Explicitly end a session (owner action), completing it.
    pub async fn end_session(&self, session_id: SessionId) -> Result<()> {
        self.finalize(session_id, SessionStatus::Completed).await
    }

    /// Periodic sweep: expires Active sessions past their time budget and
    /// evicts terminal sessions past the audit retention window. Returns
    /// the number of sessions swept, for observability.
    ///
    /// Safe to run concurrently with in-flight validations: a validator
    /// that loses the race sees `SessionNotFound` or
    /// `SessionAlreadyFinalized`, never a crash.
    pub async fn reap(&self) -> usize {
        let now = Utc::now();
        let retention = Duration::seconds(i64::try_from(TERMINAL_RETENTION_SECS).unwrap_or(i64::MAX));
        let mut inner = self.inner.write().await;
        let mut swept = 0usize;

        let expired_ids: Vec<SessionId> = inner
            .sessions
            .values()
            .filter(|s| s.is_expired(now))
            .map(|s| s.id)
            .collect();
        for id in expired_ids {
            if let Some(session) = inner.sessions.get_mut(&id) {
                session.status = SessionStatus::Expired;
                let user_id = session.user_id;
                inner.by_user.remove(&user_id);
                swept += 1;
            }
        }

        let before = inner.sessions.len();
        inner.sessions.retain(|_, s| {
            !(s.status.is_terminal() && now - s.started_at > retention)
        });
        swept += before - inner.sessions.len();

        if swept > 0 {
            tracing::info!(swept, "session reaper sweep");
        }
        swept
    }

    /// Number of sessions currently held (any state).
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// Whether the registry holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sessions.is_empty()
    }

    /// The game configuration sessions are created under.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
