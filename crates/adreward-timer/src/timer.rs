//! The reward timer state machine.
//!
//! [`RewardTimer`] is pure: it never performs I/O and never reads the
//! clock itself. Every transition returns what the caller must do next
//! (a [`Dispatch`] to send, a [`Settlement`] to execute), which keeps the
//! reward rules testable without a runtime and lets the actor decide how
//! to talk to the accounting collaborator.
//!
//! The rules it enforces:
//!
//! - one session at a time;
//! - a reward only for a clicked-through, full-duration view;
//! - confirm *or* cancel, at most once per session.

use std::fmt;

use adreward_protocol::{Ad, AdId, Credits, SessionId};
use serde::Serialize;
use tokio::time::Instant;

use crate::{Phase, RewardConfig, RewardState, TimerError, ViewingSession};

// ---------------------------------------------------------------------------
// Transition outputs
// ---------------------------------------------------------------------------

/// A best-effort notification to the accounting collaborator.
///
/// Sent once, never retried, and nobody waits for an answer. Modelled as a
/// value so callers (and tests) can see exactly what was dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A view began.
    BeginView(AdId),
    /// An invalidated session is being abandoned (only when
    /// `cancel_on_invalidate` is set).
    CancelView(AdId),
}

/// What to tell the accounting collaborator when the countdown reaches 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Confirm the view, then credit `price` to the balance.
    Confirm { ad_id: AdId, price: Credits },
    /// Cancel the view; the balance is untouched.
    Cancel { ad_id: AdId },
}

impl Settlement {
    pub fn ad_id(&self) -> &AdId {
        match self {
            Self::Confirm { ad_id, .. } | Self::Cancel { ad_id } => ad_id,
        }
    }
}

/// Why a session was invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The tab was hidden and came back before the full view duration.
    LeftEarly,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftEarly => write!(f, "left-early"),
        }
    }
}

/// Result of [`RewardTimer::invalidate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub session_id: SessionId,
    pub ad_id: AdId,
    pub reason: InvalidReason,
    /// `Some(Dispatch::CancelView)` when the config asks for server-side
    /// cleanup of abandoned sessions.
    pub dispatch: Option<Dispatch>,
}

/// A read-only view of the timer for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub session_id: Option<SessionId>,
    pub ad_id: Option<AdId>,
    /// Full duration while idle.
    pub remaining_seconds: u32,
    pub click_confirmed: bool,
    pub balance: Credits,
}

// ---------------------------------------------------------------------------
// RewardTimer
// ---------------------------------------------------------------------------

/// Owns the single active-session slot and applies the reward rules.
#[derive(Debug)]
pub struct RewardTimer {
    config: RewardConfig,
    state: RewardState,
}

impl RewardTimer {
    pub fn new(config: RewardConfig) -> Self {
        Self {
            config: config.validated(),
            state: RewardState::Idle,
        }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn state(&self) -> &RewardState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Starts viewing `ad`.
    ///
    /// # Errors
    /// [`TimerError::SessionActive`] if a session is active or settling.
    /// The existing session is left exactly as it was.
    pub fn start_session(&mut self, ad: &Ad, now: Instant) -> Result<Dispatch, TimerError> {
        if let Some(current) = self.state.session() {
            tracing::debug!(
                active = %current.ad_id,
                requested = %ad.id,
                "start rejected, session already running"
            );
            return Err(TimerError::SessionActive(current.ad_id.clone()));
        }

        let session = ViewingSession::new(
            SessionId(rand::random()),
            ad,
            self.config.view_duration_secs,
            now,
        );
        tracing::info!(
            session_id = %session.id,
            ad_id = %session.ad_id,
            duration = session.remaining_seconds,
            "viewing session started"
        );
        self.enter(Phase::Idle, RewardState::Active(session));
        Ok(Dispatch::BeginView(ad.id.clone()))
    }

    /// Records that the user actually opened the ad's link.
    ///
    /// Necessary but not sufficient for a reward: the countdown keeps
    /// running. Returns the URL to open.
    ///
    /// # Errors
    /// [`TimerError::NoActiveSession`] unless a session is active.
    pub fn on_click_through(&mut self) -> Result<String, TimerError> {
        let RewardState::Active(session) = &mut self.state else {
            return Err(TimerError::NoActiveSession);
        };
        if !session.click_confirmed {
            session.click_confirmed = true;
            tracing::info!(
                session_id = %session.id,
                remaining = session.remaining_seconds,
                "click-through recorded"
            );
        }
        Ok(session.target_url.clone())
    }

    /// Counts one second down.
    ///
    /// Returns the settlement to execute when the countdown reaches 0; the
    /// timer is then in `Settling` until [`finish_settlement`] is called.
    /// Ticks outside `Active` are ignored.
    ///
    /// [`finish_settlement`]: Self::finish_settlement
    pub fn tick(&mut self) -> Option<Settlement> {
        let RewardState::Active(session) = &mut self.state else {
            return None;
        };

        session.remaining_seconds = session.remaining_seconds.saturating_sub(1);
        tracing::trace!(session_id = %session.id, remaining = session.remaining_seconds, "tick");
        if session.remaining_seconds > 0 {
            return None;
        }

        let settlement = if session.click_confirmed && !session.reward_settled {
            Settlement::Confirm {
                ad_id: session.ad_id.clone(),
                price: session.price,
            }
        } else {
            Settlement::Cancel {
                ad_id: session.ad_id.clone(),
            }
        };
        session.reward_settled = true;

        tracing::info!(
            session_id = %session.id,
            ad_id = %session.ad_id,
            confirmed = matches!(settlement, Settlement::Confirm { .. }),
            "countdown finished, settling"
        );

        if let RewardState::Active(session) = std::mem::take(&mut self.state) {
            self.enter(Phase::Active, RewardState::Settling(session));
        }
        Some(settlement)
    }

    /// Returns to `Idle` after settlement, whatever the collaborator said.
    ///
    /// # Errors
    /// [`TimerError::NotSettling`] outside the `Settling` phase.
    pub fn finish_settlement(&mut self) -> Result<ViewingSession, TimerError> {
        match std::mem::take(&mut self.state) {
            RewardState::Settling(session) => {
                self.enter(Phase::Settling, RewardState::Idle);
                Ok(session)
            }
            other => {
                self.state = other;
                Err(TimerError::NotSettling)
            }
        }
    }

    /// Abandons the active session without a reward.
    ///
    /// Goes straight back to `Idle`, so the next snapshot shows the full
    /// duration and no click. Never confirms; cancels only when
    /// `cancel_on_invalidate` is set.
    ///
    /// # Errors
    /// [`TimerError::NoActiveSession`] unless a session is active and
    /// unsettled.
    pub fn invalidate(&mut self, reason: InvalidReason) -> Result<Invalidation, TimerError> {
        let session = match std::mem::take(&mut self.state) {
            RewardState::Active(session) if !session.reward_settled => session,
            other => {
                self.state = other;
                return Err(TimerError::NoActiveSession);
            }
        };

        self.enter(Phase::Active, RewardState::Idle);
        tracing::warn!(
            session_id = %session.id,
            ad_id = %session.ad_id,
            %reason,
            remaining = session.remaining_seconds,
            "viewing session invalidated"
        );

        let dispatch = self
            .config
            .cancel_on_invalidate
            .then(|| Dispatch::CancelView(session.ad_id.clone()));

        Ok(Invalidation {
            session_id: session.id,
            ad_id: session.ad_id,
            reason,
            dispatch,
        })
    }

    /// Installs `next`, which must be reachable from `from` in the
    /// lifecycle graph.
    fn enter(&mut self, from: Phase, next: RewardState) {
        let to = next.phase();
        debug_assert!(
            from.can_transition_to(to),
            "illegal reward state transition {from} -> {to}"
        );
        tracing::debug!(%from, %to, "reward state transition");
        self.state = next;
    }

    /// A render-ready view of the current state.
    pub fn snapshot(&self, balance: Credits) -> TimerSnapshot {
        match self.state.session() {
            Some(s) => TimerSnapshot {
                phase: self.phase(),
                session_id: Some(s.id),
                ad_id: Some(s.ad_id.clone()),
                remaining_seconds: s.remaining_seconds,
                click_confirmed: s.click_confirmed,
                balance,
            },
            None => TimerSnapshot {
                phase: Phase::Idle,
                session_id: None,
                ad_id: None,
                remaining_seconds: self.config.view_duration_secs,
                click_confirmed: false,
                balance,
            },
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
