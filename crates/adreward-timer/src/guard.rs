//! Tab-visibility guard.
//!
//! Watches the page's hidden/visible transitions while a session is
//! active. Coming back before the full view duration has passed means the
//! user left early and the session must be invalidated; staying away at
//! least that long is treated as if they never left.

use std::time::Duration;

use tokio::time::Instant;

/// Outcome of the tab becoming visible again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// There was no tracked absence (not hidden, or hidden while idle).
    NotAway,
    /// Back before the full view duration: invalidate.
    LeftEarly { away: Duration },
    /// Away at least the full view duration: carry on.
    StayedAway { away: Duration },
}

impl Verdict {
    pub fn is_left_early(&self) -> bool {
        matches!(self, Self::LeftEarly { .. })
    }
}

/// Tracks when the page went hidden during an active session.
#[derive(Debug)]
pub struct VisibilityGuard {
    full_duration: Duration,
    away_since: Option<Instant>,
    hidden: bool,
}

impl VisibilityGuard {
    pub fn new(full_duration: Duration) -> Self {
        Self {
            full_duration,
            away_since: None,
            hidden: false,
        }
    }

    /// The page went hidden. The absence is only timed while a session is
    /// active; a repeated hidden event keeps the original timestamp.
    pub fn on_hidden(&mut self, now: Instant, session_active: bool) {
        self.hidden = true;
        if session_active && self.away_since.is_none() {
            self.away_since = Some(now);
        }
    }

    /// The page became visible again.
    pub fn on_visible(&mut self, now: Instant) -> Verdict {
        self.hidden = false;
        let Some(since) = self.away_since.take() else {
            return Verdict::NotAway;
        };

        let away = now.saturating_duration_since(since);
        if away < self.full_duration {
            Verdict::LeftEarly { away }
        } else {
            Verdict::StayedAway { away }
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Forgets any tracked absence, e.g. after the session ends.
    pub fn reset(&mut self) {
        self.away_since = None;
    }
}
