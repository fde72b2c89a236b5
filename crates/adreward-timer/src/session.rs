//! The viewing session and the state slot that holds it.

use adreward_protocol::{Ad, AdId, Credits, SessionId};
use tokio::time::Instant;

use crate::Phase;

/// One ad-view-to-reward cycle.
///
/// Created when the user selects an ad, counted down once per tick, and
/// dropped when settlement finishes or the session is invalidated.
#[derive(Debug, Clone)]
pub struct ViewingSession {
    pub id: SessionId,
    pub ad_id: AdId,
    pub target_url: String,
    /// Taken from the viewed ad itself; this is what the balance grows by.
    pub price: Credits,
    /// Counts down to 0. Never negative by construction (`u32`).
    pub remaining_seconds: u32,
    /// Set only by an actual click-through.
    pub click_confirmed: bool,
    /// Flips to `true` exactly once, when confirm or cancel is issued.
    pub reward_settled: bool,
    pub started_at: Instant,
}

impl ViewingSession {
    pub(crate) fn new(id: SessionId, ad: &Ad, duration_secs: u32, now: Instant) -> Self {
        Self {
            id,
            ad_id: ad.id.clone(),
            target_url: ad.target_url.clone(),
            price: ad.price,
            remaining_seconds: duration_secs,
            click_confirmed: false,
            reward_settled: false,
            started_at: now,
        }
    }
}

/// The single active-session slot.
///
/// A tagged union instead of loose flags: there is no way to hold two
/// sessions, or to be "settling" without the session being settled.
#[derive(Debug, Clone, Default)]
pub enum RewardState {
    #[default]
    Idle,
    Active(ViewingSession),
    Settling(ViewingSession),
}

impl RewardState {
    /// The lifecycle phase of this state.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Active(_) => Phase::Active,
            Self::Settling(_) => Phase::Settling,
        }
    }

    /// The session in the slot, if any.
    pub fn session(&self) -> Option<&ViewingSession> {
        match self {
            Self::Idle => None,
            Self::Active(s) | Self::Settling(s) => Some(s),
        }
    }
}
