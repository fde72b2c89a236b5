//! Reward timer configuration and lifecycle phases.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RewardConfig
// ---------------------------------------------------------------------------

/// Settings for the reward timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// How many countdown ticks an ad must be watched for. With the
    /// default one-second `tick_period` this is the view time in seconds.
    pub view_duration_secs: u32,

    /// Interval between countdown ticks.
    #[serde(with = "millis")]
    pub tick_period: Duration,

    /// Send `cancel_view` when a session is invalidated for leaving the
    /// tab early. Off by default: abandoned sessions are simply dropped
    /// and the server times them out on its own.
    pub cancel_on_invalidate: bool,

    /// Capacity of the actor's command channel.
    pub channel_size: usize,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            view_duration_secs: 30,
            tick_period: Duration::from_secs(1),
            cancel_on_invalidate: false,
            channel_size: 32,
        }
    }
}

impl RewardConfig {
    /// Config with a specific view duration and defaults elsewhere.
    pub fn with_duration(view_duration_secs: u32) -> Self {
        Self {
            view_duration_secs,
            ..Default::default()
        }
    }

    /// Fixes values that would make the timer misbehave.
    ///
    /// - a zero duration would settle before any tick; raised to 1.
    /// - a zero channel size would panic in `mpsc::channel`; raised to 1.
    pub fn validated(mut self) -> Self {
        if self.view_duration_secs == 0 {
            tracing::warn!("view_duration_secs is 0, using 1");
            self.view_duration_secs = 1;
        }
        self.channel_size = self.channel_size.max(1);
        self
    }

    /// Wall-clock length of a full countdown: `view_duration_secs` ticks
    /// of `tick_period` each.
    ///
    /// This is also the shortest absence from the tab that does not count
    /// as leaving early.
    pub fn countdown_length(&self) -> Duration {
        self.tick_period.saturating_mul(self.view_duration_secs)
    }
}

/// `tick_period` is written as whole milliseconds in config files.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the reward timer is in its lifecycle.
///
/// ```text
/// Idle ──start──→ Active ──countdown hits 0──→ Settling ──→ Idle
///                   │
///                   └──────invalidate──────────────────────→ Idle
/// ```
///
/// - **Idle**: no ad selected; a new session may start.
/// - **Active**: an ad is being viewed and the countdown is running.
/// - **Settling**: the countdown finished and confirm/cancel is being
///   sent to the accounting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Active,
    Settling,
}

impl Phase {
    /// Returns `true` if a new session may start.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` while the countdown is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::Active)
                | (Self::Active, Self::Settling)
                | (Self::Active, Self::Idle)
                | (Self::Settling, Self::Idle)
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
            Self::Settling => write!(f, "Settling"),
        }
    }
}
