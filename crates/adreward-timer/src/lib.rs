//! # adreward-timer
//!
//! The reward timer for ad viewing.
//!
//! A user picks an ad from the [`AdBoard`], which starts a
//! [`ViewingSession`] on the reward actor. The countdown runs once per
//! tick; a click-through must happen before it reaches 0 for the view to
//! be confirmed and credited, otherwise it is cancelled. Leaving the tab
//! and coming back before the full view duration invalidates the session
//! ([`VisibilityGuard`]).
//!
//! ## Key types
//!
//! - [`RewardTimer`]: the pure state machine
//! - [`spawn_reward_actor`] / [`RewardHandle`]: the task that owns it
//! - [`AdBoard`]: ad list and selection
//! - [`Notice`]: what to tell the user

mod actor;
mod board;
mod config;
mod error;
mod guard;
mod notice;
mod session;
mod timer;

pub use actor::{RewardHandle, spawn_reward_actor};
pub use board::AdBoard;
pub use config::{Phase, RewardConfig};
pub use error::TimerError;
pub use guard::{Verdict, VisibilityGuard};
pub use notice::{Notice, NoticeReceiver, NoticeSender, notice_channel};
pub use session::{RewardState, ViewingSession};
pub use timer::{Dispatch, InvalidReason, Invalidation, RewardTimer, Settlement, TimerSnapshot};
