//! User-facing notices emitted by the reward actor.
//!
//! The actor never blocks on the UI: notices go out on an unbounded
//! channel and are dropped silently if nobody is listening.

use adreward_protocol::{AdId, Credits};
use tokio::sync::mpsc;

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A view was confirmed and the balance credited.
    Rewarded {
        ad_id: AdId,
        amount: Credits,
        balance: Credits,
    },
    /// The countdown finished without a click-through; no reward.
    NoReward { ad_id: AdId },
    /// Not an error, but the session ended early (e.g. left the tab).
    Warning(String),
    /// A collaborator call failed. Transient; nothing was retried.
    Error(String),
    /// The collaborator rejected the credential; sign in again.
    AuthRequired,
}

impl Notice {
    /// Whether this notice reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_) | Self::AuthRequired)
    }
}

/// Sending side of the notice channel.
pub type NoticeSender = mpsc::UnboundedSender<Notice>;

/// Receiving side of the notice channel.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Sends `notice`, dropping it if nobody is listening.
pub(crate) fn send_notice(notices: &NoticeSender, notice: Notice) {
    if notices.send(notice).is_err() {
        tracing::trace!("notice dropped, no listener");
    }
}

/// Creates a notice channel.
pub fn notice_channel() -> (NoticeSender, NoticeReceiver) {
    mpsc::unbounded_channel()
}
