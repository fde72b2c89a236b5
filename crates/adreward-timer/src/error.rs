//! Error types for the reward timer layer.

use adreward_accounting::AccountingError;
use adreward_protocol::AdId;

/// Errors that can occur while driving a viewing session.
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    /// A session is already running (or settling); only one ad can be
    /// viewed at a time. Carries the ad that holds the slot.
    #[error("ad {0} is already being viewed")]
    SessionActive(AdId),

    /// The operation needs an active session and there is none.
    #[error("no active viewing session")]
    NoActiveSession,

    /// `finish_settlement` was called outside the Settling state.
    #[error("no session is settling")]
    NotSettling,

    /// The selected ad isn't on the board.
    #[error("ad {0} is not on the board")]
    UnknownAd(AdId),

    /// The reward actor's command channel is closed.
    #[error("reward timer is unavailable")]
    Unavailable,

    /// Loading ads from the accounting collaborator failed.
    #[error(transparent)]
    Accounting(#[from] AccountingError),
}
