//! Error types for the accounting layer.

use adreward_protocol::ProtocolError;

/// Errors returned by an [`Accounting`](crate::Accounting) collaborator.
#[derive(Debug, thiserror::Error)]
pub enum AccountingError {
    /// The server rejected the bearer credential (HTTP 401/403). The user
    /// must sign in again; retrying with the same token is pointless.
    #[error("credential rejected by accounting API (HTTP {0})")]
    Unauthorized(u16),

    /// Any other non-success HTTP status.
    #[error("{endpoint} failed with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The request never produced a response (DNS, connect, timeout...).
    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The configured base URL can't be used to build endpoint URLs.
    #[error("invalid API base url: {0}")]
    InvalidBaseUrl(String),

    /// A request body couldn't be encoded or a response body decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The collaborator is unreachable for a reason that isn't HTTP
    /// (used by non-network implementations).
    #[error("accounting unavailable: {0}")]
    Unavailable(String),
}

impl AccountingError {
    /// Returns `true` if the failure means the credential is no good.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
