//! The accounting collaborator seam for adreward.
//!
//! The remote API that grants rewards is not ours. This crate describes
//! what the client needs from it as the [`Accounting`] trait and provides:
//!
//! - [`HttpAccounting`]: the real thing, over HTTP with a bearer
//!   credential (feature `http`, on by default).
//! - [`MemoryAccounting`]: an in-process stand-in that records every call,
//!   for tests and demos.
//!
//! # Feature Flags
//!
//! - `http` (default): HTTP client via `reqwest`

mod error;
#[cfg(feature = "http")]
mod http;
mod memory;

pub use error::AccountingError;
#[cfg(feature = "http")]
pub use http::{HttpAccounting, HttpConfig};
pub use memory::{AccountingCall, MemoryAccounting, Operation};

use std::future::Future;

use adreward_protocol::{Account, Ad, AdId, Credits, UserId};

/// The remote accounting service as seen by the reward timer.
///
/// `begin_view` is advisory and may be dropped. `confirm_view` and
/// `cancel_view` are each sent at most once per viewing session, and never
/// both. `update_balance` follows a successful `confirm_view`.
pub trait Accounting: Send + Sync + 'static {
    /// Signals that the user started viewing an ad.
    fn begin_view(
        &self,
        ad_id: &AdId,
    ) -> impl Future<Output = Result<(), AccountingError>> + Send;

    /// Grants reward eligibility for a completed, clicked-through view.
    fn confirm_view(
        &self,
        ad_id: &AdId,
    ) -> impl Future<Output = Result<(), AccountingError>> + Send;

    /// Reports a completed view that earns nothing.
    fn cancel_view(
        &self,
        ad_id: &AdId,
    ) -> impl Future<Output = Result<(), AccountingError>> + Send;

    /// Stores the user's new balance (prior balance plus the ad's price).
    fn update_balance(
        &self,
        user_id: &UserId,
        new_balance: Credits,
    ) -> impl Future<Output = Result<(), AccountingError>> + Send;

    /// Lists the ads available to view.
    fn list_ads(
        &self,
    ) -> impl Future<Output = Result<Vec<Ad>, AccountingError>> + Send;

    /// Fetches the signed-in user's account (id, balance, role).
    fn fetch_account(
        &self,
    ) -> impl Future<Output = Result<Account, AccountingError>> + Send;
}
