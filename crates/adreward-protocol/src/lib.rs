//! Wire types for adreward.
//!
//! This crate defines what the client and the remote accounting API
//! exchange:
//!
//! - **Types** ([`Ad`], [`Account`], [`BalanceUpdate`], identity newtypes,
//!   [`Credits`], [`Role`]).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! It knows nothing about HTTP or timers; the accounting crate moves these
//! bytes and the timer crate decides when.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Account, Ad, AdId, BalanceUpdate, Credits, Role, SessionId, UserId,
};
