//! Client credential persistence for adreward.
//!
//! Two values survive a restart: the bearer token every API call carries
//! and the role flag that decides which screens the user gets. This crate
//! owns both:
//!
//! 1. **Credentials** ([`Credentials`]): token + [`Role`], with the token
//!    redacted from `Debug` output.
//! 2. **Storage** ([`CredentialStore`] trait): file-backed and in-memory
//!    implementations.
//!
//! A missing credential is fatal for any authenticated flow
//! ([`CredentialError::Missing`]); callers redirect to sign-in.
//!
//! [`Role`]: adreward_protocol::Role

mod credentials;
mod error;
mod store;

pub use credentials::Credentials;
pub use error::CredentialError;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
