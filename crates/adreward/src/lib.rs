//! # adreward
//!
//! Client for a paid-to-view ad service.
//!
//! The user picks an ad, clicks through to it, and keeps the page in the
//! foreground for the full view duration; the view is then confirmed with
//! the accounting API and the ad's price is credited to their balance.
//! Views without a click-through are cancelled, and leaving the page early
//! voids the session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adreward::prelude::*;
//!
//! # async fn run() -> Result<(), AdRewardError> {
//! let config = ClientConfig::load("adreward.toml")?;
//! init_tracing(&config.log_level);
//!
//! let store = FileCredentialStore::new(&config.credentials_path);
//! let (client, mut notices) = AdRewardClient::builder()
//!     .config(&config)
//!     .connect(&store)
//!     .await?;
//!
//! let first = client.ads()[0].id.clone();
//! client.select(&first).await?;
//! let url = client.click_through().await?;
//! println!("open {url}");
//!
//! while let Some(notice) = notices.recv().await {
//!     println!("{notice:?}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;

pub use client::{AdRewardClient, AdRewardClientBuilder};
pub use config::ClientConfig;
pub use error::{AdRewardError, ConfigError};

pub use adreward_accounting as accounting;
pub use adreward_credentials as credentials;
pub use adreward_protocol as protocol;
pub use adreward_timer as timer;

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"info"` or
/// `"adreward_timer=debug"`) is used. Calling it twice is harmless: the
/// second call leaves the first subscriber in place.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// The types most applications need.
pub mod prelude {
    pub use crate::{AdRewardClient, AdRewardError, ClientConfig, init_tracing};
    pub use adreward_accounting::{Accounting, HttpAccounting, MemoryAccounting};
    pub use adreward_credentials::{
        CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore,
    };
    pub use adreward_protocol::{Account, Ad, AdId, Credits, Role, UserId};
    pub use adreward_timer::{Notice, Phase, RewardConfig, TimerSnapshot, Verdict};
}
