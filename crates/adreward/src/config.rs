//! Client configuration, loaded from TOML.
//!
//! ```toml
//! api_base_url = "https://api.example.com/v1/"
//! credentials_path = "/var/lib/adreward/credentials.json"
//! log_level = "info"
//! request_timeout_secs = 10
//!
//! [reward]
//! view_duration_secs = 30
//! tick_period = 1000
//! cancel_on_invalidate = false
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use adreward_accounting::HttpConfig;
use adreward_timer::RewardConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Settings for an [`AdRewardClient`](crate::AdRewardClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the accounting API.
    pub api_base_url: String,
    /// Where the credential JSON file lives.
    pub credentials_path: PathBuf,
    /// Fallback filter for [`init_tracing`](crate::init_tracing) when
    /// `RUST_LOG` is unset.
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub reward: RewardConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/api/".to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            log_level: "info".to_string(),
            request_timeout_secs: 10,
            reward: RewardConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parses TOML text. Missing keys take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<Self>(contents)?.validated())
    }

    /// Fixes values that would make the client misbehave.
    pub fn validated(mut self) -> Self {
        self.reward = self.reward.validated();
        if self.request_timeout_secs == 0 {
            tracing::warn!("request_timeout_secs is 0, using 1");
            self.request_timeout_secs = 1;
        }
        if self.log_level.trim().is_empty() {
            self.log_level = "info".to_string();
        }
        self
    }

    /// The HTTP settings for the accounting client.
    pub fn http(&self) -> HttpConfig {
        HttpConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
