//! `AdRewardClient` builder and session-facing API.
//!
//! This is the entry point for an application: it loads the stored
//! credential, talks to the accounting API, and wires the ad board to the
//! reward actor.

use std::sync::Arc;
use std::time::Duration;

use adreward_accounting::{Accounting, HttpAccounting, HttpConfig};
use adreward_credentials::{CredentialError, CredentialStore, Credentials};
use adreward_protocol::{Account, Ad, AdId, Role};
use adreward_timer::{
    AdBoard, NoticeReceiver, RewardConfig, RewardHandle, TimerSnapshot, Verdict, notice_channel,
    spawn_reward_actor,
};

use crate::{AdRewardError, ClientConfig};

/// Builder for an [`AdRewardClient`].
///
/// # Example
///
/// ```rust,no_run
/// use adreward::prelude::*;
///
/// # async fn run() -> Result<(), AdRewardError> {
/// let config = ClientConfig::load("adreward.toml")?;
/// let store = FileCredentialStore::new(&config.credentials_path);
/// let (client, _notices) = AdRewardClient::builder()
///     .config(&config)
///     .connect(&store)
///     .await?;
///
/// for ad in client.ads() {
///     println!("{} ({})", ad.title, ad.price);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AdRewardClientBuilder {
    http: HttpConfig,
    reward: RewardConfig,
}

impl AdRewardClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        let config = ClientConfig::default();
        Self {
            http: config.http(),
            reward: config.reward,
        }
    }

    /// Takes every setting from a loaded config.
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.http = config.http();
        self.reward = config.reward.clone();
        self
    }

    /// Sets the accounting API base URL.
    pub fn api_base_url(mut self, url: &str) -> Self {
        self.http.base_url = url.to_string();
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Sets the reward timer configuration.
    pub fn reward_config(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    /// Loads the stored credential and connects to the HTTP accounting API.
    ///
    /// # Errors
    /// [`AdRewardError::Unauthenticated`] if no credential is stored or the
    /// API rejects it.
    pub async fn connect(
        self,
        store: &impl CredentialStore,
    ) -> Result<(AdRewardClient<HttpAccounting>, NoticeReceiver), AdRewardError> {
        let credentials = stored_credentials(store)?;
        let accounting = HttpAccounting::new(&self.http, &credentials)?;
        tracing::debug!(base_url = %accounting.base_url(), role = %credentials.role, "connecting");
        self.build(accounting).await
    }

    /// Like [`build`](Self::build), but only for a signed-in user: the store
    /// must hold a credential, even though `accounting` authenticates on its
    /// own.
    ///
    /// # Errors
    /// [`AdRewardError::Unauthenticated`] if the store is empty.
    pub async fn build_with_store<A: Accounting>(
        self,
        store: &impl CredentialStore,
        accounting: A,
    ) -> Result<(AdRewardClient<A>, NoticeReceiver), AdRewardError> {
        let credentials = stored_credentials(store)?;
        tracing::debug!(role = %credentials.role, "building with stored credential");
        self.build(accounting).await
    }

    /// Builds a client on top of any [`Accounting`] implementation.
    ///
    /// Fetches the signed-in account (its balance is what rewards are added
    /// to), spawns the reward actor, and loads the ad board.
    pub async fn build<A: Accounting>(
        self,
        accounting: A,
    ) -> Result<(AdRewardClient<A>, NoticeReceiver), AdRewardError> {
        let accounting = Arc::new(accounting);

        let account = accounting.fetch_account().await.map_err(|err| {
            if err.is_unauthorized() {
                tracing::info!(error = %err, "credential rejected, sign-in required");
                AdRewardError::Unauthenticated
            } else {
                AdRewardError::from(err)
            }
        })?;

        let (notice_tx, notice_rx) = notice_channel();
        let timer = spawn_reward_actor(
            self.reward,
            Arc::clone(&accounting),
            account.clone(),
            notice_tx,
        );

        let mut board = AdBoard::new(accounting, timer.clone());
        if let Err(err) = board.refresh().await {
            timer.shutdown().await.ok();
            return Err(err.into());
        }

        tracing::info!(
            user_id = %account.user_id,
            balance = %account.balance,
            ads = board.ads().len(),
            "client ready"
        );
        Ok((AdRewardClient { account, board, timer }, notice_rx))
    }
}

/// The stored credential; an empty store means the user must sign in.
fn stored_credentials(store: &impl CredentialStore) -> Result<Credentials, AdRewardError> {
    store.require().map_err(|err| match err {
        CredentialError::Missing => {
            tracing::info!("no stored credential, sign-in required");
            AdRewardError::Unauthenticated
        }
        other => other.into(),
    })
}

impl Default for AdRewardClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A signed-in ad reward client.
///
/// Notices (rewards, warnings, failures) arrive on the receiver returned
/// alongside it by the builder.
pub struct AdRewardClient<A: Accounting> {
    account: Account,
    board: AdBoard<A>,
    timer: RewardHandle,
}

impl AdRewardClient<HttpAccounting> {
    /// Creates a new builder.
    pub fn builder() -> AdRewardClientBuilder {
        AdRewardClientBuilder::new()
    }
}

impl<A: Accounting> AdRewardClient<A> {
    /// The account as it was when the client connected.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn role(&self) -> Role {
        self.account.role
    }

    /// The ads on the board.
    pub fn ads(&self) -> &[Ad] {
        self.board.ads()
    }

    /// Reloads the ad board.
    pub async fn refresh_ads(&mut self) -> Result<usize, AdRewardError> {
        Ok(self.board.refresh().await?)
    }

    /// Starts viewing an ad from the board.
    pub async fn select(&self, ad_id: &AdId) -> Result<TimerSnapshot, AdRewardError> {
        Ok(self.board.select(ad_id).await?)
    }

    /// Records a click-through; returns the URL to open.
    pub async fn click_through(&self) -> Result<String, AdRewardError> {
        Ok(self.timer.click_through().await?)
    }

    /// The page went to the background.
    pub async fn page_hidden(&self) -> Result<(), AdRewardError> {
        Ok(self.timer.page_hidden().await?)
    }

    /// The page came back to the foreground.
    pub async fn page_visible(&self) -> Result<Verdict, AdRewardError> {
        Ok(self.timer.page_visible().await?)
    }

    /// The reward timer's current state, including the live balance.
    pub async fn snapshot(&self) -> Result<TimerSnapshot, AdRewardError> {
        Ok(self.timer.snapshot().await?)
    }

    /// A handle to the reward actor, e.g. for a UI task.
    pub fn timer(&self) -> &RewardHandle {
        &self.timer
    }

    /// Stops the reward actor and forgets the stored credential.
    pub async fn sign_out(self, store: &impl CredentialStore) -> Result<(), AdRewardError> {
        self.shutdown().await;
        store.clear()?;
        tracing::info!(user_id = %self.account.user_id, "signed out");
        Ok(())
    }

    /// Stops the reward actor. A session in progress is dropped.
    pub async fn shutdown(&self) {
        if self.timer.shutdown().await.is_err() {
            tracing::debug!("reward actor already stopped");
        }
    }
}
