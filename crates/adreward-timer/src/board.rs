//! Ad board: the grid of ads the user picks from.

use std::sync::Arc;

use adreward_accounting::Accounting;
use adreward_protocol::{Ad, AdId};

use crate::{RewardHandle, TimerError, TimerSnapshot};

/// Holds the ads fetched from the accounting collaborator and routes a
/// selection to the reward timer.
///
/// The board never decides whether a view may start; the reward actor
/// owns that rule. Selecting while a session is running is rejected there.
pub struct AdBoard<A: Accounting> {
    accounting: Arc<A>,
    ads: Vec<Ad>,
    timer: RewardHandle,
}

impl<A: Accounting> AdBoard<A> {
    /// Creates an empty board. Call [`refresh`](Self::refresh) to load ads.
    pub fn new(accounting: Arc<A>, timer: RewardHandle) -> Self {
        Self {
            accounting,
            ads: Vec::new(),
            timer,
        }
    }

    /// Reloads the ad list. On failure the previous list is kept.
    pub async fn refresh(&mut self) -> Result<usize, TimerError> {
        let ads = self.accounting.list_ads().await.inspect_err(|err| {
            tracing::warn!(error = %err, "failed to load ads, keeping previous list");
        })?;
        tracing::debug!(count = ads.len(), "ad board refreshed");
        self.ads = ads;
        Ok(self.ads.len())
    }

    /// The ads currently on the board, in server order.
    pub fn ads(&self) -> &[Ad] {
        &self.ads
    }

    /// Looks up an ad by id.
    pub fn get(&self, ad_id: &AdId) -> Option<&Ad> {
        self.ads.iter().find(|ad| ad.id == *ad_id)
    }

    /// Starts viewing the ad with `ad_id`.
    ///
    /// # Errors
    /// [`TimerError::UnknownAd`] if the ad is not on the board, otherwise
    /// whatever the reward timer says (e.g. a session is already active).
    pub async fn select(&self, ad_id: &AdId) -> Result<TimerSnapshot, TimerError> {
        let ad = self
            .get(ad_id)
            .cloned()
            .ok_or_else(|| TimerError::UnknownAd(ad_id.clone()))?;
        self.timer.start_session(ad).await
    }

    /// The reward timer this board feeds.
    pub fn timer(&self) -> &RewardHandle {
        &self.timer
    }
}
