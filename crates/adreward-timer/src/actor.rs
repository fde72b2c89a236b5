//! Reward actor: one Tokio task that owns the reward timer.
//!
//! The actor holds the [`RewardTimer`], the [`VisibilityGuard`], and the
//! [`Ticker`]. Commands arrive on a bounded channel and the ticker is
//! polled in the same `select!` loop, so every transition is serialized
//! without locks. Settlement calls to the accounting collaborator are
//! awaited inline; begin/cancel notifications are fire-and-forget.

use std::sync::Arc;

use adreward_accounting::{Accounting, AccountingError};
use adreward_protocol::{Account, Ad, AdId, Credits};
use adreward_tick::{TickInfo, Ticker, TickerConfig};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::{
    Dispatch, InvalidReason, Notice, NoticeSender, RewardConfig, RewardTimer, Settlement,
    TimerError, TimerSnapshot, Verdict, VisibilityGuard, notice::send_notice,
};

/// Commands sent to the reward actor.
pub(crate) enum RewardCommand {
    Start {
        ad: Ad,
        reply: oneshot::Sender<Result<TimerSnapshot, TimerError>>,
    },
    ClickThrough {
        reply: oneshot::Sender<Result<String, TimerError>>,
    },
    Hidden {
        reply: oneshot::Sender<()>,
    },
    Visible {
        reply: oneshot::Sender<Verdict>,
    },
    Snapshot {
        reply: oneshot::Sender<TimerSnapshot>,
    },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running reward actor.
///
/// Cheap to clone; every clone talks to the same actor and therefore the
/// same single session slot.
#[derive(Clone)]
pub struct RewardHandle {
    sender: mpsc::Sender<RewardCommand>,
}

impl RewardHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RewardCommand,
    ) -> Result<T, TimerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| TimerError::Unavailable)?;
        reply_rx.await.map_err(|_| TimerError::Unavailable)
    }

    /// Starts viewing `ad`. Rejected while another session is running.
    pub async fn start_session(&self, ad: Ad) -> Result<TimerSnapshot, TimerError> {
        self.request(|reply| RewardCommand::Start { ad, reply }).await?
    }

    /// Records a click-through and returns the URL to open.
    pub async fn click_through(&self) -> Result<String, TimerError> {
        self.request(|reply| RewardCommand::ClickThrough { reply })
            .await?
    }

    /// The page went to the background.
    pub async fn page_hidden(&self) -> Result<(), TimerError> {
        self.request(|reply| RewardCommand::Hidden { reply }).await
    }

    /// The page came back to the foreground.
    pub async fn page_visible(&self) -> Result<Verdict, TimerError> {
        self.request(|reply| RewardCommand::Visible { reply }).await
    }

    /// The current timer state, for rendering.
    pub async fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        self.request(|reply| RewardCommand::Snapshot { reply }).await
    }

    /// Stops the actor. An in-flight session is dropped without settling.
    pub async fn shutdown(&self) -> Result<(), TimerError> {
        self.sender
            .send(RewardCommand::Shutdown)
            .await
            .map_err(|_| TimerError::Unavailable)
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Spawns a reward actor for `account` and returns its handle.
///
/// `account.balance` is the prior balance the first reward is added to;
/// the actor keeps it current as rewards are credited.
pub fn spawn_reward_actor<A: Accounting>(
    config: RewardConfig,
    accounting: Arc<A>,
    account: Account,
    notices: NoticeSender,
) -> RewardHandle {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = RewardActor {
        ticker: Ticker::new(TickerConfig::with_period(config.tick_period)),
        guard: VisibilityGuard::new(config.countdown_length()),
        timer: RewardTimer::new(config),
        accounting,
        account,
        notices,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RewardHandle { sender: tx }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct RewardActor<A: Accounting> {
    timer: RewardTimer,
    guard: VisibilityGuard,
    ticker: Ticker,
    accounting: Arc<A>,
    account: Account,
    notices: NoticeSender,
    receiver: mpsc::Receiver<RewardCommand>,
}

impl<A: Accounting> RewardActor<A> {
    async fn run(mut self) {
        tracing::info!(user_id = %self.account.user_id, "reward actor started");

        loop {
            tokio::select! {
                biased;

                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                info = self.ticker.wait_for_tick() => {
                    self.on_tick(info).await;
                }
            }
        }

        self.ticker.stop();
        let metrics = self.ticker.metrics();
        tracing::info!(
            user_id = %self.account.user_id,
            ticks = metrics.total_ticks,
            late_ticks = metrics.total_late,
            "reward actor stopped"
        );
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: RewardCommand) -> bool {
        match cmd {
            RewardCommand::Start { ad, reply } => {
                let _ = reply.send(self.handle_start(&ad));
            }
            RewardCommand::ClickThrough { reply } => {
                let _ = reply.send(self.timer.on_click_through());
            }
            RewardCommand::Hidden { reply } => {
                self.handle_hidden();
                let _ = reply.send(());
            }
            RewardCommand::Visible { reply } => {
                let _ = reply.send(self.handle_visible());
            }
            RewardCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            RewardCommand::Shutdown => {
                if let Some(session) = self.timer.state().session() {
                    tracing::info!(
                        session_id = %session.id,
                        ad_id = %session.ad_id,
                        "shutting down with a session in progress"
                    );
                }
                return false;
            }
        }
        true
    }

    fn snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot(self.account.balance)
    }

    fn handle_start(&mut self, ad: &Ad) -> Result<TimerSnapshot, TimerError> {
        let dispatch = self.timer.start_session(ad, Instant::now())?;
        self.guard.reset();
        self.ticker.start();
        // A tab that is already in the background starts timing its
        // absence right away.
        if self.guard.is_hidden() {
            self.guard.on_hidden(Instant::now(), true);
            self.ticker.pause();
        }
        self.dispatch(dispatch);
        Ok(self.snapshot())
    }

    fn handle_hidden(&mut self) {
        let active = self.timer.phase().is_active();
        self.guard.on_hidden(Instant::now(), active);
        if active {
            self.ticker.pause();
        }
    }

    fn handle_visible(&mut self) -> Verdict {
        let verdict = self.guard.on_visible(Instant::now());
        self.ticker.resume();

        if let Verdict::LeftEarly { away } = verdict {
            match self.timer.invalidate(InvalidReason::LeftEarly) {
                Ok(invalidation) => {
                    self.ticker.stop();
                    tracing::debug!(
                        ad_id = %invalidation.ad_id,
                        away_ms = away.as_millis() as u64,
                        "left the tab early"
                    );
                    if let Some(dispatch) = invalidation.dispatch {
                        self.dispatch(dispatch);
                    }
                    self.notify(Notice::Warning(
                        "You left the page before the timer finished; no reward for this view."
                            .into(),
                    ));
                }
                Err(err) => {
                    tracing::debug!(error = %err, "nothing to invalidate");
                }
            }
        }
        verdict
    }

    async fn on_tick(&mut self, info: TickInfo) {
        if info.late {
            // A late tick still counts as one second; the countdown is
            // deferred, never accelerated.
            tracing::debug!(
                tick = info.tick,
                late_ms = info.late_by.as_millis() as u64,
                "countdown tick arrived late"
            );
        }
        let Some(settlement) = self.timer.tick() else {
            return;
        };
        tracing::debug!(
            ad_id = %settlement.ad_id(),
            ticks = self.ticker.tick_count(),
            "countdown complete"
        );
        self.ticker.stop();
        self.settle(settlement).await;
        self.guard.reset();
        match self.timer.finish_settlement() {
            Ok(session) => tracing::debug!(
                session_id = %session.id,
                viewed_ms = session.started_at.elapsed().as_millis() as u64,
                "session closed"
            ),
            Err(err) => tracing::warn!(error = %err, "settlement finished outside Settling"),
        }
    }

    /// Executes a settlement. Each branch makes its calls exactly once and
    /// never retries; the timer returns to Idle whatever happens here.
    async fn settle(&mut self, settlement: Settlement) {
        match settlement {
            Settlement::Confirm { ad_id, price } => {
                match self.confirm_and_credit(&ad_id, price).await {
                    Ok(balance) => {
                        self.account.balance = balance;
                        tracing::info!(%ad_id, %price, %balance, "view rewarded");
                        self.notify(Notice::Rewarded {
                            ad_id,
                            amount: price,
                            balance,
                        });
                    }
                    Err(err) => self.report_failure("confirm", &ad_id, err),
                }
            }
            Settlement::Cancel { ad_id } => match self.accounting.cancel_view(&ad_id).await {
                Ok(()) => {
                    tracing::info!(%ad_id, "view cancelled, no click-through");
                    self.notify(Notice::NoReward { ad_id });
                }
                Err(err) => self.report_failure("cancel", &ad_id, err),
            },
        }
    }

    /// Confirms the view, then writes `prior balance + price`. The balance
    /// update is skipped if the confirm fails.
    async fn confirm_and_credit(
        &self,
        ad_id: &AdId,
        price: Credits,
    ) -> Result<Credits, AccountingError> {
        self.accounting.confirm_view(ad_id).await?;
        let balance = self.account.balance.saturating_add(price);
        self.accounting
            .update_balance(&self.account.user_id, balance)
            .await?;
        Ok(balance)
    }

    /// Sends a best-effort notification on its own task.
    fn dispatch(&self, dispatch: Dispatch) {
        let accounting = Arc::clone(&self.accounting);
        let notices = self.notices.clone();
        tokio::spawn(async move {
            let (call, ad_id, result) = match dispatch {
                Dispatch::BeginView(ad_id) => {
                    let result = accounting.begin_view(&ad_id).await;
                    ("begin", ad_id, result)
                }
                Dispatch::CancelView(ad_id) => {
                    let result = accounting.cancel_view(&ad_id).await;
                    ("cancel", ad_id, result)
                }
            };
            if let Err(err) = result {
                send_notice(&notices, failure_notice(call, &ad_id, &err));
            }
        });
    }

    fn report_failure(&self, call: &'static str, ad_id: &AdId, err: AccountingError) {
        self.notify(failure_notice(call, ad_id, &err));
    }

    fn notify(&self, notice: Notice) {
        send_notice(&self.notices, notice);
    }
}

/// Logs a collaborator failure and turns it into the notice to show.
fn failure_notice(call: &'static str, ad_id: &AdId, err: &AccountingError) -> Notice {
    tracing::warn!(call, %ad_id, error = %err, "accounting call failed");
    if err.is_unauthorized() {
        Notice::AuthRequired
    } else {
        Notice::Error(format!("Could not {call} the view of ad {ad_id}: {err}"))
    }
}
