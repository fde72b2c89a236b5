//! Best-effort countdown ticker for adreward.
//!
//! Drives the reward timer's one-second countdown. The countdown only cares
//! that ticks accumulate, not that they land on exact wall-clock boundaries,
//! so a late tick is reported and the next one is scheduled from *now*
//! (missed ticks are never replayed in a burst).
//!
//! # States
//!
//! ```text
//!   Stopped ──start()──→ Running ──pause()──→ Paused
//!      ↑                   │  ↑                 │
//!      └──────stop()───────┘  └────resume()─────┘
//! ```
//!
//! While stopped or paused, [`Ticker::wait_for_tick`] pends forever, which
//! makes it safe to poll unconditionally inside a `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = ticker.wait_for_tick() => { /* count down */ }
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`Ticker`].
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Interval between ticks. Default: one second.
    pub period: Duration,
    /// Fraction of `period` a tick may be late before it is flagged as
    /// late. Default: 0.10.
    pub late_threshold: f64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            late_threshold: 0.10,
        }
    }
}

impl TickerConfig {
    /// Shortest accepted period. Anything below is clamped up.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// Create a config with a specific period and default thresholds.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called by [`Ticker::new`]. A zero period would spin the select loop,
    /// so it is raised to [`Self::MIN_PERIOD`].
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(period = ?self.period, "ticker period too small, clamping");
            self.period = Self::MIN_PERIOD;
        }
        self.late_threshold = self.late_threshold.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Returned by [`Ticker::wait_for_tick`] for every tick that fires.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Ticks since the last `start()`, starting at 1.
    pub tick: u64,
    /// `true` if the tick woke up later than the late threshold allows.
    pub late: bool,
    /// How far past its deadline the tick fired.
    pub late_by: Duration,
}

/// Counters over the ticker's whole life (not reset by `start()`).
#[derive(Debug, Clone, Default)]
pub struct TickerMetrics {
    pub total_ticks: u64,
    pub total_late: u64,
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Repeating ticker with start/stop and pause/resume.
///
/// One `Ticker` per reward actor.
pub struct Ticker {
    config: TickerConfig,
    tick_count: u64,
    /// Deadline of the next tick; `None` while stopped.
    next_tick: Option<Instant>,
    paused: bool,
    metrics: TickerMetrics,
}

impl Ticker {
    /// Creates a stopped ticker.
    pub fn new(config: TickerConfig) -> Self {
        let config = config.validated();
        debug!(period = ?config.period, "ticker created");
        Self {
            config,
            tick_count: 0,
            next_tick: None,
            paused: false,
            metrics: TickerMetrics::default(),
        }
    }

    /// Creates a stopped ticker with the given period.
    pub fn with_period(period: Duration) -> Self {
        Self::new(TickerConfig::with_period(period))
    }

    /// Starts (or restarts) ticking. The first tick fires one period from
    /// now; the tick counter and pause flag are reset.
    pub fn start(&mut self) {
        self.tick_count = 0;
        self.paused = false;
        self.next_tick = Some(Instant::now() + self.config.period);
        debug!("ticker started");
    }

    /// Stops ticking. `wait_for_tick` pends until the next `start()`.
    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            debug!(ticks = self.tick_count, "ticker stopped");
        }
        self.paused = false;
    }

    /// Waits until the next tick is due.
    ///
    /// Pends forever while stopped or paused.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let next = match self.next_tick {
            Some(next) if !self.paused => next,
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        let period = self.config.period;
        let late_by = now.saturating_duration_since(next);
        let late = late_by > period.mul_f64(self.config.late_threshold);

        self.tick_count += 1;
        self.metrics.total_ticks += 1;
        if late {
            self.metrics.total_late += 1;
            warn!(
                tick = self.tick_count,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick fired late, rescheduling from now"
            );
        }

        // Skip policy: always schedule from now, never from the missed
        // deadline, so a stalled runtime can't burst several ticks at once.
        self.next_tick = Some(now + period);

        trace!(tick = self.tick_count, late, "tick fired");

        TickInfo {
            tick: self.tick_count,
            late,
            late_by,
        }
    }

    /// Pauses ticking. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "ticker paused");
        }
    }

    /// Resumes after a pause. Idempotent.
    ///
    /// The next deadline becomes `now + period`: time spent paused never
    /// counts toward a tick.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if self.next_tick.is_some() {
                self.next_tick = Some(Instant::now() + self.config.period);
            }
            debug!(tick = self.tick_count, "ticker resumed");
        }
    }

    /// Whether the ticker is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the ticker has been started and not stopped.
    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Ticks since the last `start()`.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.config.period
    }

    /// Snapshot of the lifetime counters.
    pub fn metrics(&self) -> &TickerMetrics {
        &self.metrics
    }
}
