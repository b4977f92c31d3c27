//! Refresh scheduler.
//!
//! One long-lived loop waits on three things at once: the next deadline, a
//! manual refresh request, and the stop signal. Every trigger spawns a fetch
//! task into a `JoinSet`; the loop itself never does network I/O.
//!
//! Deadlines are absolute (`now + interval`, recomputed after every
//! dispatch). A loop that wakes late after a host suspend fires a single
//! catch-up fetch rather than one per missed tick, and a manual refresh
//! pushes the next tick back by a full interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use rates_types::RefreshError;

use crate::config::RefreshConfig;
use crate::control::{ControlHandle, SchedulerState};
use crate::pipeline::{FetchOutcome, FetchPipeline, Trigger};

/// Counters reported when the scheduler stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub dispatched: usize,
    pub updated: usize,
    pub failed: usize,
    /// Fetches still running when the shutdown drain timed out; left to finish.
    pub detached: usize,
}

pub struct RefreshScheduler {
    interval: Duration,
    fetch_on_start: bool,
    drain_timeout: Duration,
    pipeline: Arc<FetchPipeline>,
    refresh_rx: mpsc::UnboundedReceiver<()>,
    stop_rx: watch::Receiver<bool>,
    state_tx: watch::Sender<SchedulerState>,
    tasks: JoinSet<FetchOutcome>,
    report: SchedulerReport,
}

impl RefreshScheduler {
    /// Creates an idle scheduler and the handle that controls it.
    pub fn new(config: &RefreshConfig, pipeline: Arc<FetchPipeline>) -> (Self, ControlHandle) {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);

        let scheduler = Self {
            interval: config.interval,
            fetch_on_start: config.fetch_on_start,
            // One fetch task is bounded by the fetch timeout plus the sink timeout.
            drain_timeout: 2 * config.fetch_timeout + Duration::from_secs(1),
            pipeline,
            refresh_rx,
            stop_rx,
            state_tx,
            tasks: JoinSet::new(),
            report: SchedulerReport::default(),
        };
        let handle = ControlHandle::new(refresh_tx, stop_tx, state_rx);
        (scheduler, handle)
    }

    /// Runs until stopped, then drains in-flight fetches.
    ///
    /// Consumes the scheduler: a stopped scheduler cannot be restarted.
    pub async fn run(mut self) -> Result<SchedulerReport, RefreshError> {
        info!(
            "Starting periodic scheduler: updating every {}s",
            self.interval.as_secs()
        );

        if self.fetch_on_start {
            self.dispatch(Trigger::Startup);
        }
        let mut deadline = Instant::now() + self.interval;

        let outcome = loop {
            self.set_state(if self.tasks.is_empty() {
                SchedulerState::Waiting
            } else {
                SchedulerState::Dispatching
            });

            tokio::select! {
                biased;

                // Err means every handle was dropped; treat it as quit.
                _ = self.stop_rx.changed() => {
                    self.dispatch_queued();
                    break Ok(());
                }

                Some(()) = self.refresh_rx.recv() => {
                    info!("Manual refresh requested");
                    self.dispatch(Trigger::Manual);
                    deadline = Instant::now() + self.interval;
                }

                _ = time::sleep_until(deadline) => {
                    info!("Periodic update triggered");
                    self.dispatch(Trigger::Scheduled);
                    deadline = Instant::now() + self.interval;
                }

                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(e) = self.record(joined) {
                        break Err(e);
                    }
                }
            }
        };

        info!("Periodic scheduler stopped");
        let drained = self.drain().await;
        self.set_state(SchedulerState::Stopped);

        outcome.and(drained).map(|()| self.report)
    }

    /// Closes the refresh channel and dispatches requests accepted before the stop.
    fn dispatch_queued(&mut self) {
        self.refresh_rx.close();
        while self.refresh_rx.try_recv().is_ok() {
            info!("Dispatching refresh requested before stop");
            self.dispatch(Trigger::Manual);
        }
    }

    fn dispatch(&mut self, trigger: Trigger) {
        self.set_state(SchedulerState::Dispatching);
        let pipeline = self.pipeline.clone();
        self.tasks.spawn(async move { pipeline.run(trigger).await });
        self.report.dispatched += 1;
        debug!(%trigger, in_flight = self.tasks.len(), "Fetch dispatched");
    }

    fn record(&mut self, joined: Result<FetchOutcome, JoinError>) -> Result<(), RefreshError> {
        match joined {
            Ok(FetchOutcome::Updated) => self.report.updated += 1,
            Ok(FetchOutcome::Failed) => self.report.failed += 1,
            Err(e) if e.is_panic() => {
                error!("Fetch task panicked: {}", e);
                return Err(RefreshError::TaskPanicked(e.to_string()));
            }
            Err(e) => warn!("Fetch task cancelled: {}", e),
        }
        Ok(())
    }

    /// Waits for in-flight fetches, bounded by the drain timeout.
    ///
    /// Fetches still running at the bound are detached, not aborted.
    async fn drain(&mut self) -> Result<(), RefreshError> {
        if self.tasks.is_empty() {
            return Ok(());
        }
        info!("Waiting for {} in-flight fetch(es)", self.tasks.len());

        let deadline = Instant::now() + self.drain_timeout;
        let mut result = Ok(());
        loop {
            match time::timeout_at(deadline, self.tasks.join_next()).await {
                Ok(Some(joined)) => {
                    if let Err(e) = self.record(joined) {
                        result = Err(e);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    self.report.detached = self.tasks.len();
                    warn!("Leaving {} fetch(es) to finish in the background", self.report.detached);
                    self.tasks.detach_all();
                    break;
                }
            }
        }
        result
    }

    fn set_state(&self, state: SchedulerState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            debug!(from = ?*current, to = ?state, "Scheduler state");
            *current = state;
            true
        });
    }
}
