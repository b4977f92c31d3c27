//! Control surface: the handle the host uses to drive a running scheduler.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use rates_types::RefreshError;

/// Lifecycle of a `RefreshScheduler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// No fetch in flight; waiting for a tick or a request.
    Waiting,
    /// At least one fetch task is still running.
    Dispatching,
    Stopped,
}

/// Discrete user intents delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    RefreshRequested,
    QuitRequested,
}

/// Cloneable handle to a scheduler.
///
/// Refresh requests queue without limit, so none is dropped. Dropping every
/// handle has the same effect as `quit`.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    refresh_tx: mpsc::UnboundedSender<()>,
    stop_tx: Arc<watch::Sender<bool>>,
    state_rx: watch::Receiver<SchedulerState>,
}

impl ControlHandle {
    pub(crate) fn new(
        refresh_tx: mpsc::UnboundedSender<()>,
        stop_tx: watch::Sender<bool>,
        state_rx: watch::Receiver<SchedulerState>,
    ) -> Self {
        Self {
            refresh_tx,
            stop_tx: Arc::new(stop_tx),
            state_rx,
        }
    }

    /// Routes a host signal to `refresh` or `quit`.
    pub fn send(&self, signal: ControlSignal) -> Result<(), RefreshError> {
        match signal {
            ControlSignal::RefreshRequested => self.refresh(),
            ControlSignal::QuitRequested => {
                self.quit();
                Ok(())
            }
        }
    }

    /// Requests an immediate fetch. Fails once the scheduler is stopping.
    ///
    /// A request accepted here is dispatched even if `quit` follows at once.
    pub fn refresh(&self) -> Result<(), RefreshError> {
        if *self.stop_tx.borrow() {
            return Err(RefreshError::Stopped);
        }
        self.refresh_tx.send(()).map_err(|_| RefreshError::Stopped)
    }

    /// Asks the scheduler to stop. Idempotent.
    pub fn quit(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    /// Resolves once the scheduler has reached `Stopped`.
    pub async fn stopped(&self) {
        let mut rx = self.state_rx.clone();
        // Sender dropped means the scheduler is gone, which is stopped too.
        let _ = rx.wait_for(|s| *s == SchedulerState::Stopped).await;
    }
}
