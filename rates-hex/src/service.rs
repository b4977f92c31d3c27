//! Refresh Service
//!
//! Owns the shared state of one running tracker and wires the engine parts
//! together. Contains NO infrastructure logic - adapters are injected.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;

use rates_types::{PersistenceSink, RateFetcher, RefreshError, StatusIndicator};

use crate::config::RefreshConfig;
use crate::control::ControlHandle;
use crate::pipeline::{FetchOutcome, FetchPipeline, Trigger};
use crate::presentation::{PresentationAdapter, Rendered};
use crate::scheduler::{RefreshScheduler, SchedulerReport};
use crate::store::{RateStore, StoredRates};

/// Application service for the rate tracker.
///
/// The store is created here, once per service, and handed to every part
/// that needs it. Without a sink the service runs in memory-only mode.
pub struct RefreshService {
    config: RefreshConfig,
    store: Arc<RateStore>,
    presenter: Arc<PresentationAdapter>,
    pipeline: Arc<FetchPipeline>,
}

/// A started scheduler: its control handle plus the task running it.
pub struct RunningService {
    pub control: ControlHandle,
    pub task: JoinHandle<Result<SchedulerReport, RefreshError>>,
}

impl RefreshService {
    /// Creates a new service with the given adapters.
    pub fn new(
        config: RefreshConfig,
        fetcher: Arc<dyn RateFetcher>,
        indicator: Arc<dyn StatusIndicator>,
        sink: Option<Arc<dyn PersistenceSink>>,
    ) -> Self {
        let store = Arc::new(RateStore::new());
        let presenter = Arc::new(PresentationAdapter::new(
            indicator,
            store.clone(),
            config.interval,
        ));
        let pipeline = Arc::new(FetchPipeline::new(
            config.currency_pair,
            config.fetch_timeout,
            fetcher,
            sink,
            store.clone(),
            presenter.clone(),
        ));

        Self {
            config,
            store,
            presenter,
            pipeline,
        }
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Latest stored value, if any fetch has succeeded.
    pub fn current(&self) -> Option<StoredRates> {
        self.store.read()
    }

    /// Installs the icon (custom path or built-in default).
    pub fn install_icon(&self, path: Option<&Path>) {
        self.presenter.install_icon(path);
    }

    /// Re-renders the display from the current store value.
    pub fn render(&self) -> Rendered {
        self.presenter.refresh()
    }

    /// Runs one fetch task inline, outside any scheduler.
    pub async fn fetch_now(&self) -> FetchOutcome {
        self.pipeline.run(Trigger::Manual).await
    }

    /// Starts a fresh scheduler on the current runtime.
    ///
    /// Renders the loading placeholder first. Each call creates a new
    /// scheduler; a stopped one is never reused.
    pub fn start(&self) -> RunningService {
        self.presenter.refresh();

        let (scheduler, control) = RefreshScheduler::new(&self.config, self.pipeline.clone());
        let task = tokio::spawn(scheduler.run());
        RunningService { control, task }
    }
}
