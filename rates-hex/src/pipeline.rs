//! The per-trigger fetch task.
//!
//! A fetch runs in two phases:
//! 1. **update state** - fetch, validate and write the store (must succeed)
//! 2. **notify sink** - append to persistence (logged, never propagated)
//!
//! and then re-renders the presentation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use rates_types::{CurrencyPair, FetchError, PersistenceSink, RateFetcher, RateSnapshot};

use crate::presentation::PresentationAdapter;
use crate::store::{RateStore, StoredRates};

/// What caused a fetch to be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Scheduled,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Startup => "startup",
            Trigger::Scheduled => "scheduled",
            Trigger::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Result of one fetch task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Store updated and display refreshed.
    Updated,
    /// Fetch failed; store untouched, error displayed.
    Failed,
}

/// Everything a fetch task needs, shared by all tasks.
pub struct FetchPipeline {
    pair: CurrencyPair,
    timeout: Duration,
    fetcher: Arc<dyn RateFetcher>,
    sink: Option<Arc<dyn PersistenceSink>>,
    store: Arc<RateStore>,
    presenter: Arc<PresentationAdapter>,
}

impl FetchPipeline {
    pub fn new(
        pair: CurrencyPair,
        timeout: Duration,
        fetcher: Arc<dyn RateFetcher>,
        sink: Option<Arc<dyn PersistenceSink>>,
        store: Arc<RateStore>,
        presenter: Arc<PresentationAdapter>,
    ) -> Self {
        Self {
            pair,
            timeout,
            fetcher,
            sink,
            store,
            presenter,
        }
    }

    /// Runs one complete fetch task.
    #[instrument(skip(self), fields(pair = %self.pair))]
    pub async fn run(&self, trigger: Trigger) -> FetchOutcome {
        let requested_at = Utc::now();

        let stored = match self.update_state().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Error fetching currency data: {}", e);
                self.presenter.show_error(&e);
                return FetchOutcome::Failed;
            }
        };

        self.notify_sink(requested_at, &stored.snapshot).await;
        self.presenter.refresh();

        info!(
            base = stored.snapshot.base_rate(),
            target = stored.snapshot.target_rate(),
            "Currency data updated successfully"
        );
        FetchOutcome::Updated
    }

    async fn update_state(&self) -> Result<StoredRates, FetchError> {
        let snapshot = match tokio::time::timeout(self.timeout, self.fetcher.fetch(self.pair)).await
        {
            Ok(result) => result?,
            Err(_) => return Err(FetchError::Timeout(self.timeout.as_secs())),
        };

        // A zero rate must never reach the store, whatever the fetcher returned.
        snapshot.validate()?;

        Ok(self.store.write(snapshot, Utc::now()))
    }

    async fn notify_sink(&self, requested_at: DateTime<Utc>, snapshot: &RateSnapshot) {
        let Some(sink) = &self.sink else {
            return;
        };

        match tokio::time::timeout(self.timeout, sink.append(requested_at, snapshot)).await {
            Ok(Ok(())) => info!("Currency data saved to database"),
            Ok(Err(e)) => warn!("Failed to save currency data to database: {}", e),
            Err(_) => warn!(
                "Saving currency data timed out after {}s",
                self.timeout.as_secs()
            ),
        }
    }
}
