//! Engine configuration.

use std::time::Duration;

use rates_types::CurrencyPair;

/// Default cadence of scheduled refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3 * 60 * 60);

/// Upper bound on a single upstream call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings of one refresh engine instance.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between scheduled refreshes, measured from the last trigger.
    pub interval: Duration,
    pub currency_pair: CurrencyPair,
    /// Bound on the upstream call and on the shutdown drain of in-flight fetches.
    pub fetch_timeout: Duration,
    /// Dispatch one fetch as soon as the scheduler starts.
    pub fetch_on_start: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            currency_pair: CurrencyPair::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fetch_on_start: true,
        }
    }
}
