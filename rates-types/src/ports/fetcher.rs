//! Rate fetcher port.
//!
//! This trait defines the interface for the upstream rate source.
//! Implementations can be HTTP clients, mock providers, etc.

use crate::domain::RateSnapshot;
use crate::error::FetchError;
use exchange_rates::CurrencyPair;

/// Port trait for rate sources.
///
/// One call performs one request; implementations hold no state between
/// calls beyond connection reuse.
#[async_trait::async_trait]
pub trait RateFetcher: Send + Sync + 'static {
    /// Fetches the current rates for `pair`.
    ///
    /// Any non-success status, unparseable body or missing currency must be
    /// reported as a `FetchError`.
    async fn fetch(&self, pair: CurrencyPair) -> Result<RateSnapshot, FetchError>;
}
