//! Error types for the rate tracker.

use exchange_rates::CurrencyCode;

/// Domain-level errors (invalid values).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Rate for {currency} must be positive and finite, got {value}")]
    NonPositiveRate { currency: CurrencyCode, value: f64 },
}

/// Errors from a single rate fetch.
///
/// All of these are recovered by the fetch task: the error is shown, the
/// stored snapshot stays as it was, and nothing is persisted.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Response is missing currency {0}")]
    MissingCurrency(CurrencyCode),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Persistence-level errors (data access failures).
///
/// Persistence is best-effort: these are logged and never propagated past
/// the fetch task.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Database connection is closed")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(String),
}

/// Errors reported by the refresh engine itself.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Fetch task panicked: {0}")]
    TaskPanicked(String),

    #[error("Scheduler already stopped")]
    Stopped,
}
