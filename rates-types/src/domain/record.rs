//! Append-only persisted fetch record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use exchange_rates::CurrencyPair;

/// One row of the rate history log.
///
/// Rows are created on successful fetches and never updated or deleted. The
/// `id` is assigned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: i64,
    pub request_time: DateTime<Utc>,
    pub pair: CurrencyPair,
    pub base_rate: f64,
    pub target_rate: f64,
    pub created_at: DateTime<Utc>,
}
