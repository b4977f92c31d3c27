//! Persistence sink port.
//!
//! Adapters (Postgres, SQLite, in-memory) implement this trait to record
//! every successful fetch in an append-only log.

use chrono::{DateTime, Utc};

use crate::domain::RateSnapshot;
use crate::error::PersistError;

/// Append-only storage for fetch results.
///
/// Implementations must be safe to call concurrently. Callers treat every
/// error as advisory.
#[async_trait::async_trait]
pub trait PersistenceSink: Send + Sync + 'static {
    /// Appends one row for a fetch issued at `requested_at`.
    async fn append(
        &self,
        requested_at: DateTime<Utc>,
        snapshot: &RateSnapshot,
    ) -> Result<(), PersistError>;
}
