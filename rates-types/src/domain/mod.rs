//! Domain models for the rate tracker.

pub mod record;
pub mod snapshot;

pub use record::PersistedRecord;
pub use snapshot::{RateSnapshot, SnapshotTimestamp};
