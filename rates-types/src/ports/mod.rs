//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The refresh engine depends on these traits, not concrete implementations.

mod fetcher;
mod indicator;
mod sink;

pub use fetcher::RateFetcher;
pub use indicator::StatusIndicator;
pub use sink::PersistenceSink;
