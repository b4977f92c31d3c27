//! # Rates Types
//!
//! Domain types and port traits for the exchange rate tracker.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (RateSnapshot, PersistedRecord)
//! - `ports/` - Trait definitions that adapters must implement
//! - `error/` - Domain, fetch, persistence and engine error types

pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{PersistedRecord, RateSnapshot, SnapshotTimestamp};
pub use error::{DomainError, FetchError, PersistError, RefreshError};
pub use exchange_rates::{CurrencyCode, CurrencyPair};
pub use ports::{PersistenceSink, RateFetcher, StatusIndicator};
