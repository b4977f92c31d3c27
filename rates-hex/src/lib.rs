//! # Rates Hex
//!
//! The refresh engine of the exchange rate tracker.
//!
//! ## Architecture
//!
//! - `store` - reader/writer guarded holder of the latest snapshot
//! - `pipeline` - the per-trigger fetch task (update state, then notify sink)
//! - `scheduler` - fixed-interval loop with manual refresh and stop
//! - `control` - the handle hosts use to request refreshes and quit
//! - `presentation` - status line and tooltip rendering
//! - `service` - wires the parts around injected adapters
//!
//! Adapters for the upstream API, persistence and the host indicator are
//! injected as `Arc<dyn Port>`, so tests can swap in in-memory fakes.

pub mod config;
pub mod control;
pub mod pipeline;
pub mod presentation;
pub mod scheduler;
pub mod service;
pub mod store;


pub use config::RefreshConfig;
pub use control::{ControlHandle, ControlSignal, SchedulerState};
pub use pipeline::{FetchOutcome, Trigger};
pub use presentation::{PresentationAdapter, Rendered, format_duration};
pub use scheduler::{RefreshScheduler, SchedulerReport};
pub use service::{RefreshService, RunningService};
pub use store::{RateStore, StoredRates};
