//! Rendering of the stored rates into a status line and tooltip.
//!
//! The formatting functions are pure and take `now` explicitly;
//! `PresentationAdapter` reads the store and pushes the result to the host
//! `StatusIndicator`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use tracing::{debug, info};

use rates_types::{FetchError, RateSnapshot, StatusIndicator};

use crate::store::{RateStore, StoredRates};

pub const LOADING_STATUS: &str = "Loading...";
pub const LOADING_TOOLTIP: &str = "Fetching currency data...";
pub const ERROR_STATUS: &str = "Error loading data";
pub const ERROR_TOOLTIP: &str = "Error fetching currency data";

/// Built-in 16x16 PNG used when no custom icon can be loaded.
pub const DEFAULT_ICON: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x91, 0x68, 0x36, 0x00, 0x00, 0x00, 0x1F, 0x49, 0x44, 0x41, 0x54, 0x28, 0x53, 0x63, 0x60,
    0x18, 0x05, 0xA3, 0x60, 0x14, 0x8C, 0x02, 0x08, 0x00, 0x00, 0x00, 0x04, 0x10, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Text pushed to the status indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub status: String,
    pub tooltip: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pure formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Formats a remaining duration in whole hours and minutes.
///
/// Negative is `"overdue"`, under a minute is `"now"`; zero units are omitted
/// and partial units are truncated.
pub fn format_duration(d: TimeDelta) -> String {
    if d < TimeDelta::zero() {
        return "overdue".to_string();
    }

    let hours = d.num_hours();
    let minutes = d.num_minutes() % 60;

    match (hours, minutes) {
        (0, 0) => "now".to_string(),
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hours"),
        (h, m) => format!("{h} hours {m} min"),
    }
}

/// `"USD: $1.0000 | BRL: R$5.4321"`
pub fn status_line(snapshot: &RateSnapshot) -> String {
    let pair = snapshot.pair();
    format!(
        "{}: {}{:.4} | {}: {}{:.4}",
        pair.base(),
        pair.base().symbol(),
        snapshot.base_rate(),
        pair.target(),
        pair.target().symbol(),
        snapshot.target_rate(),
    )
}

/// Symbol-free variant used inside tooltips.
fn plain_line(snapshot: &RateSnapshot) -> String {
    let pair = snapshot.pair();
    format!(
        "{}: {:.4} | {}: {:.4}",
        pair.base(),
        snapshot.base_rate(),
        pair.target(),
        snapshot.target_rate(),
    )
}

fn local_clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

fn to_delta(interval: Duration) -> TimeDelta {
    TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX)
}

/// Renders the current store value as of `now`.
pub fn render(stored: Option<&StoredRates>, interval: Duration, now: DateTime<Utc>) -> Rendered {
    let Some(stored) = stored else {
        return Rendered {
            status: LOADING_STATUS.to_string(),
            tooltip: LOADING_TOOLTIP.to_string(),
        };
    };

    let remaining = stored
        .fetched_at
        .checked_add_signed(to_delta(interval))
        .map_or(TimeDelta::MAX, |next| next - now);
    let next = if remaining > TimeDelta::zero() {
        format_duration(remaining)
    } else {
        "due now".to_string()
    };

    Rendered {
        status: status_line(&stored.snapshot),
        tooltip: format!(
            "{}\nLast: {} | Next: {}",
            plain_line(&stored.snapshot),
            local_clock(stored.fetched_at),
            next
        ),
    }
}

/// Renders a failed attempt. The last good value, if any, is shown as such.
pub fn render_error(stored: Option<&StoredRates>, err: &FetchError) -> Rendered {
    let tooltip = match stored {
        Some(stored) => format!(
            "{ERROR_TOOLTIP}: {err}\nLast good: {} at {}",
            plain_line(&stored.snapshot),
            local_clock(stored.fetched_at)
        ),
        None => format!("{ERROR_TOOLTIP}: {err}"),
    };
    Rendered {
        status: ERROR_STATUS.to_string(),
        tooltip,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Pushes rendered store state to the host indicator.
pub struct PresentationAdapter {
    indicator: Arc<dyn StatusIndicator>,
    store: Arc<RateStore>,
    interval: Duration,
}

impl PresentationAdapter {
    pub fn new(indicator: Arc<dyn StatusIndicator>, store: Arc<RateStore>, interval: Duration) -> Self {
        Self {
            indicator,
            store,
            interval,
        }
    }

    /// Re-renders from the store and returns what was pushed.
    pub fn refresh(&self) -> Rendered {
        let rendered = render(self.store.read().as_ref(), self.interval, Utc::now());
        debug!(status = %rendered.status, tooltip = %rendered.tooltip, "Updating display");
        self.push(&rendered);
        rendered
    }

    /// Shows the error indicator for a failed fetch.
    pub fn show_error(&self, err: &FetchError) -> Rendered {
        let rendered = render_error(self.store.read().as_ref(), err);
        self.push(&rendered);
        rendered
    }

    /// Loads the icon at `path`, falling back to `DEFAULT_ICON`, and installs it.
    pub fn install_icon(&self, path: Option<&Path>) {
        let icon = match path.map(std::fs::read) {
            Some(Ok(bytes)) if !bytes.is_empty() => {
                info!("Using custom icon");
                bytes
            }
            Some(Ok(_)) => {
                info!("Custom icon is empty, using default icon");
                DEFAULT_ICON.to_vec()
            }
            Some(Err(e)) => {
                info!("Using default icon (custom icon load failed: {})", e);
                DEFAULT_ICON.to_vec()
            }
            None => DEFAULT_ICON.to_vec(),
        };
        self.indicator.set_icon(&icon);
    }

    fn push(&self, rendered: &Rendered) {
        self.indicator.set_status(&rendered.status, &rendered.tooltip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rates_types::{CurrencyPair, SnapshotTimestamp};

    const THREE_HOURS: Duration = Duration::from_secs(3 * 3600);

    fn stored(target: f64, fetched_at: DateTime<Utc>) -> StoredRates {
        StoredRates {
            snapshot: Arc::new(
                RateSnapshot::new(
                    CurrencyPair::default(),
                    1.0,
                    target,
                    SnapshotTimestamp::Captured(fetched_at),
                )
                .unwrap(),
            ),
            fetched_at,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::minutes(-30)), "overdue");
        assert_eq!(format_duration(TimeDelta::zero()), "now");
        assert_eq!(format_duration(TimeDelta::seconds(59)), "now");
        assert_eq!(format_duration(TimeDelta::minutes(45)), "45 min");
        assert_eq!(format_duration(TimeDelta::minutes(150)), "2 hours 30 min");
        assert_eq!(format_duration(TimeDelta::hours(2)), "2 hours");
    }

    #[test]
    fn test_format_duration_truncates() {
        let d = TimeDelta::hours(1) + TimeDelta::minutes(59) + TimeDelta::seconds(59);
        assert_eq!(format_duration(d), "1 hours 59 min");
    }

    #[test]
    fn test_render_loading_before_first_fetch() {
        let rendered = render(None, THREE_HOURS, Utc::now());
        assert_eq!(rendered.status, LOADING_STATUS);
        assert!(!rendered.tooltip.contains("Next"));
    }

    #[test]
    fn test_render_status_and_remaining_time() {
        let t = Utc::now();
        let s = stored(5.4321, t);
        let rendered = render(Some(&s), THREE_HOURS, t + TimeDelta::hours(1));

        assert_eq!(rendered.status, "USD: $1.0000 | BRL: R$5.4321");
        assert!(rendered.tooltip.starts_with("USD: 1.0000 | BRL: 5.4321\nLast: "));
        assert!(rendered.tooltip.ends_with("| Next: 2 hours"));
    }

    #[test]
    fn test_render_due_now_when_overdue() {
        let t = Utc::now();
        let s = stored(5.0, t);
        let rendered = render(Some(&s), THREE_HOURS, t + TimeDelta::hours(4));
        assert!(rendered.tooltip.ends_with("Next: due now"));
    }

    #[test]
    fn test_render_error_keeps_last_good_labeled() {
        let t = Utc::now();
        let s = stored(5.0, t);
        let err = FetchError::Status {
            status: 500,
            body: "boom".into(),
        };

        let with_prior = render_error(Some(&s), &err);
        assert_eq!(with_prior.status, ERROR_STATUS);
        assert!(with_prior.tooltip.contains("Last good: USD: 1.0000 | BRL: 5.0000"));

        let without = render_error(None, &err);
        assert_eq!(without.status, ERROR_STATUS);
        assert!(!without.tooltip.contains("Last good"));
    }
}
