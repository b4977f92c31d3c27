//! Immutable snapshot of one successful rate fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use exchange_rates::{CurrencyCode, CurrencyPair};

/// When the rates in a snapshot were last updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum SnapshotTimestamp {
    /// Timestamp string as reported by the upstream API.
    Reported(String),
    /// Instant captured locally when the response arrived.
    Captured(DateTime<Utc>),
}

impl fmt::Display for SnapshotTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotTimestamp::Reported(s) => f.write_str(s),
            SnapshotTimestamp::Captured(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}

/// A pair of rates plus their timestamp.
///
/// Snapshots are never mutated: a new fetch builds a new snapshot, and the
/// store swaps the whole value. Both rates are guaranteed finite and strictly
/// positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pair: CurrencyPair,
    base_rate: f64,
    target_rate: f64,
    last_updated: SnapshotTimestamp,
}

impl RateSnapshot {
    /// Creates a snapshot, rejecting zero, negative or non-finite rates.
    pub fn new(
        pair: CurrencyPair,
        base_rate: f64,
        target_rate: f64,
        last_updated: SnapshotTimestamp,
    ) -> Result<Self, DomainError> {
        validate_rate(pair.base(), base_rate)?;
        validate_rate(pair.target(), target_rate)?;
        Ok(Self {
            pair,
            base_rate,
            target_rate,
            last_updated,
        })
    }

    /// Re-checks the rate invariants (deserialized snapshots skip `new`).
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_rate(self.pair.base(), self.base_rate)?;
        validate_rate(self.pair.target(), self.target_rate)
    }

    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    /// Value of one unit of the base currency, in base units (normally 1.0).
    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    /// Value of one unit of the base currency, in target units.
    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }

    pub fn last_updated(&self) -> &SnapshotTimestamp {
        &self.last_updated
    }
}

fn validate_rate(currency: CurrencyCode, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::NonPositiveRate { currency, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> CurrencyPair {
        CurrencyPair::default()
    }

    #[test]
    fn test_snapshot_accepts_positive_rates() {
        let snap = RateSnapshot::new(
            pair(),
            1.0,
            5.4321,
            SnapshotTimestamp::Reported("2025-01-01T00:00:00Z".into()),
        )
        .unwrap();

        assert_eq!(snap.base_rate(), 1.0);
        assert_eq!(snap.target_rate(), 5.4321);
        assert_eq!(snap.last_updated().to_string(), "2025-01-01T00:00:00Z");
    }

    #[test]
    fn test_snapshot_rejects_zero_target() {
        let err = RateSnapshot::new(pair(), 1.0, 0.0, SnapshotTimestamp::Captured(Utc::now()))
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::NonPositiveRate {
                currency: CurrencyCode::BRL,
                ..
            }
        ));
    }

    #[test]
    fn test_snapshot_rejects_nan_and_negative() {
        let now = SnapshotTimestamp::Captured(Utc::now());
        assert!(RateSnapshot::new(pair(), f64::NAN, 5.0, now.clone()).is_err());
        assert!(RateSnapshot::new(pair(), -1.0, 5.0, now.clone()).is_err());
        assert!(RateSnapshot::new(pair(), 1.0, f64::INFINITY, now).is_err());
    }

    #[test]
    fn test_validate_catches_deserialized_zero() {
        let json = r#"{"pair":{"base":"USD","target":"BRL"},"base_rate":1.0,"target_rate":0.0,
            "last_updated":{"source":"reported","value":"x"}}"#;
        let snap: RateSnapshot = serde_json::from_str(json).unwrap();
        assert!(snap.validate().is_err());
    }

    #[test]
    fn test_timestamp_serializes_with_source_tag() {
        let ts = SnapshotTimestamp::Reported("yesterday".into());
        let json = serde_json::to_value(&ts).unwrap();
        assert_eq!(json["source"], "reported");
        assert_eq!(json["value"], "yesterday");
    }
}
