//! Latest-rate holder shared by fetch tasks and the presentation layer.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use rates_types::RateSnapshot;

/// The latest snapshot together with the instant it was fetched.
///
/// `fetched_at` is the local instant of the successful fetch and drives the
/// "next refresh" math; it is distinct from the snapshot's own timestamp.
#[derive(Debug, Clone)]
pub struct StoredRates {
    pub snapshot: Arc<RateSnapshot>,
    pub fetched_at: DateTime<Utc>,
}

/// Reader/writer guarded holder of the latest fetch.
///
/// Writes replace snapshot and instant together under the write lock, so a
/// reader always sees a matching pair. Concurrent writers serialize; the
/// last one to take the lock wins.
#[derive(Debug, Default)]
pub struct RateStore {
    inner: RwLock<Option<StoredRates>>,
}

impl RateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value, or `None` before the first successful fetch.
    pub fn read(&self) -> Option<StoredRates> {
        // A poisoned lock still holds a whole value: writes are a single assignment.
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the stored value and returns what was written.
    pub fn write(&self, snapshot: RateSnapshot, fetched_at: DateTime<Utc>) -> StoredRates {
        let stored = StoredRates {
            snapshot: Arc::new(snapshot),
            fetched_at,
        };
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(stored.clone());
        stored
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rates_types::{CurrencyPair, SnapshotTimestamp};

    fn snapshot(target: f64) -> RateSnapshot {
        RateSnapshot::new(
            CurrencyPair::default(),
            1.0,
            target,
            SnapshotTimestamp::Reported(format!("ts-{target}")),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_store_reads_none() {
        let store = RateStore::new();
        assert!(store.read().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_replaces_value() {
        let store = RateStore::new();
        let first = Utc::now();
        store.write(snapshot(5.0), first);
        let later = first + chrono::TimeDelta::minutes(5);
        store.write(snapshot(5.5), later);

        let read = store.read().unwrap();
        assert_eq!(read.snapshot.target_rate(), 5.5);
        assert_eq!(read.fetched_at, later);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_pair() {
        let store = Arc::new(RateStore::new());
        store.write(snapshot(1.0), DateTime::from_timestamp(1, 0).unwrap());

        let writers: Vec<_> = (1..=4)
            .map(|w| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..500i64 {
                        let n = w * 1000 + i;
                        // Every written pair satisfies target == fetched_at seconds.
                        store.write(
                            snapshot(n as f64),
                            DateTime::from_timestamp(n, 0).unwrap(),
                        );
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..2000 {
                        let read = store.read().unwrap();
                        assert_eq!(
                            read.snapshot.target_rate() as i64,
                            read.fetched_at.timestamp()
                        );
                        assert_eq!(
                            read.snapshot.last_updated(),
                            &SnapshotTimestamp::Reported(format!(
                                "ts-{}",
                                read.snapshot.target_rate()
                            ))
                        );
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
    }
}
