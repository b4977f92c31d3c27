//! Database row types for the `currency_rates` table.

use sqlx::FromRow;

use rates_types::{CurrencyPair, PersistError, PersistedRecord};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Rate row from PostgreSQL (native timestamps).
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgRateRow {
    pub id: i64,
    pub request_time: chrono::DateTime<chrono::Utc>,
    pub base_currency: String,
    pub target_currency: String,
    pub base_rate: f64,
    pub target_rate: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "postgres")]
impl PgRateRow {
    pub fn into_domain(self) -> Result<PersistedRecord, PersistError> {
        Ok(PersistedRecord {
            id: self.id,
            request_time: self.request_time,
            pair: parse_pair(&self.base_currency, &self.target_currency)?,
            base_rate: self.base_rate,
            target_rate: self.target_rate,
            created_at: self.created_at,
        })
    }
}

/// Rate row from SQLite (timestamps stored as RFC 3339 text).
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteRateRow {
    pub id: i64,
    pub request_time: String,
    pub base_currency: String,
    pub target_currency: String,
    pub base_rate: f64,
    pub target_rate: f64,
    pub created_at: String,
}

#[cfg(feature = "sqlite")]
impl SqliteRateRow {
    pub fn into_domain(self) -> Result<PersistedRecord, PersistError> {
        Ok(PersistedRecord {
            id: self.id,
            request_time: parse_timestamp(&self.request_time)?,
            pair: parse_pair(&self.base_currency, &self.target_currency)?,
            base_rate: self.base_rate,
            target_rate: self.target_rate,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Maps a sqlx error; a closed pool means the backend is gone.
pub fn persist_error(e: sqlx::Error) -> PersistError {
    match e {
        sqlx::Error::PoolClosed => PersistError::Unavailable,
        e => PersistError::Database(e.to_string()),
    }
}

pub fn parse_pair(base: &str, target: &str) -> Result<CurrencyPair, PersistError> {
    let base = base
        .parse()
        .map_err(|e| PersistError::Database(format!("{}", e)))?;
    let target = target
        .parse()
        .map_err(|e| PersistError::Database(format!("{}", e)))?;
    CurrencyPair::new(base, target).map_err(|e| PersistError::Database(e.to_string()))
}

#[cfg(feature = "sqlite")]
pub fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, PersistError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| PersistError::Database(format!("Invalid timestamp {:?}: {}", s, e)))
}

/// Fixed-width UTC text, so that string order matches time order.
#[cfg(feature = "sqlite")]
pub fn format_timestamp(t: chrono::DateTime<chrono::Utc>) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
