//! SQLite persistence adapter.
#![allow(clippy::collapsible_if)]

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use rates_types::{PersistError, PersistedRecord, PersistenceSink, RateSnapshot};

use crate::types::{SqliteRateRow, format_timestamp, persist_error};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite-backed append-only rate log.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if in_memory {
            // The database lives only as long as its single connection.
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_currency_rates.sql");
        for statement in ddl.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Most recent rows, newest request first.
    pub async fn recent_rates(&self, limit: i64) -> Result<Vec<PersistedRecord>, PersistError> {
        let rows: Vec<SqliteRateRow> = sqlx::query_as(
            r#"SELECT id, request_time, base_currency, target_currency, base_rate, target_rate, created_at
               FROM currency_rates ORDER BY request_time DESC, id DESC LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(persist_error)?;

        rows.into_iter().map(SqliteRateRow::into_domain).collect()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PersistenceSink for SqliteRepo {
    async fn append(
        &self,
        requested_at: DateTime<Utc>,
        snapshot: &RateSnapshot,
    ) -> Result<(), PersistError> {
        let pair = snapshot.pair();
        sqlx::query(
            r#"INSERT INTO currency_rates (request_time, base_currency, target_currency, base_rate, target_rate)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(format_timestamp(requested_at))
        .bind(pair.base().code())
        .bind(pair.target().code())
        .bind(snapshot.base_rate())
        .bind(snapshot.target_rate())
        .execute(&self.pool)
        .await
        .map_err(persist_error)?;

        tracing::debug!(
            base = snapshot.base_rate(),
            target = snapshot.target_rate(),
            %requested_at,
            "Saved currency rate"
        );
        Ok(())
    }
}
