//! PostgreSQL persistence adapter.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use rates_types::{PersistError, PersistedRecord, PersistenceSink, RateSnapshot};

use crate::config::DatabaseConfig;
use crate::types::{PgRateRow, persist_error};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL-backed append-only rate log.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_currency_rates_pg.sql"),
        "0001",
    )
    .await
}

fn connect_options(config: &DatabaseConfig) -> anyhow::Result<PgConnectOptions> {
    if let Some(url) = &config.url {
        return Ok(PgConnectOptions::from_str(url)?);
    }

    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.db_name)
        .ssl_mode(PgSslMode::from_str(&config.ssl_mode)?))
}

impl PostgresRepo {
    /// Connects, verifies the connection and creates the table if needed.
    pub async fn new(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(connect_options(config)?)
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "failed to connect to database (check your credentials): {}",
                    e
                )
            })?;
        run_migrations(&pool).await?;
        tracing::info!("Currency rates table created/verified successfully");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Most recent rows, newest request first.
    pub async fn recent_rates(&self, limit: i64) -> Result<Vec<PersistedRecord>, PersistError> {
        let rows: Vec<PgRateRow> = sqlx::query_as(
            r#"SELECT id, request_time, base_currency, target_currency, base_rate, target_rate, created_at
               FROM currency_rates ORDER BY request_time DESC, id DESC LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(persist_error)?;

        rows.into_iter().map(PgRateRow::into_domain).collect()
    }

    /// Closes the pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sink implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PersistenceSink for PostgresRepo {
    async fn append(
        &self,
        requested_at: DateTime<Utc>,
        snapshot: &RateSnapshot,
    ) -> Result<(), PersistError> {
        let pair = snapshot.pair();
        sqlx::query(
            r#"INSERT INTO currency_rates (request_time, base_currency, target_currency, base_rate, target_rate)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(requested_at)
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
