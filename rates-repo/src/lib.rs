//! # Rates Repository
//!
//! Concrete persistence implementations (adapters) for the rate tracker.
//! This crate provides database adapters that implement the `PersistenceSink` port.

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("Enable a repo feature: `postgres` or `sqlite`.");

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rates_types::{PersistError, PersistedRecord, PersistenceSink, RateSnapshot};

pub mod config;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

mod types;


pub use config::DatabaseConfig;

/// Unified repository wrapper that handles both SQLite and PostgreSQL.
pub struct Repo {
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    inner: sqlite::SqliteRepo,
    #[cfg(feature = "postgres")]
    inner: postgres::PostgresRepo,
}

/// Build and initialize a repository from connection settings.
///
/// This function:
/// 1. Connects to the database
/// 2. Creates the `currency_rates` table and index if missing
/// 3. Returns a ready-to-use `Repo`
///
/// # Examples
///
/// ```ignore
/// // PostgreSQL (with `postgres` feature), from DB_* variables
/// let repo = build_repo(&DatabaseConfig::from_env()?).await?;
///
/// // SQLite (with `sqlite` feature)
/// let config = DatabaseConfig { url: Some("sqlite://rates.db".into()), ..Default::default() };
/// let repo = build_repo(&config).await?;
/// ```
pub async fn build_repo(config: &DatabaseConfig) -> anyhow::Result<Repo> {
    tracing::info!("Attempting to connect to database: {}", config.describe());
    let repo = Repo::new(config).await?;
    tracing::info!("Database connection initialized successfully");
    Ok(repo)
}

impl Repo {
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub async fn new(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for SQLite"))?;
        let inner = sqlite::SqliteRepo::new(url).await?;
        Ok(Self { inner })
    }

    #[cfg(feature = "postgres")]
    pub async fn new(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let inner = postgres::PostgresRepo::new(config).await?;
        Ok(Self { inner })
    }

    /// Most recent rows, ordered by request time descending.
    pub async fn recent_rates(&self, limit: i64) -> Result<Vec<PersistedRecord>, PersistError> {
        self.inner.recent_rates(limit).await
    }

    pub async fn close(&self) {
        self.inner.close().await;
        tracing::info!("Database connection closed");
    }
}

// Re-export individual repos for direct use if needed
#[cfg(feature = "postgres")]
pub use postgres::PostgresRepo;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepo;

// ─────────────────────────────────────────────────────────────────────────────
// Implement PersistenceSink for Repo (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PersistenceSink for Repo {
    async fn append(
        &self,
        requested_at: DateTime<Utc>,
        snapshot: &RateSnapshot,
    ) -> Result<(), PersistError> {
        self.inner.append(requested_at, snapshot).await
    }
}
