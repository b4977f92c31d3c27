//! Rates CLI
//!
//! One-shot commands against the rate API and the persisted history.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use rates_client::CurrencyApiClient;
use rates_hex::StoredRates;
use rates_hex::presentation::render;
use rates_repo::{DatabaseConfig, build_repo};
use rates_types::{CurrencyCode, CurrencyPair, RateFetcher};

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "Exchange rate tracker CLI", long_about = None)]
struct Cli {
    /// Latest-rates endpoint
    #[arg(long, env = "RATES_API_URL", default_value = rates_client::DEFAULT_BASE_URL)]
    api_url: String,

    /// API key sent in the `apikey` header
    #[arg(long, env = "RATES_API_KEY")]
    api_key: Option<String>,

    /// Base currency
    #[arg(long, env = "RATES_BASE", default_value = "USD")]
    base: CurrencyCode,

    /// Target currency
    #[arg(long, env = "RATES_TARGET", default_value = "BRL")]
    target: CurrencyCode,

    /// Request timeout in seconds
    #[arg(long, env = "RATES_FETCH_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the latest rates once and print the snapshot
    Fetch,
    /// Fetch once and print the status line and tooltip
    Status {
        /// Refresh interval used for the "Next" countdown
        #[arg(long, env = "RATES_REFRESH_SECS", default_value = "10800")]
        refresh_secs: u64,
    },
    /// Show the most recent persisted rows
    History {
        /// Number of rows to show
        #[arg(long, default_value = "10")]
        limit: i64,
        /// Database URL (overrides DB_* variables)
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
}

fn build_client(cli: &Cli) -> Result<Arc<CurrencyApiClient>> {
    let Some(api_key) = cli.api_key.as_deref() else {
        anyhow::bail!("RATES_API_KEY (or --api-key) is required");
    };
    let client = CurrencyApiClient::new(
        cli.api_url.as_str(),
        api_key,
        Duration::from_secs(cli.timeout_secs),
    )?;
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let pair = CurrencyPair::new(cli.base, cli.target)?;

    match &cli.command {
        Commands::Fetch => {
            let client = build_client(&cli)?;
            let snapshot = client.fetch(pair).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Status { refresh_secs } => {
            let client = build_client(&cli)?;
            let fetched_at = chrono::Utc::now();
            let snapshot = client.fetch(pair).await?;
            let stored = StoredRates {
                snapshot: Arc::new(snapshot),
                fetched_at,
            };
            let rendered = render(
                Some(&stored),
                Duration::from_secs(*refresh_secs),
                chrono::Utc::now(),
            );
            println!("{}", rendered.status);
            println!("{}", rendered.tooltip);
        }

        Commands::History {
            limit,
            database_url,
        } => {
            if *limit <= 0 {
                anyhow::bail!("--limit must be positive");
            }
            let mut config = DatabaseConfig::from_env()?;
            if let Some(url) = database_url {
                config.url = Some(url.clone());
            }
            let repo = build_repo(&config).await?;
            let rows = repo.recent_rates(*limit).await;
            repo.close().await;

            let rows = rows?;
            if rows.is_empty() {
                println!("No rates recorded yet");
            } else {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
        }
    }

    Ok(())
}
