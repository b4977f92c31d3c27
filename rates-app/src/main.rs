//! # Rates Tracker Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the persistence adapter (or fall back to memory-only mode)
//! - Create the refresh service around the HTTP fetcher and console indicator
//! - Run the scheduler until the user quits

mod config;
mod console;
mod control;
mod telemetry;

use std::sync::Arc;

use tracing::{error, info, warn};

use rates_client::CurrencyApiClient;
use rates_hex::RefreshService;
use rates_repo::{DatabaseConfig, Repo, build_repo};
use rates_types::PersistenceSink;

use crate::console::ConsoleIndicator;

/// Logs panics through tracing before the default hook runs.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        error!("Application crashed: {}", panic);
        default_hook(panic);
    }));
}

/// Connects the persistence backend; any failure means memory-only mode.
async fn init_repo(persist: bool) -> Option<Arc<Repo>> {
    if !persist {
        info!("Persistence disabled, running in memory-only mode");
        return None;
    }

    let repo = match DatabaseConfig::from_env() {
        Ok(db_config) => build_repo(&db_config).await,
        Err(e) => Err(e),
    };
    match repo {
        Ok(repo) => Some(Arc::new(repo)),
        Err(e) => {
            warn!(
                "Database initialization failed, continuing in memory-only mode: {}",
                e
            );
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let telemetry = telemetry::init()?;
    install_panic_hook();

    info!("Starting currency rate tracker...");

    // Load configuration
    let config = config::Config::from_env()?;
    info!(
        "Tracking {} every {}s",
        config.refresh.currency_pair,
        config.refresh.interval.as_secs()
    );

    let repo = init_repo(config.persist).await;
    let sink = repo.clone().map(|r| r as Arc<dyn PersistenceSink>);

    let fetcher = CurrencyApiClient::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.refresh.fetch_timeout,
    )?;

    let service = RefreshService::new(
        config.refresh.clone(),
        Arc::new(fetcher),
        Arc::new(ConsoleIndicator::stdout()),
        sink,
    );
    service.install_icon(Some(&config.icon_path));

    let running = service.start();
    let surface = control::run(running.control.clone());
    control::print_help();

    // Blocks until quit
    let outcome = control::supervise(running, surface).await;

    if let Some(repo) = repo {
        repo.close().await;
    }

    if let Ok(report) = &outcome {
        info!(?report, "Currency rate tracker terminated");
    }

    telemetry.shutdown();
    outcome.map(|_| ())
}
