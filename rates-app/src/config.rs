//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use rates_hex::RefreshConfig;
use rates_hex::config::{DEFAULT_FETCH_TIMEOUT, DEFAULT_REFRESH_INTERVAL};
use rates_types::{CurrencyCode, CurrencyPair};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub refresh: RefreshConfig,
    pub icon_path: PathBuf,
    /// `false` forces memory-only mode.
    pub persist: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("RATES_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("RATES_API_KEY environment variable is required"))?;

        let base: CurrencyCode = get("RATES_BASE").as_deref().unwrap_or("USD").parse()?;
        let target: CurrencyCode = get("RATES_TARGET").as_deref().unwrap_or("BRL").parse()?;

        let interval = match get("RATES_REFRESH_SECS") {
            Some(s) => Duration::from_secs(s.parse()?),
            None => DEFAULT_REFRESH_INTERVAL,
        };
        if interval.is_zero() {
            anyhow::bail!("RATES_REFRESH_SECS must be greater than zero");
        }

        let fetch_timeout = match get("RATES_FETCH_TIMEOUT_SECS") {
            Some(s) => Duration::from_secs(s.parse()?),
            None => DEFAULT_FETCH_TIMEOUT,
        };

        let persist = match get("RATES_PERSIST") {
            Some(s) => s.parse()?,
            None => true,
        };

        Ok(Self {
            api_url: get("RATES_API_URL").unwrap_or_else(|| rates_client::DEFAULT_BASE_URL.into()),
            api_key,
            refresh: RefreshConfig {
                interval,
                currency_pair: CurrencyPair::new(base, target)?,
                fetch_timeout,
                fetch_on_start: true,
            },
            icon_path: get("RATES_ICON_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("icon/exchange.png")),
            persist,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        Config::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = from(&[("RATES_API_KEY", "secret")]).unwrap();
        assert_eq!(config.api_url, "https://api.currencyapi.com/v3/latest");
        assert_eq!(config.refresh.interval, Duration::from_secs(3 * 3600));
        assert_eq!(config.refresh.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh.currency_pair.to_string(), "USD/BRL");
        assert!(config.persist);
    }

    #[test]
    fn test_api_key_required() {
        let err = from(&[]).unwrap_err();
        assert!(err.to_string().contains("RATES_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let config = from(&[
            ("RATES_API_KEY", "secret"),
            ("RATES_BASE", "eur"),
            ("RATES_TARGET", "GBP"),
            ("RATES_REFRESH_SECS", "600"),
            ("RATES_PERSIST", "false"),
        ])
        .unwrap();
        assert_eq!(config.refresh.currency_pair.to_string(), "EUR/GBP");
        assert_eq!(config.refresh.interval, Duration::from_secs(600));
        assert!(!config.persist);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(from(&[("RATES_API_KEY", "k"), ("RATES_REFRESH_SECS", "0")]).is_err());
        assert!(from(&[("RATES_API_KEY", "k"), ("RATES_TARGET", "USD")]).is_err());
        assert!(from(&[("RATES_API_KEY", "k"), ("RATES_BASE", "ABC")]).is_err());
    }
}
