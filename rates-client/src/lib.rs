//! # Rates Client
//!
//! HTTP `RateFetcher` for the currencyapi.com `latest` endpoint.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use rates_types::{CurrencyPair, FetchError, RateFetcher, RateSnapshot, SnapshotTimestamp};

pub const DEFAULT_BASE_URL: &str = "https://api.currencyapi.com/v3/latest";

/// Longest error body kept in a `FetchError::Status`.
const MAX_ERROR_BODY: usize = 512;

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    meta: Meta,
    data: HashMap<String, CurrencyValue>,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    last_updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrencyValue {
    value: f64,
}

/// Parses a `latest` response body into a snapshot for `pair`.
///
/// Both currencies must be present; the upstream `last_updated_at` is kept
/// when reported, otherwise the local receive time is used.
pub fn parse_latest(body: &str, pair: CurrencyPair) -> Result<RateSnapshot, FetchError> {
    let resp: LatestResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let value_of = |code: rates_types::CurrencyCode| {
        resp.data
            .get(code.code())
            .map(|v| v.value)
            .ok_or(FetchError::MissingCurrency(code))
    };
    let base_rate = value_of(pair.base())?;
    let target_rate = value_of(pair.target())?;

    let last_updated = match resp.meta.last_updated_at {
        Some(reported) if !reported.is_empty() => SnapshotTimestamp::Reported(reported),
        _ => SnapshotTimestamp::Captured(Utc::now()),
    };

    Ok(RateSnapshot::new(pair, base_rate, target_rate, last_updated)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// currencyapi.com client.
pub struct CurrencyApiClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    http: Client,
}

impl CurrencyApiClient {
    /// Creates a new client whose every request is bounded by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            return FetchError::Timeout(self.timeout.as_secs());
        }
        FetchError::Http(err.without_url().to_string())
    }
}

#[async_trait]
impl RateFetcher for CurrencyApiClient {
    #[instrument(skip(self), fields(url = %self.base_url))]
    async fn fetch(&self, pair: CurrencyPair) -> Result<RateSnapshot, FetchError> {
        let resp = self
            .http
            .get(&self.base_url)
            // Key travels in a header, never in the URL.
            .header("apikey", &self.api_key)
            .query(&[
                ("currencies", pair.codes()),
                ("base_currency", pair.base().code().to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify(e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "Rate response received");

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        parse_latest(&body, pair)
    }
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut end = max;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use rates_types::CurrencyCode;

    const BODY: &str = r#"{
        "meta": { "last_updated_at": "2025-06-01T23:59:59Z" },
        "data": {
            "BRL": { "code": "BRL", "value": 5.4321 },
            "USD": { "code": "USD", "value": 1 }
        }
    }"#;

    #[test]
    fn test_parse_latest() {
        let snap = parse_latest(BODY, CurrencyPair::default()).unwrap();
        assert_eq!(snap.base_rate(), 1.0);
        assert_eq!(snap.target_rate(), 5.4321);
        assert_eq!(
            snap.last_updated(),
            &SnapshotTimestamp::Reported("2025-06-01T23:59:59Z".into())
        );
    }

    #[test]
    fn test_parse_missing_currency() {
        let pair = CurrencyPair::new(CurrencyCode::USD, CurrencyCode::EUR).unwrap();
        let err = parse_latest(BODY, pair).unwrap_err();
        assert!(matches!(err, FetchError::MissingCurrency(CurrencyCode::EUR)));
    }

    #[test]
    fn test_parse_zero_value_is_invalid() {
        let body = r#"{"meta":{},"data":{"USD":{"value":1.0},"BRL":{"value":0}}}"#;
        let err = parse_latest(body, CurrencyPair::default()).unwrap_err();
        assert!(matches!(err, FetchError::Invalid(_)));
    }

    #[test]
    fn test_parse_without_meta_uses_local_time() {
        let body = r#"{"data":{"USD":{"value":1.0},"BRL":{"value":5.1}}}"#;
        let snap = parse_latest(body, CurrencyPair::default()).unwrap();
        assert!(matches!(snap.last_updated(), SnapshotTimestamp::Captured(_)));
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_latest("<html>oops</html>", CurrencyPair::default()).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "R$".repeat(10) + "€€€";
        let cut = truncate(body, 21);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 24);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client =
            CurrencyApiClient::new("http://localhost:9/v3/latest/", "k", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9/v3/latest");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP round trips against a one-shot local server
    // ─────────────────────────────────────────────────────────────────────────

    /// Serves a single response and hands back the raw request it received.
    async fn serve_once(
        status_line: &'static str,
        body: String,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v3/latest", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (url, server)
    }

    #[tokio::test]
    async fn test_fetch_sends_key_and_query() {
        let (url, server) = serve_once("200 OK", BODY.to_string()).await;
        let client = CurrencyApiClient::new(url, "secret", Duration::from_secs(5)).unwrap();

        let snap = client.fetch(CurrencyPair::default()).await.unwrap();
        assert_eq!(snap.target_rate(), 5.4321);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v3/latest?"), "{request}");
        assert!(request.contains("currencies=USD%2CBRL"), "{request}");
        assert!(request.contains("base_currency=USD"), "{request}");
        assert!(request.to_ascii_lowercase().contains("apikey: secret"), "{request}");
        assert!(!request.contains("apikey="), "{request}");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let body = "x".repeat(1000);
        let (url, server) = serve_once("503 Service Unavailable", body).await;
        let client = CurrencyApiClient::new(url, "secret", Duration::from_secs(5)).unwrap();

        let err = client.fetch(CurrencyPair::default()).await.unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body.len(), MAX_ERROR_BODY + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_missing_currency_in_response() {
        let body = r#"{"data":{"USD":{"value":1.0}}}"#.to_string();
        let (url, server) = serve_once("200 OK", body).await;
        let client = CurrencyApiClient::new(url, "secret", Duration::from_secs(5)).unwrap();

        let err = client.fetch(CurrencyPair::default()).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingCurrency(CurrencyCode::BRL)));
        server.await.unwrap();
    }
}
