//! Retrieves the electricity price CSV from its configured location.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::models::price_table::PriceTable;

/// Source of a price table. `None` means no data is available, for whatever
/// reason; the cause is logged by the implementation.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Option<PriceTable>;
}

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads CSV over HTTP(S), or from the local filesystem for any other
/// location (optionally prefixed with `file://`).
#[derive(Clone)]
pub struct CsvPriceFetcher {
    client: Client,
    location: String,
}

impl CsvPriceFetcher {
    pub fn new(location: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, location })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    async fn try_fetch(&self) -> Result<PriceTable, FetchError> {
        let body = if is_http(&self.location) {
            self.client
                .get(&self.location)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?
                .to_vec()
        } else {
            let path = self
                .location
                .strip_prefix("file://")
                .unwrap_or(&self.location);
            tokio::fs::read(path).await?
        };

        Ok(PriceTable::from_csv_reader(body.as_slice())?)
    }
}

#[async_trait]
impl PriceSource for CsvPriceFetcher {
    async fn fetch(&self) -> Option<PriceTable> {
        match self.try_fetch().await {
            Ok(table) => {
                tracing::info!(
                    "Fetched {} electricity price rows from {}",
                    table.len(),
                    self.location
                );
                Some(table)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch electricity data from {}: {}", self.location, e);
                None
            }
        }
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    const CSV: &str = "state,price,timestamp\nVIC,81.52,2025-06-24T00:00:00Z\nNSW,90.10,2025-06-24T00:30:00Z\n";

    fn fetcher(location: String) -> CsvPriceFetcher {
        CsvPriceFetcher::new(location, Duration::from_secs(5)).unwrap()
    }

    async fn serve_fixture() -> String {
        let app = Router::new()
            .route("/prices.csv", get(|| async { CSV }))
            .route(
                "/broken.csv",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_is_http() {
        assert!(is_http("https://raw.githubusercontent.com/x/prices.csv"));
        assert!(is_http("HTTP://example.com/a.csv"));
        assert!(!is_http("file:///tmp/prices.csv"));
        assert!(!is_http("data/prices.csv"));
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let base = serve_fixture().await;

        let table = fetcher(format!("{}/prices.csv", base)).fetch().await.unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][0], "NSW");
    }

    #[tokio::test]
    async fn test_error_status_is_absent() {
        let base = serve_fixture().await;

        assert!(fetcher(format!("{}/broken.csv", base)).fetch().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let path = std::env::temp_dir().join(format!("prices-{}.csv", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, CSV).await.unwrap();

        let table = fetcher(format!("file://{}", path.display()))
            .fetch()
            .await
            .unwrap();
        assert_eq!(table.headers(), &["state", "price", "timestamp"]);

        let table = fetcher(path.display().to_string()).fetch().await.unwrap();
        assert_eq!(table.len(), 2);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let path = std::env::temp_dir().join(format!("missing-{}.csv", uuid::Uuid::new_v4()));

        assert!(fetcher(path.display().to_string()).fetch().await.is_none());
    }
}
