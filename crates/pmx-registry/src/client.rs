//! HTTP client for public CLOB reads.
//!
//! Wraps the unauthenticated `GET /book` and `GET /price` endpoints used for
//! token metadata and best-price lookups.

use std::time::Duration;

use pmx_core::OrderSide;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::source::{BoxFuture, OrderBookSource, OrderBookSummary, PriceQuote};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default CLOB endpoint.
pub const DEFAULT_CLOB_URL: &str = "https://clob.polymarket.com";

/// Client for public CLOB endpoints.
#[derive(Debug, Clone)]
pub struct ClobRestClient {
    client: Client,
    base_url: String,
}

impl ClobRestClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - CLOB root URL (e.g., "https://clob.polymarket.com")
    pub fn new(base_url: impl Into<String>) -> RegistryResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the order book summary for a token.
    pub async fn get_order_book(&self, token_id: &str) -> RegistryResult<OrderBookSummary> {
        debug!(token_id, "Fetching order book");
        self.get_json("book", &[("token_id", token_id)]).await
    }

    /// Fetch the best price for a token on one side.
    pub async fn get_price(&self, token_id: &str, side: OrderSide) -> RegistryResult<PriceQuote> {
        debug!(token_id, %side, "Fetching price");
        self.get_json("price", &[("token_id", token_id), ("side", side.as_str())])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> RegistryResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| RegistryError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RegistryError::HttpClient(format!("Failed to read response: {e}")))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull `error` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

impl OrderBookSource for ClobRestClient {
    fn get_order_book<'a>(&'a self, token_id: &'a str) -> BoxFuture<'a, RegistryResult<OrderBookSummary>> {
        Box::pin(ClobRestClient::get_order_book(self, token_id))
    }

    fn get_price<'a>(
        &'a self,
        token_id: &'a str,
        side: OrderSide,
    ) -> BoxFuture<'a, RegistryResult<PriceQuote>> {
        Box::pin(ClobRestClient::get_price(self, token_id, side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pmx_core::{Price, TickSize};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_get_order_book() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/book")
            .match_query(Matcher::UrlEncoded("token_id".into(), "123".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "market": "0xcond",
                    "asset_id": "123",
                    "bids": [{"price": "0.45", "size": "10"}],
                    "asks": [],
                    "tick_size": "0.001",
                    "neg_risk": false
                }"#,
            )
            .create_async()
            .await;

        let client = ClobRestClient::new(server.url()).unwrap();
        let book = client.get_order_book("123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(book.tick(), Some(TickSize::Thousandth));
        assert_eq!(book.neg_risk, Some(false));
        assert_eq!(book.bids.len(), 1);
    }

    #[tokio::test]
    async fn test_get_price_sends_side() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/price")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("token_id".into(), "123".into()),
                Matcher::UrlEncoded("side".into(), "BUY".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"price": "0.52"}"#)
            .create_async()
            .await;

        let client = ClobRestClient::new(format!("{}/", server.url())).unwrap();
        let quote = client.get_price("123", OrderSide::Buy).await.unwrap();

        mock.assert_async().await;
        assert_eq!(quote.parsed(), Some(Price::new(dec!(0.52))));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/book")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error": "No orderbook exists for the requested token id"}"#)
            .create_async()
            .await;

        let client = ClobRestClient::new(server.url()).unwrap();
        let err = client.get_order_book("999").await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("No orderbook exists"));
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/book")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"tick_size": "0.1", "neg_risk": true}"#)
            .create_async()
            .await;

        let source: std::sync::Arc<dyn OrderBookSource> =
            std::sync::Arc::new(ClobRestClient::new(server.url()).unwrap());
        let book = source.get_order_book("1").await.unwrap();
        assert_eq!(book.tick(), Some(TickSize::Tenth));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error":"bad token"}"#), "bad token");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }
}
