//! Order book lookup abstraction.
//!
//! The token metadata cache and the order executor only need two public
//! reads from the CLOB: the order book summary (which carries the token's
//! tick size and neg-risk flag) and the best price for a side. This trait
//! lets tests inject a scripted source instead of the REST client.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use pmx_core::{OrderSide, Price, Size, TickSize};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// One price level of the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Size,
}

/// Order book summary as returned by `GET /book`.
///
/// Only the fields this crate reads are modelled; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSummary {
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub bids: Vec<BookLevel>,
    #[serde(default)]
    pub asks: Vec<BookLevel>,
    /// Accepts both `"0.01"` and `0.01`.
    #[serde(default)]
    pub tick_size: Option<Decimal>,
    #[serde(default)]
    pub neg_risk: Option<bool>,
}

impl OrderBookSummary {
    /// Tick size, if present and one of the legal ticks.
    pub fn tick(&self) -> Option<TickSize> {
        self.tick_size.and_then(|t| TickSize::try_from(t).ok())
    }
}

/// Response of `GET /price`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Decimal string; may be absent or malformed on thin books.
    #[serde(default)]
    pub price: Option<String>,
}

impl PriceQuote {
    pub fn new(price: impl Into<String>) -> Self {
        Self {
            price: Some(price.into()),
        }
    }

    /// Parsed price, if the quote carries a valid decimal.
    pub fn parsed(&self) -> Option<Price> {
        self.price.as_deref().and_then(|p| p.parse().ok())
    }
}

/// Public order book reads.
pub trait OrderBookSource: Send + Sync {
    /// Fetch the order book summary for a token.
    fn get_order_book<'a>(&'a self, token_id: &'a str) -> BoxFuture<'a, RegistryResult<OrderBookSummary>>;

    /// Fetch the best price for a token on one side.
    fn get_price<'a>(
        &'a self,
        token_id: &'a str,
        side: OrderSide,
    ) -> BoxFuture<'a, RegistryResult<PriceQuote>>;
}

/// Arc wrapper for OrderBookSource trait objects.
pub type DynOrderBookSource = Arc<dyn OrderBookSource>;

/// Scripted order book source for testing.
///
/// Tokens without a scripted book or price answer with HTTP 404.
#[derive(Debug, Default)]
pub struct MockOrderBookSource {
    books: parking_lot::Mutex<HashMap<String, OrderBookSummary>>,
    prices: parking_lot::Mutex<HashMap<(String, OrderSide), PriceQuote>>,
    /// When set, every call fails with this status.
    fail_status: parking_lot::Mutex<Option<u16>>,
    book_calls: parking_lot::Mutex<Vec<String>>,
    price_calls: parking_lot::Mutex<Vec<(String, OrderSide)>>,
}

impl MockOrderBookSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a book carrying only tick size and neg-risk.
    pub fn set_meta(&self, token_id: &str, tick_size: Option<Decimal>, neg_risk: Option<bool>) {
        self.set_book(
            token_id,
            OrderBookSummary {
                asset_id: Some(token_id.to_string()),
                tick_size,
                neg_risk,
                ..Default::default()
            },
        );
    }

    pub fn set_book(&self, token_id: &str, book: OrderBookSummary) {
        self.books.lock().insert(token_id.to_string(), book);
    }

    pub fn set_price(&self, token_id: &str, side: OrderSide, quote: PriceQuote) {
        self.prices.lock().insert((token_id.to_string(), side), quote);
    }

    pub fn set_fail_status(&self, status: Option<u16>) {
        *self.fail_status.lock() = status;
    }

    /// Token ids passed to `get_order_book`, in call order.
    pub fn book_calls(&self) -> Vec<String> {
        self.book_calls.lock().clone()
    }

    pub fn price_calls(&self) -> Vec<(String, OrderSide)> {
        self.price_calls.lock().clone()
    }

    fn scripted_failure(&self) -> Option<RegistryError> {
        self.fail_status.lock().map(|status| RegistryError::Api {
            status,
            message: "scripted failure".to_string(),
        })
    }
}

impl OrderBookSource for MockOrderBookSource {
    fn get_order_book<'a>(&'a self, token_id: &'a str) -> BoxFuture<'a, RegistryResult<OrderBookSummary>> {
        Box::pin(async move {
            self.book_calls.lock().push(token_id.to_string());
            if let Some(err) = self.scripted_failure() {
                return Err(err);
            }
            self.books
                .lock()
                .get(token_id)
                .cloned()
                .ok_or_else(|| RegistryError::Api {
                    status: 404,
                    message: "No orderbook exists for the requested token id".to_string(),
                })
        })
    }

    fn get_price<'a>(
        &'a self,
        token_id: &'a str,
        side: OrderSide,
    ) -> BoxFuture<'a, RegistryResult<PriceQuote>> {
        Box::pin(async move {
            self.price_calls.lock().push((token_id.to_string(), side));
            if let Some(err) = self.scripted_failure() {
                return Err(err);
            }
            self.prices
                .lock()
                .get(&(token_id.to_string(), side))
                .cloned()
                .ok_or_else(|| RegistryError::Api {
                    status: 404,
                    message: "No price for the requested token id".to_string(),
                })
        })
    }
}
