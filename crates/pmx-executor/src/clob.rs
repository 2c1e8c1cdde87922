//! CLOB network client abstraction.
//!
//! Order signing and the authenticated REST protocol live behind these
//! traits. Responses are returned as raw JSON so that normalization stays in
//! one place (`pmx_core::normalize_order_response`).

use std::collections::VecDeque;
use std::sync::Arc;

use pmx_core::{ApiCredentials, MarketOrderArgs, OrderArgs, OrderOptions, OrderType};
use pmx_registry::BoxFuture;
use serde_json::{json, Value};

use crate::error::ClientError;

/// Authenticated order operations.
pub trait OrderSubmitter: Send + Sync {
    /// Sign and post a limit order.
    fn create_and_post_order(
        &self,
        order: OrderArgs,
        options: OrderOptions,
        order_type: OrderType,
        defer_exec: bool,
    ) -> BoxFuture<'_, Result<Value, ClientError>>;

    /// Sign and post a market order.
    fn create_and_post_market_order(
        &self,
        order: MarketOrderArgs,
        options: OrderOptions,
        order_type: OrderType,
        defer_exec: bool,
    ) -> BoxFuture<'_, Result<Value, ClientError>>;

    fn cancel_order<'a>(&'a self, order_id: &'a str) -> BoxFuture<'a, Result<Value, ClientError>>;

    fn get_open_orders(&self) -> BoxFuture<'_, Result<Vec<Value>, ClientError>>;
}

/// L1-authenticated API key management.
pub trait ApiKeyProvider: Send + Sync {
    /// Recover the credentials already registered for the signer.
    fn derive_api_key(&self) -> BoxFuture<'_, Result<ApiCredentials, ClientError>>;

    /// Register new credentials for the signer.
    fn create_api_key(&self) -> BoxFuture<'_, Result<ApiCredentials, ClientError>>;
}

/// Arc wrapper for OrderSubmitter trait objects.
pub type DynOrderSubmitter = Arc<dyn OrderSubmitter>;

/// Arc wrapper for ApiKeyProvider trait objects.
pub type DynApiKeyProvider = Arc<dyn ApiKeyProvider>;

/// A call recorded by [`MockClobClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClobCall {
    Limit {
        order: OrderArgs,
        options: OrderOptions,
        order_type: OrderType,
        defer_exec: bool,
    },
    Market {
        order: MarketOrderArgs,
        options: OrderOptions,
        order_type: OrderType,
        defer_exec: bool,
    },
    Cancel(String),
    OpenOrders,
    DeriveApiKey,
    CreateApiKey,
}

/// Scripted CLOB client for testing.
///
/// Order posts pop queued responses; when the queue is empty they answer
/// with an accepted order.
#[derive(Debug)]
pub struct MockClobClient {
    calls: parking_lot::Mutex<Vec<ClobCall>>,
    responses: parking_lot::Mutex<VecDeque<Result<Value, ClientError>>>,
    derived: parking_lot::Mutex<Result<ApiCredentials, ClientError>>,
    created: parking_lot::Mutex<Result<ApiCredentials, ClientError>>,
}

impl Default for MockClobClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClobClient {
    pub fn new() -> Self {
        Self {
            calls: parking_lot::Mutex::new(Vec::new()),
            responses: parking_lot::Mutex::new(VecDeque::new()),
            derived: parking_lot::Mutex::new(Ok(Self::credentials("derived"))),
            created: parking_lot::Mutex::new(Ok(Self::credentials("created"))),
        }
    }

    /// Credentials whose fields are all prefixed with `tag`.
    pub fn credentials(tag: &str) -> ApiCredentials {
        ApiCredentials {
            api_key: format!("{tag}-key"),
            secret: format!("{tag}-secret"),
            passphrase: format!("{tag}-passphrase"),
        }
    }

    /// Queue the next order-post response.
    pub fn push_response(&self, response: Result<Value, ClientError>) {
        self.responses.lock().push_back(response);
    }

    pub fn set_derive_result(&self, result: Result<ApiCredentials, ClientError>) {
        *self.derived.lock() = result;
    }

    pub fn set_create_result(&self, result: Result<ApiCredentials, ClientError>) {
        *self.created.lock() = result;
    }

    pub fn calls(&self) -> Vec<ClobCall> {
        self.calls.lock().clone()
    }

    fn next_response(&self) -> Result<Value, ClientError> {
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Ok(json!({
                "success": true,
                "errorMsg": "",
                "orderID": "0xmock",
                "status": "live"
            }))
        })
    }
}

impl OrderSubmitter for MockClobClient {
    fn create_and_post_order(
        &self,
        order: OrderArgs,
        options: OrderOptions,
        order_type: OrderType,
        defer_exec: bool,
    ) -> BoxFuture<'_, Result<Value, ClientError>> {
        Box::pin(async move {
            self.calls.lock().push(ClobCall::Limit {
                order,
                options,
                order_type,
                defer_exec,
            });
            self.next_response()
        })
    }

    fn create_and_post_market_order(
        &self,
        order: MarketOrderArgs,
        options: OrderOptions,
        order_type: OrderType,
        defer_exec: bool,
    ) -> BoxFuture<'_, Result<Value, ClientError>> {
        Box::pin(async move {
            self.calls.lock().push(ClobCall::Market {
                order,
                options,
                order_type,
                defer_exec,
            });
            self.next_response()
        })
    }

    fn cancel_order<'a>(&'a self, order_id: &'a str) -> BoxFuture<'a, Result<Value, ClientError>> {
        Box::pin(async move {
            self.calls.lock().push(ClobCall::Cancel(order_id.to_string()));
            Ok(json!({ "canceled": [order_id], "not_canceled": {} }))
        })
    }

    fn get_open_orders(&self) -> BoxFuture<'_, Result<Vec<Value>, ClientError>> {
        Box::pin(async move {
            self.calls.lock().push(ClobCall::OpenOrders);
            Ok(vec![json!({ "id": "0xmock", "status": "LIVE" })])
        })
    }
}

impl ApiKeyProvider for MockClobClient {
    fn derive_api_key(&self) -> BoxFuture<'_, Result<ApiCredentials, ClientError>> {
        Box::pin(async move {
            self.calls.lock().push(ClobCall::DeriveApiKey);
            self.derived.lock().clone()
        })
    }

    fn create_api_key(&self) -> BoxFuture<'_, Result<ApiCredentials, ClientError>> {
        Box::pin(async move {
            self.calls.lock().push(ClobCall::CreateApiKey);
            self.created.lock().clone()
        })
    }
}
