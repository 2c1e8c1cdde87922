//! Relayer abstraction for gasless Safe deployment and execution.

use std::sync::Arc;

use alloy::primitives::Address;
use pmx_registry::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::encode::SafeTransaction;
use crate::error::RelayError;

/// Acknowledgement of a relayed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayReceipt {
    pub transaction_hash: Option<String>,
    /// Address of the Safe, for deployments.
    pub proxy_address: Option<Address>,
    /// Relayer state string, e.g. `STATE_MINED`.
    pub state: Option<String>,
}

/// Relayer client bound to one signer.
pub trait RelayClient: Send + Sync {
    /// Execute a batch of Safe transactions and wait for the relayer's result.
    fn execute<'a>(
        &'a self,
        transactions: Vec<SafeTransaction>,
        description: &'a str,
    ) -> BoxFuture<'a, Result<RelayReceipt, RelayError>>;

    /// Deploy the signer's Safe.
    fn deploy(&self) -> BoxFuture<'_, Result<RelayReceipt, RelayError>>;
}

/// Arc wrapper for RelayClient trait objects.
pub type DynRelayClient = Arc<dyn RelayClient>;

/// Builds a relay client for an endpoint.
pub trait RelayConnector: Send + Sync {
    fn connect<'a>(
        &'a self,
        relayer_url: &'a str,
        chain_id: u64,
    ) -> BoxFuture<'a, Result<DynRelayClient, RelayError>>;
}

/// A batch recorded by [`MockRelayClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedBatch {
    pub transactions: Vec<SafeTransaction>,
    pub description: String,
}

/// Scripted relayer for testing.
#[derive(Debug, Default)]
pub struct MockRelayClient {
    executed: parking_lot::Mutex<Vec<ExecutedBatch>>,
    deploy_calls: parking_lot::Mutex<usize>,
    deploy_result: parking_lot::Mutex<Option<Result<RelayReceipt, RelayError>>>,
    execute_error: parking_lot::Mutex<Option<RelayError>>,
}

impl MockRelayClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result returned by `deploy`; defaults to a receipt without an address.
    pub fn set_deploy_result(&self, result: Result<RelayReceipt, RelayError>) {
        *self.deploy_result.lock() = Some(result);
    }

    pub fn set_execute_error(&self, err: Option<RelayError>) {
        *self.execute_error.lock() = err;
    }

    pub fn executed(&self) -> Vec<ExecutedBatch> {
        self.executed.lock().clone()
    }

    pub fn deploy_calls(&self) -> usize {
        *self.deploy_calls.lock()
    }
}

impl RelayClient for MockRelayClient {
    fn execute<'a>(
        &'a self,
        transactions: Vec<SafeTransaction>,
        description: &'a str,
    ) -> BoxFuture<'a, Result<RelayReceipt, RelayError>> {
        Box::pin(async move {
            self.executed.lock().push(ExecutedBatch {
                transactions,
                description: description.to_string(),
            });
            if let Some(err) = self.execute_error.lock().clone() {
                return Err(err);
            }
            Ok(RelayReceipt {
                transaction_hash: Some(format!("0x{:064x}", self.executed.lock().len())),
                proxy_address: None,
                state: Some("STATE_MINED".to_string()),
            })
        })
    }

    fn deploy(&self) -> BoxFuture<'_, Result<RelayReceipt, RelayError>> {
        Box::pin(async move {
            *self.deploy_calls.lock() += 1;
            self.deploy_result
                .lock()
                .clone()
                .unwrap_or_else(|| Ok(RelayReceipt::default()))
        })
    }
}

/// Connector that hands out a shared client and records endpoints.
#[derive(Debug)]
pub struct MockRelayConnector {
    client: Arc<MockRelayClient>,
    connections: parking_lot::Mutex<Vec<(String, u64)>>,
    error: parking_lot::Mutex<Option<RelayError>>,
}

impl MockRelayConnector {
    pub fn new(client: Arc<MockRelayClient>) -> Self {
        Self {
            client,
            connections: parking_lot::Mutex::new(Vec::new()),
            error: parking_lot::Mutex::new(None),
        }
    }

    pub fn set_error(&self, err: Option<RelayError>) {
        *self.error.lock() = err;
    }

    pub fn connections(&self) -> Vec<(String, u64)> {
        self.connections.lock().clone()
    }
}

impl RelayConnector for MockRelayConnector {
    fn connect<'a>(
        &'a self,
        relayer_url: &'a str,
        chain_id: u64,
    ) -> BoxFuture<'a, Result<DynRelayClient, RelayError>> {
        Box::pin(async move {
            self.connections
                .lock()
                .push((relayer_url.to_string(), chain_id));
            if let Some(err) = self.error.lock().clone() {
                return Err(err);
            }
            let client: DynRelayClient = self.client.clone();
            Ok(client)
        })
    }
}
