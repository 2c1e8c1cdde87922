//! Executor error types.

use pmx_registry::RegistryError;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by the CLOB network client.
///
/// Mirrors what an HTTP client exposes on a failed call: an optional status,
/// an optional decoded JSON body, and a message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ClientError {
    pub status: Option<u16>,
    pub body: Option<Value>,
    pub message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    /// An HTTP-level failure with a decoded body.
    pub fn http(status: u16, body: Value) -> Self {
        Self {
            status: Some(status),
            message: format!("HTTP {status}"),
            body: Some(body),
        }
    }

    /// Most specific human-readable message available.
    ///
    /// Order: body `errorMsg`, body `error`, the client's own message, then a
    /// generic fallback.
    pub fn best_message(&self) -> String {
        let from_body = |field: &str| {
            self.body
                .as_ref()
                .and_then(|b| b.get(field))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        from_body("errorMsg")
            .or_else(|| from_body("error"))
            .or_else(|| Some(self.message.trim().to_string()).filter(|m| !m.is_empty()))
            .unwrap_or_else(|| "Request failed".to_string())
    }
}

impl From<RegistryError> for ClientError {
    fn from(err: RegistryError) -> Self {
        Self {
            status: err.status(),
            body: None,
            message: err.to_string(),
        }
    }
}

/// On-chain read failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Relayer failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Relayer connection failed: {0}")]
    Connect(String),

    #[error("Relayer rejected request: {0}")]
    Rejected(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}
