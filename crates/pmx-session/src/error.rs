//! Application and session error types.

use alloy::primitives::Address;
use pmx_executor::{ChainError, ClientError, RelayError};
use thiserror::Error;

/// Fatal session bootstrap failures.
///
/// Any of these aborts the bootstrap; there is no partial session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Safe is not deployed: {0}")]
    SafeNotDeployed(Address),

    #[error("Safe deployment did not return a proxy address")]
    DeploymentUnconfirmed,

    #[error("Failed to obtain API credentials: {0}")]
    Credentials(ClientError),

    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Application-level failures outside the bootstrap itself.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;
