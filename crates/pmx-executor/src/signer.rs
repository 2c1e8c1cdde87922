//! Signing identity for the trading account.
//!
//! The trading EOA is loaded once at startup from an environment variable or
//! a key file. Everything downstream only sees the [`Signer`] trait, so the
//! session bootstrap never touches key material directly.

use std::path::PathBuf;

use alloy::primitives::{Address, PrimitiveSignature};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as AlloySigner;
use pmx_registry::BoxFuture;
use thiserror::Error;
use zeroize::Zeroizing;

// =============================================================================
// KeySource and KeyManager
// =============================================================================

/// Source of the private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Load from environment variable (development).
    EnvVar { var_name: String },
    /// Load from file (production, recommend 0600 permissions).
    File { path: PathBuf },
}

/// Key management errors.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Failed to decode hex: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Address mismatch: expected {expected}, got {actual}")]
    AddressMismatch { expected: Address, actual: Address },

    #[error("Signing failed: {0}")]
    Signing(#[from] alloy::signers::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Holds the trading EOA signer.
///
/// Security notes:
/// - The raw key bytes are zeroized as soon as the signer is built.
/// - Keys are loaded once at startup; no runtime key rotation.
/// - Never log private key material.
pub struct KeyManager {
    signer: PrivateKeySigner,
}

impl KeyManager {
    /// Load the key from `source` and optionally verify its address.
    ///
    /// # Errors
    /// Returns `KeyError` if:
    /// - Environment variable not found
    /// - File read fails
    /// - Hex decoding fails
    /// - Private key is invalid
    /// - Address mismatch
    pub fn load(source: &KeySource, expected_address: Option<Address>) -> Result<Self, KeyError> {
        let secret_bytes = match source {
            KeySource::EnvVar { var_name } => {
                let hex = Zeroizing::new(
                    std::env::var(var_name)
                        .map_err(|_| KeyError::EnvVarNotFound(var_name.clone()))?,
                );
                parse_hex_key(&hex)?
            }
            KeySource::File { path } => {
                let content = Zeroizing::new(std::fs::read_to_string(path)?);
                parse_hex_key(&content)?
            }
        };

        Self::from_bytes(&secret_bytes, expected_address)
    }

    /// Build from raw key bytes.
    pub fn from_bytes(secret_bytes: &[u8], expected_address: Option<Address>) -> Result<Self, KeyError> {
        let signer = PrivateKeySigner::from_slice(secret_bytes)
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        if let Some(expected) = expected_address {
            if signer.address() != expected {
                return Err(KeyError::AddressMismatch {
                    expected,
                    actual: signer.address(),
                });
            }
        }

        Ok(Self { signer })
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn into_signer(self) -> PrivateKeySigner {
        self.signer
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

/// Parse a hex key (supports 0x prefix and whitespace trimming).
fn parse_hex_key(hex_str: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let trimmed = hex_str.trim().trim_start_matches("0x");
    Ok(Zeroizing::new(hex::decode(trimmed)?))
}

// =============================================================================
// Signer
// =============================================================================

/// Signing identity: an address plus the ability to sign messages.
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;

    /// EIP-191 personal-sign of `message`.
    fn sign_message<'a>(&'a self, message: &'a [u8]) -> BoxFuture<'a, Result<PrimitiveSignature, KeyError>>;
}

impl Signer for PrivateKeySigner {
    fn address(&self) -> Address {
        AlloySigner::address(self)
    }

    fn sign_message<'a>(&'a self, message: &'a [u8]) -> BoxFuture<'a, Result<PrimitiveSignature, KeyError>> {
        Box::pin(async move { Ok(AlloySigner::sign_message(self, message).await?) })
    }
}

// =============================================================================
// Tests
// =============================================================================
