//! Application configuration.

use crate::error::{AppError, AppResult};
use crate::session::SessionConfig;
use alloy::primitives::Address;
use pmx_core::{TickPolicy, TickRounding, TickSizeMode, SAFE_FACTORY};
use pmx_executor::{ContractAddresses, KeySource};
use pmx_registry::{DEFAULT_CLOB_URL, DEFAULT_METADATA_TTL_MS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable read for the private key when no key file is set.
pub const DEFAULT_KEY_ENV_VAR: &str = "PMX_PRIVATE_KEY";

/// Polygon mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 137;

fn default_clob_url() -> String {
    DEFAULT_CLOB_URL.to_string()
}

fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

fn default_auto_deploy() -> bool {
    true
}

fn default_safe_factory() -> Address {
    SAFE_FACTORY
}

fn default_metadata_ttl_ms() -> u64 {
    DEFAULT_METADATA_TTL_MS
}

fn default_key_env_var() -> String {
    DEFAULT_KEY_ENV_VAR.to_string()
}

/// Defaults applied to orders built from this config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDefaults {
    /// Token metadata cache TTL (ms). Default: 60,000.
    #[serde(default = "default_metadata_ttl_ms")]
    pub metadata_ttl_ms: u64,
    /// Off-grid price handling. Default: none.
    #[serde(default)]
    pub tick_size_mode: TickSizeMode,
    /// Rounding used when snapping. Default: nearest.
    #[serde(default)]
    pub tick_rounding: TickRounding,
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            metadata_ttl_ms: default_metadata_ttl_ms(),
            tick_size_mode: TickSizeMode::default(),
            tick_rounding: TickRounding::default(),
        }
    }
}

impl OrderDefaults {
    pub fn tick_policy(&self) -> TickPolicy {
        TickPolicy {
            mode: self.tick_size_mode,
            rounding: self.tick_rounding,
            tick_size: None,
        }
    }
}

/// Where the trading key is loaded from.
///
/// A key file takes precedence over the environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConfig {
    #[serde(default = "default_key_env_var")]
    pub env_var: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Expected EOA; loading fails if the key does not match.
    #[serde(default)]
    pub expected_address: Option<Address>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            env_var: default_key_env_var(),
            file: None,
            expected_address: None,
        }
    }
}

impl KeyConfig {
    pub fn source(&self) -> KeySource {
        match &self.file {
            Some(path) => KeySource::File { path: path.clone() },
            None => KeySource::EnvVar {
                var_name: self.env_var.clone(),
            },
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// CLOB REST endpoint.
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    /// Relayer endpoint. Required for session bootstrap.
    #[serde(default)]
    pub relayer_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Deploy the Safe through the relayer when it is missing.
    #[serde(default = "default_auto_deploy")]
    pub auto_deploy: bool,
    #[serde(default = "default_safe_factory")]
    pub safe_factory: Address,
    #[serde(default)]
    pub contracts: ContractAddresses,
    #[serde(default)]
    pub orders: OrderDefaults,
    #[serde(default)]
    pub key: KeyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clob_url: default_clob_url(),
            relayer_url: String::new(),
            chain_id: default_chain_id(),
            auto_deploy: default_auto_deploy(),
            safe_factory: default_safe_factory(),
            contracts: ContractAddresses::default(),
            orders: OrderDefaults::default(),
            key: KeyConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Settings consumed by the session bootstrapper.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            relayer_url: self.relayer_url.clone(),
            chain_id: self.chain_id,
            auto_deploy: self.auto_deploy,
            safe_factory: self.safe_factory,
        }
    }
}
