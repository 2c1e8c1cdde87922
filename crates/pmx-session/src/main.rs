//! pmx command line entry point.
//!
//! Read-only helpers around the CLOB core: tick alignment, token metadata,
//! best bid/ask and Safe address derivation.

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pmx_core::{
    align_price, derive_safe_address, MetadataMode, OrderOptions, OrderSide, Price, TickRounding,
    TickSize,
};
use pmx_executor::KeyManager;
use pmx_registry::{ClobRestClient, TokenMetaCache};
use pmx_session::AppConfig;
use serde_json::json;
use tracing::info;

/// Prediction-market CLOB trading tools
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PMX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Align a price to a tick size
    Align {
        price: Price,
        tick: TickSize,
        /// nearest, down or up (defaults to the configured rounding)
        #[arg(short, long)]
        rounding: Option<TickRounding>,
    },
    /// Resolve tick size and neg-risk flag for a token
    Meta { token_id: String },
    /// Best bid and ask for a token
    Quote { token_id: String },
    /// Derive the Safe address for an EOA (defaults to the configured key)
    SafeAddress {
        #[arg(long)]
        eoa: Option<Address>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    pmx_telemetry::init_logging()?;

    // Determine config path: CLI arg > PMX_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("PMX_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = AppConfig::from_file(&config_path)?;

    match args.command {
        Command::Align {
            price,
            tick,
            rounding,
        } => {
            let rounding = rounding.unwrap_or(config.orders.tick_rounding);
            let aligned = align_price(price, tick.as_decimal(), rounding);
            println!("{aligned}");
        }
        Command::Meta { token_id } => {
            let client = Arc::new(ClobRestClient::new(config.clob_url.as_str())?);
            let cache = TokenMetaCache::new(client).with_ttl_ms(config.orders.metadata_ttl_ms);
            let options = cache
                .resolve(&token_id, MetadataMode::Auto, OrderOptions::default(), true, true)
                .await
                .with_context(|| format!("metadata lookup for {token_id}"))?;
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        Command::Quote { token_id } => {
            let client = ClobRestClient::new(config.clob_url.as_str())?;
            let (bid, ask) = tokio::join!(
                client.get_price(&token_id, OrderSide::Buy),
                client.get_price(&token_id, OrderSide::Sell)
            );
            let quote = json!({
                "tokenId": token_id,
                "bid": bid?.parsed(),
                "ask": ask?.parsed(),
            });
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        Command::SafeAddress { eoa } => {
            let eoa = match eoa {
                Some(eoa) => eoa,
                None => KeyManager::load(&config.key.source(), config.key.expected_address)?.address(),
            };
            let safe = derive_safe_address(eoa, config.safe_factory);
            println!("{}", json!({ "eoa": eoa, "safe": safe }));
        }
    }

    Ok(())
}
