//! Order-related types.
//!
//! Provides order side, lifetime and execution policies, the caller-facing
//! limit/market order requests, and the payloads handed to the CLOB client
//! for submission.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::{Price, Size};
use crate::error::CoreError;
use crate::tick::{TickRounding, TickSize, TickSizeMode};

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(CoreError::Unrecognized(format!("order side {other}"))),
        }
    }
}

/// Lifetime policy for resting limit orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled.
    #[default]
    #[serde(rename = "GTC")]
    GoodTilCancelled,
    /// Good-til-date. Requires an expiration timestamp.
    #[serde(rename = "GTD")]
    GoodTilDate,
}

/// Execution policy for market orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarketOrderType {
    /// Fill-or-kill.
    #[default]
    #[serde(rename = "FOK")]
    FillOrKill,
    /// Fill-and-kill: fill what is available, cancel the rest.
    #[serde(rename = "FAK")]
    FillAndKill,
}

/// Order type as submitted to the CLOB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Gtc,
    Gtd,
    Fok,
    Fak,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gtc => "GTC",
            Self::Gtd => "GTD",
            Self::Fok => "FOK",
            Self::Fak => "FAK",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TimeInForce> for OrderType {
    fn from(tif: TimeInForce) -> Self {
        match tif {
            TimeInForce::GoodTilCancelled => Self::Gtc,
            TimeInForce::GoodTilDate => Self::Gtd,
        }
    }
}

impl From<MarketOrderType> for OrderType {
    fn from(kind: MarketOrderType) -> Self {
        match kind {
            MarketOrderType::FillOrKill => Self::Fok,
            MarketOrderType::FillAndKill => Self::Fak,
        }
    }
}

/// Where token metadata (tick size, neg-risk flag) comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataMode {
    /// Fill missing fields from the cache or an order-book lookup.
    #[default]
    Auto,
    /// Use caller-supplied values only; never look anything up.
    Manual,
}

/// Tick handling shared by limit and market requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickPolicy {
    pub mode: TickSizeMode,
    pub rounding: TickRounding,
    /// Caller override; takes precedence over cached or fetched values.
    pub tick_size: Option<TickSize>,
}

/// Caller-facing limit order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderRequest {
    pub token_id: String,
    pub size: Size,
    /// Required unless `is_market_order` is set.
    pub price: Option<Price>,
    pub side: OrderSide,
    pub mode: MetadataMode,
    pub neg_risk: Option<bool>,
    /// Price the order aggressively off the current best price.
    pub is_market_order: bool,
    pub time_in_force: TimeInForce,
    /// Required when `time_in_force` is GTD.
    pub expiration_unix_seconds: Option<u64>,
    pub defer_exec: bool,
    pub tick: TickPolicy,
}

impl LimitOrderRequest {
    /// GTC limit order at an explicit price.
    pub fn new(token_id: impl Into<String>, side: OrderSide, size: Size, price: Price) -> Self {
        Self {
            token_id: token_id.into(),
            size,
            price: Some(price),
            side,
            mode: MetadataMode::Auto,
            neg_risk: None,
            is_market_order: false,
            time_in_force: TimeInForce::GoodTilCancelled,
            expiration_unix_seconds: None,
            defer_exec: false,
            tick: TickPolicy::default(),
        }
    }

    /// Aggressive limit order priced off the current best price.
    pub fn aggressive(token_id: impl Into<String>, side: OrderSide, size: Size) -> Self {
        Self {
            price: None,
            is_market_order: true,
            ..Self::new(token_id, side, size, Price::ZERO)
        }
    }

    pub fn with_tick(mut self, mode: TickSizeMode, rounding: TickRounding) -> Self {
        self.tick.mode = mode;
        self.tick.rounding = rounding;
        self
    }

    pub fn with_tick_size(mut self, tick_size: TickSize) -> Self {
        self.tick.tick_size = Some(tick_size);
        self
    }

    pub fn with_neg_risk(mut self, neg_risk: bool) -> Self {
        self.neg_risk = Some(neg_risk);
        self
    }

    pub fn good_til(mut self, expiration_unix_seconds: u64) -> Self {
        self.time_in_force = TimeInForce::GoodTilDate;
        self.expiration_unix_seconds = Some(expiration_unix_seconds);
        self
    }
}

/// Caller-facing market order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrderRequest {
    pub token_id: String,
    pub side: OrderSide,
    pub mode: MetadataMode,
    pub neg_risk: Option<bool>,
    /// Collateral to spend; required for BUY.
    pub amount_usdc: Option<Size>,
    /// Shares to sell; required for SELL.
    pub amount_shares: Option<Size>,
    /// Worst acceptable price (cap for BUY, floor for SELL).
    pub price: Option<Price>,
    pub order_type: MarketOrderType,
    pub defer_exec: bool,
    pub tick: TickPolicy,
}

impl MarketOrderRequest {
    pub fn buy(token_id: impl Into<String>, amount_usdc: Size) -> Self {
        Self {
            token_id: token_id.into(),
            side: OrderSide::Buy,
            mode: MetadataMode::Auto,
            neg_risk: None,
            amount_usdc: Some(amount_usdc),
            amount_shares: None,
            price: None,
            order_type: MarketOrderType::FillOrKill,
            defer_exec: false,
            tick: TickPolicy::default(),
        }
    }

    pub fn sell(token_id: impl Into<String>, amount_shares: Size) -> Self {
        Self {
            side: OrderSide::Sell,
            amount_usdc: None,
            amount_shares: Some(amount_shares),
            ..Self::buy(token_id, Size::ZERO)
        }
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_tick(mut self, mode: TickSizeMode, rounding: TickRounding) -> Self {
        self.tick.mode = mode;
        self.tick.rounding = rounding;
        self
    }

    /// The amount field the side requires.
    pub fn amount(&self) -> Option<Size> {
        match self.side {
            OrderSide::Buy => self.amount_usdc,
            OrderSide::Sell => self.amount_shares,
        }
    }
}

/// Limit order payload handed to the CLOB client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderArgs {
    pub token_id: String,
    pub price: Price,
    pub size: Size,
    pub side: OrderSide,
    pub fee_rate_bps: u32,
    /// Unix seconds; 0 means no expiration.
    pub expiration: u64,
    /// `None` is the public (any taker) order.
    pub taker: Option<Address>,
}

/// Market order payload handed to the CLOB client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOrderArgs {
    pub token_id: String,
    /// USDC for BUY, shares for SELL.
    pub amount: Size,
    pub side: OrderSide,
    pub price: Option<Price>,
    pub fee_rate_bps: u32,
    pub taker: Option<Address>,
}

/// Per-order options resolved from token metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOptions {
    pub tick_size: Option<TickSize>,
    pub neg_risk: Option<bool>,
}
