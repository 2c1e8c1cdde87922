//! Core domain types for prediction-market CLOB trading.
//!
//! This crate provides the pure building blocks used by the order executor
//! and the session bootstrapper:
//! - `Price`, `Size`: precision-safe numeric types
//! - `TickSize`, `align_price`: tick-grid alignment
//! - `LimitOrderRequest`, `MarketOrderRequest`: caller-facing order requests
//! - `CreateOrderResult`, `OrderErrorCode`: normalized submission results
//! - `TradingSession`, `ApprovalStatus`: session value types

pub mod classify;
pub mod decimal;
pub mod error;
pub mod execution;
pub mod order;
pub mod tick;
pub mod trading_session;
pub mod wallet;

pub use classify::{classify_error_message, OrderErrorCode};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use execution::{normalize_order_response, CreateOrderResult, OrderAck};
pub use order::{
    LimitOrderRequest, MarketOrderArgs, MarketOrderRequest, MarketOrderType, MetadataMode,
    OrderArgs, OrderOptions, OrderSide, OrderType, TickPolicy, TimeInForce,
};
pub use tick::{align_price, TickRounding, TickSize, TickSizeMode};
pub use trading_session::{ApiCredentials, ApprovalStatus, TradingSession};
pub use wallet::{derive_safe_address, SAFE_FACTORY, SAFE_INIT_CODE_HASH};
