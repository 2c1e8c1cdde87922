//! Trading session bootstrap for the pmx CLOB core.
//!
//! Turns a signing key plus configuration into a ready-to-trade
//! [`pmx_core::TradingSession`]:
//! - Relayer connection
//! - Safe address derivation and (optional) deployment
//! - CLOB API credentials (derive, falling back to create)
//! - Exchange approvals

pub mod config;
pub mod error;
pub mod session;

pub use config::{AppConfig, KeyConfig, OrderDefaults};
pub use error::{AppError, AppResult, SessionError, SessionResult};
pub use session::{
    ProgressObserver, SessionBootstrapper, SessionConfig, SessionProgress, SessionStep,
};
