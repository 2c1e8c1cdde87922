//! Structured logging for pmx.
//!
//! JSON lines in production (`RUST_ENV=production`), pretty multi-line
//! output everywhere else. Filtering follows `RUST_LOG`, defaulting to
//! `info,pmx=debug`.

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogFormat, DEFAULT_FILTER};
