//! Token metadata and public order book reads.
//!
//! - `TokenMetaCache`: TTL cache of per-token tick size and neg-risk flag
//! - `OrderBookSource`: injectable order book / price lookup
//! - `ClobRestClient`: reqwest implementation for the public CLOB endpoints

pub mod client;
pub mod clock;
pub mod error;
pub mod source;
pub mod token_cache;

pub use client::{ClobRestClient, DEFAULT_CLOB_URL};
pub use clock::{Clock, SystemClock};
pub use error::{RegistryError, RegistryResult};
pub use source::{
    BookLevel, BoxFuture, DynOrderBookSource, MockOrderBookSource, OrderBookSource,
    OrderBookSummary, PriceQuote,
};
pub use token_cache::{TokenMeta, TokenMetaCache, DEFAULT_METADATA_TTL_MS};
