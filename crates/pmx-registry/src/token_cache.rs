//! Token metadata cache.
//!
//! Orders need a token's tick size (for price alignment) and its neg-risk
//! flag (for exchange routing). Both come from the token's order book, so a
//! single lookup fills both fields. Entries are fresh for a fixed TTL; a
//! stale entry is kept until a successful refresh overwrites it.
//!
//! The map is never locked across a lookup. Concurrent misses for the same
//! token may both hit the network; the last write wins, which is harmless
//! since entries are plain snapshots.

use dashmap::DashMap;
use pmx_core::{MetadataMode, OrderOptions, TickSize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::RegistryResult;
use crate::source::DynOrderBookSource;

/// Default freshness window (60 seconds).
pub const DEFAULT_METADATA_TTL_MS: u64 = 60_000;

/// Cached metadata for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMeta {
    pub tick_size: TickSize,
    pub neg_risk: bool,
    pub fetched_at_ms: u64,
}

impl TokenMeta {
    /// Fresh while `now - fetched_at <= ttl`.
    pub fn is_fresh(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.fetched_at_ms) <= ttl_ms
    }
}

/// Time-bounded cache of per-token tick size and neg-risk flag.
pub struct TokenMetaCache<C: Clock = SystemClock> {
    entries: DashMap<String, TokenMeta>,
    source: DynOrderBookSource,
    clock: C,
    ttl_ms: u64,
}

impl TokenMetaCache<SystemClock> {
    /// Create a cache backed by the system clock and the default TTL.
    pub fn new(source: DynOrderBookSource) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<C: Clock> TokenMetaCache<C> {
    pub fn with_clock(source: DynOrderBookSource, clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            source,
            clock,
            ttl_ms: DEFAULT_METADATA_TTL_MS,
        }
    }

    #[must_use]
    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// The order book source used for refreshes.
    pub fn source(&self) -> &DynOrderBookSource {
        &self.source
    }

    /// Current entry for a token, fresh or stale.
    pub fn get(&self, token_id: &str) -> Option<TokenMeta> {
        self.entries.get(token_id).map(|entry| *entry)
    }

    /// Current entry for a token, only if still fresh.
    pub fn get_fresh(&self, token_id: &str) -> Option<TokenMeta> {
        let now_ms = self.clock.now_ms();
        self.get(token_id)
            .filter(|meta| meta.is_fresh(now_ms, self.ttl_ms))
    }

    /// Seed or overwrite an entry, timestamped now.
    pub fn insert(&self, token_id: impl Into<String>, tick_size: TickSize, neg_risk: bool) {
        let meta = TokenMeta {
            tick_size,
            neg_risk,
            fetched_at_ms: self.clock.now_ms(),
        };
        self.entries.insert(token_id.into(), meta);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve tick size and neg-risk for a token.
    ///
    /// - `Manual` mode returns `overrides` untouched.
    /// - `Auto` mode skips the cache when every needed field is overridden,
    ///   answers from a fresh entry when there is one, and otherwise performs
    ///   exactly one order book lookup. The lookup result is cached only when
    ///   it carried both fields.
    ///
    /// Overrides always win over cached or fetched values. Lookup errors are
    /// returned to the caller.
    pub async fn resolve(
        &self,
        token_id: &str,
        mode: MetadataMode,
        overrides: OrderOptions,
        needs_tick: bool,
        needs_neg_risk: bool,
    ) -> RegistryResult<OrderOptions> {
        if mode == MetadataMode::Manual {
            return Ok(overrides);
        }

        let missing_tick = needs_tick && overrides.tick_size.is_none();
        let missing_neg_risk = needs_neg_risk && overrides.neg_risk.is_none();
        if !missing_tick && !missing_neg_risk {
            return Ok(overrides);
        }

        if let Some(meta) = self.get_fresh(token_id) {
            debug!(token_id, tick_size = %meta.tick_size, neg_risk = meta.neg_risk, "Token metadata cache hit");
            return Ok(OrderOptions {
                tick_size: overrides.tick_size.or(Some(meta.tick_size)),
                neg_risk: overrides.neg_risk.or(Some(meta.neg_risk)),
            });
        }

        debug!(token_id, "Token metadata cache miss, fetching order book");
        let book = self.source.get_order_book(token_id).await?;
        let tick_size = book.tick();
        let neg_risk = book.neg_risk;

        match (tick_size, neg_risk) {
            (Some(tick_size), Some(neg_risk)) => self.insert(token_id, tick_size, neg_risk),
            _ => warn!(
                token_id,
                raw_tick_size = ?book.tick_size,
                ?neg_risk,
                "Order book missing tick size or neg-risk, not caching"
            ),
        }

        Ok(OrderOptions {
            tick_size: overrides.tick_size.or(tick_size),
            neg_risk: overrides.neg_risk.or(neg_risk),
        })
    }
}
