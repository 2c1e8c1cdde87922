//! Limit and market order construction.
//!
//! Both protocols share a preamble: resolve token metadata, work out the
//! price, apply the tick policy. Validation failures return before any
//! network call. Every outcome, including client errors, comes back as a
//! [`CreateOrderResult`]; nothing here returns `Err`.
//!
//! # Limit orders
//!
//! 1. GTD without an expiration -> `INVALID_ORDER_EXPIRATION`
//! 2. Resolve tick size (only when the tick mode needs it) and neg-risk
//!    (only when the caller didn't supply it)
//! 3. Aggressive ("market-like") limits price off the book; explicit limits
//!    require a price
//! 4. Apply the tick policy, submit, normalize
//!
//! # Market orders
//!
//! BUY spends `amount_usdc`, SELL sells `amount_shares`. A tick size is only
//! needed when a worst-price cap is supplied.

use std::sync::Arc;

use pmx_core::{
    normalize_order_response, CreateOrderResult, LimitOrderRequest, MarketOrderArgs,
    MarketOrderRequest, OrderArgs, OrderErrorCode, OrderOptions, OrderSide, OrderType, Price,
    TickPolicy, TickSizeMode, TimeInForce,
};
use pmx_registry::{Clock, RegistryError, SystemClock, TokenMetaCache};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clob::DynOrderSubmitter;
use crate::error::ClientError;

/// Highest price an aggressive BUY will pay.
pub const MAX_AGGRESSIVE_PRICE: Price = Price(Decimal::from_parts(99, 0, 0, false, 2));
/// Lowest price an aggressive SELL will accept.
pub const MIN_AGGRESSIVE_PRICE: Price = Price(Decimal::from_parts(1, 0, 0, false, 2));
/// Aggressive BUY premium over the quoted price (+5%).
const BUY_PREMIUM: Decimal = Decimal::from_parts(105, 0, 0, false, 2);
/// Aggressive SELL discount off the quoted price (-5%).
const SELL_DISCOUNT: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

/// Best bid/ask pair; either side may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BestPrices {
    pub bid: Option<Price>,
    pub ask: Option<Price>,
}

/// Builds, submits and normalizes orders.
pub struct OrderExecutor<C: Clock = SystemClock> {
    client: DynOrderSubmitter,
    metadata: Arc<TokenMetaCache<C>>,
}

impl<C: Clock> OrderExecutor<C> {
    pub fn new(client: DynOrderSubmitter, metadata: Arc<TokenMetaCache<C>>) -> Self {
        Self { client, metadata }
    }

    pub fn metadata(&self) -> &Arc<TokenMetaCache<C>> {
        &self.metadata
    }

    /// Submit a limit order (explicit or aggressive).
    pub async fn create_limit_order(&self, request: LimitOrderRequest) -> CreateOrderResult {
        let time_in_force = request.time_in_force;
        if time_in_force == TimeInForce::GoodTilDate && request.expiration_unix_seconds.is_none() {
            return CreateOrderResult::failure(
                OrderErrorCode::InvalidOrderExpiration,
                "GTD orders require expiration_unix_seconds",
                None,
            );
        }

        let explicit_price = if request.is_market_order {
            None
        } else {
            match request.price {
                Some(price) if price.is_probability() => Some(price),
                Some(price) => {
                    return CreateOrderResult::failure(
                        OrderErrorCode::InvalidOrderError,
                        format!("price {price} is outside (0, 1)"),
                        None,
                    )
                }
                None => {
                    return CreateOrderResult::failure(
                        OrderErrorCode::InvalidOrderError,
                        "price is required for limit orders",
                        None,
                    )
                }
            }
        };

        let overrides = OrderOptions {
            tick_size: request.tick.tick_size,
            neg_risk: request.neg_risk,
        };
        let options = match self
            .metadata
            .resolve(
                &request.token_id,
                request.mode,
                overrides,
                request.tick.mode.needs_tick(),
                request.neg_risk.is_none(),
            )
            .await
        {
            Ok(options) => options,
            Err(e) => return lookup_failure(&request.token_id, e),
        };

        let base_price = match explicit_price {
            Some(price) => price,
            None => self.aggressive_price(&request.token_id, request.side).await,
        };

        let price = match apply_tick_policy(base_price, &request.tick, &options) {
            Ok(price) => price,
            Err(failure) => return failure,
        };

        let order = OrderArgs {
            token_id: request.token_id,
            price,
            size: request.size,
            side: request.side,
            fee_rate_bps: 0,
            expiration: request.expiration_unix_seconds.unwrap_or(0),
            taker: None,
        };
        let order_type = OrderType::from(time_in_force);

        info!(
            token_id = %order.token_id,
            side = %order.side,
            %price,
            size = %order.size,
            %order_type,
            neg_risk = ?options.neg_risk,
            defer_exec = request.defer_exec,
            "Submitting limit order"
        );

        let response = self
            .client
            .create_and_post_order(order, options, order_type, request.defer_exec)
            .await;
        finish(response)
    }

    /// Submit a market order.
    pub async fn create_market_order(&self, request: MarketOrderRequest) -> CreateOrderResult {
        let amount = match request.amount().filter(|a| a.is_positive()) {
            Some(amount) => amount,
            None => {
                let field = match request.side {
                    OrderSide::Buy => "amount_usdc",
                    OrderSide::Sell => "amount_shares",
                };
                return CreateOrderResult::failure(
                    OrderErrorCode::InvalidOrderError,
                    format!("{} market orders require a positive {field}", request.side),
                    None,
                );
            }
        };

        if let Some(price) = request.price.filter(|p| !p.is_probability()) {
            return CreateOrderResult::failure(
                OrderErrorCode::InvalidOrderError,
                format!("price {price} is outside (0, 1)"),
                None,
            );
        }

        let needs_tick = request.price.is_some() && request.tick.mode.needs_tick();
        let overrides = OrderOptions {
            tick_size: request.tick.tick_size,
            neg_risk: request.neg_risk,
        };
        let options = match self
            .metadata
            .resolve(
                &request.token_id,
                request.mode,
                overrides,
                needs_tick,
                request.neg_risk.is_none(),
            )
            .await
        {
            Ok(options) => options,
            Err(e) => return lookup_failure(&request.token_id, e),
        };

        let price = match request.price {
            Some(price) => match apply_tick_policy(price, &request.tick, &options) {
                Ok(price) => Some(price),
                Err(failure) => return failure,
            },
            None => None,
        };

        let order = MarketOrderArgs {
            token_id: request.token_id,
            amount,
            side: request.side,
            price,
            fee_rate_bps: 0,
            taker: None,
        };
        let order_type = OrderType::from(request.order_type);

        info!(
            token_id = %order.token_id,
            side = %order.side,
            %amount,
            price = ?price.map(|p| p.to_string()),
            %order_type,
            neg_risk = ?options.neg_risk,
            "Submitting market order"
        );

        let response = self
            .client
            .create_and_post_market_order(order, options, order_type, request.defer_exec)
            .await;
        finish(response)
    }

    /// Best bid (BUY quote) and best ask (SELL quote), fetched concurrently.
    ///
    /// A failed or unparsable quote leaves that side empty.
    pub async fn best_prices(&self, token_id: &str) -> BestPrices {
        let source = self.metadata.source();
        let (bid, ask) = tokio::join!(
            source.get_price(token_id, OrderSide::Buy),
            source.get_price(token_id, OrderSide::Sell)
        );

        let parse = |side: OrderSide, quote: Result<pmx_registry::PriceQuote, RegistryError>| match quote {
            Ok(q) => q.parsed(),
            Err(e) => {
                warn!(token_id, %side, error = %e, "Price lookup failed");
                None
            }
        };

        BestPrices {
            bid: parse(OrderSide::Buy, bid),
            ask: parse(OrderSide::Sell, ask),
        }
    }

    /// Cancel an order by id. Returns the raw exchange response.
    pub async fn cancel_order(&self, order_id: &str) -> Result<Value, ClientError> {
        info!(order_id, "Cancelling order");
        self.client.cancel_order(order_id).await
    }

    /// Open orders for the authenticated account.
    pub async fn get_open_orders(&self) -> Result<Vec<Value>, ClientError> {
        self.client.get_open_orders().await
    }

    /// Price for an aggressive limit: 5% through the quote, clamped to
    /// [0.01, 0.99]. Any lookup problem falls back to the extreme.
    async fn aggressive_price(&self, token_id: &str, side: OrderSide) -> Price {
        let fallback = match side {
            OrderSide::Buy => MAX_AGGRESSIVE_PRICE,
            OrderSide::Sell => MIN_AGGRESSIVE_PRICE,
        };

        let quoted = match self.metadata.source().get_price(token_id, side).await {
            Ok(quote) => quote.parsed().filter(Price::is_probability),
            Err(e) => {
                warn!(token_id, %side, error = %e, "Price lookup failed, using fallback price");
                return fallback;
            }
        };

        match quoted {
            Some(market) => {
                let price = match side {
                    OrderSide::Buy => (market * BUY_PREMIUM).min(MAX_AGGRESSIVE_PRICE),
                    OrderSide::Sell => (market * SELL_DISCOUNT).max(MIN_AGGRESSIVE_PRICE),
                };
                debug!(token_id, %side, %market, %price, "Aggressive price from quote");
                price
            }
            None => {
                warn!(token_id, %side, "Quote missing or outside (0, 1), using fallback price");
                fallback
            }
        }
    }
}

/// Apply the tick policy to `price`.
///
/// `Validate` demands the price already sit on the grid (exact decimal
/// equality); `Round` snaps it.
fn apply_tick_policy(
    price: Price,
    policy: &TickPolicy,
    options: &OrderOptions,
) -> Result<Price, CreateOrderResult> {
    if policy.mode == TickSizeMode::None {
        return Ok(price);
    }

    let Some(tick_size) = options.tick_size else {
        return Err(CreateOrderResult::failure(
            OrderErrorCode::InvalidOrderMinTickSize,
            "tick size unavailable for tick handling",
            None,
        ));
    };

    let aligned = tick_size.align(price, policy.rounding);
    match policy.mode {
        TickSizeMode::Validate if aligned != price => Err(CreateOrderResult::failure(
            OrderErrorCode::InvalidOrderMinTickSize,
            format!("price {price} is not a multiple of tick size {tick_size}"),
            None,
        )),
        TickSizeMode::Validate => Ok(price),
        _ => {
            if aligned != price {
                debug!(%price, %aligned, %tick_size, "Rounded price to tick");
            }
            Ok(aligned)
        }
    }
}

/// Normalize a submission outcome into a result.
fn finish(response: Result<Value, ClientError>) -> CreateOrderResult {
    match response {
        Ok(raw) => {
            let result = normalize_order_response(raw);
            if result.success && result.order_id.is_none() {
                warn!("Order acknowledged without an order id");
                return result.into_failure(OrderErrorCode::Unknown, "Order response missing order id");
            }
            if result.success {
                info!(order_id = ?result.order_id, status = ?result.status, "Order accepted");
            } else {
                warn!(error_code = ?result.error_code, error_msg = ?result.error_msg, "Order rejected");
            }
            result
        }
        Err(e) => client_failure(e),
    }
}

/// Convert a client error: HTTP status means `HTTP_ERROR`, otherwise `UNKNOWN`.
fn client_failure(err: ClientError) -> CreateOrderResult {
    let code = if err.status.is_some() {
        OrderErrorCode::HttpError
    } else {
        OrderErrorCode::Unknown
    };
    let message = err.best_message();
    warn!(status = ?err.status, %code, %message, "Order submission failed");
    CreateOrderResult::failure(code, message, err.body)
}

fn lookup_failure(token_id: &str, err: RegistryError) -> CreateOrderResult {
    warn!(token_id, error = %err, "Token metadata lookup failed");
    client_failure(ClientError::from(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clob::{ClobCall, MockClobClient};
    use pmx_core::{MarketOrderType, MetadataMode, Size, TickRounding, TickSize};
    use pmx_registry::{MockOrderBookSource, PriceQuote};
    use rust_decimal_macros::dec;
    use serde_json::json;

    const TOKEN: &str = "1234";

    struct Harness {
        client: Arc<MockClobClient>,
        source: Arc<MockOrderBookSource>,
        executor: OrderExecutor,
    }

    fn harness() -> Harness {
        let client = Arc::new(MockClobClient::new());
        let source = Arc::new(MockOrderBookSource::new());
        source.set_meta(TOKEN, Some(dec!(0.01)), Some(false));
        let cache = Arc::new(TokenMetaCache::new(source.clone()));
        let executor = OrderExecutor::new(client.clone(), cache);
        Harness {
            client,
            source,
            executor,
        }
    }

    fn price(value: Decimal) -> Price {
        Price::new(value)
    }

    fn limit(value: Decimal) -> LimitOrderRequest {
        LimitOrderRequest::new(TOKEN, OrderSide::Buy, Size::new(dec!(10)), price(value))
    }

    fn submitted_limit(client: &MockClobClient) -> (OrderArgs, OrderOptions, OrderType, bool) {
        match client.calls().into_iter().next() {
            Some(ClobCall::Limit {
                order,
                options,
                order_type,
                defer_exec,
            }) => (order, options, order_type, defer_exec),
            other => panic!("expected a limit order, got {other:?}"),
        }
    }

    // =========================================================================
    // Limit orders
    // =========================================================================

    #[tokio::test]
    async fn test_gtd_without_expiration_fails_before_any_call() {
        let h = harness();
        let mut request = limit(dec!(0.5));
        request.time_in_force = TimeInForce::GoodTilDate;

        let result = h.executor.create_limit_order(request).await;

        assert!(!result.success);
        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderExpiration));
        assert!(h.client.calls().is_empty());
        assert!(h.source.book_calls().is_empty());
        assert!(h.source.price_calls().is_empty());
    }

    #[tokio::test]
    async fn test_gtd_with_expiration_is_submitted() {
        let h = harness();
        let request = limit(dec!(0.5)).good_til(1_900_000_000);

        let result = h.executor.create_limit_order(request).await;

        assert!(result.success);
        let (order, _, order_type, _) = submitted_limit(&h.client);
        assert_eq!(order.expiration, 1_900_000_000);
        assert_eq!(order_type, OrderType::Gtd);
    }

    #[tokio::test]
    async fn test_explicit_limit_submission_shape() {
        let h = harness();
        let mut request = limit(dec!(0.45));
        request.defer_exec = true;

        let result = h.executor.create_limit_order(request).await;

        assert!(result.success);
        assert_eq!(result.order_id.as_deref(), Some("0xmock"));
        let (order, options, order_type, defer_exec) = submitted_limit(&h.client);
        assert_eq!(order.price, price(dec!(0.45)));
        assert_eq!(order.size, Size::new(dec!(10)));
        assert_eq!(order.fee_rate_bps, 0);
        assert_eq!(order.expiration, 0);
        assert_eq!(order.taker, None);
        assert_eq!(order_type, OrderType::Gtc);
        assert!(defer_exec);
        // Tick mode none: neg-risk fetched, tick size came along with it.
        assert_eq!(options.neg_risk, Some(false));
        assert_eq!(h.source.book_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_manual_mode_with_neg_risk_skips_lookup() {
        let h = harness();
        let mut request = limit(dec!(0.45)).with_neg_risk(true);
        request.mode = MetadataMode::Manual;

        let result = h.executor.create_limit_order(request).await;

        assert!(result.success);
        assert!(h.source.book_calls().is_empty());
        let (_, options, _, _) = submitted_limit(&h.client);
        assert_eq!(options.neg_risk, Some(true));
        assert_eq!(options.tick_size, None);
    }

    #[tokio::test]
    async fn test_missing_price_is_invalid() {
        let h = harness();
        let mut request = limit(dec!(0.5));
        request.price = None;

        let result = h.executor.create_limit_order(request).await;

        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderError));
        assert!(h.client.calls().is_empty());
        assert!(h.source.book_calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_price_wins_over_unreachable_book() {
        let h = harness();
        h.source.set_fail_status(Some(503));
        let mut request = limit(dec!(0.5));
        request.price = None;

        let result = h.executor.create_limit_order(request).await;

        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderError));
        assert!(h.source.book_calls().is_empty());
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_limit_price_is_invalid() {
        let h = harness();
        for value in [dec!(0), dec!(1), dec!(1.5), Decimal::MAX] {
            let request = limit(value).with_tick(TickSizeMode::Round, TickRounding::Nearest);

            let result = h.executor.create_limit_order(request).await;

            assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderError), "price={value}");
        }
        assert!(h.source.book_calls().is_empty());
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_validate_rejects_off_tick_price() {
        let h = harness();
        let request = limit(dec!(0.127)).with_tick(TickSizeMode::Validate, TickRounding::Nearest);

        let result = h.executor.create_limit_order(request).await;

        assert!(!result.success);
        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderMinTickSize));
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_validate_accepts_on_tick_price() {
        let h = harness();
        let request = limit(dec!(0.12)).with_tick(TickSizeMode::Validate, TickRounding::Nearest);

        let result = h.executor.create_limit_order(request).await;

        assert!(result.success);
        let (order, options, _, _) = submitted_limit(&h.client);
        assert_eq!(order.price, price(dec!(0.12)));
        assert_eq!(options.tick_size, Some(TickSize::Hundredth));
    }

    #[tokio::test]
    async fn test_round_mode_snaps_price() {
        let h = harness();
        let request = limit(dec!(0.127)).with_tick(TickSizeMode::Round, TickRounding::Down);

        let result = h.executor.create_limit_order(request).await;

        assert!(result.success);
        let (order, _, _, _) = submitted_limit(&h.client);
        assert_eq!(order.price, price(dec!(0.12)));
    }

    #[tokio::test]
    async fn test_tick_override_wins() {
        let h = harness();
        let request = limit(dec!(0.1234))
            .with_tick(TickSizeMode::Round, TickRounding::Nearest)
            .with_tick_size(TickSize::Thousandth);

        h.executor.create_limit_order(request).await;

        let (order, options, _, _) = submitted_limit(&h.client);
        assert_eq!(order.price, price(dec!(0.123)));
        assert_eq!(options.tick_size, Some(TickSize::Thousandth));
    }

    #[tokio::test]
    async fn test_tick_handling_without_tick_size_fails() {
        let h = harness();
        let mut request = limit(dec!(0.12))
            .with_tick(TickSizeMode::Round, TickRounding::Nearest)
            .with_neg_risk(false);
        request.mode = MetadataMode::Manual;

        let result = h.executor.create_limit_order(request).await;

        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderMinTickSize));
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_aggressive_buy_prices_through_quote() {
        let h = harness();
        h.source.set_price(TOKEN, OrderSide::Buy, PriceQuote::new("0.60"));
        let request = LimitOrderRequest::aggressive(TOKEN, OrderSide::Buy, Size::new(dec!(5)));

        h.executor.create_limit_order(request).await;

        let (order, _, _, _) = submitted_limit(&h.client);
        assert_eq!(order.price, price(dec!(0.63)));
    }

    #[tokio::test]
    async fn test_aggressive_buy_is_capped() {
        let h = harness();
        h.source.set_price(TOKEN, OrderSide::Buy, PriceQuote::new("0.98"));
        let request = LimitOrderRequest::aggressive(TOKEN, OrderSide::Buy, Size::new(dec!(5)));

        h.executor.create_limit_order(request).await;

        let (order, _, _, _) = submitted_limit(&h.client);
        assert_eq!(order.price, MAX_AGGRESSIVE_PRICE);
    }

    #[tokio::test]
    async fn test_aggressive_sell_is_floored_and_rounded() {
        let h = harness();
        h.source.set_price(TOKEN, OrderSide::Sell, PriceQuote::new("0.37"));
        let request = LimitOrderRequest::aggressive(TOKEN, OrderSide::Sell, Size::new(dec!(5)))
            .with_tick(TickSizeMode::Round, TickRounding::Down);

        h.executor.create_limit_order(request).await;

        // 0.37 * 0.95 = 0.3515 -> 0.35
        let (order, _, _, _) = submitted_limit(&h.client);
        assert_eq!(order.price, price(dec!(0.35)));

        h.source.set_price(TOKEN, OrderSide::Sell, PriceQuote::new("0.01"));
        let request = LimitOrderRequest::aggressive(TOKEN, OrderSide::Sell, Size::new(dec!(5)));
        h.executor.create_limit_order(request).await;
        match h.client.calls().last() {
            Some(ClobCall::Limit { order, .. }) => assert_eq!(order.price, MIN_AGGRESSIVE_PRICE),
            other => panic!("expected a limit order, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_aggressive_falls_back_on_lookup_failure() {
        let h = harness();
        // No scripted quote: the source answers 404.
        let request = LimitOrderRequest::aggressive(TOKEN, OrderSide::Buy, Size::new(dec!(5)));

        let result = h.executor.create_limit_order(request).await;

        assert!(result.success);
        let (order, _, _, _) = submitted_limit(&h.client);
        assert_eq!(order.price, MAX_AGGRESSIVE_PRICE);
    }

    #[tokio::test]
    async fn test_aggressive_falls_back_on_bad_quotes() {
        for bad in ["abc", "1.2", "0"] {
            let h = harness();
            h.source.set_price(TOKEN, OrderSide::Sell, PriceQuote::new(bad));
            let request = LimitOrderRequest::aggressive(TOKEN, OrderSide::Sell, Size::new(dec!(5)));

            h.executor.create_limit_order(request).await;

            let (order, _, _, _) = submitted_limit(&h.client);
            assert_eq!(order.price, MIN_AGGRESSIVE_PRICE, "quote {bad}");
        }
    }

    #[tokio::test]
    async fn test_rejection_is_classified() {
        let h = harness();
        h.client.push_response(Ok(json!({
            "success": false,
            "errorMsg": "not enough balance / allowance"
        })));

        let result = h.executor.create_limit_order(limit(dec!(0.5))).await;

        assert!(!result.success);
        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderNotEnoughBalance));
        assert!(result.raw.is_some());
    }

    #[tokio::test]
    async fn test_success_without_order_id_is_unknown_failure() {
        let h = harness();
        h.client.push_response(Ok(json!({ "success": true, "errorMsg": "" })));

        let result = h.executor.create_limit_order(limit(dec!(0.5))).await;

        assert!(!result.success);
        assert_eq!(result.error_code, Some(OrderErrorCode::Unknown));
    }

    #[tokio::test]
    async fn test_http_error_conversion() {
        let h = harness();
        h.client.push_response(Err(ClientError::http(
            400,
            json!({ "error": "invalid order payload" }),
        )));

        let result = h.executor.create_limit_order(limit(dec!(0.5))).await;

        assert_eq!(result.error_code, Some(OrderErrorCode::HttpError));
        assert_eq!(result.error_msg.as_deref(), Some("invalid order payload"));
        assert_eq!(result.raw, Some(json!({ "error": "invalid order payload" })));
    }

    #[tokio::test]
    async fn test_transport_error_conversion() {
        let h = harness();
        h.client.push_response(Err(ClientError::new("connection reset by peer")));

        let result = h.executor.create_limit_order(limit(dec!(0.5))).await;

        assert_eq!(result.error_code, Some(OrderErrorCode::Unknown));
        assert_eq!(result.error_msg.as_deref(), Some("connection reset by peer"));
    }

    #[tokio::test]
    async fn test_metadata_lookup_failure_is_structured() {
        let h = harness();
        h.source.set_fail_status(Some(502));

        let result = h.executor.create_limit_order(limit(dec!(0.5))).await;

        assert!(!result.success);
        assert_eq!(result.error_code, Some(OrderErrorCode::HttpError));
        assert!(h.client.calls().is_empty());
    }

    // =========================================================================
    // Market orders
    // =========================================================================

    #[tokio::test]
    async fn test_market_buy_requires_positive_usdc() {
        let h = harness();
        let request = MarketOrderRequest::buy(TOKEN, Size::ZERO);

        let result = h.executor.create_market_order(request).await;

        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderError));
        assert!(h.client.calls().is_empty());
        assert!(h.source.book_calls().is_empty());
    }

    #[tokio::test]
    async fn test_market_sell_requires_shares_not_usdc() {
        let h = harness();
        let mut request = MarketOrderRequest::sell(TOKEN, Size::new(dec!(10)));
        request.amount_usdc = None;

        let result = h.executor.create_market_order(request).await;

        assert!(result.success);
        match h.client.calls().into_iter().next() {
            Some(ClobCall::Market { order, order_type, .. }) => {
                assert_eq!(order.amount, Size::new(dec!(10)));
                assert_eq!(order.side, OrderSide::Sell);
                assert_eq!(order.price, None);
                assert_eq!(order_type, OrderType::Fok);
            }
            other => panic!("expected a market order, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_market_sell_with_only_usdc_is_invalid() {
        let h = harness();
        let mut request = MarketOrderRequest::sell(TOKEN, Size::ZERO);
        request.amount_shares = None;
        request.amount_usdc = Some(Size::new(dec!(10)));

        let result = h.executor.create_market_order(request).await;

        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderError));
    }

    #[tokio::test]
    async fn test_market_price_cap_is_rounded() {
        let h = harness();
        let mut request = MarketOrderRequest::buy(TOKEN, Size::new(dec!(25)))
            .with_price(price(dec!(0.555)))
            .with_tick(TickSizeMode::Round, TickRounding::Up);
        request.order_type = MarketOrderType::FillAndKill;

        let result = h.executor.create_market_order(request).await;

        assert!(result.success);
        match h.client.calls().into_iter().next() {
            Some(ClobCall::Market { order, order_type, .. }) => {
                assert_eq!(order.price, Some(price(dec!(0.56))));
                assert_eq!(order_type, OrderType::Fak);
            }
            other => panic!("expected a market order, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_market_price_cap_out_of_range_is_invalid() {
        let h = harness();
        let request = MarketOrderRequest::buy(TOKEN, Size::new(dec!(25)))
            .with_price(price(dec!(2)))
            .with_tick(TickSizeMode::Round, TickRounding::Up);

        let result = h.executor.create_market_order(request).await;

        assert_eq!(result.error_code, Some(OrderErrorCode::InvalidOrderError));
        assert!(h.source.book_calls().is_empty());
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_market_without_price_ignores_tick_mode() {
        let h = harness();
        let mut request = MarketOrderRequest::buy(TOKEN, Size::new(dec!(25)))
            .with_tick(TickSizeMode::Validate, TickRounding::Nearest);
        request.mode = MetadataMode::Manual;
        request.neg_risk = Some(false);

        let result = h.executor.create_market_order(request).await;

        assert!(result.success);
        assert!(h.source.book_calls().is_empty());
    }

    // =========================================================================
    // Reads and passthrough
    // =========================================================================

    #[tokio::test]
    async fn test_best_prices() {
        let h = harness();
        h.source.set_price(TOKEN, OrderSide::Buy, PriceQuote::new("0.48"));

        let best = h.executor.best_prices(TOKEN).await;

        assert_eq!(best.bid, Some(price(dec!(0.48))));
        assert_eq!(best.ask, None);
        assert_eq!(h.source.price_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_and_open_orders_pass_through() {
        let h = harness();

        let cancelled = h.executor.cancel_order("0xabc").await.unwrap();
        let open = h.executor.get_open_orders().await.unwrap();

        assert_eq!(cancelled["canceled"][0], "0xabc");
        assert_eq!(open.len(), 1);
        assert_eq!(
            h.client.calls(),
            vec![ClobCall::Cancel("0xabc".to_string()), ClobCall::OpenOrders]
        );
    }
}
