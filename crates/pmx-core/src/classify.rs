//! Order error taxonomy and free-text error classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of order failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderErrorCode {
    InvalidOrderMinTickSize,
    InvalidOrderMinSize,
    InvalidOrderDuplicated,
    InvalidOrderNotEnoughBalance,
    InvalidOrderExpiration,
    InvalidOrderError,
    ExecutionError,
    OrderDelayed,
    DelayingOrderError,
    FokOrderNotFilledError,
    MarketNotReady,
    HttpError,
    Unknown,
}

impl OrderErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidOrderMinTickSize => "INVALID_ORDER_MIN_TICK_SIZE",
            Self::InvalidOrderMinSize => "INVALID_ORDER_MIN_SIZE",
            Self::InvalidOrderDuplicated => "INVALID_ORDER_DUPLICATED",
            Self::InvalidOrderNotEnoughBalance => "INVALID_ORDER_NOT_ENOUGH_BALANCE",
            Self::InvalidOrderExpiration => "INVALID_ORDER_EXPIRATION",
            Self::InvalidOrderError => "INVALID_ORDER_ERROR",
            Self::ExecutionError => "EXECUTION_ERROR",
            Self::OrderDelayed => "ORDER_DELAYED",
            Self::DelayingOrderError => "DELAYING_ORDER_ERROR",
            Self::FokOrderNotFilledError => "FOK_ORDER_NOT_FILLED_ERROR",
            Self::MarketNotReady => "MARKET_NOT_READY",
            Self::HttpError => "HTTP_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for OrderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known exchange error fragments, checked in order against the lower-cased
/// message. First match wins.
const MESSAGE_PATTERNS: &[(&str, OrderErrorCode)] = &[
    ("tick size", OrderErrorCode::InvalidOrderMinTickSize),
    ("min_tick_size", OrderErrorCode::InvalidOrderMinTickSize),
    ("lower than the minimum", OrderErrorCode::InvalidOrderMinSize),
    ("minimum size", OrderErrorCode::InvalidOrderMinSize),
    ("min_size", OrderErrorCode::InvalidOrderMinSize),
    ("duplicate", OrderErrorCode::InvalidOrderDuplicated),
    ("already exists", OrderErrorCode::InvalidOrderDuplicated),
    ("not enough balance", OrderErrorCode::InvalidOrderNotEnoughBalance),
    ("allowance", OrderErrorCode::InvalidOrderNotEnoughBalance),
    ("expiration", OrderErrorCode::InvalidOrderExpiration),
    ("could not insert order", OrderErrorCode::InvalidOrderError),
    ("invalid_order_error", OrderErrorCode::InvalidOrderError),
    ("could not run the execution", OrderErrorCode::ExecutionError),
    ("execution_error", OrderErrorCode::ExecutionError),
    ("match delayed", OrderErrorCode::OrderDelayed),
    ("order_delayed", OrderErrorCode::OrderDelayed),
    ("error delaying", OrderErrorCode::DelayingOrderError),
    ("delaying_order_error", OrderErrorCode::DelayingOrderError),
    ("fully filled", OrderErrorCode::FokOrderNotFilledError),
    ("fok_order_not_filled", OrderErrorCode::FokOrderNotFilledError),
    ("not yet ready", OrderErrorCode::MarketNotReady),
    ("market_not_ready", OrderErrorCode::MarketNotReady),
];

/// Classify a free-text exchange error.
///
/// Returns `None` when there is no message to classify, and
/// `Some(Unknown)` for a message that matches nothing known.
pub fn classify_error_message(message: Option<&str>) -> Option<OrderErrorCode> {
    let message = message?;
    let lowered = message.to_lowercase();

    let code = MESSAGE_PATTERNS
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, code)| *code)
        .unwrap_or(OrderErrorCode::Unknown);

    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(msg: &str) -> OrderErrorCode {
        classify_error_message(Some(msg)).unwrap()
    }

    #[test]
    fn test_tick_size_message() {
        assert_eq!(
            classify("Price breaks minimum tick size"),
            OrderErrorCode::InvalidOrderMinTickSize
        );
        assert_eq!(
            classify("order 0xabc is invalid. Price (0.127), breaks minimum tick size rule: 0.01"),
            OrderErrorCode::InvalidOrderMinTickSize
        );
    }

    #[test]
    fn test_exchange_messages() {
        assert_eq!(
            classify("Size (1) lower than the minimum: 5"),
            OrderErrorCode::InvalidOrderMinSize
        );
        assert_eq!(classify("order 0x1 is duplicated"), OrderErrorCode::InvalidOrderDuplicated);
        assert_eq!(
            classify("not enough balance / allowance"),
            OrderErrorCode::InvalidOrderNotEnoughBalance
        );
        assert_eq!(classify("invalid expiration value"), OrderErrorCode::InvalidOrderExpiration);
        assert_eq!(classify("could not insert order"), OrderErrorCode::InvalidOrderError);
        assert_eq!(classify("could not run the execution"), OrderErrorCode::ExecutionError);
        assert_eq!(
            classify("order match delayed due to market conditions"),
            OrderErrorCode::OrderDelayed
        );
        assert_eq!(classify("error delaying the order"), OrderErrorCode::DelayingOrderError);
        assert_eq!(
            classify("order couldn't be fully filled. FOK orders are fully filled or killed."),
            OrderErrorCode::FokOrderNotFilledError
        );
        assert_eq!(
            classify("the market is not yet ready to process new orders"),
            OrderErrorCode::MarketNotReady
        );
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(classify("NOT ENOUGH BALANCE"), OrderErrorCode::InvalidOrderNotEnoughBalance);
    }

    #[test]
    fn test_first_match_wins() {
        // Mentions both a tick size and an allowance; tick size is checked first.
        assert_eq!(
            classify("tick size check failed before allowance check"),
            OrderErrorCode::InvalidOrderMinTickSize
        );
    }

    #[test]
    fn test_unmatched_message_is_unknown() {
        assert_eq!(classify("server exploded"), OrderErrorCode::Unknown);
    }

    #[test]
    fn test_absent_message_is_unclassified() {
        assert_eq!(classify_error_message(None), None);
    }

    #[test]
    fn test_code_serializes_screaming() {
        let json = serde_json::to_string(&OrderErrorCode::FokOrderNotFilledError).unwrap();
        assert_eq!(json, "\"FOK_ORDER_NOT_FILLED_ERROR\"");
        assert_eq!(OrderErrorCode::HttpError.to_string(), "HTTP_ERROR");
    }
}
