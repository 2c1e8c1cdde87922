//! Order submission results.
//!
//! The CLOB answers order posts with loosely-shaped JSON: the order id may
//! appear as `orderID` or `orderId`, transaction hashes as
//! `transactionsHashes` or `transactionHashes`, and failures may arrive with
//! `success: true` plus an `errorMsg`. [`OrderAck::decode`] is the single
//! place that knows these shapes; everything downstream works with
//! [`CreateOrderResult`].
//!
//! Field priority when several names are present:
//! - order id: `orderID`, then `orderId`
//! - transaction hashes: `transactionsHashes`, then `transactionHashes`
//! - error message: `errorMsg`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::{classify_error_message, OrderErrorCode};

const ORDER_ID_FIELDS: [&str; 2] = ["orderID", "orderId"];
const TX_HASH_FIELDS: [&str; 2] = ["transactionsHashes", "transactionHashes"];

/// Decoded view of a raw order acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderAck {
    /// Explicit `success` flag, when present.
    pub success_flag: Option<bool>,
    pub order_id: Option<String>,
    pub status: Option<String>,
    /// Non-empty error message, when present.
    pub error_msg: Option<String>,
    pub transaction_hashes: Option<Vec<String>>,
}

impl OrderAck {
    pub fn decode(raw: &Value) -> Self {
        let non_empty_str = |value: &Value| {
            value
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let order_id = ORDER_ID_FIELDS
            .iter()
            .find_map(|field| raw.get(field).and_then(non_empty_str));

        let transaction_hashes = TX_HASH_FIELDS.iter().find_map(|field| {
            raw.get(field).and_then(Value::as_array).map(|hashes| {
                hashes
                    .iter()
                    .filter_map(|h| h.as_str().map(str::to_string))
                    .collect::<Vec<_>>()
            })
        });

        Self {
            success_flag: raw.get("success").and_then(Value::as_bool),
            order_id,
            status: raw.get("status").and_then(non_empty_str),
            error_msg: raw.get("errorMsg").and_then(non_empty_str),
            transaction_hashes,
        }
    }

    /// The exchange signalled acceptance: explicit success or an order id.
    pub fn is_accepted(&self) -> bool {
        self.success_flag == Some(true) || self.order_id.is_some()
    }
}

/// Uniform result of an order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResult {
    pub success: bool,
    pub order_id: Option<String>,
    pub status: Option<String>,
    pub error_code: Option<OrderErrorCode>,
    pub error_msg: Option<String>,
    pub transaction_hashes: Option<Vec<String>>,
    /// Raw exchange response (or error body) for diagnostics.
    pub raw: Option<Value>,
}

impl CreateOrderResult {
    /// Failure detected before or instead of a usable exchange response.
    pub fn failure(code: OrderErrorCode, message: impl Into<String>, raw: Option<Value>) -> Self {
        Self {
            success: false,
            order_id: None,
            status: None,
            error_code: Some(code),
            error_msg: Some(message.into()),
            transaction_hashes: None,
            raw,
        }
    }

    /// Demote a result to a failure, keeping whatever the exchange returned.
    pub fn into_failure(mut self, code: OrderErrorCode, message: impl Into<String>) -> Self {
        self.success = false;
        self.error_code = Some(code);
        self.error_msg = Some(message.into());
        self
    }
}

/// Normalize a raw order-post response.
///
/// Success requires acceptance and no error message. A failure always
/// carries an error code: the classified message, or `UNKNOWN`.
pub fn normalize_order_response(raw: Value) -> CreateOrderResult {
    let ack = OrderAck::decode(&raw);
    let success = ack.is_accepted() && ack.error_msg.is_none();

    let (error_code, error_msg) = if success {
        (None, None)
    } else {
        let code = classify_error_message(ack.error_msg.as_deref()).unwrap_or(OrderErrorCode::Unknown);
        let msg = ack
            .error_msg
            .clone()
            .unwrap_or_else(|| "Order was not accepted".to_string());
        (Some(code), Some(msg))
    };

    CreateOrderResult {
        success,
        order_id: ack.order_id,
        status: ack.status,
        error_code,
        error_msg,
        transaction_hashes: ack.transaction_hashes,
        raw: Some(raw),
    }
}
