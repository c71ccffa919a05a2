use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OrderError;

/// Which side of the book an order or trade sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// Unique identity of a resting or incoming order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

/// Unique identity of an executed trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeId(pub Uuid);

/// A limit order. Identity, symbol, side, price and submission timestamp
/// are immutable once created; only `qty` is mutated, by the matcher, as
/// the order fills.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    /// Residual (unfilled) quantity.
    pub qty: i64,
    pub ts_ns: u128,
}

impl Order {
    /// Assigns a fresh id, stamps the current wall-clock time, and
    /// validates price/qty/symbol at the ingress boundary.
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        price: f64,
        qty: i64,
        user_id: impl Into<String>,
    ) -> Result<Self, OrderError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(OrderError::EmptySymbol);
        }
        if !(price.is_finite() && price > 0.0) {
            return Err(OrderError::NonPositivePrice(price));
        }
        if qty <= 0 {
            return Err(OrderError::NonPositiveQty(qty));
        }

        Ok(Self {
            id: OrderId(Uuid::new_v4()),
            user_id: user_id.into(),
            symbol,
            side,
            price,
            qty,
            ts_ns: now_ns(),
        })
    }
}

/// A single fill produced by a match event. Always constructed by the
/// matcher, never by a caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: String,
    pub buy_order: OrderId,
    pub sell_order: OrderId,
    pub price: f64,
    pub qty: i64,
    pub ts_ns: u128,
    /// The side of the incoming order that triggered this match.
    pub aggressor: Side,
}

pub(crate) fn now_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos()
}
