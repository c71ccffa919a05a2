//! API types for the REST and WebSocket interfaces.

use orderbook::Side;
use serde::{Deserialize, Serialize};

/// Request to submit a new limit order.
#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    pub side: Side,
    pub price: f64,
    pub quantity: i64,
    pub user_id: String,
}

/// Acknowledgement of an accepted order. Submission is decoupled from
/// matching — any resulting trades arrive later on the trade stream, not
/// in this response.
#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub status: &'static str,
    pub order_id: orderbook::OrderId,
}

/// Query parameters for order book depth requests.
#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    pub depth: Option<usize>,
}

/// Response body for `GET /stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub monitor: orderbook::Stats,
    pub self_heal_injections: u64,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: orderbook::Mode,
}
