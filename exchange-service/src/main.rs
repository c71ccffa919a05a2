//! Exchange service — REST API and WebSocket server fronting the
//! `orderbook` matching core.
//!
//! Provides HTTP endpoints for order submission and book queries, plus
//! WebSocket streams for trades and latency metrics. Built with Axum.

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

mod exchange;
mod types;
mod websocket;

use exchange::{Exchange, SubmitError};
use types::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let exchange = Arc::new(Exchange::new());

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/symbols/:symbol/orderbook", get(get_orderbook))
        .route("/symbols/:symbol/orders", post(submit_order))
        .route("/symbols/:symbol/trades/stream", get(trade_stream))
        .route("/symbols/:symbol/metrics/stream", get(metrics_stream))
        .layer(CorsLayer::permissive())
        .with_state(AppState { exchange });

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();

    info!("exchange service starting on http://0.0.0.0:8080");
    info!("GET  /health - liveness and current mode");
    info!("GET  /stats - monitor and self-healer counters");
    info!("GET  /symbols/:symbol/orderbook?depth= - book snapshot");
    info!("POST /symbols/:symbol/orders - submit a limit order");
    info!("WS   /symbols/:symbol/trades/stream - trade stream");
    info!("WS   /symbols/:symbol/metrics/stream - latency metric stream");

    axum::serve(listener, app).await.unwrap();
}

#[derive(Clone)]
struct AppState {
    exchange: Arc<Exchange>,
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        mode: state.exchange.mode(),
    })
}

async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatsResponse {
        monitor: state.exchange.stats(),
        self_heal_injections: state.exchange.self_heal_injections(),
    })
}

async fn get_orderbook(
    Path(symbol): Path<String>,
    Query(params): Query<DepthQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .exchange
        .book(&symbol, params.depth.unwrap_or(10))
        .await
        .ok_or(AppError::SymbolNotFound)?;
    Ok(Json(snapshot))
}

async fn submit_order(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SubmitOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order_id = state
        .exchange
        .submit(&symbol, request.side, request.price, request.quantity, &request.user_id)
        .map_err(AppError::Submit)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitOrderResponse {
            status: "accepted",
            order_id,
        }),
    ))
}

async fn trade_stream(
    Path(symbol): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| websocket::handle_trade_stream(socket, symbol, state))
}

async fn metrics_stream(
    Path(symbol): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| websocket::handle_metrics_stream(socket, symbol, state))
}

#[derive(Debug)]
enum AppError {
    SymbolNotFound,
    Submit(SubmitError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::SymbolNotFound => (StatusCode::NOT_FOUND, "symbol not found".to_string()),
            AppError::Submit(SubmitError::Invalid(e)) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Submit(SubmitError::QueueFull) => {
                (StatusCode::SERVICE_UNAVAILABLE, "ingress queue is full".to_string())
            }
            AppError::Submit(SubmitError::Throttled) => {
                (StatusCode::TOO_MANY_REQUESTS, "system is throttled".to_string())
            }
        };

        let body = Json(serde_json::json!({ "error": message, "code": status.as_u16() }));
        (status, body).into_response()
    }
}
