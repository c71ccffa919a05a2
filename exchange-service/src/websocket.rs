//! WebSocket handlers for real-time trade and metric streaming.
//!
//! Each connection gets its own subscriber channel off the engine's fan-out
//! hub; messages for other symbols are filtered out locally since the hub
//! itself is symbol-agnostic.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::AppState;

pub async fn handle_trade_stream(socket: WebSocket, symbol: String, state: AppState) {
    info!(symbol = %symbol, "new trade stream connection");

    let (mut sender, mut receiver) = socket.split();
    let mut trades = state.exchange.engine().subscribe_trades();
    let mut ping_interval = interval(Duration::from_secs(30));

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        error!(symbol = %symbol, error = %e, "websocket error in trade stream");
                        break;
                    }
                    _ => {}
                }
            }

            trade = trades.recv() => {
                match trade {
                    Some(trade) if trade.symbol == symbol => {
                        if let Ok(json) = serde_json::to_string(&trade) {
                            if sender.send(Message::Text(json)).await.is_err() {
                                warn!(symbol = %symbol, "failed to send trade update");
                                break;
                            }
                        }
                    }
                    Some(_) => {}
                    None => break,
                }
            }

            _ = ping_interval.tick() => {
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    info!(symbol = %symbol, "trade stream handler ended");
}

pub async fn handle_metrics_stream(socket: WebSocket, symbol: String, state: AppState) {
    info!(symbol = %symbol, "new metrics stream connection");

    let (mut sender, mut receiver) = socket.split();
    let mut metrics = state.exchange.engine().subscribe_metrics();
    let mut ping_interval = interval(Duration::from_secs(30));

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        error!(symbol = %symbol, error = %e, "websocket error in metrics stream");
                        break;
                    }
                    _ => {}
                }
            }

            sample = metrics.recv() => {
                match sample {
                    Some(sample) => {
                        let payload = serde_json::json!({
                            "type": sample.metric_type,
                            "value": sample.value,
                            "timestamp_ns": sample.timestamp_ns.to_string(),
                        });
                        if let Ok(json) = serde_json::to_string(&payload) {
                            if sender.send(Message::Text(json)).await.is_err() {
                                warn!(symbol = %symbol, "failed to send metrics update");
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }

            _ = ping_interval.tick() => {
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    info!(symbol = %symbol, "metrics stream handler ended");
}
