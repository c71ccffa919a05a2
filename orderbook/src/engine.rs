use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::{mpsc, RwLock};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fanout::Hub;
use crate::order_book::{BookSnapshot, OrderBook};
use crate::types::{now_ns, Order, OrderId, Side, Trade};

/// One typed metric sample emitted after each processed order.
///
/// Only `"latency"` is produced today; `metric_type` stays a string rather
/// than an enum so a future metric can be added without an API break.
#[derive(Clone, Debug, PartialEq)]
pub struct LatencySample {
    pub metric_type: &'static str,
    pub value: f64,
    pub timestamp_ns: u128,
}

impl LatencySample {
    fn latency(micros: f64) -> Self {
        Self {
            metric_type: "latency",
            value: micros,
            timestamp_ns: now_ns(),
        }
    }
}

/// Owns every symbol's book and the single task that ever mutates them.
///
/// Cloning an engine clones the handle, not the state — all clones share
/// the same books, ingress queue and output streams, mirroring the
/// original's one-`MatchingEngine`-per-process design.
#[derive(Clone)]
pub struct MatchingEngine {
    inner: Arc<Inner>,
}

struct Inner {
    books: DashMap<String, RwLock<OrderBook>>,
    order_tx: mpsc::Sender<Order>,
    order_rx: tokio::sync::Mutex<Option<mpsc::Receiver<Order>>>,
    trades: Hub<Trade>,
    metrics: Hub<LatencySample>,
    config: EngineConfig,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let (order_tx, order_rx) = mpsc::channel(config.order_buffer_size);
        Self {
            inner: Arc::new(Inner {
                books: DashMap::new(),
                order_tx,
                order_rx: tokio::sync::Mutex::new(Some(order_rx)),
                trades: Hub::new(config.trade_buffer_size),
                metrics: Hub::new(config.metrics_buffer_size),
                config,
            }),
        }
    }

    /// Spawns the single matching task. Calling this more than once is a
    /// logic error — only the first call's receiver half is available.
    pub fn start(&self) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut rx = inner
                .order_rx
                .lock()
                .await
                .take()
                .expect("MatchingEngine::start called more than once");
            while let Some(order) = rx.recv().await {
                let start = Instant::now();
                inner.match_order(order).await;
                let micros = start.elapsed().as_micros() as f64;
                inner.metrics.publish(LatencySample::latency(micros));
            }
        });
    }

    /// Validates and enqueues an order. Non-blocking: returns the new
    /// order's id immediately, whether or not a match has happened yet.
    pub fn submit(
        &self,
        symbol: &str,
        side: Side,
        price: f64,
        qty: i64,
        user_id: &str,
    ) -> Result<OrderId, EngineError> {
        let order = Order::new(symbol, side, price, qty, user_id)?;
        let id = order.id;
        self.inner
            .order_tx
            .try_send(order)
            .map_err(|_| EngineError::QueueFull)?;
        Ok(id)
    }

    /// Current depth of the ingress queue.
    pub fn queue_depth(&self) -> usize {
        self.inner.config.order_buffer_size - self.inner.order_tx.capacity()
    }

    /// A depth-limited snapshot of one symbol's book, or `None` if the
    /// symbol has never had an order.
    pub async fn book(&self, symbol: &str, depth: usize) -> Option<BookSnapshot> {
        let book = self.inner.books.get(symbol)?;
        let guard = book.read().await;
        Some(guard.snapshot(symbol, depth))
    }

    pub fn subscribe_trades(&self) -> mpsc::Receiver<Trade> {
        self.inner.trades.subscribe()
    }

    pub fn subscribe_metrics(&self) -> mpsc::Receiver<LatencySample> {
        self.inner.metrics.subscribe()
    }
}

impl Inner {
    async fn match_order(&self, order: Order) {
        let symbol = order.symbol.clone();
        let book_lock = self
            .books
            .entry(symbol)
            .or_insert_with(|| RwLock::new(OrderBook::new()));
        let mut book = book_lock.write().await;
        let trades = book.submit(order);
        drop(book);

        for trade in trades {
            tracing::info!(
                symbol = %trade.symbol,
                price = trade.price,
                qty = trade.qty,
                trade_id = ?trade.id.0,
                "trade executed"
            );
            self.trades.publish(trade);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn engine_with(config: EngineConfig) -> MatchingEngine {
        let engine = MatchingEngine::new(config);
        engine.start();
        engine
    }

    #[tokio::test]
    async fn submit_then_match_produces_a_trade() {
        let engine = engine_with(EngineConfig::default()).await;
        let mut trades = engine.subscribe_trades();

        engine.submit("AAPL", Side::Sell, 100.0, 10, "bob").unwrap();
        engine.submit("AAPL", Side::Buy, 100.0, 10, "alice").unwrap();

        let trade = tokio::time::timeout(Duration::from_secs(1), trades.recv())
            .await
            .expect("trade should arrive")
            .expect("channel open");
        assert_eq!(trade.qty, 10);
        assert_eq!(trade.price, 100.0);
    }

    #[tokio::test]
    async fn metric_sample_is_typed_latency() {
        let engine = engine_with(EngineConfig::default()).await;
        let mut metrics = engine.subscribe_metrics();

        engine.submit("AAPL", Side::Buy, 100.0, 10, "alice").unwrap();

        let sample = tokio::time::timeout(Duration::from_secs(1), metrics.recv())
            .await
            .expect("metric should arrive")
            .expect("channel open");
        assert_eq!(sample.metric_type, "latency");
        assert!(sample.value >= 0.0);
        assert!(sample.timestamp_ns > 0);
    }

    #[tokio::test]
    async fn unknown_symbol_has_no_book() {
        let engine = engine_with(EngineConfig::default()).await;
        assert!(engine.book("NOPE", 5).await.is_none());
    }

    #[tokio::test]
    async fn invalid_order_is_rejected_before_enqueue() {
        let engine = engine_with(EngineConfig::default()).await;
        let err = engine.submit("AAPL", Side::Buy, -1.0, 10, "alice").unwrap_err();
        assert!(matches!(err, EngineError::InvalidOrder(_)));
        assert_eq!(engine.queue_depth(), 0);
    }

    #[tokio::test]
    async fn queue_full_is_reported() {
        let mut config = EngineConfig::default();
        config.order_buffer_size = 1;
        let engine = MatchingEngine::new(config);
        // Deliberately do not start the matcher, so the queue never drains.
        engine.submit("AAPL", Side::Buy, 100.0, 1, "alice").unwrap();
        let err = engine.submit("AAPL", Side::Buy, 100.0, 1, "alice").unwrap_err();
        assert_eq!(err, EngineError::QueueFull);
    }
}
