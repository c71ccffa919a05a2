//! Thin façade over the `orderbook` core: composes a `MatchingEngine`, its
//! `Monitor` and `SelfHealer`, and the one policy the core itself does not
//! enforce — rejecting submissions while the system is throttled.

use std::sync::Arc;

use orderbook::{
    EngineConfig, EngineError, MatchingEngine, Mode, Monitor, MonitorConfig, OrderId, SelfHealer,
    SelfHealerConfig, Side,
};

/// Rejection reasons surfaced to HTTP callers. `Throttled` only exists at
/// this layer — the core's `submit` never returns it, since the decision
/// to throttle lives in front of the ingress boundary, not inside it.
#[derive(Debug)]
pub enum SubmitError {
    Invalid(orderbook::OrderError),
    QueueFull,
    Throttled,
}

impl From<EngineError> for SubmitError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidOrder(inner) => SubmitError::Invalid(inner),
            EngineError::QueueFull => SubmitError::QueueFull,
        }
    }
}

pub struct Exchange {
    engine: MatchingEngine,
    monitor: Arc<Monitor>,
    healer: Arc<SelfHealer>,
}

impl Exchange {
    pub fn new() -> Self {
        let engine = MatchingEngine::new(EngineConfig::default());
        let monitor = Arc::new(Monitor::new(MonitorConfig::default()));
        let healer = Arc::new(SelfHealer::new(SelfHealerConfig::default()));

        engine.start();
        monitor.clone().start(&engine);
        healer.clone().start(&engine);

        Self {
            engine,
            monitor,
            healer,
        }
    }

    /// Submits an order, first rejecting it if the system is throttled.
    /// This is the one composition the core leaves to its callers.
    pub fn submit(
        &self,
        symbol: &str,
        side: Side,
        price: f64,
        qty: i64,
        user_id: &str,
    ) -> Result<OrderId, SubmitError> {
        if self.monitor.should_throttle(self.engine.queue_depth()) {
            return Err(SubmitError::Throttled);
        }
        self.engine
            .submit(symbol, side, price, qty, user_id)
            .map_err(SubmitError::from)
    }

    pub async fn book(&self, symbol: &str, depth: usize) -> Option<orderbook::BookSnapshot> {
        self.engine.book(symbol, depth).await
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn stats(&self) -> orderbook::Stats {
        self.monitor.stats()
    }

    pub fn mode(&self) -> Mode {
        self.monitor.mode()
    }

    pub fn self_heal_injections(&self) -> u64 {
        self.healer.injection_count()
    }
}
