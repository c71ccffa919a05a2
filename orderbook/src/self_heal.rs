use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::SelfHealerConfig;
use crate::engine::MatchingEngine;
use crate::types::Side;

/// One recorded liquidity injection, for the audit trail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidityInjection {
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub qty: i64,
    pub reason: String,
}

/// Watches a single designated symbol and injects synthetic liquidity
/// when one side of its book empties out, so a thin book doesn't stall
/// entirely.
///
/// The audit log is a bounded ring buffer — oldest entries are evicted as
/// new ones arrive — while [`SelfHealer::injection_count`] is a separate
/// monotonic counter, so the reported total still reflects every injection
/// ever made even once the log itself has wrapped.
pub struct SelfHealer {
    config: SelfHealerConfig,
    log: RwLock<VecDeque<LiquidityInjection>>,
    count: AtomicU64,
}

impl SelfHealer {
    pub fn new(config: SelfHealerConfig) -> Self {
        Self {
            config,
            log: RwLock::new(VecDeque::new()),
            count: AtomicU64::new(0),
        }
    }

    /// Spawns the healing ticker against a running engine. Takes
    /// `Arc<Self>` by value — callers keep their own clone to query the
    /// injection count from.
    pub fn start(self: Arc<Self>, engine: &MatchingEngine) {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.heal_interval);
            loop {
                ticker.tick().await;
                self.tick(&engine).await;
            }
        });
    }

    async fn tick(&self, engine: &MatchingEngine) {
        let symbol = &self.config.healer_symbol;
        let Some(snapshot) = engine.book(symbol, 1).await else {
            return;
        };

        let best_bid = snapshot.bids.first().map(|l| l.price);
        let best_ask = snapshot.asks.first().map(|l| l.price);

        match (best_bid, best_ask) {
            (Some(bid), None) => self.inject(engine, symbol, Side::Sell, bid + 2.0, "one-sided book (only bids)"),
            (None, Some(ask)) => self.inject(engine, symbol, Side::Buy, ask - 2.0, "one-sided book (only asks)"),
            (Some(bid), Some(ask)) => {
                let mid = (bid + ask) / 2.0;
                let spread_pct = ((ask - bid) / mid) * 100.0;
                if spread_pct > self.config.spread_warn_pct {
                    tracing::warn!(symbol = %symbol, spread_pct, "wide spread detected");
                }
            }
            (None, None) => {}
        }
    }

    fn inject(&self, engine: &MatchingEngine, symbol: &str, side: Side, price: f64, reason: &str) {
        tracing::info!(symbol, ?side, price, qty = 5, "injecting liquidity");
        if engine.submit(symbol, side, price, 5, "self-healer").is_err() {
            tracing::warn!(symbol, "self-healer injection rejected by engine");
            return;
        }

        let mut log = self.log.write().expect("self-healer log lock poisoned");
        log.push_back(LiquidityInjection {
            symbol: symbol.to_string(),
            side,
            price,
            qty: 5,
            reason: reason.to_string(),
        });
        if log.len() > self.config.injection_log_capacity {
            log.pop_front();
        }
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total injections ever made, independent of how much of the audit
    /// log is still retained.
    pub fn injection_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Currently-retained audit entries, most recent last.
    pub fn recent_injections(&self) -> Vec<LiquidityInjection> {
        self.log.read().expect("self-healer log lock poisoned").iter().cloned().collect()
    }
}
