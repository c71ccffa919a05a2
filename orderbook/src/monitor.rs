use std::collections::VecDeque;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::config::MonitorConfig;
use crate::engine::{LatencySample, MatchingEngine};
use crate::types::Trade;

/// System health state, driven off rolling average match latency.
///
/// `Throttled` is a reserved variant: the monitor tracks whether callers
/// *should* throttle via [`Monitor::should_throttle`], but never transitions
/// into this mode itself — only `Normal`/`Safe` are ever observed from
/// [`Monitor::mode`]. An admission layer in front of the engine is expected
/// to act on `should_throttle`'s result directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Normal,
    Safe,
    Throttled,
}

/// Point-in-time counters and latency figures, as returned by `stats()`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub avg_latency_us: f64,
    pub max_latency_us: f64,
    pub total_trades: i64,
    pub safe_mode_triggers: i64,
    pub throttle_count: i64,
    pub current_mode: Mode,
}

struct Window {
    samples: VecDeque<f64>,
    capacity: usize,
    avg: f64,
    max: f64,
}

impl Window {
    fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            avg: 0.0,
            max: 0.0,
        }
    }

    fn record(&mut self, micros: f64) {
        self.samples.push_back(micros);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        if micros > self.max {
            self.max = micros;
        }
        let sum: f64 = self.samples.iter().sum();
        self.avg = sum / self.samples.len() as f64;
    }
}

struct Counters {
    total_trades: i64,
    safe_mode_triggers: i64,
    throttle_count: i64,
}

/// Tracks match latency and trade volume, and derives a system `Mode` from
/// it on a fixed interval.
///
/// The rolling window lives behind its own lock, separate from the mode
/// lock, so a burst of latency samples never blocks a concurrent health
/// check (or vice versa).
pub struct Monitor {
    window: RwLock<Window>,
    mode: RwLock<Mode>,
    counters: RwLock<Counters>,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            window: RwLock::new(Window::new(config.window_size)),
            mode: RwLock::new(Mode::Normal),
            counters: RwLock::new(Counters {
                total_trades: 0,
                safe_mode_triggers: 0,
                throttle_count: 0,
            }),
            config,
        }
    }

    /// Spawns the monitor's three background tasks against a running
    /// engine: metric collection, trade counting, and periodic health
    /// evaluation. Takes `Arc<Self>` by value — callers keep their own
    /// clone to query stats from.
    pub fn start(self: std::sync::Arc<Self>, engine: &MatchingEngine) {
        let metrics_rx = engine.subscribe_metrics();
        let trades_rx = engine.subscribe_trades();

        let monitor = self.clone();
        tokio::spawn(async move { monitor.collect_metrics(metrics_rx).await });

        let monitor = self.clone();
        tokio::spawn(async move { monitor.collect_trades(trades_rx).await });

        tokio::spawn(async move { self.check_health_loop().await });
    }

    async fn collect_metrics(&self, mut rx: mpsc::Receiver<LatencySample>) {
        while let Some(sample) = rx.recv().await {
            self.record_latency(sample.value);
        }
    }

    async fn collect_trades(&self, mut rx: mpsc::Receiver<Trade>) {
        while let Some(trade) = rx.recv().await {
            self.increment_trades();
            tracing::debug!(
                symbol = %trade.symbol,
                price = trade.price,
                qty = trade.qty,
                "monitor tracked trade"
            );
        }
    }

    async fn check_health_loop(&self) {
        let mut ticker = tokio::time::interval(self.config.check_interval);
        loop {
            ticker.tick().await;
            self.evaluate_health();
        }
    }

    fn record_latency(&self, micros: f64) {
        self.window
            .write()
            .expect("monitor window lock poisoned")
            .record(micros);
    }

    fn increment_trades(&self) {
        self.counters
            .write()
            .expect("monitor counters lock poisoned")
            .total_trades += 1;
    }

    /// Runs one hysteresis step: enters `Safe` above the latency threshold,
    /// returns to `Normal` once average latency drops below 70% of it.
    pub fn evaluate_health(&self) {
        let avg = self.window.read().expect("monitor window lock poisoned").avg;
        let mut mode = self.mode.write().expect("monitor mode lock poisoned");

        if avg > self.config.latency_threshold_us && *mode == Mode::Normal {
            *mode = Mode::Safe;
            self.counters
                .write()
                .expect("monitor counters lock poisoned")
                .safe_mode_triggers += 1;
            tracing::warn!(avg_latency_us = avg, "entering safe mode due to high latency");
        } else if avg < self.config.latency_threshold_us * 0.7 && *mode == Mode::Safe {
            *mode = Mode::Normal;
            tracing::info!(avg_latency_us = avg, "returning to normal mode");
        }
    }

    pub fn mode(&self) -> Mode {
        *self.mode.read().expect("monitor mode lock poisoned")
    }

    /// Reports whether `queue_depth` exceeds the configured threshold,
    /// counting the check. Does not itself change `mode()` — see [`Mode`].
    pub fn should_throttle(&self, queue_depth: usize) -> bool {
        if queue_depth > self.config.queue_threshold {
            self.counters
                .write()
                .expect("monitor counters lock poisoned")
                .throttle_count += 1;
            true
        } else {
            false
        }
    }

    pub fn stats(&self) -> Stats {
        let window = self.window.read().expect("monitor window lock poisoned");
        let counters = self.counters.read().expect("monitor counters lock poisoned");
        Stats {
            avg_latency_us: window.avg,
            max_latency_us: window.max,
            total_trades: counters.total_trades,
            safe_mode_triggers: counters.safe_mode_triggers,
            throttle_count: counters.throttle_count,
            current_mode: self.mode(),
        }
    }
}
