//! In-memory, multi-symbol limit order matching core.
//!
//! - Price-time priority matching (best price first, then FIFO)
//! - Partial fills, immediate execution at the resting maker's price
//! - A single matching task per process is the only writer to any book
//! - Bounded channels for ingress and for the trade/metric output streams

pub mod config;
pub mod engine;
pub mod error;
pub mod fanout;
pub mod monitor;
pub mod order_book;
pub mod price_levels;
pub mod self_heal;
pub mod types;

pub use config::{EngineConfig, MonitorConfig, SelfHealerConfig};
pub use engine::{LatencySample, MatchingEngine};
pub use error::{EngineError, OrderError};
pub use monitor::{Mode, Monitor, Stats};
pub use order_book::{BookSnapshot, OrderBook, PriceLevel};
pub use price_levels::PriceLevels;
pub use self_heal::{LiquidityInjection, SelfHealer};
pub use types::{Order, OrderId, Side, Trade, TradeId};
