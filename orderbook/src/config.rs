use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sizing for the matching engine's ingress and output queues.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ingress order queue capacity.
    pub order_buffer_size: usize,
    /// Authoritative trade stream capacity.
    pub trade_buffer_size: usize,
    /// Authoritative metric stream capacity.
    pub metrics_buffer_size: usize,
    /// Default fan-out width hint for trade/metric subscribers.
    pub subscriber_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_buffer_size: 10_000,
            trade_buffer_size: 1_000,
            metrics_buffer_size: 1_000,
            subscriber_count: 3,
        }
    }
}

/// Thresholds driving the monitor's rolling window and mode machine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub latency_threshold_us: f64,
    pub queue_threshold: usize,
    pub window_size: usize,
    #[serde(with = "duration_secs")]
    pub check_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            latency_threshold_us: 200.0,
            queue_threshold: 8_000,
            window_size: 100,
            check_interval: Duration::from_secs(2),
        }
    }
}

/// Self-healer tick cadence and target symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelfHealerConfig {
    #[serde(with = "duration_secs")]
    pub heal_interval: Duration,
    pub healer_symbol: String,
    /// Wide-spread warning threshold, as a percent of mid price.
    pub spread_warn_pct: f64,
    /// How many audit entries to retain (oldest evicted first).
    pub injection_log_capacity: usize,
}

impl Default for SelfHealerConfig {
    fn default() -> Self {
        Self {
            heal_interval: Duration::from_secs(5),
            healer_symbol: "RELIANCE".to_string(),
            spread_warn_pct: 1.0,
            injection_log_capacity: 1_000,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let e = EngineConfig::default();
        assert_eq!(e.order_buffer_size, 10_000);
        assert_eq!(e.trade_buffer_size, 1_000);
        assert_eq!(e.metrics_buffer_size, 1_000);
        assert_eq!(e.subscriber_count, 3);

        let m = MonitorConfig::default();
        assert_eq!(m.latency_threshold_us, 200.0);
        assert_eq!(m.queue_threshold, 8_000);
        assert_eq!(m.window_size, 100);
        assert_eq!(m.check_interval, Duration::from_secs(2));

        let h = SelfHealerConfig::default();
        assert_eq!(h.heal_interval, Duration::from_secs(5));
        assert_eq!(h.healer_symbol, "RELIANCE");
    }
}
