//! Basic Metrics
//!
//! Per-operation counters and latency tracking for the orchestrator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Serialize;

/// Counters for one operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    pub calls: u64,
    pub failures: u64,
}

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    total_ops: AtomicU64,
    total_failures: AtomicU64,

    by_operation: RwLock<HashMap<&'static str, OperationStats>>,

    latency_sum_us: AtomicU64,
    latency_min_us: AtomicU64,
    latency_max_us: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_ops: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            by_operation: RwLock::new(HashMap::new()),
            latency_sum_us: AtomicU64::new(0),
            latency_min_us: AtomicU64::new(u64::MAX),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record a finished operation
    pub fn record(&self, operation: &'static str, latency: Duration, ok: bool) {
        self.total_ops.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.total_failures.fetch_add(1, Ordering::Relaxed);
        }

        {
            let mut ops = self.by_operation.write();
            let stats = ops.entry(operation).or_default();
            stats.calls += 1;
            if !ok {
                stats.failures += 1;
            }
        }

        let latency_us = latency.as_micros().min(u64::MAX as u128) as u64;
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_min_us.fetch_min(latency_us, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    pub fn total_ops(&self) -> u64 {
        self.total_ops.load(Ordering::Relaxed)
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }

    /// Counters for a single operation (zero if never recorded)
    pub fn operation(&self, operation: &str) -> OperationStats {
        self.by_operation
            .read()
            .get(operation)
            .copied()
            .unwrap_or_default()
    }

    /// Get average latency in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let count = self.total_ops();
        if count == 0 {
            return 0.0;
        }
        self.latency_sum_us.load(Ordering::Relaxed) as f64 / count as f64
    }

    pub fn min_latency_us(&self) -> u64 {
        match self.latency_min_us.load(Ordering::Relaxed) {
            u64::MAX => 0,
            min => min,
        }
    }

    pub fn max_latency_us(&self) -> u64 {
        self.latency_max_us.load(Ordering::Relaxed)
    }

    /// Get a summary of metrics
    pub fn summary(&self) -> String {
        format!(
            "Operations: {} ({} failed) | Latency (µs): avg={:.1}, min={}, max={}",
            self.total_ops(),
            self.total_failures(),
            self.avg_latency_us(),
            self.min_latency_us(),
            self.max_latency_us()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.record("query_text", Duration::from_micros(100), true);
        metrics.record("query_text", Duration::from_micros(200), false);
        metrics.record("analyze_and_query", Duration::from_micros(150), true);

        assert_eq!(metrics.total_ops(), 3);
        assert_eq!(metrics.total_failures(), 1);
        assert_eq!(metrics.min_latency_us(), 100);
        assert_eq!(metrics.max_latency_us(), 200);
        assert!((metrics.avg_latency_us() - 150.0).abs() < 0.1);

        assert_eq!(
            metrics.operation("query_text"),
            OperationStats {
                calls: 2,
                failures: 1
            }
        );
        assert_eq!(metrics.operation("analyze_and_query").calls, 1);
        assert_eq!(metrics.operation("query_from_audio"), OperationStats::default());
        assert!(metrics.summary().starts_with("Operations: 3 (1 failed)"));
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = Metrics::new();
        assert_eq!(metrics.min_latency_us(), 0);
        assert_eq!(metrics.avg_latency_us(), 0.0);
        assert!(metrics.summary().starts_with("Operations: 0"));
    }
}
