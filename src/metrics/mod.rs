//! Operation Metrics Module
//!
//! Standardized operation monitoring for the deque. Counters capture how
//! often callers succeed, fail, block, or time out, plus operation latency,
//! without affecting the blocking protocol itself. Collection can be
//! toggled at runtime through [`MetricsCollector`].

use core::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Snapshot of deque operation metrics.
#[derive(Debug, Default, Clone)]
pub struct PerformanceMetrics {
    /// Total number of operations performed
    pub total_operations: u64,
    /// Number of operations that completed with an element transferred
    pub successful_operations: u64,
    /// Number of operations that failed (full, empty, or interrupted)
    pub failed_operations: u64,
    /// Number of operations that had to wait on a condition variable
    pub blocked_operations: u64,
    /// Number of timed operations that reached their deadline
    pub timed_out_operations: u64,
    /// Average operation time in nanoseconds
    pub avg_operation_time_ns: u64,
    /// Maximum operation time in nanoseconds
    pub max_operation_time_ns: u64,
}

impl PerformanceMetrics {
    /// Calculate success rate as percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_operations == 0 {
            0.0
        } else {
            (self.successful_operations as f64 / self.total_operations as f64) * 100.0
        }
    }

    /// Calculate the share of operations that had to block, as percentage
    pub fn block_rate(&self) -> f64 {
        if self.total_operations == 0 {
            0.0
        } else {
            (self.blocked_operations as f64 / self.total_operations as f64) * 100.0
        }
    }

    /// Get average operation time as Duration
    pub fn avg_operation_time(&self) -> Duration {
        Duration::from_nanos(self.avg_operation_time_ns)
    }

    /// Get maximum operation time as Duration
    pub fn max_operation_time(&self) -> Duration {
        Duration::from_nanos(self.max_operation_time_ns)
    }
}

/// Internal atomic metrics collection
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    total_operations: AtomicU64,
    successful_operations: AtomicU64,
    failed_operations: AtomicU64,
    blocked_operations: AtomicU64,
    timed_out_operations: AtomicU64,
    total_time_ns: AtomicU64,
    max_time_ns: AtomicU64,
}

impl AtomicMetrics {
    /// Record a successful operation with its duration
    pub fn record_success(&self, duration: Duration) {
        let duration_ns = duration.as_nanos() as u64;

        self.total_operations.fetch_add(1, Ordering::Relaxed);
        self.successful_operations.fetch_add(1, Ordering::Relaxed);
        self.total_time_ns.fetch_add(duration_ns, Ordering::Relaxed);

        // Update max time if this operation was slower
        let mut current_max = self.max_time_ns.load(Ordering::Relaxed);
        while duration_ns > current_max {
            match self.max_time_ns.compare_exchange_weak(
                current_max,
                duration_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => current_max = x,
            }
        }
    }

    /// Record a failed operation (full, empty, or interrupted)
    pub fn record_failure(&self) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        self.failed_operations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an operation that reached its deadline
    pub fn record_timeout(&self) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        self.failed_operations.fetch_add(1, Ordering::Relaxed);
        self.timed_out_operations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an operation that had to wait on a condition variable
    pub fn record_blocked(&self) {
        self.blocked_operations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> PerformanceMetrics {
        let total_ops = self.total_operations.load(Ordering::Relaxed);
        let successful_ops = self.successful_operations.load(Ordering::Relaxed);
        let failed_ops = self.failed_operations.load(Ordering::Relaxed);
        let blocked_ops = self.blocked_operations.load(Ordering::Relaxed);
        let timed_out_ops = self.timed_out_operations.load(Ordering::Relaxed);
        let total_time = self.total_time_ns.load(Ordering::Relaxed);
        let max_time = self.max_time_ns.load(Ordering::Relaxed);

        PerformanceMetrics {
            total_operations: total_ops,
            successful_operations: successful_ops,
            failed_operations: failed_ops,
            blocked_operations: blocked_ops,
            timed_out_operations: timed_out_ops,
            avg_operation_time_ns: if total_ops > 0 {
                total_time / total_ops
            } else {
                0
            },
            max_operation_time_ns: max_time,
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.total_operations.store(0, Ordering::Relaxed);
        self.successful_operations.store(0, Ordering::Relaxed);
        self.failed_operations.store(0, Ordering::Relaxed);
        self.blocked_operations.store(0, Ordering::Relaxed);
        self.timed_out_operations.store(0, Ordering::Relaxed);
        self.total_time_ns.store(0, Ordering::Relaxed);
        self.max_time_ns.store(0, Ordering::Relaxed);
    }
}

/// Trait for structures that expose operation metrics
pub trait MetricsCollector {
    /// Get current performance metrics
    fn metrics(&self) -> PerformanceMetrics;

    /// Reset all metrics
    fn reset_metrics(&self);

    /// Enable or disable metrics collection
    fn set_metrics_enabled(&self, enabled: bool);

    /// Check if metrics collection is enabled
    fn is_metrics_enabled(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let metrics = AtomicMetrics::default();
        metrics.record_success(Duration::from_nanos(100));
        metrics.record_success(Duration::from_nanos(300));
        metrics.record_failure();
        metrics.record_timeout();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_operations, 4);
        assert_eq!(snapshot.successful_operations, 2);
        assert_eq!(snapshot.failed_operations, 2);
        assert_eq!(snapshot.timed_out_operations, 1);
        assert_eq!(snapshot.success_rate(), 50.0);
        assert_eq!(snapshot.avg_operation_time_ns, 100);
        assert_eq!(snapshot.max_operation_time_ns, 300);
    }

    #[test]
    fn test_reset() {
        let metrics = AtomicMetrics::default();
        metrics.record_success(Duration::from_nanos(100));
        metrics.record_blocked();
        metrics.reset();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_operations, 0);
        assert_eq!(snapshot.blocked_operations, 0);
        assert_eq!(snapshot.success_rate(), 0.0);
    }
}
