//! Statistics tracking for the resolver.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for resolver activity.
///
/// `received` counts every accepted client query; `blocked`, `resolved`, and
/// `failed` partition it by outcome.
pub struct Stats {
    pub received: AtomicU64,
    pub blocked: AtomicU64,
    pub resolved: AtomicU64,
    pub failed: AtomicU64,
    /// Cumulative response time in microseconds for averaging.
    total_response_time_us: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            received: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
            resolved: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
        }
    }

    pub fn record_blocked(&self, response_time_ms: f64) {
        self.received.fetch_add(1, Ordering::Relaxed);
        self.blocked.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us
            .fetch_add((response_time_ms * 1000.0) as u64, Ordering::Relaxed);
    }

    pub fn record_resolved(&self, response_time_ms: f64) {
        self.received.fetch_add(1, Ordering::Relaxed);
        self.resolved.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us
            .fetch_add((response_time_ms * 1000.0) as u64, Ordering::Relaxed);
    }

    /// A transaction that produced no reply; contributes no response time.
    pub fn record_failed(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot_and_reset(&self) -> StatsSnapshot {
        let received = self.received.swap(0, Ordering::Relaxed);
        let blocked = self.blocked.swap(0, Ordering::Relaxed);
        let resolved = self.resolved.swap(0, Ordering::Relaxed);
        let failed = self.failed.swap(0, Ordering::Relaxed);
        let total_us = self.total_response_time_us.swap(0, Ordering::Relaxed);

        // Average over the replies actually sent; failures contribute none.
        let replied = blocked + resolved;
        let avg_response_ms = if replied > 0 {
            (total_us as f64 / replied as f64) / 1000.0
        } else {
            0.0
        };

        StatsSnapshot {
            received,
            blocked,
            resolved,
            failed,
            avg_response_ms,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

pub struct StatsSnapshot {
    pub received: u64,
    pub blocked: u64,
    pub resolved: u64,
    pub failed: u64,
    pub avg_response_ms: f64,
}
