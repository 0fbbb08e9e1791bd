//! Observability and Metrics
//!
//! Counters kept by the server listener. Workers never touch them; the
//! listener records each worker's outcome when it reaps the task.
//!
//! Uses atomic counters so a snapshot can be taken through a shared reference.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Listener-side counters for one server run
#[derive(Debug)]
pub struct Metrics {
    /// Total connections accepted
    pub connections_accepted: AtomicU64,
    /// Workers currently running
    pub workers_active: AtomicU64,
    /// Exchanges that sent a reply
    pub exchanges_completed: AtomicU64,
    /// Connections rejected during the role handshake
    pub handshakes_failed: AtomicU64,
    /// Connections dropped after the handshake without a reply
    pub exchanges_failed: AtomicU64,
    /// Workers that panicked
    pub worker_panics: AtomicU64,
    /// Failed accept calls
    pub accept_errors: AtomicU64,
    /// Payload bytes received by completed exchanges
    pub bytes_received: AtomicU64,
    /// Payload bytes sent by completed exchanges
    pub bytes_sent: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            connections_accepted: AtomicU64::new(0),
            workers_active: AtomicU64::new(0),
            exchanges_completed: AtomicU64::new(0),
            handshakes_failed: AtomicU64::new(0),
            exchanges_failed: AtomicU64::new(0),
            worker_panics: AtomicU64::new(0),
            accept_errors: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a new connection handed to a worker
    pub fn connection_accepted(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.workers_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker that has finished, however it ended
    pub fn worker_finished(&self) {
        self.workers_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a completed exchange
    pub fn exchange_completed(&self, bytes_received: u64, bytes_sent: u64) {
        self.exchanges_completed.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes_received, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes_sent, Ordering::Relaxed);
    }

    /// Record a failed handshake
    pub fn handshake_failed(&self) {
        self.handshakes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an exchange that ended without a reply
    pub fn exchange_failed(&self) {
        self.exchanges_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker panic
    pub fn worker_panicked(&self) {
        self.worker_panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed accept
    pub fn accept_error(&self) {
        self.accept_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            workers_active: self.workers_active.load(Ordering::Relaxed),
            exchanges_completed: self.exchanges_completed.load(Ordering::Relaxed),
            handshakes_failed: self.handshakes_failed.load(Ordering::Relaxed),
            exchanges_failed: self.exchanges_failed.load(Ordering::Relaxed),
            worker_panics: self.worker_panics.load(Ordering::Relaxed),
            accept_errors: self.accept_errors.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            connections_accepted = snapshot.connections_accepted,
            workers_active = snapshot.workers_active,
            exchanges_completed = snapshot.exchanges_completed,
            handshakes_failed = snapshot.handshakes_failed,
            exchanges_failed = snapshot.exchanges_failed,
            worker_panics = snapshot.worker_panics,
            accept_errors = snapshot.accept_errors,
            bytes_received = snapshot.bytes_received,
            bytes_sent = snapshot.bytes_sent,
            uptime_seconds = snapshot.uptime_seconds,
            "Server metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connections_accepted: u64,
    pub workers_active: u64,
    pub exchanges_completed: u64,
    pub handshakes_failed: u64,
    pub exchanges_failed: u64,
    pub worker_panics: u64,
    pub accept_errors: u64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub uptime_seconds: u64,
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_worker_lifecycle() {
        let metrics = Metrics::new();
        metrics.connection_accepted();
        metrics.connection_accepted();
        metrics.exchange_completed(10, 5);
        metrics.worker_finished();
        metrics.handshake_failed();
        metrics.worker_finished();

        let snap = metrics.snapshot();
        assert_eq!(snap.connections_accepted, 2);
        assert_eq!(snap.workers_active, 0);
        assert_eq!(snap.exchanges_completed, 1);
        assert_eq!(snap.handshakes_failed, 1);
        assert_eq!(snap.bytes_received, 10);
        assert_eq!(snap.bytes_sent, 5);
    }
}
