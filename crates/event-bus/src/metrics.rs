//! Delivery counters for the event bus.
//!
//! ## Usage
//!
//! ```ignore
//! let bus = EventBus::<String>::new();
//! // ... publish ...
//! let snapshot = bus.metrics().snapshot();
//! println!("delivered {} / attempted {}", snapshot.delivered, snapshot.attempted);
//! ```

use crate::error::DeliveryError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters shared by a bus and its in-flight deliveries.
///
/// Only the bus records; callers read through [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Total `publish` calls, including those with no subscribers
    published: AtomicU64,
    /// Total per-subscriber delivery attempts dispatched
    attempted: AtomicU64,
    /// Attempts that handed the event to a receiver
    delivered: AtomicU64,
    /// Attempts that hit the strategy timeout
    timed_out: AtomicU64,
    /// Attempts against a dropped subscription
    closed: AtomicU64,
}

impl BusMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one `publish` call
    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one dispatched delivery
    pub(crate) fn record_attempt(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one completed hand-over
    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed attempt under its cause
    pub(crate) fn record_failure(&self, error: DeliveryError) {
        let counter = match error {
            DeliveryError::TimedOut(_) => &self.timed_out,
            DeliveryError::Closed => &self.closed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            attempted: self.attempted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`BusMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub published: u64,
    pub attempted: u64,
    pub delivered: u64,
    pub timed_out: u64,
    pub closed: u64,
}

impl MetricsSnapshot {
    /// Failed attempts of any cause
    pub fn failed(&self) -> u64 {
        self.timed_out + self.closed
    }

    /// Attempts that have not resolved yet
    pub fn in_flight(&self) -> u64 {
        self.attempted
            .saturating_sub(self.delivered)
            .saturating_sub(self.failed())
    }
}
