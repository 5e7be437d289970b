//! Log-and-drop strategy.

use super::BackoffStrategy;
use crate::config::BusConfig;
use crate::event::Event;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Message written for every failed delivery.
pub const FAILURE_MESSAGE: &str = "failed to deliver message";

/// Sink for delivery failure records.
pub trait FailureLogger<T>: Send + Sync + 'static {
    /// Write `message` together with the undelivered `event`.
    fn info(&self, message: &str, event: &Event<T>);
}

impl<T, L> FailureLogger<T> for Arc<L>
where
    L: FailureLogger<T> + ?Sized,
{
    fn info(&self, message: &str, event: &Event<T>) {
        (**self).info(message, event);
    }
}

/// Writes failures as `tracing` records at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl<T: fmt::Debug> FailureLogger<T> for TracingLogger {
    fn info(&self, message: &str, event: &Event<T>) {
        info!(
            event_name = %event.name,
            details = ?event.details,
            "{}",
            message
        );
    }
}

/// Fixed timeout; failures are logged and the event is dropped.
#[derive(Debug, Clone)]
pub struct LoggingStrategy<L = TracingLogger> {
    timeout: Duration,
    logger: L,
}

impl<L> LoggingStrategy<L> {
    /// Create a strategy writing to `logger`.
    pub fn new(timeout: Duration, logger: L) -> Self {
        Self { timeout, logger }
    }

    /// Create a strategy with the configured delivery timeout.
    pub fn from_config(config: &BusConfig, logger: L) -> Self {
        Self::new(config.delivery_timeout, logger)
    }
}

impl LoggingStrategy<TracingLogger> {
    /// Strategy that logs through `tracing`.
    pub fn tracing(timeout: Duration) -> Self {
        Self::new(timeout, TracingLogger)
    }
}

impl<T, L> BackoffStrategy<T> for LoggingStrategy<L>
where
    L: FailureLogger<T>,
{
    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn on_delivery_failure(&self, event: Event<T>) {
        self.logger.info(FAILURE_MESSAGE, &event);
    }
}
