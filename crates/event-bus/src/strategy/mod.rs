//! # Backoff Strategies
//!
//! A strategy supplies the per-delivery timeout and decides what happens
//! when a subscriber is not receiving in time.
//!
//! - [`LoggingStrategy`]: record the failure and move on. Stateless, one
//!   instance can serve every publish.
//! - [`RetryStrategy`]: republish with a budget one smaller, dropping the
//!   event once the budget is spent. Each retry level is a fresh instance.

mod logging;
mod retry;

pub use logging::{FailureLogger, LoggingStrategy, TracingLogger, FAILURE_MESSAGE};
pub use retry::RetryStrategy;

use crate::event::Event;
use std::time::Duration;

/// Timeout and failure hook applied to each delivery of a publish.
pub trait BackoffStrategy<T>: Send + Sync + 'static {
    /// How long one delivery may wait for its subscriber.
    fn timeout(&self) -> Duration;

    /// Called once per subscriber whose delivery failed.
    fn on_delivery_failure(&self, event: Event<T>);
}
