//! Republish-on-failure strategy with a decreasing budget.
//!
//! A retry is a full republish: every current subscriber of the event name
//! receives it again, not only the one that failed. The chain ends when a
//! delivery succeeds everywhere or the budget reaches zero.

use super::BackoffStrategy;
use crate::config::BusConfig;
use crate::event::Event;
use crate::publisher::Publisher;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Retry state for one level of a retry chain.
///
/// Never mutated; each retry level gets its own instance via
/// [`next_attempt`](Self::next_attempt), so concurrent chains for the same
/// event share no counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy<P> {
    publisher: P,
    timeout: Duration,
    remaining: u32,
}

impl<P: Clone> RetryStrategy<P> {
    /// Create a strategy that republishes through `publisher` up to `retries` times.
    pub fn new(publisher: P, timeout: Duration, retries: u32) -> Self {
        Self {
            publisher,
            timeout,
            remaining: retries,
        }
    }

    /// Create a strategy from the configured timeout and retry budget.
    pub fn from_config(publisher: P, config: &BusConfig) -> Self {
        Self::new(publisher, config.delivery_timeout, config.max_retries)
    }

    /// Retries left at this level.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The strategy for the next level, or `None` once the budget is spent.
    #[must_use]
    pub fn next_attempt(&self) -> Option<Self> {
        let remaining = self.remaining.checked_sub(1)?;
        Some(Self {
            publisher: self.publisher.clone(),
            timeout: self.timeout,
            remaining,
        })
    }
}

impl<T, P> BackoffStrategy<T> for RetryStrategy<P>
where
    P: Publisher<T> + Clone + 'static,
    T: 'static,
{
    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn on_delivery_failure(&self, event: Event<T>) {
        let Some(next) = self.next_attempt() else {
            debug!(event_name = %event.name, "Retries exhausted, dropping event");
            return;
        };

        debug!(
            event_name = %event.name,
            remaining = next.remaining,
            "Retrying delivery"
        );
        self.publisher.publish(event, Arc::new(next));
    }
}
