//! # Event Bus
//!
//! Registry-backed fan-out with per-subscriber delivery tasks.
//!
//! ## Delivery
//!
//! ```text
//! publish(event, strategy)
//!   │
//!   ├─ snapshot subscribers for event.name (no entry => no-op)
//!   │
//!   └─ per subscriber: tokio::spawn
//!         offer(event) ──┬── completes first ──▶ delivered
//!                        └── timeout first ────▶ strategy.on_delivery_failure(event)
//! ```
//!
//! `publish` returns once the attempts are spawned. A slow or absent
//! subscriber only ever costs its own task.

use crate::error::DeliveryError;
use crate::event::Event;
use crate::metrics::BusMetrics;
use crate::registry::SubscriberRegistry;
use crate::strategy::BackoffStrategy;
use crate::subscriber::{self, DeliveryHandle, Subscription};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Anything events can be published through.
///
/// Implemented by [`EventBus`]; `RetryStrategy` republishes through this
/// trait so it can be pointed at a test double.
pub trait Publisher<T>: Send + Sync {
    /// Publish `event`, reporting failed deliveries to `strategy`.
    fn publish(&self, event: Event<T>, strategy: Arc<dyn BackoffStrategy<T>>);
}

/// In-process publish/subscribe bus for events carrying `T`.
///
/// Cloning is cheap and yields a handle to the same registry.
pub struct EventBus<T> {
    /// Event name -> delivery handles.
    subscribers: Arc<SubscriberRegistry<String, DeliveryHandle<T>>>,

    /// Delivery counters.
    metrics: Arc<BusMetrics>,
}

impl<T> EventBus<T>
where
    T: Clone + Send + 'static,
{
    /// Create a bus with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(SubscriberRegistry::new()),
            metrics: Arc::new(BusMetrics::new()),
        }
    }

    /// Register interest in `event_name`.
    ///
    /// Every subscription is independent; subscribing twice to the same
    /// name yields two handles that each receive every publish.
    pub fn subscribe(&self, event_name: impl Into<String>) -> Subscription<T> {
        let event_name = event_name.into();
        let (handle, subscription) = subscriber::channel(event_name.clone());
        self.subscribers.append_at(event_name, handle);

        debug!(
            event_name = %subscription.event_name(),
            subscription_id = %subscription.id(),
            "Subscription created"
        );
        subscription
    }

    /// Stop future publishes to `event_name` from reaching `subscription`.
    ///
    /// Deliveries already dispatched against an earlier snapshot are not
    /// cancelled. Unknown names or subscriptions are ignored.
    pub fn unsubscribe(&self, event_name: &str, subscription: &Subscription<T>) {
        let removed = self.subscribers.remove_at(event_name, &subscription.id());

        debug!(
            event_name = event_name,
            subscription_id = %subscription.id(),
            removed = removed,
            "Unsubscribe"
        );
    }

    /// Deliver `event` to every current subscriber of `event.name`.
    ///
    /// Each delivery runs in its own task and waits at most
    /// `strategy.timeout()`; on expiry `strategy.on_delivery_failure` is
    /// invoked once for that subscriber. Publishing to a name with no
    /// subscribers does nothing.
    ///
    /// Must be called from within a Tokio runtime. The returned [`Dispatch`]
    /// may be dropped; awaiting it is only needed to observe completion.
    pub fn publish(&self, event: Event<T>, strategy: Arc<dyn BackoffStrategy<T>>) -> Dispatch {
        self.metrics.record_published();

        let Some(handles) = self.subscribers.get(event.name.as_str()) else {
            debug!(event_name = %event.name, "No subscribers");
            return Dispatch::default();
        };

        let timeout = strategy.timeout();
        debug!(
            event_name = %event.name,
            subscribers = handles.len(),
            timeout = ?timeout,
            "Publishing event"
        );

        let attempts = handles
            .into_iter()
            .map(|handle| {
                tokio::spawn(deliver(
                    handle,
                    event.clone(),
                    timeout,
                    Arc::clone(&strategy),
                    Arc::clone(&self.metrics),
                ))
            })
            .collect();

        Dispatch { attempts }
    }

    /// Number of subscriptions currently registered under `event_name`.
    #[must_use]
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscribers.get(event_name).map_or(0, |handles| handles.len())
    }

    /// Delivery counters shared by this bus and its clones.
    #[must_use]
    pub fn metrics(&self) -> Arc<BusMetrics> {
        Arc::clone(&self.metrics)
    }
}

/// One delivery attempt: race the hand-over against the strategy timeout.
async fn deliver<T>(
    handle: DeliveryHandle<T>,
    event: Event<T>,
    timeout: Duration,
    strategy: Arc<dyn BackoffStrategy<T>>,
    metrics: Arc<BusMetrics>,
) -> Result<(), DeliveryError>
where
    T: Clone + Send + 'static,
{
    metrics.record_attempt();

    let outcome = match tokio::time::timeout(timeout, handle.offer(event.clone())).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::TimedOut(timeout)),
    };

    match outcome {
        Ok(()) => {
            metrics.record_delivered();
            debug!(
                event_name = %event.name,
                subscription_id = %handle.id(),
                "Event delivered"
            );
        }
        Err(error) => {
            metrics.record_failure(error);
            debug!(
                event_name = %event.name,
                subscription_id = %handle.id(),
                error = %error,
                "Delivery failed"
            );
            strategy.on_delivery_failure(event);
        }
    }

    outcome
}

impl<T> Publisher<T> for EventBus<T>
where
    T: Clone + Send + 'static,
{
    fn publish(&self, event: Event<T>, strategy: Arc<dyn BackoffStrategy<T>>) {
        let _dispatch = EventBus::publish(self, event, strategy);
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T> Default for EventBus<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

/// Delivery attempts spawned by one `publish` call.
///
/// Dropping it detaches the attempts; they run to completion regardless.
#[derive(Debug, Default)]
pub struct Dispatch {
    attempts: Vec<JoinHandle<Result<(), DeliveryError>>>,
}

impl Dispatch {
    /// Number of delivery attempts dispatched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// True when there were no subscribers to deliver to.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Wait for every attempt to be delivered or to fail.
    ///
    /// Failure hooks have returned by the time this resolves. A retry the
    /// hook started is a separate publish and is not awaited.
    pub async fn wait(self) -> DispatchReport {
        let mut report = DispatchReport::default();
        for attempt in self.attempts {
            match attempt.await {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(_)) | Err(_) => report.failed += 1,
            }
        }
        report
    }
}

/// Outcome counts for one [`Dispatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscribers that received the event.
    pub delivered: usize,
    /// Subscribers whose delivery failed.
    pub failed: usize,
}
