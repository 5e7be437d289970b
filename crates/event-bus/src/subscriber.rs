//! # Subscriptions
//!
//! The delivery conduit between the bus and one subscriber.
//!
//! ## Rendezvous
//!
//! The conduit has no buffer. A receiver parks inside `recv()` by leaving a
//! one-shot slot on the conduit; a delivery completes only by filling that
//! slot. There is at most one slot: each `recv()` replaces the slot of an
//! abandoned one, and a delivery that finds a closed slot waits for the
//! next `recv()`.
//!
//! ```text
//!  Subscription::recv()                      DeliveryHandle::offer()
//!  ────────────────────                      ───────────────────────
//!  park slot ────────── conduit (0..1 slot) ─▶ take slot (one offer at a time)
//!  await slot ◀──────────── event ──────────── fill slot
//! ```
//!
//! `recv()` is cancel-safe. If its future is dropped after a delivery has
//! filled the slot, the event is kept and returned by the next `recv()`.

use crate::error::DeliveryError;
use crate::event::Event;
use futures::stream::{self, Stream};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

type Slot<T> = oneshot::Sender<Event<T>>;

/// Identity of a subscription. Two handles are equal iff their ids are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// State shared by both ends of one conduit.
struct Conduit<T> {
    state: Mutex<ConduitState<T>>,
    /// Signalled when a receiver parks or the subscription is dropped.
    parked: Notify,
    /// Concurrent publishes to the same subscriber queue here.
    turn: tokio::sync::Mutex<()>,
}

struct ConduitState<T> {
    /// Slot of the receiver parked in `recv()`, if any.
    waiting: Option<Slot<T>>,
    subscription_dropped: bool,
    producers_dropped: bool,
}

impl<T> Conduit<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(ConduitState {
                waiting: None,
                subscription_dropped: false,
                producers_dropped: false,
            }),
            parked: Notify::new(),
            turn: tokio::sync::Mutex::new(()),
        }
    }

    /// Leave a fresh slot for the next delivery.
    ///
    /// Returns `None` once every producer is gone.
    fn park(&self) -> Option<oneshot::Receiver<Event<T>>> {
        let (slot, delivered) = oneshot::channel();
        {
            let mut state = self.state.lock();
            if state.producers_dropped {
                return None;
            }
            state.waiting = Some(slot);
        }
        self.parked.notify_one();
        Some(delivered)
    }
}

/// Create a connected conduit for `event_name`.
pub(crate) fn channel<T>(event_name: String) -> (DeliveryHandle<T>, Subscription<T>) {
    let id = SubscriptionId::new();
    let conduit = Arc::new(Conduit::new());

    let handle = DeliveryHandle {
        id,
        producer: Arc::new(Producer {
            conduit: Arc::clone(&conduit),
        }),
    };
    let subscription = Subscription {
        id,
        event_name,
        conduit,
        pending: None,
    };
    (handle, subscription)
}

/// Consumer end of a conduit, returned by `EventBus::subscribe`.
///
/// Must be read promptly: a delivery that finds no waiting `recv()` before
/// the strategy timeout counts as failed. Under a retry strategy the same
/// event may arrive more than once.
pub struct Subscription<T> {
    id: SubscriptionId,
    event_name: String,
    conduit: Arc<Conduit<T>>,
    /// Delivered into a `recv()` that was dropped before returning it.
    pending: Option<Event<T>>,
}

impl<T> Subscription<T> {
    /// Identity of this subscription.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Event name this subscription was registered under.
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Wait for the next event.
    ///
    /// Cancel-safe: dropping the future never loses a delivered event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - An event was handed over
    /// - `None` - The bus and every in-flight delivery were dropped
    pub async fn recv(&mut self) -> Option<Event<T>> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }

        let delivered = self.conduit.park()?;
        let mut parked = ParkedRecv {
            delivered,
            pending: &mut self.pending,
        };
        (&mut parked.delivered).await.ok()
    }

    /// Receive events as a stream until the producer side is gone.
    pub fn stream(&mut self) -> impl Stream<Item = Event<T>> + '_ {
        stream::unfold(self, |subscription| async move {
            let event = subscription.recv().await?;
            Some((event, subscription))
        })
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        {
            let mut state = self.conduit.state.lock();
            state.subscription_dropped = true;
            state.waiting = None;
        }
        self.conduit.parked.notify_one();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event_name", &self.event_name)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

/// A `recv()` in progress.
///
/// On drop the slot is closed; an event that was already filled in is
/// moved to `pending`.
struct ParkedRecv<'a, T> {
    delivered: oneshot::Receiver<Event<T>>,
    pending: &'a mut Option<Event<T>>,
}

impl<T> Drop for ParkedRecv<'_, T> {
    fn drop(&mut self) {
        self.delivered.close();
        if let Ok(event) = self.delivered.try_recv() {
            *self.pending = Some(event);
        }
    }
}

/// Keeps the conduit open for the subscriber while any handle clone lives.
struct Producer<T> {
    conduit: Arc<Conduit<T>>,
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        let mut state = self.conduit.state.lock();
        state.producers_dropped = true;
        // Wakes a parked recv() with `None`.
        state.waiting = None;
    }
}

/// Producer end of a conduit, held by the registry.
pub(crate) struct DeliveryHandle<T> {
    id: SubscriptionId,
    producer: Arc<Producer<T>>,
}

impl<T> DeliveryHandle<T> {
    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Hand `event` to the receiver parked in `recv()`.
    ///
    /// Pending until a receiver shows up; callers bound it with a timeout.
    pub(crate) async fn offer(&self, mut event: Event<T>) -> Result<(), DeliveryError> {
        let conduit = &self.producer.conduit;
        let _turn = conduit.turn.lock().await;

        loop {
            let slot = {
                let mut state = conduit.state.lock();
                if state.subscription_dropped {
                    return Err(DeliveryError::Closed);
                }
                state.waiting.take()
            };

            match slot {
                Some(slot) => match slot.send(event) {
                    Ok(()) => return Ok(()),
                    // Receiver abandoned this recv(); wait for the next one.
                    Err(returned) => event = returned,
                },
                None => conduit.parked.notified().await,
            }
        }
    }
}

impl<T> Clone for DeliveryHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T> PartialEq for DeliveryHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> PartialEq<SubscriptionId> for DeliveryHandle<T> {
    fn eq(&self, other: &SubscriptionId) -> bool {
        self.id == *other
    }
}

impl<T> fmt::Debug for DeliveryHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryHandle").field("id", &self.id).finish()
    }
}
