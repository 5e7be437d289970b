//! # Event Bus - In-Process Publish/Subscribe
//!
//! Publishers emit named events; subscribers register interest in an event
//! name and receive a private, unbuffered delivery conduit.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────┐   on_delivery_failure   ┌──────────────────┐
//! │        EventBus<T>       │ ──────────────────────▶ │ BackoffStrategy  │
//! │ subscribe / unsubscribe  │                         │  LoggingStrategy │
//! │ publish (fan-out tasks)  │ ◀────── republish ───── │  RetryStrategy   │
//! └────────────┬─────────────┘                         └──────────────────┘
//!              │ snapshot / append / remove
//!              ▼
//! ┌──────────────────────────┐
//! │   SubscriberRegistry     │  name -> [DeliveryHandle], map-wide RwLock
//! └──────────────────────────┘
//! ```
//!
//! ## Delivery Semantics
//!
//! - At most once per subscriber per publish, best effort, local only.
//! - A delivery completes only while the subscriber is inside `recv()`.
//! - Each delivery is bounded by `strategy.timeout()`; a slow subscriber
//!   never blocks the publisher or its siblings.
//! - Failures are reported to the strategy, never returned from `publish`.
//!
//! ## Example
//!
//! ```ignore
//! use event_bus::{Event, EventBus, LoggingStrategy};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let bus = EventBus::new();
//! let mut sub = bus.subscribe("SomeEvent");
//!
//! let strategy = Arc::new(LoggingStrategy::tracing(Duration::from_secs(1)));
//! bus.publish(Event::new("SomeEvent", "SomeDetails"), strategy);
//!
//! let event = sub.recv().await;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod publisher;
pub mod registry;
pub mod strategy;
pub mod subscriber;

// Re-export main types
pub use config::BusConfig;
pub use error::{ConfigError, DeliveryError};
pub use event::Event;
pub use metrics::{BusMetrics, MetricsSnapshot};
pub use publisher::{Dispatch, DispatchReport, EventBus, Publisher};
pub use registry::SubscriberRegistry;
pub use strategy::{
    BackoffStrategy, FailureLogger, LoggingStrategy, RetryStrategy, TracingLogger,
    FAILURE_MESSAGE,
};
pub use subscriber::{Subscription, SubscriptionId};
