//! Error types for the event bus.
//!
//! Delivery failures never surface from `publish`; they are reported to the
//! backoff strategy and recorded in metrics. `DeliveryError` names the cause.

use std::time::Duration;
use thiserror::Error;

/// Why a single delivery attempt failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The subscriber was not receiving before the strategy timeout elapsed.
    #[error("Delivery timed out after {0:?}")]
    TimedOut(Duration),

    /// The subscription was dropped by its owner.
    #[error("Subscription closed")]
    Closed,
}

/// Configuration validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Delivery timeout too large: {timeout:?} > {max:?}")]
    TimeoutTooLarge { timeout: Duration, max: Duration },

    #[error("Too many retries: {retries} > {max}")]
    TooManyRetries { retries: u32, max: u32 },
}
