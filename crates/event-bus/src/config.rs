//! Bus configuration from environment variables.
//!
//! # Example
//!
//! ```ignore
//! use event_bus::{BusConfig, LoggingStrategy};
//!
//! let config = BusConfig::from_env().with_max_retries(5);
//! config.validate()?;
//! let strategy = LoggingStrategy::tracing(config.delivery_timeout);
//! ```

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

/// Default per-delivery timeout.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Default retry budget for `RetryStrategy`.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound accepted by `validate`.
pub const MAX_DELIVERY_TIMEOUT: Duration = Duration::from_secs(3600);

/// Upper bound accepted by `validate`.
pub const MAX_RETRIES: u32 = 1000;

/// Settings the built-in strategies are constructed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// How long a delivery may wait for its subscriber
    pub delivery_timeout: Duration,

    /// Retry budget for `RetryStrategy`
    pub max_retries: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl BusConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EVENT_BUS_TIMEOUT_MS`: Delivery timeout in milliseconds (default: 1000)
    /// - `EVENT_BUS_MAX_RETRIES`: Retry budget (default: 3)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            delivery_timeout: env::var("EVENT_BUS_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.delivery_timeout),

            max_retries: env::var("EVENT_BUS_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    /// Validate bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery_timeout > MAX_DELIVERY_TIMEOUT {
            return Err(ConfigError::TimeoutTooLarge {
                timeout: self.delivery_timeout,
                max: MAX_DELIVERY_TIMEOUT,
            });
        }

        if self.max_retries > MAX_RETRIES {
            return Err(ConfigError::TooManyRetries {
                retries: self.max_retries,
                max: MAX_RETRIES,
            });
        }

        Ok(())
    }

    /// Builder-style method to set the delivery timeout
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Builder-style method to set the retry budget
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}
