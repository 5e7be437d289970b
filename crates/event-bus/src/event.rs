//! # Events
//!
//! The value routed through the bus: a name used as the routing key and an
//! opaque payload. Events are cloned into every delivery attempt and never
//! mutated after construction.

use serde::{Deserialize, Serialize};

/// A named event carrying a payload of type `T`.
///
/// Equality is structural over both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event<T> {
    /// Routing key.
    pub name: String,
    /// Payload.
    pub details: T,
}

impl<T> Event<T> {
    /// Create a new event.
    pub fn new(name: impl Into<String>, details: T) -> Self {
        Self {
            name: name.into(),
            details,
        }
    }

    /// Routing key of this event.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
