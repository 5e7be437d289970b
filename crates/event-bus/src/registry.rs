//! # Subscriber Registry
//!
//! Concurrent multimap from a key to an ordered sequence of values.
//!
//! ## Locking
//!
//! - One map-wide `RwLock`: readers share it, writers are fully serialized.
//! - Locks are held only for the snapshot copy or the membership change,
//!   never across delivery I/O.
//! - `get` returns an owned copy, so later mutations are never observed
//!   through a previously returned snapshot.

use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Thread-safe mapping of key to an ordered `Vec` of values.
///
/// Duplicate values are allowed; `remove_at` removes one occurrence at a time.
/// Removing the last value for a key deletes the key, so "found" always means
/// "at least one value".
#[derive(Debug)]
pub struct SubscriberRegistry<K, V> {
    items: RwLock<HashMap<K, Vec<V>>>,
}

impl<K, V> SubscriberRegistry<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of the values mapped to `key`, or `None` if there are none.
    pub fn get<Q>(&self, key: &Q) -> Option<Vec<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let items = self.items.read();
        items.get(key).cloned()
    }

    /// Append `value` to the end of the sequence for `key`, creating it if absent.
    pub fn append_at(&self, key: K, value: V) {
        let mut items = self.items.write();
        items.entry(key).or_default().push(value);
    }

    /// Remove the first value equal to `value` from the sequence for `key`.
    ///
    /// No-op if the key or the value is absent. Returns whether a value was removed.
    pub fn remove_at<Q, R>(&self, key: &Q, value: &R) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq<R>,
        R: ?Sized,
    {
        let mut items = self.items.write();
        let Some(values) = items.get_mut(key) else {
            return false;
        };
        let Some(index) = values.iter().position(|v| v == value) else {
            return false;
        };

        values.remove(index);
        if values.is_empty() {
            items.remove(key);
        }
        true
    }
}

impl<K, V> Default for SubscriberRegistry<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
