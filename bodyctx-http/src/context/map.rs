use super::{Key, Value};
use ahash::HashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Shared handle to the key-value mapping of a request context.
///
/// Cloning a [`ContextMap`] clones the handle: all clones alias
/// the same mapping, and mutations through any of them are visible
/// through all of them. Each individual operation is atomic,
/// a sequence of operations is not.
#[derive(Clone, Default)]
pub struct ContextMap(Arc<Mutex<HashMap<Key, Value>>>);

impl ContextMap {
    /// Create a new empty [`ContextMap`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the value previously stored for the key.
    pub fn insert(&self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.0.lock().insert(key.into(), value.into())
    }

    /// Insert a value only when no value is stored for the key yet.
    ///
    /// Returns true if the value was inserted.
    pub fn insert_if_absent(&self, key: impl Into<Key>, value: impl Into<Value>) -> bool {
        let mut map = self.0.lock();
        let key = key.into();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value.into());
        true
    }

    /// Get the value stored for the key, `None` if the key is absent.
    ///
    /// A stored [`Value::NULL`] is returned as `Some(Value::NULL)`.
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Option<Value> {
        let key: Key = key.into();
        self.0.lock().get(&key).cloned()
    }

    /// Returns true if a value, possibly [`Value::NULL`], is stored for the key.
    #[must_use]
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        let key: Key = key.into();
        self.0.lock().contains_key(&key)
    }

    /// Remove the value stored for the key, returning it if there was one.
    pub fn remove(&self, key: impl Into<Key>) -> Option<Value> {
        let key: Key = key.into();
        self.0.lock().remove(&key)
    }

    /// Number of entries in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if the mapping holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Snapshot of the keys currently stored, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.0.lock().keys().cloned().collect()
    }

    /// Snapshot of the entries currently stored, in no particular order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.0
            .lock()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Returns true if both handles alias the same mapping.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ContextMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}
