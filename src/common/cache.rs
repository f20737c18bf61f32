//! Bounded in-memory registry for deployed flows and live sessions.
//!
//! Uses moka's concurrent cache implementation.

use moka::sync::Cache;

/// Thread-safe keyed registry with a fixed capacity.
///
/// Used by the engine for:
/// - Compiled flows (`MemCache<String, Arc<Flow>>`)
/// - Live sessions (`MemCache<SessionId, SessionHandle>`)
///
/// When the capacity is exceeded the least recently used entry is evicted,
/// which for sessions is the same as the participant abandoning the run.
#[derive(Clone)]
pub struct MemCache<K, V> {
    entries: Cache<K, V>,
}

impl<K, V> MemCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Allocate a new [`MemCache`].
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Cache::new(capacity as u64),
        }
    }

    pub fn set(
        &self,
        key: K,
        value: V,
    ) {
        self.entries.insert(key, value);
    }

    pub fn get(
        &self,
        key: &K,
    ) -> Option<V> {
        self.entries.get(key)
    }

    /// Remove an entry, returning it if it was present.
    pub fn remove(
        &self,
        key: &K,
    ) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn contains(
        &self,
        key: &K,
    ) -> bool {
        self.entries.contains_key(key)
    }
}
