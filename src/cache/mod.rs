//! Cache Module
//!
//! Bounded in-memory caches with LRU and LFU eviction behind one contract.

mod bucketed_lfu;
mod lfu;
mod lru;
mod ordered_lru;
mod policy;
mod stats;

#[cfg(test)]
mod property_tests;

use std::hash::Hash;

use crate::error::{CacheError, Result};

// Re-export public types
pub use bucketed_lfu::BucketedLfuCache;
pub use lfu::LfuCache;
pub use lru::LruCache;
pub use ordered_lru::OrderedLruCache;
pub use policy::CachePolicy;
pub use stats::CacheStats;

// == Bounded Cache Contract ==
/// A fixed-capacity key-value store that evicts one entry per overflowing `put`.
///
/// A miss is reported as `None`. Lookups take `&mut self` because every engine
/// updates its recency or frequency bookkeeping on a hit.
pub trait BoundedCache<K, V> {
    /// Returns the value for `key`, recording the access with the eviction policy.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Inserts or overwrites `key`, evicting one entry if capacity is exceeded.
    fn put(&mut self, key: K, value: V);

    /// Number of resident entries.
    fn len(&self) -> usize;

    /// Maximum number of resident entries.
    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit, miss and eviction counters with the current entry count.
    fn stats(&self) -> CacheStats;
}

// == Factory ==
/// Builds the engine selected by `policy` as a trait object.
pub fn build_cache<K, V>(policy: CachePolicy, capacity: usize) -> Result<Box<dyn BoundedCache<K, V>>>
where
    K: Hash + Eq + Clone + 'static,
    V: 'static,
{
    let cache: Box<dyn BoundedCache<K, V>> = match policy {
        CachePolicy::Lru => Box::new(LruCache::new(capacity)?),
        CachePolicy::OrderedLru => Box::new(OrderedLruCache::new(capacity)?),
        CachePolicy::Lfu => Box::new(LfuCache::new(capacity)?),
        CachePolicy::BucketedLfu => Box::new(BucketedLfuCache::new(capacity)?),
    };
    Ok(cache)
}

/// Rejects a zero capacity.
pub(crate) fn check_capacity(capacity: usize) -> Result<usize> {
    if capacity == 0 {
        return Err(CacheError::InvalidCapacity(capacity));
    }
    Ok(capacity)
}
