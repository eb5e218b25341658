//! Ordered LRU Cache Module
//!
//! LRU cache over an access-ordered map: every touch moves the entry to the
//! fresh end, so the structurally oldest entry is always the eviction target.

use std::fmt;
use std::hash::Hash;

use lru::LruCache as AccessOrderedMap;
use tracing::{debug, trace};

use crate::cache::{check_capacity, BoundedCache, CacheStats};
use crate::error::Result;

// == Ordered LRU Cache ==
/// Bounded LRU cache that delegates ordering to an access-ordered map.
///
/// The map itself is unbounded; this type enforces the capacity and performs
/// the eviction after each insert.
pub struct OrderedLruCache<K, V> {
    map: AccessOrderedMap<K, V>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> OrderedLruCache<K, V>
where
    K: Hash + Eq,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = check_capacity(capacity)?;
        debug!(capacity, "creating ordered lru cache");

        Ok(Self {
            map: AccessOrderedMap::unbounded(),
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Returns the value for `key` without refreshing it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.peek(key)
    }

    /// Returns true if `key` is resident, without refreshing it.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains(key)
    }

    /// Returns the entry that the next overflowing `put` would evict.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.map.peek_lru()
    }

    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.map.iter().map(|(key, _)| key)
    }

    // == Evict Oldest ==
    fn evict_overflow(&mut self) {
        if self.map.len() > self.capacity && self.map.pop_lru().is_some() {
            self.stats.record_eviction();
            debug!(capacity = self.capacity, "evicted eldest entry");
        }
    }
}

impl<K, V> fmt::Debug for OrderedLruCache<K, V>
where
    K: Hash + Eq,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedLruCache")
            .field("len", &self.map.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<K, V> BoundedCache<K, V> for OrderedLruCache<K, V>
where
    K: Hash + Eq,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let value = self.map.get(key);
        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
            trace!("ordered lru miss");
        }
        value
    }

    fn put(&mut self, key: K, value: V) {
        self.map.put(key, value);
        self.evict_overflow();
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.map.len())
    }
}
