//! LFU Cache Module
//!
//! Least Frequently Used cache with a value map and a parallel frequency map.
//!
//! Frequencies start at 1 on `put`, grow by 1 on every hit, and go back to 1
//! when a resident key is written again. Eviction scans every frequency for
//! the minimum, so it costs O(n); lookups and writes are O(1).
//! [`BucketedLfuCache`](crate::cache::BucketedLfuCache) trades this scan for
//! frequency buckets.

use std::hash::Hash;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::cache::{check_capacity, BoundedCache, CacheStats};
use crate::error::Result;

// == LFU Cache ==
/// Bounded cache evicting the least frequently used entry.
///
/// Both maps keep insertion order, and an overwrite keeps a key's original
/// position. Among entries sharing the minimum frequency, the one inserted
/// earliest is evicted.
#[derive(Debug)]
pub struct LfuCache<K, V> {
    values: IndexMap<K, V>,
    frequencies: IndexMap<K, u64>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> LfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = check_capacity(capacity)?;
        debug!(capacity, "creating lfu cache");

        Ok(Self {
            values: IndexMap::with_capacity(capacity),
            frequencies: IndexMap::with_capacity(capacity),
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Returns the value for `key` without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    /// Returns true if `key` is resident, without counting an access.
    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Current access count for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.frequencies.get(key).copied()
    }

    // == Peek LFU ==
    /// Returns the next eviction candidate and its frequency.
    pub fn peek_lfu(&self) -> Option<(&K, u64)> {
        self.least_frequent().map(|pos| {
            let (key, &frequency) = self.frequency_at(pos);
            (key, frequency)
        })
    }

    // == Evict ==
    /// Removes the entry with the lowest frequency, earliest inserted on ties.
    fn evict_least_frequent(&mut self) -> Option<(K, V)> {
        let pos = self.least_frequent()?;
        let Some((key, frequency)) = self.frequencies.shift_remove_index(pos) else {
            unreachable!("lfu scan returned out of range position {pos}");
        };
        let Some(value) = self.values.shift_remove(&key) else {
            unreachable!("lfu frequency map holds a key missing from the value map");
        };

        self.stats.record_eviction();
        debug!(
            capacity = self.capacity,
            frequency, "evicted least frequently used entry"
        );
        Some((key, value))
    }

    /// Position of the first minimum frequency in insertion order.
    fn least_frequent(&self) -> Option<usize> {
        self.frequencies
            .values()
            .enumerate()
            .min_by_key(|(_, &frequency)| frequency)
            .map(|(pos, _)| pos)
    }

    fn frequency_at(&self, pos: usize) -> (&K, &u64) {
        match self.frequencies.get_index(pos) {
            Some(entry) => entry,
            None => unreachable!("lfu position {pos} out of range"),
        }
    }
}

impl<K, V> BoundedCache<K, V> for LfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        match self.frequencies.get_mut(key) {
            Some(frequency) => *frequency += 1,
            None => {
                self.stats.record_miss();
                trace!("lfu miss");
                return None;
            }
        }

        self.stats.record_hit();
        match self.values.get(key) {
            Some(value) => Some(value),
            None => unreachable!("lfu value map lost a key present in the frequency map"),
        }
    }

    fn put(&mut self, key: K, value: V) {
        // The written entry is never its own eviction candidate
        if !self.values.contains_key(&key) && self.values.len() >= self.capacity {
            self.evict_least_frequent();
        }

        self.frequencies.insert(key.clone(), 1);
        self.values.insert(key, value);
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.values.len())
    }
}
