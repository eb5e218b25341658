//! Bucketed LFU Cache Module
//!
//! LFU cache with constant time eviction. Keys are grouped into buckets by
//! frequency, each bucket ordered by when its keys entered it, and the lowest
//! non-empty frequency is tracked so the victim is found without a scan.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use lru::LruCache as AccessOrderedMap;
use tracing::{debug, trace};

use crate::cache::{check_capacity, BoundedCache, CacheStats};
use crate::error::Result;

/// Keys sharing one frequency, oldest arrival first out.
type Bucket<K> = AccessOrderedMap<K, ()>;

#[derive(Debug)]
struct Slot<V> {
    value: V,
    frequency: u64,
}

// == Bucketed LFU Cache ==
/// Bounded LFU cache with O(1) `get`, `put` and eviction.
///
/// Frequency semantics match [`LfuCache`](crate::cache::LfuCache): 1 on
/// `put`, +1 per hit. Ties at the minimum frequency go to the key that
/// reached that frequency first, which is not necessarily the key inserted
/// first.
pub struct BucketedLfuCache<K, V> {
    entries: HashMap<K, Slot<V>>,
    buckets: HashMap<u64, Bucket<K>>,
    /// Lowest frequency with a non-empty bucket
    min_frequency: u64,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> BucketedLfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = check_capacity(capacity)?;
        debug!(capacity, "creating bucketed lfu cache");

        Ok(Self {
            entries: HashMap::with_capacity(capacity),
            buckets: HashMap::new(),
            min_frequency: 1,
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Returns the value for `key` without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Returns true if `key` is resident, without counting an access.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Current access count for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|slot| slot.frequency)
    }

    /// Returns the next eviction candidate and its frequency.
    pub fn peek_lfu(&self) -> Option<(&K, u64)> {
        let bucket = self.buckets.get(&self.min_frequency)?;
        bucket.peek_lru().map(|(key, _)| (key, self.min_frequency))
    }

    // == Bucket Helpers ==
    /// Takes `key` out of the bucket for `frequency`, dropping the bucket once empty.
    fn take_from_bucket(&mut self, key: &K, frequency: u64) -> K {
        let Some(bucket) = self.buckets.get_mut(&frequency) else {
            unreachable!("lfu bucket {frequency} missing for a resident key");
        };
        let Some((owned, ())) = bucket.pop_entry(key) else {
            unreachable!("lfu key absent from the bucket of its frequency");
        };
        if bucket.is_empty() {
            self.buckets.remove(&frequency);
        }
        owned
    }

    fn add_to_bucket(&mut self, key: K, frequency: u64) {
        self.buckets
            .entry(frequency)
            .or_insert_with(Bucket::unbounded)
            .put(key, ());
    }

    fn evict_least_frequent(&mut self) {
        let frequency = self.min_frequency;
        let Some(bucket) = self.buckets.get_mut(&frequency) else {
            unreachable!("lfu minimum frequency {frequency} has no bucket");
        };
        let Some((key, ())) = bucket.pop_lru() else {
            unreachable!("lfu retained an empty bucket");
        };
        if bucket.is_empty() {
            self.buckets.remove(&frequency);
        }
        if self.entries.remove(&key).is_none() {
            unreachable!("lfu bucket held a key missing from the entry map");
        }

        self.stats.record_eviction();
        debug!(
            capacity = self.capacity,
            frequency, "evicted least frequently used entry"
        );
    }
}

impl<K, V> fmt::Debug for BucketedLfuCache<K, V>
where
    K: Hash + Eq + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketedLfuCache")
            .field("entries", &self.entries)
            .field("buckets", &self.buckets.len())
            .field("min_frequency", &self.min_frequency)
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<K, V> BoundedCache<K, V> for BucketedLfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let from = match self.entries.get_mut(key) {
            Some(slot) => {
                slot.frequency += 1;
                slot.frequency - 1
            }
            None => {
                self.stats.record_miss();
                trace!("bucketed lfu miss");
                return None;
            }
        };

        self.stats.record_hit();
        let owned = self.take_from_bucket(key, from);
        self.add_to_bucket(owned, from + 1);
        if from == self.min_frequency && !self.buckets.contains_key(&from) {
            self.min_frequency = from + 1;
        }

        self.peek(key)
    }

    fn put(&mut self, key: K, value: V) {
        if let Some(slot) = self.entries.get_mut(&key) {
            let from = slot.frequency;
            slot.value = value;
            slot.frequency = 1;

            let owned = self.take_from_bucket(&key, from);
            self.add_to_bucket(owned, 1);
            self.min_frequency = 1;
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_least_frequent();
        }

        self.entries.insert(
            key.clone(),
            Slot {
                value,
                frequency: 1,
            },
        );
        self.add_to_bucket(key, 1);
        self.min_frequency = 1;
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }
}
