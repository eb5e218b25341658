//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check every engine against the bounded cache contract
//! and the LFU engines against simple reference models.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::{
    build_cache, BoundedCache, BucketedLfuCache, CachePolicy, LfuCache, LruCache,
    OrderedLruCache,
};

// == Strategies ==
/// Small key space so sequences revisit keys often
fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..16
}

fn value_strategy() -> impl Strategy<Value = u32> {
    any::<u32>()
}

fn capacity_strategy() -> impl Strategy<Value = usize> {
    1usize..8
}

fn policy_strategy() -> impl Strategy<Value = CachePolicy> {
    prop::sample::select(CachePolicy::ALL.to_vec())
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: u8, value: u32 },
    Get { key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<CacheOp>> {
    prop::collection::vec(cache_op_strategy(), 0..120)
}

fn apply(cache: &mut dyn BoundedCache<u8, u32>, ops: &[CacheOp]) {
    for op in ops {
        match *op {
            CacheOp::Put { key, value } => cache.put(key, value),
            CacheOp::Get { key } => {
                cache.get(&key);
            }
        }
    }
}

// == Reference Models ==
/// Scan LFU model: insertion ordered, first minimum evicted.
#[derive(Debug, Default)]
struct ScanLfuModel {
    entries: Vec<(u8, u32, u64)>,
}

impl ScanLfuModel {
    fn get(&mut self, key: u8) -> Option<u32> {
        let entry = self.entries.iter_mut().find(|(k, _, _)| *k == key)?;
        entry.2 += 1;
        Some(entry.1)
    }

    fn put(&mut self, key: u8, value: u32, capacity: usize) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _, _)| *k == key) {
            entry.1 = value;
            entry.2 = 1;
            return;
        }
        if self.entries.len() >= capacity {
            let mut victim = 0;
            for (pos, entry) in self.entries.iter().enumerate() {
                if entry.2 < self.entries[victim].2 {
                    victim = pos;
                }
            }
            self.entries.remove(victim);
        }
        self.entries.push((key, value, 1));
    }
}

/// Bucketed LFU model: ties broken by the earliest arrival at the current frequency.
#[derive(Debug, Default)]
struct BucketLfuModel {
    entries: Vec<(u8, u32, u64, u64)>,
    clock: u64,
}

impl BucketLfuModel {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let stamp = self.tick();
        let entry = self.entries.iter_mut().find(|e| e.0 == key)?;
        entry.2 += 1;
        entry.3 = stamp;
        Some(entry.1)
    }

    fn put(&mut self, key: u8, value: u32, capacity: usize) {
        let stamp = self.tick();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.0 == key) {
            entry.1 = value;
            entry.2 = 1;
            entry.3 = stamp;
            return;
        }
        if self.entries.len() >= capacity {
            if let Some(victim) = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| (e.2, e.3))
                .map(|(pos, _)| pos)
            {
                self.entries.remove(victim);
            }
        }
        self.entries.push((key, value, 1, stamp));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of operations, the resident count never exceeds capacity.
    #[test]
    fn prop_capacity_enforcement(
        policy in policy_strategy(),
        capacity in capacity_strategy(),
        ops in ops_strategy()
    ) {
        let mut cache = build_cache::<u8, u32>(policy, capacity).unwrap();

        for op in ops {
            apply(cache.as_mut(), std::slice::from_ref(&op));
            prop_assert!(
                cache.len() <= capacity,
                "{} cache size {} exceeds capacity {}",
                policy,
                cache.len(),
                capacity
            );
        }
    }

    // A put followed immediately by a get returns the stored value, whatever came before.
    #[test]
    fn prop_put_then_get(
        policy in policy_strategy(),
        capacity in capacity_strategy(),
        ops in ops_strategy(),
        key in key_strategy(),
        value in value_strategy()
    ) {
        let mut cache = build_cache::<u8, u32>(policy, capacity).unwrap();
        apply(cache.as_mut(), &ops);

        cache.put(key, value);
        prop_assert_eq!(cache.get(&key), Some(&value));
    }

    // Writing the same key twice keeps one entry holding the second value.
    #[test]
    fn prop_overwrite_semantics(
        policy in policy_strategy(),
        capacity in capacity_strategy(),
        ops in ops_strategy(),
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut cache = build_cache::<u8, u32>(policy, capacity).unwrap();
        apply(cache.as_mut(), &ops);

        cache.put(key, value1);
        let len = cache.len();
        cache.put(key, value2);

        prop_assert_eq!(cache.len(), len, "Overwrite changed the resident count");
        prop_assert_eq!(cache.get(&key), Some(&value2));
    }

    // Every lookup is counted exactly once as a hit or a miss.
    #[test]
    fn prop_statistics_accuracy(
        policy in policy_strategy(),
        capacity in capacity_strategy(),
        ops in ops_strategy()
    ) {
        let mut cache = build_cache::<u8, u32>(policy, capacity).unwrap();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => cache.put(key, value),
                CacheOp::Get { key } => match cache.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, cache.len(), "Total entries mismatch");
    }

    // Both LRU engines make identical eviction decisions.
    #[test]
    fn prop_lru_engines_agree(capacity in capacity_strategy(), ops in ops_strategy()) {
        let mut linked = LruCache::new(capacity).unwrap();
        let mut ordered = OrderedLruCache::new(capacity).unwrap();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    linked.put(key, value);
                    ordered.put(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(linked.get(&key), ordered.get(&key));
                }
            }
            prop_assert_eq!(
                linked.keys().collect::<Vec<_>>(),
                ordered.keys().collect::<Vec<_>>()
            );
        }
        prop_assert_eq!(linked.stats(), ordered.stats());
    }

    // The scan LFU engine matches the reference model step for step.
    #[test]
    fn prop_lfu_matches_model(capacity in capacity_strategy(), ops in ops_strategy()) {
        let mut cache = LfuCache::new(capacity).unwrap();
        let mut model = ScanLfuModel::default();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(key, value);
                    model.put(key, value, capacity);
                    prop_assert_eq!(cache.frequency(&key), Some(1));
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key).copied(), model.get(key));
                }
            }
        }
        for (key, value, frequency) in &model.entries {
            prop_assert_eq!(cache.peek(key), Some(value));
            prop_assert_eq!(cache.frequency(key), Some(*frequency));
        }
        prop_assert_eq!(cache.len(), model.entries.len());
    }

    // The bucketed LFU engine matches its reference model step for step.
    #[test]
    fn prop_bucketed_lfu_matches_model(capacity in capacity_strategy(), ops in ops_strategy()) {
        let mut cache = BucketedLfuCache::new(capacity).unwrap();
        let mut model = BucketLfuModel::default();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(key, value);
                    model.put(key, value, capacity);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key).copied(), model.get(key));
                }
            }
        }
        for (key, value, frequency, _) in &model.entries {
            prop_assert_eq!(cache.peek(key), Some(value));
            prop_assert_eq!(cache.frequency(key), Some(*frequency));
        }
        prop_assert_eq!(cache.len(), model.entries.len());
    }
}

// Property tests for LRU eviction behavior
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Filling to capacity and adding one more key evicts the first key inserted.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::vec(key_strategy(), 2..10),
        new_key in key_strategy(),
        ordered in any::<bool>()
    ) {
        let mut seen = HashSet::new();
        let unique_keys: Vec<u8> = initial_keys
            .into_iter()
            .filter(|key| seen.insert(*key))
            .collect();

        prop_assume!(unique_keys.len() >= 2);
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let policy = if ordered { CachePolicy::OrderedLru } else { CachePolicy::Lru };
        let mut cache = build_cache::<u8, u32>(policy, capacity).unwrap();

        for key in &unique_keys {
            cache.put(*key, u32::from(*key));
        }
        prop_assert_eq!(cache.len(), capacity, "Cache should be at capacity");

        cache.put(new_key, 0);
        prop_assert_eq!(cache.len(), capacity, "Cache should remain at capacity");

        let oldest_key = unique_keys[0];
        prop_assert!(cache.get(&oldest_key).is_none(), "Oldest key {} should have been evicted", oldest_key);
        prop_assert!(cache.get(&new_key).is_some());
        for key in unique_keys.iter().skip(1) {
            prop_assert!(cache.get(key).is_some(), "Key {} should still exist", key);
        }
    }

    // A get on the eviction candidate protects it; the next oldest key goes instead.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::vec(key_strategy(), 3..10),
        new_key in key_strategy(),
        repeats in 1usize..5
    ) {
        let mut seen = HashSet::new();
        let unique_keys: Vec<u8> = keys
            .into_iter()
            .filter(|key| seen.insert(*key))
            .collect();

        prop_assume!(unique_keys.len() >= 3);
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let mut cache = LruCache::new(capacity).unwrap();
        for key in &unique_keys {
            cache.put(*key, u32::from(*key));
        }

        let accessed_key = unique_keys[0];
        let accessed_value = u32::from(accessed_key);
        for _ in 0..repeats {
            prop_assert_eq!(cache.get(&accessed_key), Some(&accessed_value));
        }
        prop_assert_eq!(cache.stats().evictions, 0);

        cache.put(new_key, 0);

        prop_assert!(cache.contains(&accessed_key), "Accessed key should not be evicted");
        prop_assert!(!cache.contains(&unique_keys[1]), "Second oldest key should be evicted");
        prop_assert_eq!(cache.keys().next(), Some(&new_key));
    }
}
