//! LRU Cache Module
//!
//! Least Recently Used cache built from a hash index and a doubly linked list.
//!
//! Nodes live in a slab and link to each other by index, so `prev`/`next`
//! never form ownership cycles. Slots freed by eviction go on a free list and
//! are reused by the next insertion. The list is strictly linear: the head has
//! no `prev`, the tail has no `next`, and an empty list has neither.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::cache::{check_capacity, BoundedCache, CacheStats};
use crate::error::Result;

// == Node ==
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Bounded cache evicting the least recently used entry.
///
/// `get`, `put` and eviction are all O(1).
///
/// # Example
/// ```
/// use evict_cache::cache::{BoundedCache, LruCache};
///
/// let mut cache = LruCache::new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");
/// cache.put("c", 3);
///
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some(&1));
/// ```
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Key to slab index
    index: HashMap<K, usize>,
    /// Node storage, `None` marks a free slot
    slab: Vec<Option<Node<K, V>>>,
    /// Reclaimed slab slots
    free: Vec<usize>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// Fails with [`CacheError::InvalidCapacity`](crate::error::CacheError) when
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = check_capacity(capacity)?;
        debug!(capacity, "creating lru cache");

        Ok(Self {
            index: HashMap::with_capacity(capacity),
            slab: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            capacity,
            stats: CacheStats::new(),
        })
    }

    // == Peek ==
    /// Returns the value for `key` without changing its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.node(idx).value)
    }

    /// Returns true if `key` is resident, without promoting it.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    // == Peek LRU ==
    /// Returns the entry that the next overflowing `put` would evict.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.tail.map(|idx| {
            let node = self.node(idx);
            (&node.key, &node.value)
        })
    }

    // == Keys ==
    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?);
            cursor = node.next;
            Some(&node.key)
        })
    }

    // == Pop LRU ==
    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        self.detach(idx);

        let node = match self.slab[idx].take() {
            Some(node) => node,
            None => unreachable!("lru tail {idx} points at a vacant slot"),
        };
        self.free.push(idx);
        self.index.remove(&node.key);

        Some((node.key, node.value))
    }

    // == List Helpers ==
    fn node(&self, idx: usize) -> &Node<K, V> {
        match self.slab[idx].as_ref() {
            Some(node) => node,
            None => unreachable!("lru index {idx} points at a vacant slot"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        match self.slab[idx].as_mut() {
            Some(node) => node,
            None => unreachable!("lru index {idx} points at a vacant slot"),
        }
    }

    /// Unlinks a node, leaving its own links cleared.
    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node_mut(idx);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Links a detached node in as the new head.
    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(h) => self.node_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn promote(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.detach(idx);
            self.push_front(idx);
        }
    }

    fn allocate(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slab[idx] = Some(node);
                idx
            }
            None => {
                self.slab.push(Some(node));
                self.slab.len() - 1
            }
        }
    }

    /// Walks the list both ways and checks it against the index.
    #[cfg(test)]
    fn assert_invariants(&self) {
        let forward: Vec<usize> = {
            let mut out = Vec::new();
            let mut cursor = self.head;
            while let Some(idx) = cursor {
                assert!(out.len() <= self.index.len(), "cycle in forward links");
                out.push(idx);
                cursor = self.node(idx).next;
            }
            out
        };
        let mut backward: Vec<usize> = {
            let mut out = Vec::new();
            let mut cursor = self.tail;
            while let Some(idx) = cursor {
                assert!(out.len() <= self.index.len(), "cycle in backward links");
                out.push(idx);
                cursor = self.node(idx).prev;
            }
            out
        };
        backward.reverse();

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), self.index.len());
        assert!(self.index.len() <= self.capacity);
        for (key, &idx) in &self.index {
            assert!(forward.contains(&idx));
            assert!(self.node(idx).key == *key);
        }
        assert_eq!(self.head.is_none(), self.tail.is_none());
    }
}

impl<K, V> BoundedCache<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            trace!("lru miss");
            return None;
        };

        self.stats.record_hit();
        self.promote(idx);
        Some(&self.node(idx).value)
    }

    fn put(&mut self, key: K, value: V) {
        // Overwrite in place, no second node for the same key
        if let Some(&idx) = self.index.get(&key) {
            self.node_mut(idx).value = value;
            self.promote(idx);
            return;
        }

        if self.index.len() >= self.capacity && self.pop_lru().is_some() {
            self.stats.record_eviction();
            debug!(capacity = self.capacity, "evicted least recently used entry");
        }

        let idx = self.allocate(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.index.insert(key, idx);
        self.push_front(idx);
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.index.len())
    }
}
