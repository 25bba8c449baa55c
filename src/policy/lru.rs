//! # Least Recently Used (LRU) Cache
//!
//! Recency-ordered cache: every hit moves the entry to the MRU end, and a
//! full cache evicts from the LRU end before admitting a new key.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                           LruCache<K, V>                                 │
//!   │                                                                          │
//!   │   ┌──────────────────────────────────────────────────────────────────┐   │
//!   │   │  index: FxHashMap<K, SlotId>                                     │   │
//!   │   │                                                                  │   │
//!   │   │  ┌─────────┬──────────┐                                          │   │
//!   │   │  │   Key   │  SlotId  │                                          │   │
//!   │   │  ├─────────┼──────────┤                                          │   │
//!   │   │  │  page_1 │  id_1  ──┼──────────┐                               │   │
//!   │   │  │  page_2 │  id_2  ──┼────────┐ │                               │   │
//!   │   │  │  page_3 │  id_3  ──┼──────┐ │ │                               │   │
//!   │   │  └─────────┴──────────┘      │ │ │                               │   │
//!   │   └──────────────────────────────┼─┼─┼───────────────────────────────┘   │
//!   │                                  │ │ │                                   │
//!   │   ┌──────────────────────────────┼─┼─┼───────────────────────────────┐   │
//!   │   │  list: IntrusiveList<Entry<K, V>>                                │   │
//!   │   │                              ▼ ▼ ▼                               │   │
//!   │   │  head ──► [page_1] ◄──► [page_2] ◄──► [page_3] ◄── tail          │   │
//!   │   │            MRU                          LRU                      │   │
//!   │   └──────────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   INSERT new item (cache full, capacity = 3)
//!
//!     head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!
//!   insert(D):
//!     1. Pop [C] from tail, drop it from the index
//!     2. Push [D] at head
//!
//!     head ──► [D] ◄──► [A] ◄──► [B] ◄── tail
//!
//!   GET existing item
//!
//!   get(B):
//!     1. Look up SlotId in index: O(1)
//!     2. move_to_front: O(1)
//!
//!     head ──► [B] ◄──► [D] ◄──► [A] ◄── tail
//! ```
//!
//! ## Methods
//!
//! | Method           | Complexity | Description                               |
//! |------------------|------------|-------------------------------------------|
//! | `new(capacity)`  | O(1)       | Create cache; capacity 0 stores nothing   |
//! | `insert(k, v)`   | O(1)       | Insert or update, may evict LRU           |
//! | `get(&k)`        | O(1)       | Get value, moves to MRU                   |
//! | `get_mut(&k)`    | O(1)       | Mutable get, moves to MRU                 |
//! | `peek(&k)`       | O(1)       | Get value without touching recency        |
//! | `peek_lru()`     | O(1)       | Next eviction candidate                   |
//! | `pop_lru()`      | O(1)       | Remove least recently used                |
//! | `remove(&k)`     | O(1)       | Remove entry by key                       |
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lru::LruCache;
//! use evictkit::traits::CoreCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.insert(1, "a");
//! cache.insert(2, "b");
//! assert_eq!(cache.get(&1), Some(&"a"));
//!
//! cache.insert(3, "c");
//! assert!(!cache.contains(&2));
//! assert_eq!(cache.get(&3), Some(&"c"));
//! ```
//!
//! ## Thread Safety
//!
//! `LruCache` is single-threaded. Wrap it in
//! [`LockedCache`](crate::concurrent::LockedCache) or shard it with
//! [`ShardedCache`](crate::concurrent::ShardedCache) for shared use.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::{CoreCache, MutableCache};

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded LRU cache over an arena-backed recency list.
pub struct LruCache<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 is valid: every insert is a no-op and every get misses.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Returns the value for `key` without changing recency.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value and marks `key` MRU.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            },
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.list.move_to_front(id);
        self.list.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Marks `key` MRU without reading it; returns `false` if absent.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.list.move_to_front(id),
            None => false,
        }
    }

    /// Iterates entries from MRU to LRU.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Verifies the index/list bijection and the capacity bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "lru index has {} keys but list has {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "lru length {} exceeds capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if entry.key == *key => {},
                _ => return Err(InvariantError::new("lru index points at wrong node")),
            }
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.list.len(), self.capacity)
    }
}

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            self.list.move_to_front(id);
            return self
                .list
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.list.len() >= self.capacity {
            if let Some(evicted) = self.list.pop_back() {
                self.index.remove(&evicted.key);
                #[cfg(feature = "metrics")]
                self.metrics.record_evicted_entry();
            }
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        self.get_mut(key).map(|value| &*value)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.list.clear();
        self.index.clear();
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|entry| entry.value)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<K, V> Extend<(K, V)> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
