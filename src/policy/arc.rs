//! Adaptive Replacement Cache (ARC).
//!
//! Balances recency against frequency by keeping two resident lists and two
//! ghost lists, and steering a target size `p` for the recency side from the
//! ghost hits it observes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                           ArcCache<K, V> Layout                             │
//! │                                                                             │
//! │   index: FxHashMap<K, (Segment, SlotId)>                                    │
//! │   ┌──────────┬──────────────┐                                               │
//! │   │  "page1" │ (T1, id_0)   │                                               │
//! │   │  "page2" │ (T2, id_3)   │                                               │
//! │   └──────────┴──────────────┘                                               │
//! │                                                                             │
//! │   T1: IntrusiveList<Entry>  seen once         T2: IntrusiveList<Entry>      │
//! │   ┌─────────────────────────┐                 ┌─────────────────────────┐   │
//! │   │ MRU ──► [..] ◄──► [..]  │                 │ MRU ──► [..] ◄──► [..]  │   │
//! │   └────────────────┬────────┘                 └────────────────┬────────┘   │
//! │                    │ replace                                   │ replace    │
//! │                    ▼                                           ▼            │
//! │   B1: GhostList<K> (keys only, ≤ C)           B2: GhostList<K> (keys, ≤ C)  │
//! │                                                                             │
//! │   p ∈ [0, C]: target size of T1                                             │
//! │     insert hitting B1 → p grows   (recency is paying off)                   │
//! │     insert hitting B2 → p shrinks (frequency is paying off)                 │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Flows
//!
//! ```text
//!   get(k) resident in T1 or T2   → move to MRU of T2, return value
//!   get(k) ghost or absent        → miss, nothing changes
//!
//!   insert(k) resident            → replace value, move to MRU of T2
//!   insert(k) in B1               → p += max(1, |B2|/|B1|), drop ghost,
//!                                   replace if full, admit to T2
//!   insert(k) in B2               → p -= max(1, |B1|/|B2|), drop ghost,
//!                                   replace if full, admit to T2
//!   insert(k) new
//!     |T1| + |B1| >= C:
//!        |T1| < C  → drop B1 LRU, replace if full
//!        else      → replace (T1 LRU to B1)
//!     else total >= C:
//!        total >= 2C → drop B2 LRU
//!        replace if full
//!     admit to T1
//!
//!   replace:
//!     T1 non-empty and (|T1| >= max(1, p) or T2 empty) → T1 LRU to B1
//!     otherwise                                       → T2 LRU to B2
//! ```
//!
//! ## Operations
//!
//! | Operation   | Time   | Notes                                      |
//! |-------------|--------|--------------------------------------------|
//! | `get`       | O(1)   | May move T1→T2                             |
//! | `insert`    | O(1)   | At most one resident eviction              |
//! | `contains`  | O(1)   | Resident keys only                         |
//! | `clear`     | O(n)   | Clears all four lists and resets `p`       |
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::arc::ArcCache;
//! use evictkit::traits::CoreCache;
//!
//! let mut cache = ArcCache::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! assert_eq!(cache.t2_len(), 1);
//! assert_eq!(cache.t1_len(), 1);
//! ```

use std::fmt;
use std::hash::Hash;

use log::trace;
use rustc_hash::FxHashMap;

use crate::ds::ghost_list::GhostList;
use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, PolicyMetricsRecorder,
};
use crate::traits::{CoreCache, MutableCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    T1,
    T2,
}

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Single-threaded ARC cache.
pub struct ArcCache<K, V> {
    t1: IntrusiveList<Entry<K, V>>,
    t2: IntrusiveList<Entry<K, V>>,
    b1: GhostList<K>,
    b2: GhostList<K>,
    index: FxHashMap<K, (Segment, SlotId)>,
    p: usize,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an ARC cache with `capacity` resident entries and ghost lists
    /// of the same size. Capacity 0 stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            t1: IntrusiveList::with_capacity(capacity),
            t2: IntrusiveList::with_capacity(capacity),
            b1: GhostList::new(capacity),
            b2: GhostList::new(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            p: 0,
            capacity,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Current target size of T1.
    pub fn p_value(&self) -> usize {
        self.p
    }

    pub fn t1_len(&self) -> usize {
        self.t1.len()
    }

    pub fn t2_len(&self) -> usize {
        self.t2.len()
    }

    pub fn b1_len(&self) -> usize {
        self.b1.len()
    }

    pub fn b2_len(&self) -> usize {
        self.b2.len()
    }

    /// Returns a resident value without moving it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &(segment, id) = self.index.get(key)?;
        self.list(segment).get(id).map(|entry| &entry.value)
    }

    /// Returns `true` if `key` is remembered in B1 or B2.
    pub fn is_ghost(&self, key: &K) -> bool {
        self.b1.contains(key) || self.b2.contains(key)
    }

    /// Checks list/index agreement and every ARC size bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.t1.check_invariants()?;
        self.t2.check_invariants()?;
        self.b1.check_invariants()?;
        self.b2.check_invariants()?;

        let resident = self.t1.len() + self.t2.len();
        if resident != self.index.len() {
            return Err(InvariantError::new(format!(
                "arc index has {} keys but T1+T2 hold {}",
                self.index.len(),
                resident
            )));
        }
        if resident > self.capacity {
            return Err(InvariantError::new(format!(
                "arc T1+T2 = {} exceeds capacity {}",
                resident, self.capacity
            )));
        }
        if self.p > self.capacity {
            return Err(InvariantError::new(format!(
                "arc p = {} exceeds capacity {}",
                self.p, self.capacity
            )));
        }
        for (key, &(segment, id)) in &self.index {
            match self.list(segment).get(id) {
                Some(entry) if entry.key == *key => {},
                _ => return Err(InvariantError::new("arc index points at wrong node")),
            }
            if self.is_ghost(key) {
                return Err(InvariantError::new("arc key is both resident and ghost"));
            }
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.index.len(), self.capacity)
    }

    fn list(&self, segment: Segment) -> &IntrusiveList<Entry<K, V>> {
        match segment {
            Segment::T1 => &self.t1,
            Segment::T2 => &self.t2,
        }
    }

    /// Moves a resident entry to MRU of T2 and returns its new slot.
    fn promote(&mut self, key: &K) -> Option<SlotId> {
        let &(segment, id) = self.index.get(key)?;
        let new_id = match segment {
            Segment::T2 => {
                self.t2.move_to_front(id);
                id
            },
            Segment::T1 => {
                let entry = self.t1.remove(id)?;
                self.t2.push_front(entry)
            },
        };
        if let Some(location) = self.index.get_mut(key) {
            *location = (Segment::T2, new_id);
        }
        Some(new_id)
    }

    /// Evicts one resident entry into the matching ghost list.
    fn replace(&mut self) {
        let t1_len = self.t1.len();
        let from_t1 = t1_len > 0 && (t1_len >= self.p.max(1) || self.t2.is_empty());
        let evicted = if from_t1 {
            self.t1.pop_back()
        } else {
            self.t2.pop_back()
        };
        if let Some(entry) = evicted {
            self.index.remove(&entry.key);
            if from_t1 {
                self.b1.record(entry.key);
            } else {
                self.b2.record(entry.key);
            }
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
        }
    }

    fn replace_if_full(&mut self) {
        if self.t1.len() + self.t2.len() >= self.capacity {
            self.replace();
        }
    }

    fn admit(&mut self, segment: Segment, key: K, value: V) {
        let entry = Entry {
            key: key.clone(),
            value,
        };
        let id = match segment {
            Segment::T1 => self.t1.push_front(entry),
            Segment::T2 => self.t2.push_front(entry),
        };
        self.index.insert(key, (segment, id));
    }

    fn on_ghost_hit(&mut self, in_b1: bool) {
        let (b1, b2) = (self.b1.len(), self.b2.len());
        let before = self.p;
        if in_b1 {
            let delta = (b2 / b1.max(1)).max(1);
            self.p = (self.p + delta).min(self.capacity);
        } else {
            let delta = (b1 / b2.max(1)).max(1);
            self.p -= self.p.min(delta);
        }
        trace!(
            "arc ghost hit in {}: p {} -> {} (|B1| = {}, |B2| = {})",
            if in_b1 { "B1" } else { "B2" },
            before,
            self.p,
            b1,
            b2
        );
        #[cfg(feature = "metrics")]
        self.metrics.record_ghost_hit();
    }
}

impl<K, V> CoreCache<K, V> for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(id) = self.promote(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return self
                .t2
                .get_mut(id)
                .map(|entry| std::mem::replace(&mut entry.value, value));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let in_b1 = self.b1.contains(&key);
        if in_b1 || self.b2.contains(&key) {
            self.on_ghost_hit(in_b1);
            if in_b1 {
                self.b1.remove(&key);
            } else {
                self.b2.remove(&key);
            }
            self.replace_if_full();
            self.admit(Segment::T2, key, value);
            return None;
        }

        let t1_b1 = self.t1.len() + self.b1.len();
        let total = t1_b1 + self.t2.len() + self.b2.len();
        if t1_b1 >= self.capacity {
            if self.t1.len() < self.capacity {
                self.b1.pop_lru();
                self.replace_if_full();
            } else {
                self.replace();
            }
        } else if total >= self.capacity {
            if total >= 2 * self.capacity {
                self.b2.pop_lru();
            }
            self.replace_if_full();
        }

        self.admit(Segment::T1, key, value);
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        match self.promote(key) {
            Some(id) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_hit();
                self.t2.get(id).map(|entry| &entry.value)
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                None
            },
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.t1.clear();
        self.t2.clear();
        self.b1.clear();
        self.b2.clear();
        self.index.clear();
        self.p = 0;
    }
}

impl<K, V> MutableCache<K, V> for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Removes a resident entry. Ghost records are left alone.
    fn remove(&mut self, key: &K) -> Option<V> {
        let (segment, id) = self.index.remove(key)?;
        let entry = match segment {
            Segment::T1 => self.t1.remove(id),
            Segment::T2 => self.t2.remove(id),
        };
        entry.map(|entry| entry.value)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for ArcCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcCache")
            .field("capacity", &self.capacity)
            .field("p", &self.p)
            .field("t1", &self.t1.len())
            .field("t2", &self.t2.len())
            .finish_non_exhaustive()
    }
}
