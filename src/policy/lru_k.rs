//! # LRU-K (history-gated LRU)
//!
//! Keys must be seen `k` times before they are admitted to the bounded main
//! store. Until then they live in a separate, bounded history that records an
//! access count and the most recently put value. One-off reads and scans
//! therefore churn the history instead of the main store.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                          LrukCache<K, V>                                 │
//!   │                                                                          │
//!   │   history: LruCache<K, HistoryRecord<V>>      capacity H                 │
//!   │   ┌──────────────────────────────────────────────────────────────────┐   │
//!   │   │  head ──► [k7 hits:1 val:Some] ◄──► [k3 hits:2 val:None] ◄── tail│   │
//!   │   └──────────────────────────────────────────────────────────────────┘   │
//!   │                         │ hits >= k and value recorded                   │
//!   │                         ▼                                                │
//!   │   main: LruCache<K, V>                        capacity C                 │
//!   │   ┌──────────────────────────────────────────────────────────────────┐   │
//!   │   │  head ──► [k1] ◄──► [k9] ◄──► [k4] ◄── tail (evicted on overflow)│   │
//!   │   └──────────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-key state machine
//!
//! ```text
//!   Unseen ──put/get──► Tracked(hits) ──get, hits >= k, value recorded──► Promoted
//!                          │    ▲
//!                          └────┘ put: record value, hits += 1
//!                                 get: hits += 1
//! ```
//!
//! - `put` on a resident key updates it like an LRU hit.
//! - `put` on any other key stores the value in history and counts one
//!   access. It never promotes.
//! - `get` on a tracked key counts one access and promotes once the count
//!   reaches `k` and a value is recorded; the history record is dropped.
//! - `get` on an unseen key creates a value-less record. Such a key can never
//!   be promoted until a `put` supplies a value.
//!
//! Because the initiating `put` is itself an access, with `k = 2` the first
//! `get` after a `put` promotes.
//!
//! A key is in at most one of `main` and `history`.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lru_k::LrukCache;
//! use evictkit::traits::CoreCache;
//!
//! let mut cache = LrukCache::new(1, 10, 2);
//! cache.insert(1, "a");
//! assert!(!cache.contains(&1));
//! assert_eq!(cache.get(&1), Some(&"a"));
//!
//! cache.insert(2, "b");
//! assert_eq!(cache.get(&2), Some(&"b"));
//! assert_eq!(cache.get(&1), None);
//! ```

use std::fmt;
use std::hash::Hash;

use log::trace;

use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, PolicyMetricsRecorder,
};
use crate::policy::lru::LruCache;
use crate::traits::{CoreCache, MutableCache};

/// History entry for a key not yet admitted to the main store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord<V> {
    pub hits: usize,
    pub value: Option<V>,
}

/// LRU cache that admits keys only after `k` recorded accesses.
pub struct LrukCache<K, V> {
    main: LruCache<K, V>,
    history: LruCache<K, HistoryRecord<V>>,
    k: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU-K cache.
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0. Use [`try_new`](Self::try_new) for user-supplied
    /// values.
    pub fn new(main_capacity: usize, history_capacity: usize, k: usize) -> Self {
        match Self::try_new(main_capacity, history_capacity, k) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`new`](Self::new).
    pub fn try_new(
        main_capacity: usize,
        history_capacity: usize,
        k: usize,
    ) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::ZeroK);
        }
        Ok(Self {
            main: LruCache::new(main_capacity),
            history: LruCache::new(history_capacity),
            k,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        })
    }

    /// Promotion threshold.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Access count recorded for a key that has not been promoted.
    pub fn history_hits(&self, key: &K) -> Option<usize> {
        self.history.peek(key).map(|record| record.hits)
    }

    /// Returns a resident value without refreshing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.main.peek(key)
    }

    /// Checks both stores and that no key is in both.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.main.check_invariants()?;
        self.history.check_invariants()?;
        for (key, _) in self.main.iter() {
            if self.history.contains(key) {
                return Err(InvariantError::new(
                    "key present in both main store and history",
                ));
            }
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.main.len(), self.main.capacity())
    }

    /// Counts a read of a non-resident key; returns `true` if it should be
    /// promoted now.
    fn record_read(&mut self, key: &K) -> bool {
        match self.history.get_mut(key) {
            Some(record) => {
                record.hits += 1;
                record.hits >= self.k && record.value.is_some()
            },
            None => {
                self.history.insert(
                    key.clone(),
                    HistoryRecord {
                        hits: 1,
                        value: None,
                    },
                );
                false
            },
        }
    }

    fn promote(&mut self, key: &K) -> Option<&V> {
        let record = self.history.remove(key)?;
        let hits = record.hits;
        let value = record.value?;

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_promotion();
            if self.main.len() >= self.main.capacity() {
                self.metrics.record_evicted_entry();
            }
        }

        self.main.insert(key.clone(), value);
        trace!(
            "lru-k promoted key after {} hits (k = {}, main {}/{})",
            hits,
            self.k,
            self.main.len(),
            self.main.capacity()
        );
        self.main.peek(key)
    }
}

impl<K, V> CoreCache<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.main.capacity() == 0 {
            return None;
        }

        if self.main.contains(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return self.main.insert(key, value);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        match self.history.get_mut(&key) {
            Some(record) => {
                record.hits += 1;
                record.value = Some(value);
            },
            None => {
                self.history.insert(
                    key,
                    HistoryRecord {
                        hits: 1,
                        value: Some(value),
                    },
                );
            },
        }
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        if self.main.contains(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_hit();
            return self.main.get(key);
        }

        if self.main.capacity() == 0 || !self.record_read(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        self.promote(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    fn len(&self) -> usize {
        self.main.len()
    }

    fn capacity(&self) -> usize {
        self.main.capacity()
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.main.clear();
        self.history.clear();
    }
}

impl<K, V> MutableCache<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Removes a resident entry, or forgets a tracked key and returns its
    /// staged value.
    fn remove(&mut self, key: &K) -> Option<V> {
        match self.main.remove(key) {
            Some(value) => Some(value),
            None => self.history.remove(key).and_then(|record| record.value),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LrukCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LrukCache")
            .field("main", &self.main)
            .field("history", &self.history)
            .field("k", &self.k)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod basic_behavior {
        use super::*;

        #[test]
        fn test_zero_k_rejected() {
            assert_eq!(
                LrukCache::<u32, u32>::try_new(4, 4, 0).unwrap_err(),
                ConfigError::ZeroK
            );
        }

        #[test]
        #[should_panic(expected = "k must be > 0")]
        fn test_new_panics_on_zero_k() {
            let _ = LrukCache::<u32, u32>::new(4, 4, 0);
        }

        #[test]
        fn test_put_stages_in_history() {
            let mut cache = LrukCache::new(2, 4, 2);
            assert_eq!(cache.insert(1, "a"), None);
            assert!(!cache.contains(&1));
            assert_eq!(cache.len(), 0);
            assert_eq!(cache.history_len(), 1);
            assert_eq!(cache.history_hits(&1), Some(1));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_promotion_after_k_accesses() {
            let mut cache = LrukCache::new(2, 4, 3);
            cache.insert(1, "a");
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.history_hits(&1), Some(2));
            assert_eq!(cache.get(&1), Some(&"a"));
            assert!(cache.contains(&1));
            assert_eq!(cache.history_hits(&1), None);
            assert_eq!(cache.history_len(), 0);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_repeated_puts_count_and_keep_latest_value() {
            let mut cache = LrukCache::new(2, 4, 3);
            cache.insert(1, "old");
            cache.insert(1, "new");
            assert_eq!(cache.history_hits(&1), Some(2));
            assert!(!cache.contains(&1));
            assert_eq!(cache.get(&1), Some(&"new"));
        }

        #[test]
        fn test_resident_update() {
            let mut cache = LrukCache::new(2, 4, 2);
            cache.insert(1, 10);
            cache.get(&1);
            assert_eq!(cache.insert(1, 11), Some(10));
            assert_eq!(cache.peek(&1), Some(&11));
        }
    }

    mod admission {
        use super::*;

        #[test]
        fn test_reads_without_put_never_promote() {
            let mut cache: LrukCache<u32, &str> = LrukCache::new(2, 4, 2);
            for _ in 0..10 {
                assert_eq!(cache.get(&7), None);
            }
            assert_eq!(cache.history_hits(&7), Some(10));
            assert!(!cache.contains(&7));
        }

        #[test]
        fn test_value_less_record_promotes_once_put_supplies_value() {
            let mut cache = LrukCache::new(2, 4, 3);
            cache.get(&5);
            cache.get(&5);
            cache.insert(5, "v");
            // hits = 3 now, but put never promotes
            assert!(!cache.contains(&5));
            assert_eq!(cache.get(&5), Some(&"v"));
        }

        #[test]
        fn test_history_overflow_drops_oldest_record() {
            let mut cache = LrukCache::new(2, 2, 2);
            cache.insert(1, "a");
            cache.insert(2, "b");
            cache.insert(3, "c");
            assert_eq!(cache.history_len(), 2);
            assert_eq!(cache.history_hits(&1), None);
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.get(&2), None);
        }

        #[test]
        fn test_promotion_evicts_main_lru() {
            let mut cache = LrukCache::new(1, 10, 2);
            cache.insert(1, "a");
            assert_eq!(cache.get(&1), Some(&"a"));
            cache.insert(2, "b");
            assert_eq!(cache.get(&2), Some(&"b"));
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.len(), 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_zero_history_capacity_never_promotes() {
            let mut cache = LrukCache::new(2, 0, 1);
            cache.insert(1, "a");
            assert_eq!(cache.get(&1), None);
            assert!(cache.is_empty());
        }

        #[test]
        fn test_zero_main_capacity_misses() {
            let mut cache = LrukCache::new(0, 4, 1);
            cache.insert(1, "a");
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.history_len(), 0);
        }

        #[test]
        fn test_remove_from_either_store() {
            let mut cache = LrukCache::new(2, 4, 2);
            cache.insert(1, "resident");
            cache.get(&1);
            cache.insert(2, "staged");
            assert_eq!(cache.remove(&1), Some("resident"));
            assert_eq!(cache.remove(&2), Some("staged"));
            assert_eq!(cache.history_len(), 0);
            assert_eq!(cache.remove(&3), None);
        }

        #[test]
        fn test_clear_resets_history() {
            let mut cache = LrukCache::new(2, 4, 2);
            cache.insert(1, 1);
            cache.get(&1);
            cache.insert(2, 2);
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.history_len(), 0);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_invariants_hold(
                main in 0usize..8,
                history in 0usize..8,
                k in 1usize..4,
                ops in proptest::collection::vec((0u8..3, 0u16..20), 0..300)
            ) {
                let mut cache = LrukCache::new(main, history, k);
                for (op, key) in ops {
                    match op {
                        0 => { cache.insert(key, key); },
                        1 => {
                            if let Some(v) = cache.get(&key) {
                                prop_assert_eq!(*v, key);
                            }
                        },
                        _ => { cache.remove(&key); },
                    }
                    prop_assert!(cache.len() <= main);
                    prop_assert!(cache.history_len() <= history);
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn test_counts_promotions() {
            let mut cache = LrukCache::new(1, 4, 2);
            cache.insert(1, ());
            cache.get(&1);
            cache.insert(2, ());
            cache.get(&2);
            let snap = cache.metrics_snapshot();
            assert_eq!(snap.promotions, 2);
            assert_eq!(snap.evictions, 1);
            assert_eq!(snap.get_hits, 2);
        }
    }
}
