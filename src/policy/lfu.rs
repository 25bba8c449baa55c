//! # LFU (Least Frequently Used) Cache with Aging
//!
//! Evicts the entry with the smallest access count; ties go to the least
//! recently accessed entry of that count. An optional aging threshold halves
//! every counter once the average count grows past it, so keys that were hot
//! long ago lose their advantage and the cache can follow a shifting workload.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                          LfuCache<K, V>                                  │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │  FrequencyBuckets<K, V>                                            │ │
//!   │   │                                                                    │ │
//!   │   │  min_freq = 1                                                      │ │
//!   │   │  freq=1: [page_3] ◄──► [page_5]          ← victim is page_5 (LRU)  │ │
//!   │   │  freq=3: [page_2]                                                  │ │
//!   │   │  freq=7: [page_4] ◄──► [page_1]                                    │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                                                          │
//!   │   total: u64             (sum of all counters, kept incrementally)      │
//!   │   aging_threshold: Option<u64>                                          │
//!   │   capacity: usize                                                        │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## LFU vs LRU
//!
//! ```text
//!   Access pattern: A, A, A, B, C, D   capacity 2
//!
//!   LRU: [D, C]   A is pushed out by the scan of one-off keys
//!   LFU: {A:3, D:1}   A keeps its place, one-off keys evict each other
//! ```
//!
//! ## Aging
//!
//! ```text
//!   After every counter change:
//!
//!     total > threshold * len ?
//!        │ no ──► done
//!        ▼ yes
//!     every count = max(1, count / 2)
//!     rebuild buckets, oldest access first (recency within a bucket survives)
//!     total = Σ count
//! ```
//!
//! The rebuild is O(n log n) in the number of live entries and only runs
//! when the threshold is crossed.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lfu::LfuCache;
//! use evictkit::traits::CoreCache;
//!
//! let mut cache = LfuCache::new(2);
//! cache.insert("hot", 1);
//! cache.insert("cold", 2);
//! cache.get(&"hot");
//!
//! cache.insert("new", 3);
//! assert!(cache.contains(&"hot"));
//! assert!(!cache.contains(&"cold"));
//! ```

use std::fmt;
use std::hash::Hash;

use log::debug;

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::CacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, PolicyMetricsRecorder,
};
use crate::traits::{CoreCache, MutableCache};

/// Single-threaded LFU cache with optional counter aging.
pub struct LfuCache<K, V> {
    buckets: FrequencyBuckets<K, V>,
    capacity: usize,
    aging_threshold: Option<u64>,
    total: u64,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU cache with aging disabled.
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, None)
    }

    /// Creates an LFU cache that halves all counters whenever the average
    /// count exceeds `threshold`.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is 0. Use [`try_with_aging`](Self::try_with_aging)
    /// for user-supplied values.
    pub fn with_aging(capacity: usize, threshold: u64) -> Self {
        match Self::try_with_aging(capacity, threshold) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`with_aging`](Self::with_aging).
    pub fn try_with_aging(capacity: usize, threshold: u64) -> Result<Self, ConfigError> {
        if threshold == 0 {
            return Err(ConfigError::ZeroAgingThreshold);
        }
        Ok(Self::build(capacity, Some(threshold)))
    }

    fn build(capacity: usize, aging_threshold: Option<u64>) -> Self {
        Self {
            buckets: FrequencyBuckets::with_capacity(capacity),
            capacity,
            aging_threshold,
            total: 0,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        }
    }

    /// Returns the access count of `key`, if resident.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    pub fn aging_threshold(&self) -> Option<u64> {
        self.aging_threshold
    }

    /// Sum of all live access counters.
    pub fn total_frequency(&self) -> u64 {
        self.total
    }

    /// Returns the value without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.buckets.peek(key)
    }

    /// Returns the next eviction victim as `(key, value, count)`.
    pub fn peek_lfu(&self) -> Option<(&K, &V, u64)> {
        self.buckets.peek_min()
    }

    /// Removes and returns the next eviction victim.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        let (key, value, freq) = self.buckets.pop_min()?;
        self.total = self.total.saturating_sub(freq);
        self.maybe_age();
        Some((key, value))
    }

    /// Checks bucket structure, the running total and the capacity bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.buckets.check_invariants()?;
        if self.buckets.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "lfu length {} exceeds capacity {}",
                self.buckets.len(),
                self.capacity
            )));
        }
        let sum: u64 = self.buckets.iter().map(|(_, _, freq)| freq).sum();
        if sum != self.total {
            return Err(InvariantError::new(format!(
                "lfu running total {} != sum of counters {}",
                self.total, sum
            )));
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.buckets.len(), self.capacity)
    }

    /// Counts one access to a resident key and returns its value.
    fn access(&mut self, key: &K) -> Option<&mut V> {
        let (freq, _) = self.buckets.touch(key)?;
        if freq != u64::MAX {
            self.total = self.total.saturating_add(1);
        }
        self.maybe_age();
        self.buckets.peek_mut(key)
    }

    fn maybe_age(&mut self) {
        let Some(threshold) = self.aging_threshold else {
            return;
        };
        let len = self.buckets.len() as u64;
        if len == 0 || self.total <= threshold.saturating_mul(len) {
            return;
        }

        let before = self.total;
        self.total = self.buckets.decay_halve();
        debug!(
            "lfu aging rescale: total {} -> {} over {} entries (threshold {})",
            before, self.total, len, threshold
        );
        #[cfg(feature = "metrics")]
        self.metrics.record_aging_rescale();
    }
}

impl<K, V> CoreCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.access(&key) {
            let old = std::mem::replace(slot, value);
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return Some(old);
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.buckets.len() >= self.capacity {
            if let Some((_, _, freq)) = self.buckets.pop_min() {
                self.total = self.total.saturating_sub(freq);
                #[cfg(feature = "metrics")]
                self.metrics.record_evicted_entry();
            }
        }

        self.buckets.insert(key, value);
        self.total = self.total.saturating_add(1);
        self.maybe_age();
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        if !self.buckets.contains(key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.access(key).map(|value| &*value)
    }

    fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.buckets.clear();
        self.total = 0;
    }
}

impl<K, V> MutableCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        let (value, freq) = self.buckets.remove(key)?;
        self.total = self.total.saturating_sub(freq);
        self.maybe_age();
        Some(value)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.buckets.len())
            .field("capacity", &self.capacity)
            .field("total", &self.total)
            .field("aging_threshold", &self.aging_threshold)
            .finish()
    }
}
