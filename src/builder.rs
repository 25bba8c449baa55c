//! Unified cache builder for all eviction policies.
//!
//! One [`CacheBuilder`] value describes capacity plus sharding; a
//! [`PolicyKind`] picks the policy and its parameters. The result is a
//! [`Cache`] that dispatches to the chosen policy, optionally wrapped in a
//! [`LockedCache`](crate::concurrent::LockedCache) or split into a
//! [`ShardedCache`](crate::concurrent::ShardedCache).
//!
//! ## Example
//!
//! ```rust
//! use evictkit::builder::{CacheBuilder, PolicyKind};
//! use evictkit::traits::CoreCache;
//!
//! let mut cache = CacheBuilder::new(100).build::<u64, String>(PolicyKind::Lru);
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;

#[cfg(feature = "concurrency")]
use crate::concurrent::{LockedCache, ShardedCache, sharded::DEFAULT_SHARD_SEED};
use crate::error::ConfigError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::traits::{CoreCache, MutableCache};

/// Shard count used by [`CacheBuilder::try_build_sharded`] unless
/// [`CacheBuilder::shards`] is called.
pub const DEFAULT_SHARDS: usize = 8;

/// Available eviction policies and their parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least Recently Used.
    Lru,
    /// Least Frequently Used; `Some(t)` halves all counts once the total
    /// exceeds `t` times the entry count.
    Lfu { aging_threshold: Option<u64> },
    /// LRU with admission after `k` accesses tracked in a history of
    /// `history_capacity` keys.
    LruK { history_capacity: usize, k: usize },
    /// Adaptive Replacement Cache.
    Arc,
}

/// A policy chosen at runtime.
pub enum Cache<K, V> {
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    LruK(LrukCache<K, V>),
    Arc(ArcCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Builds a single instance of `kind` with `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for `k = 0` or `aging_threshold = Some(0)`.
    pub fn try_new(kind: PolicyKind, capacity: usize) -> Result<Self, ConfigError> {
        Ok(match kind {
            PolicyKind::Lru => Cache::Lru(LruCache::new(capacity)),
            PolicyKind::Lfu {
                aging_threshold: None,
            } => Cache::Lfu(LfuCache::new(capacity)),
            PolicyKind::Lfu {
                aging_threshold: Some(threshold),
            } => Cache::Lfu(LfuCache::try_with_aging(capacity, threshold)?),
            PolicyKind::LruK {
                history_capacity,
                k,
            } => Cache::LruK(LrukCache::try_new(capacity, history_capacity, k)?),
            PolicyKind::Arc => Cache::Arc(ArcCache::new(capacity)),
        })
    }

    /// The policy this cache was built with.
    pub fn kind(&self) -> PolicyKind {
        match self {
            Cache::Lru(_) => PolicyKind::Lru,
            Cache::Lfu(lfu) => PolicyKind::Lfu {
                aging_threshold: lfu.aging_threshold(),
            },
            Cache::LruK(lruk) => PolicyKind::LruK {
                history_capacity: lruk.history_capacity(),
                k: lruk.k(),
            },
            Cache::Arc(_) => PolicyKind::Arc,
        }
    }
}

impl<K, V> CoreCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self {
            Cache::Lru(lru) => lru.insert(key, value),
            Cache::Lfu(lfu) => lfu.insert(key, value),
            Cache::LruK(lruk) => lruk.insert(key, value),
            Cache::Arc(arc) => arc.insert(key, value),
        }
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        match self {
            Cache::Lru(lru) => lru.get(key),
            Cache::Lfu(lfu) => lfu.get(key),
            Cache::LruK(lruk) => lruk.get(key),
            Cache::Arc(arc) => arc.get(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self {
            Cache::Lru(lru) => lru.contains(key),
            Cache::Lfu(lfu) => lfu.contains(key),
            Cache::LruK(lruk) => lruk.contains(key),
            Cache::Arc(arc) => arc.contains(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Cache::Lru(lru) => lru.len(),
            Cache::Lfu(lfu) => lfu.len(),
            Cache::LruK(lruk) => lruk.len(),
            Cache::Arc(arc) => arc.len(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Cache::Lru(lru) => lru.capacity(),
            Cache::Lfu(lfu) => lfu.capacity(),
            Cache::LruK(lruk) => lruk.capacity(),
            Cache::Arc(arc) => arc.capacity(),
        }
    }

    fn clear(&mut self) {
        match self {
            Cache::Lru(lru) => lru.clear(),
            Cache::Lfu(lfu) => lfu.clear(),
            Cache::LruK(lruk) => lruk.clear(),
            Cache::Arc(arc) => arc.clear(),
        }
    }
}

impl<K, V> MutableCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        match self {
            Cache::Lru(lru) => lru.remove(key),
            Cache::Lfu(lfu) => lfu.remove(key),
            Cache::LruK(lruk) => lruk.remove(key),
            Cache::Arc(arc) => arc.remove(key),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        match self {
            Cache::Lru(lru) => lru.metrics_snapshot(),
            Cache::Lfu(lfu) => lfu.metrics_snapshot(),
            Cache::LruK(lruk) => lruk.metrics_snapshot(),
            Cache::Arc(arc) => arc.metrics_snapshot(),
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cache::Lru(lru) => f.debug_tuple("Lru").field(lru).finish(),
            Cache::Lfu(lfu) => f.debug_tuple("Lfu").field(lfu).finish(),
            Cache::LruK(lruk) => f.debug_tuple("LruK").field(lruk).finish(),
            Cache::Arc(arc) => f.debug_tuple("Arc").field(arc).finish(),
        }
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBuilder {
    capacity: usize,
    shards: usize,
    seed: u64,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified total capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            shards: DEFAULT_SHARDS,
            #[cfg(feature = "concurrency")]
            seed: DEFAULT_SHARD_SEED,
            #[cfg(not(feature = "concurrency"))]
            seed: 0,
        }
    }

    /// Shard count for [`try_build_sharded`](Self::try_build_sharded).
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Routing seed for [`try_build_sharded`](Self::try_build_sharded).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Builds a single-threaded cache.
    ///
    /// # Example
    ///
    /// ```rust
    /// use evictkit::builder::{CacheBuilder, PolicyKind};
    ///
    /// let lru = CacheBuilder::new(100).try_build::<u64, String>(PolicyKind::Lru);
    /// assert!(lru.is_ok());
    ///
    /// let bad = CacheBuilder::new(100)
    ///     .try_build::<u64, String>(PolicyKind::LruK { history_capacity: 10, k: 0 });
    /// assert!(bad.is_err());
    /// ```
    pub fn try_build<K, V>(&self, kind: PolicyKind) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        Cache::try_new(kind, self.capacity)
    }

    /// # Panics
    ///
    /// Panics on invalid policy parameters. Use
    /// [`try_build`](Self::try_build) to get an error instead.
    pub fn build<K, V>(&self, kind: PolicyKind) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build(kind) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds a single instance behind one lock.
    #[cfg(feature = "concurrency")]
    pub fn try_build_locked<K, V>(
        &self,
        kind: PolicyKind,
    ) -> Result<LockedCache<Cache<K, V>>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        self.try_build(kind).map(LockedCache::new)
    }

    /// Builds a sharded cache; policy parameters are applied unchanged to
    /// every shard and only the capacity is split.
    ///
    /// # Example
    ///
    /// ```rust
    /// use evictkit::builder::{CacheBuilder, PolicyKind};
    /// use evictkit::traits::CachePolicy;
    ///
    /// let cache = CacheBuilder::new(10)
    ///     .shards(4)
    ///     .try_build_sharded::<u64, u64>(PolicyKind::Arc)
    ///     .unwrap();
    /// assert_eq!(cache.shard_capacities(), vec![3, 3, 2, 2]);
    ///
    /// cache.put(7, 70);
    /// assert_eq!(cache.get(&7), Some(70));
    /// ```
    #[cfg(feature = "concurrency")]
    pub fn try_build_sharded<K, V>(
        &self,
        kind: PolicyKind,
    ) -> Result<ShardedCache<Cache<K, V>>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        ShardedCache::try_new_with(self.capacity, self.shards, self.seed, |cap| {
            Cache::try_new(kind, cap)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [PolicyKind; 5] = [
        PolicyKind::Lru,
        PolicyKind::Lfu {
            aging_threshold: None,
        },
        PolicyKind::Lfu {
            aging_threshold: Some(8),
        },
        PolicyKind::LruK {
            history_capacity: 10,
            k: 2,
        },
        PolicyKind::Arc,
    ];

    #[test]
    fn test_all_policies_basic_ops() {
        for kind in ALL_KINDS {
            let mut cache = CacheBuilder::new(10).build::<u64, String>(kind);
            assert_eq!(cache.kind(), kind);

            assert_eq!(cache.insert(1, "one".to_string()), None);
            assert_eq!(cache.insert(2, "two".to_string()), None);

            assert_eq!(cache.get(&1), Some(&"one".to_string()));
            assert_eq!(cache.get(&2), Some(&"two".to_string()));
            assert_eq!(cache.get(&3), None);

            assert!(cache.contains(&1));
            assert!(!cache.contains(&99));
            assert_eq!(cache.len(), 2);

            assert_eq!(cache.insert(1, "ONE".to_string()), Some("one".to_string()));
            assert_eq!(cache.get(&1), Some(&"ONE".to_string()));

            assert_eq!(cache.remove(&2), Some("two".to_string()));
            cache.clear();
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn test_capacity_enforcement() {
        let mut cache = CacheBuilder::new(2).build::<u64, String>(PolicyKind::Lru);

        cache.insert(1, "one".to_string());
        cache.insert(2, "two".to_string());
        cache.insert(3, "three".to_string());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let builder = CacheBuilder::new(4);
        assert_eq!(
            builder
                .try_build::<u32, u32>(PolicyKind::LruK {
                    history_capacity: 4,
                    k: 0
                })
                .err(),
            Some(ConfigError::ZeroK)
        );
        assert_eq!(
            builder
                .try_build::<u32, u32>(PolicyKind::Lfu {
                    aging_threshold: Some(0)
                })
                .err(),
            Some(ConfigError::ZeroAgingThreshold)
        );
    }

    #[test]
    #[should_panic(expected = "LRU-K promotion threshold k must be > 0")]
    fn test_build_panics_on_zero_k() {
        let _ = CacheBuilder::new(4).build::<u32, u32>(PolicyKind::LruK {
            history_capacity: 4,
            k: 0,
        });
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;
        use crate::traits::CachePolicy;

        #[test]
        fn test_sharded_zero_shards_rejected() {
            let result = CacheBuilder::new(4)
                .shards(0)
                .try_build_sharded::<u32, u32>(PolicyKind::Lru);
            assert_eq!(result.err().map(|e| e.to_string()), Some("shard count must be > 0".into()));
        }

        #[test]
        fn test_sharded_applies_parameters_to_every_shard() {
            let cache = CacheBuilder::new(9)
                .shards(3)
                .seed(7)
                .try_build_sharded::<u32, u32>(PolicyKind::LruK {
                    history_capacity: 5,
                    k: 3,
                })
                .unwrap();
            assert_eq!(cache.shard_capacities(), vec![3, 3, 3]);
            for shard in 0..3 {
                let kind = cache.with_shard(shard, |inner| inner.kind());
                assert_eq!(
                    kind,
                    Some(PolicyKind::LruK {
                        history_capacity: 5,
                        k: 3
                    })
                );
            }
        }

        #[test]
        fn test_locked_round_trip() {
            let cache = CacheBuilder::new(2)
                .try_build_locked::<&str, u32>(PolicyKind::Arc)
                .unwrap();
            cache.put("a", 1);
            assert_eq!(cache.get(&"a"), Some(1));
            assert_eq!(cache.get_or_default(&"b"), 0);
        }
    }
}
