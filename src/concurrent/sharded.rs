//! Sharded cache: N independent policy instances behind N locks.
//!
//! ## Architecture
//!
//! ```text
//!   put(k, v) / get(k)
//!        │
//!        ▼
//!   ShardSelector::shard_for_key(k)      seeded hash, no lock held
//!        │
//!        ├──────────────┬──────────────┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//!   │ Mutex<C> │   │ Mutex<C> │   │ Mutex<C> │   │ Mutex<C> │
//!   │ cap = 3  │   │ cap = 3  │   │ cap = 2  │   │ cap = 2  │
//!   └──────────┘   └──────────┘   └──────────┘   └──────────┘
//!        total capacity 10 split over 4 shards
//! ```
//!
//! Each shard evicts on its own, so the victim is chosen from the key's
//! shard only and the result differs from a single instance of the same
//! total capacity. Operations on different shards never contend.
//!
//! Shard `i` gets `capacity / shards`, plus one if `i < capacity % shards`.

use std::fmt;
use std::hash::Hash;

use log::debug;
use parking_lot::Mutex;

use crate::ds::shard::{ShardSelector, split_capacity};
use crate::error::ConfigError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::traits::{CachePolicy, CoreCache, MutableCache};

/// Seed used when none is supplied.
pub const DEFAULT_SHARD_SEED: u64 = 0x5eed_cafe;

/// A thread-safe cache made of independently locked policy instances.
///
/// # Example
///
/// ```
/// use evictkit::concurrent::ShardedCache;
/// use evictkit::policy::lru::LruCache;
/// use evictkit::traits::CachePolicy;
///
/// let cache = ShardedCache::try_new(5, 2, LruCache::new).unwrap();
/// assert_eq!(cache.shard_capacities(), vec![3, 2]);
///
/// cache.put("k", 1);
/// assert_eq!(cache.get(&"k"), Some(1));
/// ```
pub struct ShardedCache<C> {
    shards: Box<[Mutex<C>]>,
    selector: ShardSelector,
    capacities: Vec<usize>,
}

impl<C> ShardedCache<C> {
    /// Builds `shards` instances, calling `factory` with each shard's
    /// capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroShards`] if `shards` is 0.
    pub fn try_new<F>(capacity: usize, shards: usize, factory: F) -> Result<Self, ConfigError>
    where
        F: FnMut(usize) -> C,
    {
        Self::try_new_with_seed(capacity, shards, DEFAULT_SHARD_SEED, factory)
    }

    /// Like [`try_new`](Self::try_new) with an explicit routing seed.
    pub fn try_new_with_seed<F>(
        capacity: usize,
        shards: usize,
        seed: u64,
        mut factory: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(usize) -> C,
    {
        Self::try_new_with(capacity, shards, seed, |cap| Ok(factory(cap)))
    }

    /// Builds shards with a fallible factory; the first error is returned.
    pub fn try_new_with<F>(
        capacity: usize,
        shards: usize,
        seed: u64,
        mut factory: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnMut(usize) -> Result<C, ConfigError>,
    {
        if shards == 0 {
            return Err(ConfigError::ZeroShards);
        }
        let capacities = split_capacity(capacity, shards);
        let instances = capacities
            .iter()
            .map(|&cap| factory(cap).map(Mutex::new))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "sharded cache created: capacity={} shards={} seed={:#x}",
            capacity, shards, seed
        );

        Ok(Self {
            shards: instances.into_boxed_slice(),
            selector: ShardSelector::new(shards, seed),
            capacities,
        })
    }

    /// # Panics
    ///
    /// Panics if `shards` is 0. Use [`try_new`](Self::try_new) to get an
    /// error instead.
    pub fn new<F>(capacity: usize, shards: usize, factory: F) -> Self
    where
        F: FnMut(usize) -> C,
    {
        match Self::try_new(capacity, shards, factory) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Capacity assigned to each shard at construction.
    pub fn shard_capacities(&self) -> Vec<usize> {
        self.capacities.clone()
    }

    /// Index of the shard that owns `key`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        self.selector.shard_for_key(key)
    }

    /// Runs `f` with exclusive access to shard `index`.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn with_shard<R>(&self, index: usize, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let shard = self.shards.get(index)?;
        Some(f(&mut shard.lock()))
    }

    fn shard(&self, key: &impl Hash) -> &Mutex<C> {
        &self.shards[self.selector.shard_for_key(key)]
    }
}

impl<C> ShardedCache<C> {
    /// Sum of shard lengths, each read under its own lock. Not a consistent
    /// snapshot while other threads write.
    pub fn len<K, V>(&self) -> usize
    where
        C: CoreCache<K, V>,
    {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty<K, V>(&self) -> bool
    where
        C: CoreCache<K, V>,
    {
        self.shards.iter().all(|shard| shard.lock().is_empty())
    }

    pub fn capacity<K, V>(&self) -> usize
    where
        C: CoreCache<K, V>,
    {
        self.shards.iter().map(|shard| shard.lock().capacity()).sum()
    }

    pub fn contains<K, V>(&self, key: &K) -> bool
    where
        K: Hash,
        C: CoreCache<K, V>,
    {
        self.shard(key).lock().contains(key)
    }

    /// Clears every shard, one lock at a time.
    pub fn clear<K, V>(&self)
    where
        C: CoreCache<K, V>,
    {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
    }

    pub fn remove<K, V>(&self, key: &K) -> Option<V>
    where
        K: Hash,
        C: MutableCache<K, V>,
    {
        self.shard(key).lock().remove(key)
    }
}

impl<C, K, V> CachePolicy<K, V> for ShardedCache<C>
where
    K: Hash,
    V: Clone,
    C: CoreCache<K, V> + Send,
{
    fn put(&self, key: K, value: V) {
        let shard = self.shard(&key);
        shard.lock().insert(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.shard(key).lock().get(key).cloned()
    }
}

/// Shard snapshots summed field by field.
#[cfg(feature = "metrics")]
impl<C> MetricsSnapshotProvider<CacheMetricsSnapshot> for ShardedCache<C>
where
    C: MetricsSnapshotProvider<CacheMetricsSnapshot>,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.shards
            .iter()
            .map(|shard| shard.lock().snapshot())
            .fold(CacheMetricsSnapshot::default(), |acc, snap| acc + snap)
    }
}

impl<C> fmt::Debug for ShardedCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shards", &self.shards.len())
            .field("capacities", &self.capacities)
            .field("seed", &self.selector.seed())
            .finish_non_exhaustive()
    }
}
