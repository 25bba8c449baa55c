//! # Cache Trait Hierarchy
//!
//! Two contracts: a single-threaded one that every policy implements directly,
//! and a thread-safe one implemented by the locking wrappers.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │   single owner, &mut self
//!   │                                         │
//!   │  insert(&mut, K, V) → Option<V>         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  contains(&, &K) → bool                 │
//!   │  len / is_empty / capacity / clear      │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          MutableCache<K, V>             │
//!   │  remove(&mut, &K) → Option<V>           │
//!   └─────────────────────────────────────────┘
//!
//!   ┌─────────────────────────────────────────┐
//!   │      CachePolicy<K, V>: Send + Sync     │   shared, &self
//!   │                                         │
//!   │  put(&, K, V)                           │
//!   │  get(&, &K) → Option<V>        (clone)  │
//!   │  get_into(&, &K, &mut V) → bool         │
//!   │  get_or_default(&, &K) → V              │
//!   └─────────────────────────────────────────┘
//!        ▲                         ▲
//!        │                         │
//!   LockedCache<C>           ShardedCache<C>
//! ```
//!
//! `CoreCache::get` counts as an access: it may reorder recency lists, bump
//! frequencies, or promote LRU-K history. Use `contains` to test membership
//! without side effects.
//!
//! ## Policy Comparison
//!
//! | Policy | Eviction Basis                   | Scan resistant |
//! |--------|----------------------------------|----------------|
//! | LRU    | Last access time                 | No             |
//! | LFU    | Access count, aged by halving    | Yes            |
//! | LRU-K  | LRU, admission after K accesses  | Yes            |
//! | ARC    | Adaptive recency/frequency split | Yes            |

/// Core cache operations that all policies support.
///
/// # Example
///
/// ```
/// use evictkit::traits::CoreCache;
/// use evictkit::policy::lru::LruCache;
///
/// fn warm_cache<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = LruCache::new(100);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key was
    /// resident.
    ///
    /// If the cache is full and `key` is new, the policy evicts exactly one
    /// entry first (LRU-K may instead stage the value in its history).
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key, counting the lookup as an access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key is resident without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of resident entries.
    fn capacity(&self) -> usize;

    /// Removes all entries and any auxiliary history.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use evictkit::traits::{CoreCache, MutableCache};
/// use evictkit::policy::lfu::LfuCache;
///
/// fn invalidate_keys<C: MutableCache<u64, String>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = LfuCache::new(100);
/// cache.insert(1, "one".to_string());
/// cache.insert(2, "two".to_string());
///
/// invalidate_keys(&mut cache, &[1]);
/// assert!(!cache.contains(&1));
/// assert!(cache.contains(&2));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes `key`, returning its value if it was resident.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes every key in `keys`; returns the number actually removed.
    fn remove_batch(&mut self, keys: &[K]) -> usize {
        keys.iter().filter(|key| self.remove(key).is_some()).count()
    }
}

/// Thread-safe cache interface shared by every concurrent wrapper.
///
/// All methods take `&self`; implementations serialise access internally.
/// Values are cloned out before any internal lock is released.
///
/// The trait is object safe, so callers can hold a
/// `Box<dyn CachePolicy<K, V>>` and swap policies at runtime.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "concurrency")]
/// # {
/// use evictkit::concurrent::LockedCache;
/// use evictkit::policy::lru::LruCache;
/// use evictkit::traits::CachePolicy;
///
/// let cache: Box<dyn CachePolicy<u32, String>> =
///     Box::new(LockedCache::new(LruCache::new(2)));
/// cache.put(1, "one".to_string());
///
/// let mut out = String::new();
/// assert!(cache.get_into(&1, &mut out));
/// assert_eq!(out, "one");
/// assert_eq!(cache.get_or_default(&9), String::new());
/// # }
/// ```
pub trait CachePolicy<K, V>: Send + Sync {
    /// Inserts or updates `key`.
    fn put(&self, key: K, value: V);

    /// Looks up `key`, counting it as an access, and clones the value out.
    fn get(&self, key: &K) -> Option<V>;

    /// Writes the value into `out` on a hit; leaves `out` untouched on a miss.
    fn get_into(&self, key: &K, out: &mut V) -> bool {
        match self.get(key) {
            Some(value) => {
                *out = value;
                true
            },
            None => false,
        }
    }

    /// Returns the value on a hit or `V::default()` on a miss.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }
}
