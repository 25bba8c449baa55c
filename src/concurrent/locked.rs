//! Single-lock wrapper.

use std::fmt;

use parking_lot::Mutex;

#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::traits::{CachePolicy, CoreCache, MutableCache};

/// A policy instance guarded by one exclusive lock.
///
/// Every operation takes the lock for its own duration only; values are
/// cloned out before the guard drops.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use evictkit::concurrent::LockedCache;
/// use evictkit::policy::lru::LruCache;
/// use evictkit::traits::CachePolicy;
///
/// let cache = Arc::new(LockedCache::new(LruCache::new(64)));
/// let handles: Vec<_> = (0..4u64)
///     .map(|t| {
///         let cache = Arc::clone(&cache);
///         thread::spawn(move || cache.put(t, t * 10))
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(cache.len(), 4);
/// assert_eq!(cache.get(&2), Some(20));
/// ```
pub struct LockedCache<C> {
    inner: Mutex<C>,
}

impl<C> LockedCache<C> {
    pub fn new(cache: C) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Runs `f` with exclusive access to the wrapped policy.
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }

    pub fn len<K, V>(&self) -> usize
    where
        C: CoreCache<K, V>,
    {
        self.inner.lock().len()
    }

    pub fn is_empty<K, V>(&self) -> bool
    where
        C: CoreCache<K, V>,
    {
        self.inner.lock().is_empty()
    }

    pub fn capacity<K, V>(&self) -> usize
    where
        C: CoreCache<K, V>,
    {
        self.inner.lock().capacity()
    }

    /// Membership test without touching access state.
    pub fn contains<K, V>(&self, key: &K) -> bool
    where
        C: CoreCache<K, V>,
    {
        self.inner.lock().contains(key)
    }

    pub fn clear<K, V>(&self)
    where
        C: CoreCache<K, V>,
    {
        self.inner.lock().clear();
    }

    pub fn remove<K, V>(&self, key: &K) -> Option<V>
    where
        C: MutableCache<K, V>,
    {
        self.inner.lock().remove(key)
    }
}

#[cfg(feature = "metrics")]
impl<C> MetricsSnapshotProvider<CacheMetricsSnapshot> for LockedCache<C>
where
    C: MetricsSnapshotProvider<CacheMetricsSnapshot>,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.lock().snapshot()
    }
}

impl<C, K, V> CachePolicy<K, V> for LockedCache<C>
where
    C: CoreCache<K, V> + Send,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        self.inner.lock().insert(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }
}

impl<C: fmt::Debug> fmt::Debug for LockedCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(guard) => f.debug_struct("LockedCache").field("inner", &*guard).finish(),
            None => f.debug_struct("LockedCache").finish_non_exhaustive(),
        }
    }
}
