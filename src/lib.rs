//! evictkit: bounded in-memory key-value caches with pluggable eviction.
//!
//! Four single-threaded policies share the [`traits::CoreCache`] contract:
//!
//! - [`policy::lru::LruCache`]: least recently used.
//! - [`policy::lfu::LfuCache`]: least frequently used with optional aging.
//! - [`policy::lru_k::LrukCache`]: LRU gated by an access-history admission
//!   filter.
//! - [`policy::arc::ArcCache`]: adaptive replacement between recency and
//!   frequency.
//!
//! With the `concurrency` feature (default), [`concurrent::LockedCache`] and
//! [`concurrent::ShardedCache`] expose any policy through the thread-safe
//! [`traits::CachePolicy`] interface. [`builder::CacheBuilder`] picks a
//! policy at runtime.
//!
//! ```
//! use evictkit::prelude::*;
//!
//! let mut cache = LruCache::new(2);
//! cache.insert(1, "one");
//! cache.insert(2, "two");
//! cache.get(&1);
//! cache.insert(3, "three");
//! assert!(!cache.contains(&2));
//! ```

pub mod builder;
#[cfg(feature = "concurrency")]
pub mod concurrent;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
