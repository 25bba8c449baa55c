//! Thread-safe wrappers around the single-threaded policies.
//!
//! - [`LockedCache`]: one policy instance behind one `parking_lot::Mutex`.
//! - [`ShardedCache`]: N independent instances, each behind its own mutex,
//!   with keys routed by a seeded hash.
//!
//! Both implement [`CachePolicy`](crate::traits::CachePolicy). `get` mutates
//! policy state in every policy, so instances sit behind a mutex, never a
//! read-write lock.

pub mod locked;
pub mod sharded;

pub use locked::LockedCache;
pub use sharded::ShardedCache;
