//! Key routing and capacity splitting for sharded caches.
//!
//! ## Architecture
//!
//! ```text
//!   key ──► DefaultHasher(seed, key) ──► finish() % shards ──► shard index
//!
//!   capacity 10, shards 4
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │
//!   │  cap 3  │  cap 3  │  cap 2  │  cap 2  │
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! The same `(key, seed, shards)` always yields the same shard, so a key is
//! owned by exactly one shard for the lifetime of a [`ShardSelector`].
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::ds::{ShardSelector, split_capacity};
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//!
//! assert_eq!(split_capacity(10, 4), vec![3, 3, 2, 2]);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic shard selector using a seeded hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards with the given `seed`.
    ///
    /// The shard count is clamped to at least 1; callers that must reject
    /// zero do so before constructing the selector.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Maps a key to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards as u64) as usize
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Splits `total` capacity over `shards` as evenly as possible.
///
/// Shard `i` receives `total / shards`, plus one when `i < total % shards`,
/// so the result always sums to `total`. Zero shards yields an empty vector.
pub fn split_capacity(total: usize, shards: usize) -> Vec<usize> {
    if shards == 0 {
        return Vec::new();
    }
    let base = total / shards;
    let extra = total % shards;
    (0..shards).map(|i| base + usize::from(i < extra)).collect()
}
