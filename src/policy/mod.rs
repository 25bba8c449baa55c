//! Eviction policies.
//!
//! Every policy implements [`CoreCache`](crate::traits::CoreCache) and
//! [`MutableCache`](crate::traits::MutableCache) and is single-threaded; wrap
//! one in [`LockedCache`](crate::concurrent::LockedCache) or build a
//! [`ShardedCache`](crate::concurrent::ShardedCache) of them to share it
//! across threads.
//!
//! | Module    | Type          | Evicts                                      |
//! |-----------|---------------|---------------------------------------------|
//! | [`lru`]   | `LruCache`    | least recently used                         |
//! | [`lfu`]   | `LfuCache`    | least frequently used, ties by recency      |
//! | [`lru_k`] | `LrukCache`   | LRU of entries admitted after K accesses    |
//! | [`arc`]   | `ArcCache`    | T1 or T2 LRU, steered by ghost hits         |

pub mod arc;
pub mod lfu;
pub mod lru;
pub mod lru_k;
