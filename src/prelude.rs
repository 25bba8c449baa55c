pub use crate::builder::{Cache, CacheBuilder, PolicyKind};
#[cfg(feature = "concurrency")]
pub use crate::concurrent::{LockedCache, ShardedCache};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
pub use crate::policy::arc::ArcCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_k::LrukCache;
pub use crate::traits::{CachePolicy, CoreCache, MutableCache};
