//! Per-instance cache counters (feature `metrics`).
//!
//! Policies record into a [`CacheMetrics`](metrics_impl::CacheMetrics) held
//! inside the instance, so recording needs no atomics: the instance is either
//! owned by one thread or guarded by the wrapper's lock. Snapshots are plain
//! `Copy` values; sharded caches sum the snapshots of their shards.

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::CacheMetrics;
pub use snapshot::CacheMetricsSnapshot;
pub use traits::{CoreMetricsRecorder, MetricsExporter, MetricsSnapshotProvider, PolicyMetricsRecorder};
