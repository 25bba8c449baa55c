//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and export are separate traits so policy code
//! only ever writes counters.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │   every policy
//!   │  get_hit/get_miss/insert    │
//!   │  evict/clear                │
//!   └──────────────┬──────────────┘
//!                  │
//!                  ▼
//!   ┌─────────────────────────────┐
//!   │    PolicyMetricsRecorder    │   LFU aging, LRU-K promotion,
//!   │  promotion/rescale/ghost    │   ARC ghost hits
//!   └─────────────────────────────┘
//!
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (tests, benches, callers)    │    │ (monitoring backends)        │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Common counters for any cache policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Signals specific to the non-LRU policies.
pub trait PolicyMetricsRecorder: CoreMetricsRecorder {
    /// LRU-K moved a history record into the main store.
    fn record_promotion(&mut self);
    /// LFU halved every counter.
    fn record_aging_rescale(&mut self);
    /// ARC saw an insert for a key in B1 or B2.
    fn record_ghost_hit(&mut self);
}

/// Produces a point-in-time copy of an instance's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publishes a snapshot to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
