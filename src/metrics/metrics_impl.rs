use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::{CoreMetricsRecorder, PolicyMetricsRecorder};

/// Plain counters embedded in each policy instance.
#[derive(Debug, Default, Clone)]
pub struct CacheMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evictions: u64,
    pub promotions: u64,
    pub aging_rescales: u64,
    pub ghost_hits: u64,
    pub clears: u64,
}

impl CacheMetrics {
    /// Copies the counters and attaches the size gauges.
    pub fn snapshot(&self, len: usize, capacity: usize) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_new: self.insert_new,
            insert_updates: self.insert_updates,
            evictions: self.evictions,
            promotions: self.promotions,
            aging_rescales: self.aging_rescales,
            ghost_hits: self.ghost_hits,
            clears: self.clears,
            cache_len: len,
            capacity,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl CoreMetricsRecorder for CacheMetrics {
    #[inline]
    fn record_get_hit(&mut self) {
        self.get_hits += 1;
    }

    #[inline]
    fn record_get_miss(&mut self) {
        self.get_misses += 1;
    }

    #[inline]
    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    #[inline]
    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    #[inline]
    fn record_evicted_entry(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl PolicyMetricsRecorder for CacheMetrics {
    #[inline]
    fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    #[inline]
    fn record_aging_rescale(&mut self) {
        self.aging_rescales += 1;
    }

    #[inline]
    fn record_ghost_hit(&mut self) {
        self.ghost_hits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_resets() {
        let mut metrics = CacheMetrics::default();
        metrics.record_get_hit();
        metrics.record_get_miss();
        metrics.record_get_miss();
        metrics.record_evicted_entry();
        metrics.record_promotion();

        let snap = metrics.snapshot(3, 8);
        assert_eq!(snap.get_hits, 1);
        assert_eq!(snap.get_misses, 2);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.promotions, 1);
        assert_eq!(snap.cache_len, 3);
        assert_eq!(snap.capacity, 8);

        metrics.reset();
        assert_eq!(metrics.snapshot(0, 8).get_hits, 0);
    }
}
