use std::ops::{Add, AddAssign};

/// Point-in-time copy of a cache's counters plus size gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_new: u64,
    pub insert_updates: u64,

    pub evictions: u64,
    pub promotions: u64,
    pub aging_rescales: u64,
    pub ghost_hits: u64,
    pub clears: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    pub fn get_calls(&self) -> u64 {
        self.get_hits + self.get_misses
    }

    /// Fraction of lookups that hit, or `0.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let calls = self.get_calls();
        if calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / calls as f64
        }
    }
}

impl AddAssign for CacheMetricsSnapshot {
    fn add_assign(&mut self, rhs: Self) {
        self.get_hits += rhs.get_hits;
        self.get_misses += rhs.get_misses;
        self.insert_new += rhs.insert_new;
        self.insert_updates += rhs.insert_updates;
        self.evictions += rhs.evictions;
        self.promotions += rhs.promotions;
        self.aging_rescales += rhs.aging_rescales;
        self.ghost_hits += rhs.ghost_hits;
        self.clears += rhs.clears;
        self.cache_len += rhs.cache_len;
        self.capacity += rhs.capacity;
    }
}

impl Add for CacheMetricsSnapshot {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_zero_calls() {
        assert_eq!(CacheMetricsSnapshot::default().hit_rate(), 0.0);
        let snap = CacheMetricsSnapshot {
            get_hits: 3,
            get_misses: 1,
            ..Default::default()
        };
        assert!((snap.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn shard_snapshots_sum() {
        let a = CacheMetricsSnapshot {
            get_hits: 1,
            cache_len: 2,
            capacity: 4,
            ..Default::default()
        };
        let b = CacheMetricsSnapshot {
            get_hits: 2,
            evictions: 5,
            cache_len: 1,
            capacity: 3,
            ..Default::default()
        };
        let total = a + b;
        assert_eq!(total.get_hits, 3);
        assert_eq!(total.evictions, 5);
        assert_eq!(total.cache_len, 3);
        assert_eq!(total.capacity, 7);
    }
}
