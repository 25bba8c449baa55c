//! Frequency buckets for O(1) LFU tracking.
//!
//! Holds entries (key, value, access count) grouped into one doubly linked
//! list per occupied frequency. Buckets are chained in ascending frequency
//! order and `min_freq` points at the lowest one, so the eviction candidate
//! is always the tail of the `min_freq` bucket.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                      FrequencyBuckets<K, V> Layout                          │
//! │                                                                             │
//! │   ┌─────────────────────────────┐   ┌─────────────────────────────────┐   │
//! │   │ index: FxHashMap<K, SlotId> │   │ entries: SlotArena<Entry<K, V>> │   │
//! │   │                             │   │                                 │   │
//! │   │  "page_a" ── id_0 ──────────┼───┼──► id_0 { freq:2, tick:7, .. } │   │
//! │   │  "page_b" ── id_1 ──────────┼───┼──► id_1 { freq:1, tick:3, .. } │   │
//! │   │  "page_c" ── id_2 ──────────┼───┼──► id_2 { freq:1, tick:5, .. } │   │
//! │   └─────────────────────────────┘   └─────────────────────────────────┘   │
//! │                                                                             │
//! │   buckets: FxHashMap<u64, Bucket>                                           │
//! │                                                                             │
//! │   min_freq = 1                                                              │
//! │   freq=1: head ──► [id_2] ◄──► [id_1] ◄── tail                             │
//! │                      MRU          LRU (evict first)                        │
//! │   freq=2: head ──► [id_0] ◄── tail                                         │
//! │                                                                             │
//! │   freq=1 ──next──► freq=2                                                   │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation      | Time       | Notes                                    |
//! |----------------|------------|------------------------------------------|
//! | `insert`       | O(1)       | New key starts at freq=1, MRU of bucket  |
//! | `touch`        | O(1)       | freq+1, MRU of the new bucket            |
//! | `remove`       | O(1)       |                                          |
//! | `pop_min`      | O(1)       | LRU of the lowest-frequency bucket       |
//! | `decay_halve`  | O(n log n) | Halve all counts, keep relative recency  |
//!
//! Every insert and touch stamps the entry with a monotonically increasing
//! tick. `decay_halve` replays entries in tick order, so recency within each
//! new bucket matches recency before the rebuild.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::ds::FrequencyBuckets;
//!
//! let mut freq = FrequencyBuckets::new();
//! freq.insert("a", 1);
//! freq.insert("b", 2);
//! freq.insert("c", 3);
//! freq.touch(&"a");
//!
//! assert_eq!(freq.frequency(&"a"), Some(2));
//! assert_eq!(freq.pop_min(), Some(("b", 2, 1)));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

/// Link fields come first; they are touched on every bucket move.
#[derive(Debug)]
#[repr(C)]
struct Entry<K, V> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    freq: u64,
    tick: u64,
    key: K,
    value: V,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    prev: Option<u64>,
    next: Option<u64>,
}

/// LFU bookkeeping: entries bucketed by access count with per-bucket recency.
#[derive(Debug)]
pub struct FrequencyBuckets<K, V> {
    entries: SlotArena<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
    clock: u64,
}

impl<K, V> FrequencyBuckets<K, V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates buckets with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
            clock: 0,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the access count of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| entry.freq)
    }

    /// Returns the lowest occupied frequency.
    pub fn min_freq(&self) -> Option<u64> {
        (self.min_freq != 0).then_some(self.min_freq)
    }

    /// Returns the value of `key` without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| &entry.value)
    }

    /// Returns a mutable value reference without counting an access.
    pub fn peek_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = *self.index.get(key)?;
        self.entries.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Returns the current eviction candidate without removing it.
    pub fn peek_min(&self) -> Option<(&K, &V, u64)> {
        let id = self.buckets.get(&self.min_freq)?.tail?;
        self.entries
            .get(id)
            .map(|entry| (&entry.key, &entry.value, entry.freq))
    }

    /// Iterates all entries as `(key, value, freq)` in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V, u64)> {
        self.entries
            .iter()
            .map(|(_, entry)| (&entry.key, &entry.value, entry.freq))
    }

    /// Inserts `key` at frequency 1; returns `false` if it is already tracked.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let tick = self.next_tick();
        let id = self.entries.insert(Entry {
            prev: None,
            next: None,
            freq: 1,
            tick,
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        if !self.buckets.contains_key(&1) {
            let next = (self.min_freq != 0).then_some(self.min_freq);
            self.insert_bucket(1, None, next);
        }
        self.list_push_front(1, id);
        self.min_freq = 1;
        true
    }

    /// Counts one access to `key`.
    ///
    /// Moves the entry to the MRU end of the `freq + 1` bucket and returns the
    /// new frequency together with the value. A count already at `u64::MAX`
    /// only refreshes recency.
    pub fn touch(&mut self, key: &K) -> Option<(u64, &mut V)> {
        let id = *self.index.get(key)?;
        let current_freq = self.entries.get(id)?.freq;
        let tick = self.next_tick();

        let new_freq = if current_freq == u64::MAX {
            self.list_remove(current_freq, id)?;
            self.list_push_front(current_freq, id);
            current_freq
        } else {
            let next_freq = current_freq + 1;
            let (prev_freq, next_existing) = {
                let bucket = self.buckets.get(&current_freq)?;
                (bucket.prev, bucket.next)
            };

            self.list_remove(current_freq, id)?;
            let bucket_empty = self.bucket_is_empty(current_freq);
            if bucket_empty {
                self.remove_bucket(current_freq, prev_freq, next_existing);
                if self.min_freq == current_freq {
                    self.min_freq = next_existing.unwrap_or(0);
                }
            }

            if !self.buckets.contains_key(&next_freq) {
                let prev = if bucket_empty {
                    prev_freq
                } else {
                    Some(current_freq)
                };
                self.insert_bucket(next_freq, prev, next_existing);
            }
            self.list_push_front(next_freq, id);
            if self.min_freq == 0 || next_freq < self.min_freq {
                self.min_freq = next_freq;
            }
            next_freq
        };

        let entry = self.entries.get_mut(id)?;
        entry.freq = new_freq;
        entry.tick = tick;
        Some((new_freq, &mut entry.value))
    }

    /// Removes `key`, returning its value and last frequency.
    pub fn remove(&mut self, key: &K) -> Option<(V, u64)> {
        let id = self.index.remove(key)?;
        let freq = self.entries.get(id)?.freq;
        self.unlink(freq, id)?;
        self.entries.remove(id).map(|entry| (entry.value, entry.freq))
    }

    /// Removes and returns the LRU entry of the lowest-frequency bucket.
    pub fn pop_min(&mut self) -> Option<(K, V, u64)> {
        let freq = self.min_freq;
        if freq == 0 {
            return None;
        }
        let id = self.buckets.get(&freq)?.tail?;
        self.unlink(freq, id)?;
        let entry = self.entries.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value, entry.freq))
    }

    /// Halves every frequency (floor 1) and returns the new sum of counts.
    ///
    /// Buckets are rebuilt by replaying entries oldest tick first, so the
    /// relative recency of entries landing in the same bucket is preserved.
    pub fn decay_halve(&mut self) -> u64 {
        if self.is_empty() {
            return 0;
        }

        let mut order: Vec<(u64, SlotId)> = Vec::with_capacity(self.len());
        let mut freqs: Vec<u64> = Vec::new();
        let mut total = 0u64;
        for (id, entry) in self.entries.iter_mut() {
            entry.freq = (entry.freq / 2).max(1);
            entry.prev = None;
            entry.next = None;
            total = total.saturating_add(entry.freq);
            order.push((entry.tick, id));
            freqs.push(entry.freq);
        }
        order.sort_unstable_by_key(|(tick, _)| *tick);
        freqs.sort_unstable();
        freqs.dedup();

        // Buckets are created lowest first, so each links to the one before.
        self.buckets.clear();
        let mut prev = None;
        for &freq in &freqs {
            self.insert_bucket(freq, prev, None);
            prev = Some(freq);
        }
        self.min_freq = freqs.first().copied().unwrap_or(0);

        for (_, id) in order {
            if let Some(freq) = self.entries.get(id).map(|entry| entry.freq) {
                self.list_push_front(freq, id);
            }
        }
        total
    }

    /// Clears all entries and buckets.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
        self.clock = 0;
    }

    /// Checks bucket chaining, per-bucket links and the index bijection.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "frequency entries {} != index {}",
                self.len(),
                self.index.len()
            )));
        }

        if self.is_empty() {
            if !self.buckets.is_empty() || self.min_freq != 0 {
                return Err(InvariantError::new("empty buckets still hold state"));
            }
            return Ok(());
        }

        if !self.buckets.contains_key(&self.min_freq) {
            return Err(InvariantError::new(format!(
                "min_freq {} has no bucket",
                self.min_freq
            )));
        }

        let mut seen = 0usize;
        for (&freq, bucket) in &self.buckets {
            if freq < self.min_freq {
                return Err(InvariantError::new(format!(
                    "bucket {} below min_freq {}",
                    freq, self.min_freq
                )));
            }
            match bucket.prev {
                Some(prev) => {
                    if self.buckets.get(&prev).and_then(|b| b.next) != Some(freq) {
                        return Err(InvariantError::new(format!(
                            "bucket {} prev link broken",
                            freq
                        )));
                    }
                },
                None if freq != self.min_freq => {
                    return Err(InvariantError::new(format!(
                        "bucket {} has no predecessor but is not min",
                        freq
                    )));
                },
                None => {},
            }

            let mut current = bucket.head;
            let mut last = None;
            let mut count = 0usize;
            while let Some(id) = current {
                let entry = self
                    .entries
                    .get(id)
                    .ok_or_else(|| InvariantError::new("bucket references freed slot"))?;
                if entry.freq != freq || entry.prev != last {
                    return Err(InvariantError::new(format!(
                        "entry {:?} misplaced in bucket {}",
                        id, freq
                    )));
                }
                if self.index.get(&entry.key) != Some(&id) {
                    return Err(InvariantError::new("index disagrees with bucket entry"));
                }
                if let Some(prev_id) = last {
                    let newer = self.entries.get(prev_id).map(|e| e.tick);
                    if newer.is_some_and(|t| t < entry.tick) {
                        return Err(InvariantError::new(format!(
                            "bucket {} not ordered by recency",
                            freq
                        )));
                    }
                }
                last = Some(id);
                current = entry.next;
                count += 1;
                if count > self.len() {
                    return Err(InvariantError::new("cycle in frequency bucket"));
                }
            }
            if bucket.tail != last || count == 0 {
                return Err(InvariantError::new(format!(
                    "bucket {} tail or emptiness wrong",
                    freq
                )));
            }
            seen += count;
        }

        if seen != self.len() {
            return Err(InvariantError::new(format!(
                "buckets hold {} entries, arena {}",
                seen,
                self.len()
            )));
        }
        Ok(())
    }

    fn next_tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn unlink(&mut self, freq: u64, id: SlotId) -> Option<()> {
        self.list_remove(freq, id)?;
        if self.bucket_is_empty(freq) {
            let (prev, next) = {
                let bucket = self.buckets.get(&freq)?;
                (bucket.prev, bucket.next)
            };
            self.remove_bucket(freq, prev, next);
            if self.min_freq == freq {
                self.min_freq = next.unwrap_or(0);
            }
        }
        Some(())
    }

    fn bucket_is_empty(&self, freq: u64) -> bool {
        self.buckets
            .get(&freq)
            .map(|bucket| bucket.head.is_none())
            .unwrap_or(true)
    }

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                head: None,
                tail: None,
                prev,
                next,
            },
        );
        if let Some(prev_bucket) = prev.and_then(|p| self.buckets.get_mut(&p)) {
            prev_bucket.next = Some(freq);
        }
        if let Some(next_bucket) = next.and_then(|n| self.buckets.get_mut(&n)) {
            next_bucket.prev = Some(freq);
        }
    }

    fn remove_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        if let Some(prev_bucket) = prev.and_then(|p| self.buckets.get_mut(&p)) {
            prev_bucket.next = next;
        }
        if let Some(next_bucket) = next.and_then(|n| self.buckets.get_mut(&n)) {
            next_bucket.prev = prev;
        }
        self.buckets.remove(&freq);
    }

    fn list_push_front(&mut self, freq: u64, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return;
        };

        let old_head = bucket.head;
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(old_head) => {
                if let Some(entry) = self.entries.get_mut(old_head) {
                    entry.prev = Some(id);
                }
            },
            None => bucket.tail = Some(id),
        }
        bucket.head = Some(id);
    }

    fn list_remove(&mut self, freq: u64, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let entry = self.entries.get(id)?;
            (entry.prev, entry.next)
        };

        let bucket = self.buckets.get_mut(&freq)?;
        match prev {
            Some(prev) => {
                if let Some(entry) = self.entries.get_mut(prev) {
                    entry.next = next;
                }
            },
            None => bucket.head = next,
        }
        match next {
            Some(next) => {
                if let Some(entry) = self.entries.get_mut(next) {
                    entry.prev = prev;
                }
            },
            None => bucket.tail = prev,
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
        Some(())
    }
}

impl<K, V> Default for FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod basic_behavior {
        use super::super::*;

        #[test]
        fn insert_starts_at_one() {
            let mut freq = FrequencyBuckets::new();
            assert!(freq.insert("a", 10));
            assert!(!freq.insert("a", 11));
            assert_eq!(freq.frequency(&"a"), Some(1));
            assert_eq!(freq.peek(&"a"), Some(&10));
            assert_eq!(freq.min_freq(), Some(1));
            freq.check_invariants().unwrap();
        }

        #[test]
        fn touch_moves_up_one_bucket() {
            let mut freq = FrequencyBuckets::new();
            freq.insert("a", 1);
            freq.insert("b", 2);

            let (count, value) = freq.touch(&"a").unwrap();
            assert_eq!(count, 2);
            *value = 100;

            assert_eq!(freq.peek(&"a"), Some(&100));
            assert_eq!(freq.min_freq(), Some(1));
            assert!(freq.touch(&"missing").is_none());
            freq.check_invariants().unwrap();
        }

        #[test]
        fn pop_min_takes_lru_of_lowest_bucket() {
            let mut freq = FrequencyBuckets::new();
            freq.insert("a", 1);
            freq.insert("b", 2);
            freq.insert("c", 3);
            freq.touch(&"a");

            assert_eq!(freq.peek_min().map(|(k, _, _)| *k), Some("b"));
            assert_eq!(freq.pop_min(), Some(("b", 2, 1)));
            assert_eq!(freq.pop_min(), Some(("c", 3, 1)));
            assert_eq!(freq.pop_min(), Some(("a", 1, 2)));
            assert_eq!(freq.pop_min(), None);
            assert_eq!(freq.min_freq(), None);
            freq.check_invariants().unwrap();
        }

        #[test]
        fn remove_updates_min_freq() {
            let mut freq = FrequencyBuckets::new();
            freq.insert("a", 1);
            freq.insert("b", 2);
            freq.touch(&"b");

            assert_eq!(freq.remove(&"a"), Some((1, 1)));
            assert_eq!(freq.min_freq(), Some(2));
            assert_eq!(freq.remove(&"a"), None);
            freq.check_invariants().unwrap();
        }

        #[test]
        fn clear_resets_everything() {
            let mut freq = FrequencyBuckets::new();
            freq.insert(1, ());
            freq.insert(2, ());
            freq.clear();
            assert!(freq.is_empty());
            assert_eq!(freq.min_freq(), None);
            freq.check_invariants().unwrap();
        }
    }

    mod decay {
        use super::super::*;

        #[test]
        fn halves_with_floor_one() {
            let mut freq = FrequencyBuckets::new();
            freq.insert("a", ());
            freq.insert("b", ());
            freq.insert("c", ());
            for _ in 0..9 {
                freq.touch(&"a");
            }
            for _ in 0..3 {
                freq.touch(&"b");
            }

            let total = freq.decay_halve();
            assert_eq!(freq.frequency(&"a"), Some(5));
            assert_eq!(freq.frequency(&"b"), Some(2));
            assert_eq!(freq.frequency(&"c"), Some(1));
            assert_eq!(total, 8);
            freq.check_invariants().unwrap();
        }

        #[test]
        fn preserves_recency_within_merged_bucket() {
            let mut freq = FrequencyBuckets::new();
            freq.insert("old", ());
            freq.insert("new", ());
            freq.touch(&"old");
            freq.touch(&"old");
            freq.touch(&"new");
            // old=3 (touched before new), new=2; both halve to 1.
            freq.decay_halve();
            assert_eq!(freq.frequency(&"old"), Some(1));
            assert_eq!(freq.frequency(&"new"), Some(1));
            assert_eq!(freq.pop_min().map(|(k, _, _)| k), Some("old"));
            freq.check_invariants().unwrap();
        }

        #[test]
        fn rebuilds_many_buckets_in_ascending_order() {
            let mut freq = FrequencyBuckets::new();
            for key in 0..20u64 {
                freq.insert(key, ());
                for _ in 0..2 * key {
                    freq.touch(&key);
                }
            }
            // key k sits at 2k + 1 and halves to max(k, 1)
            freq.decay_halve();
            freq.check_invariants().unwrap();
            assert_eq!(freq.min_freq(), Some(1));

            let popped: Vec<(u64, u64)> = std::iter::from_fn(|| freq.pop_min())
                .map(|(key, _, count)| (key, count))
                .collect();
            let expected: Vec<(u64, u64)> = (0..20).map(|key| (key, key.max(1))).collect();
            assert_eq!(popped, expected);
        }

        #[test]
        fn empty_decay_is_zero() {
            let mut freq: FrequencyBuckets<u32, ()> = FrequencyBuckets::new();
            assert_eq!(freq.decay_halve(), 0);
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8),
        Touch(u8),
        Remove(u8),
        PopMin,
        Decay,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..32).prop_map(Op::Insert),
            4 => (0u8..32).prop_map(Op::Touch),
            1 => (0u8..32).prop_map(Op::Remove),
            1 => Just(Op::PopMin),
            1 => Just(Op::Decay),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_for_random_ops(ops in proptest::collection::vec(op_strategy(), 0..300)) {
            let mut freq = FrequencyBuckets::new();
            for op in ops {
                match op {
                    Op::Insert(k) => { freq.insert(k, u32::from(k)); },
                    Op::Touch(k) => { freq.touch(&k); },
                    Op::Remove(k) => { freq.remove(&k); },
                    Op::PopMin => {
                        let expected = freq.min_freq();
                        let popped = freq.pop_min().map(|(_, _, f)| f);
                        prop_assert_eq!(popped, expected);
                    },
                    Op::Decay => {
                        let total = freq.decay_halve();
                        let sum: u64 = freq.iter().map(|(_, _, f)| f).sum();
                        prop_assert_eq!(total, sum);
                    },
                }
                prop_assert!(freq.check_invariants().is_ok());
            }
        }
    }
}
