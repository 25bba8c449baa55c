//! Bounded key-only recency list.
//!
//! ARC keeps the keys it recently evicted from T1 and T2 in two of these
//! (B1 and B2). A ghost stores no value; it only records that the key was
//! resident a short while ago so a later insert can adapt the target size.
//!
//! ```text
//!   index: FxHashMap<K, SlotId>        list: IntrusiveList<K>
//!   ┌─────────┬─────────┐              head ─► [A] ◄──► [B] ◄──► [C] ◄── tail
//!   │  key A  │  id_1   │                 MRU                       LRU
//!   │  key B  │  id_2   │
//!   └─────────┴─────────┘
//! ```
//!
//! `record` moves an existing key to MRU or inserts it, dropping the LRU key
//! once `capacity` is reached. `pop_lru` lets the owner trim explicitly.
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;

/// Bounded recency list of keys (no values).
#[derive(Debug)]
pub struct GhostList<K> {
    list: IntrusiveList<K>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records `key` as most recently evicted.
    ///
    /// Returns the key that fell off the LRU end to make room, if any.
    pub fn record(&mut self, key: K) -> Option<K> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            return None;
        }

        let dropped = if self.list.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let id = self.list.push_front(key.clone());
        self.index.insert(key, id);
        dropped
    }

    /// Removes and returns the least recently recorded key.
    pub fn pop_lru(&mut self) -> Option<K> {
        let key = self.list.pop_back()?;
        self.index.remove(&key);
        Some(key)
    }

    /// Removes `key`; returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.list.remove(id);
                true
            },
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Iterates keys from MRU to LRU.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.list.iter()
    }

    /// Checks that index and list describe the same bounded key set.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.list.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "ghost list holds {} keys but index has {}",
                self.list.len(),
                self.index.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "ghost list length {} exceeds capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            if self.list.get(id) != Some(key) {
                return Err(InvariantError::new("ghost index points at wrong slot"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_drops_lru() {
        let mut ghost = GhostList::new(2);
        assert_eq!(ghost.record("a"), None);
        assert_eq!(ghost.record("b"), None);

        ghost.record("a");
        assert_eq!(ghost.record("c"), Some("b"));

        assert!(ghost.contains(&"a"));
        assert!(ghost.contains(&"c"));
        assert!(!ghost.contains(&"b"));
        ghost.check_invariants().unwrap();
    }

    #[test]
    fn zero_capacity_is_noop() {
        let mut ghost = GhostList::new(0);
        ghost.record("a");
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&"a"));
        assert_eq!(ghost.pop_lru(), None);
    }

    #[test]
    fn pop_lru_returns_oldest() {
        let mut ghost = GhostList::new(3);
        ghost.record(1);
        ghost.record(2);
        ghost.record(3);
        assert_eq!(ghost.pop_lru(), Some(1));
        assert_eq!(ghost.iter().copied().collect::<Vec<_>>(), vec![3, 2]);
        ghost.check_invariants().unwrap();
    }

    #[test]
    fn remove_and_clear() {
        let mut ghost = GhostList::new(2);
        ghost.record("a");
        ghost.record("b");
        assert!(ghost.remove(&"a"));
        assert!(!ghost.remove(&"missing"));
        assert_eq!(ghost.len(), 1);

        ghost.clear();
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&"b"));
        ghost.check_invariants().unwrap();
    }
}
