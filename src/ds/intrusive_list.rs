//! Recency list over a `SlotArena`.
//!
//! Nodes are linked by [`SlotId`] rather than by pointer, so a caller can
//! keep the id returned from `push_front` in its own index and later move or
//! unlink that node in O(1).
//!
//! ```text
//!   head (MRU)                                   tail (LRU)
//!      │                                             │
//!      ▼                                             ▼
//!   [id_4] ──next──► [id_0] ──next──► [id_2] ──next──► None
//!   None ◄──prev──── [id_4] ◄──prev── [id_0]
//! ```
//!
//! Used for LRU order, the ARC T1/T2 segments and ghost key lists.
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Link<T> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    value: T,
}

/// Doubly linked recency list whose nodes live in a `SlotArena`.
#[derive(Debug)]
pub struct IntrusiveList<T> {
    nodes: SlotArena<Link<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Least recently pushed or moved value.
    pub fn back(&self) -> Option<&T> {
        self.get(self.tail?)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.nodes.get(id).map(|link| &link.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(|link| &mut link.value)
    }

    /// Walks from MRU to LRU.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
        }
    }

    /// Links `value` in as the new MRU node.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.nodes.insert(Link {
            prev: None,
            next: None,
            value,
        });
        self.link_front(id);
        id
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks `id` and frees its slot. Returns `None` for a stale id.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.unlink(id)?;
        self.nodes.remove(id).map(|link| link.value)
    }

    /// Makes `id` the MRU node. Returns `false` for a stale id.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if self.head == Some(id) {
            return true;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.link_front(id);
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Checks that links run head to tail with symmetric `prev` pointers and
    /// that the walk visits every stored node exactly once.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.head.is_none() != self.tail.is_none() {
            return Err(InvariantError::new("list head and tail disagree"));
        }

        let mut visited = 0usize;
        let mut expected_prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let link = self
                .nodes
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("list links to freed slot {:?}", id)))?;
            if link.prev != expected_prev {
                return Err(InvariantError::new(format!(
                    "slot {:?} has prev {:?}, expected {:?}",
                    id, link.prev, expected_prev
                )));
            }
            visited += 1;
            if visited > self.len() {
                return Err(InvariantError::new("list links form a cycle"));
            }
            expected_prev = Some(id);
            cursor = link.next;
        }

        if expected_prev != self.tail {
            return Err(InvariantError::new(format!(
                "walk ended at {:?} but tail is {:?}",
                expected_prev, self.tail
            )));
        }
        if visited != self.len() {
            return Err(InvariantError::new(format!(
                "{} slots stored, {} reachable",
                self.len(),
                visited
            )));
        }
        Ok(())
    }

    fn link_front(&mut self, id: SlotId) {
        let old_head = self.head;
        if let Some(link) = self.nodes.get_mut(id) {
            link.prev = None;
            link.next = old_head;
        }
        match old_head.and_then(|head| self.nodes.get_mut(head)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let link = self.nodes.get_mut(id)?;
        let (prev, next) = (link.prev.take(), link.next.take());

        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(before) => before.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(after) => after.prev = prev,
            None => self.tail = prev,
        }
        Some(())
    }
}

/// Borrowing iterator returned by [`IntrusiveList::iter`].
pub struct Iter<'a, T> {
    nodes: &'a SlotArena<Link<T>>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let link = self.nodes.get(self.cursor?)?;
        self.cursor = link.next;
        Some(&link.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn values<T: Copy>(list: &IntrusiveList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_push_front_puts_newest_first() {
        let mut list = IntrusiveList::with_capacity(3);
        for v in [1, 2, 3] {
            list.push_front(v);
        }
        assert_eq!(values(&list), vec![3, 2, 1]);
        assert_eq!(list.back(), Some(&1));
        list.check_invariants().unwrap();
    }

    #[test]
    fn test_move_to_front_then_pop_back() {
        let mut list = IntrusiveList::with_capacity(0);
        let a = list.push_front('a');
        list.push_front('b');
        list.push_front('c');

        assert!(list.move_to_front(a));
        assert!(list.move_to_front(a));
        assert_eq!(values(&list), vec!['a', 'c', 'b']);
        assert_eq!(list.pop_back(), Some('b'));
        assert_eq!(list.back(), Some(&'c'));
        list.check_invariants().unwrap();
    }

    #[test]
    fn test_stale_id_is_rejected() {
        let mut list = IntrusiveList::with_capacity(0);
        list.push_front(1);
        let mid = list.push_front(2);
        list.push_front(3);

        assert_eq!(list.remove(mid), Some(2));
        assert_eq!(list.remove(mid), None);
        assert!(!list.move_to_front(mid));
        assert_eq!(list.get(mid), None);
        assert_eq!(values(&list), vec![3, 1]);
        list.check_invariants().unwrap();
    }

    #[test]
    fn test_get_mut_and_clear() {
        let mut list = IntrusiveList::with_capacity(2);
        let id = list.push_front(10);
        if let Some(v) = list.get_mut(id) {
            *v += 1;
        }
        assert_eq!(list.get(id), Some(&11));

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.back(), None);
        assert_eq!(list.pop_back(), None);
        list.check_invariants().unwrap();
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(u8),
        PopBack,
        Touch(usize),
        Remove(usize),
    }

    proptest! {
        #[test]
        fn prop_matches_vec_model(
            ops in proptest::collection::vec(
                prop_oneof![
                    3 => any::<u8>().prop_map(Op::Push),
                    1 => Just(Op::PopBack),
                    2 => (0usize..16).prop_map(Op::Touch),
                    1 => (0usize..16).prop_map(Op::Remove),
                ],
                0..200,
            )
        ) {
            let mut list = IntrusiveList::with_capacity(0);
            // front of the model is MRU
            let mut model: Vec<(SlotId, u8)> = Vec::new();

            for op in ops {
                match op {
                    Op::Push(v) => model.insert(0, (list.push_front(v), v)),
                    Op::PopBack => {
                        prop_assert_eq!(list.pop_back(), model.pop().map(|(_, v)| v));
                    },
                    Op::Touch(i) if i < model.len() => {
                        let node = model.remove(i);
                        prop_assert!(list.move_to_front(node.0));
                        model.insert(0, node);
                    },
                    Op::Remove(i) if i < model.len() => {
                        let (id, v) = model.remove(i);
                        prop_assert_eq!(list.remove(id), Some(v));
                    },
                    _ => {},
                }
                let expected: Vec<u8> = model.iter().map(|&(_, v)| v).collect();
                prop_assert_eq!(values(&list), expected);
                prop_assert!(list.check_invariants().is_ok());
            }
        }
    }
}
