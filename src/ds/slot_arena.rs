//! Slot storage addressed by [`SlotId`].
//!
//! Vacant slots form a free chain threaded through the slots themselves, so
//! the most recently freed slot is reused first. An id is only meaningful
//! until its slot is removed.

/// Handle to an occupied slot in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

/// Arena with O(1) insert, remove and lookup.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        self.len += 1;
        match self.free_head {
            Some(idx) => {
                if let Slot::Vacant { next_free } = self.slots[idx] {
                    self.free_head = next_free;
                }
                self.slots[idx] = Slot::Occupied(value);
                SlotId(idx)
            },
            None => {
                self.slots.push(Slot::Occupied(value));
                SlotId(self.slots.len() - 1)
            },
        }
    }

    /// Frees the slot and returns its value; `None` if it was already vacant.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        self.free_head = Some(id.0);
        self.len -= 1;
        match std::mem::replace(slot, vacant) {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        match self.slots.get(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slots.get_mut(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| match slot {
                Slot::Occupied(value) => Some((SlotId(idx), value)),
                Slot::Vacant { .. } => None,
            })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| match slot {
                Slot::Occupied(value) => Some((SlotId(idx), value)),
                Slot::Vacant { .. } => None,
            })
    }
}
