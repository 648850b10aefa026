//! Fixed-capacity slot arena
//!
//! Beach-line and event-queue nodes refer to each other by [`SlotId`] rather
//! than by pointer. Slots are never released one by one; the whole arena is
//! dropped when its sweep ends.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Typed index of a slot in an [`Arena`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    /// Placeholder for links of a node that is not in any list
    pub const UNLINKED: SlotId = SlotId(u32::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot_{}", self.0)
    }
}

/// Bump-allocated storage with a hard capacity
///
/// The capacity is an upper bound the caller commits to up front; a sweep over
/// N sites allocates at most 2N slots. Exceeding it is a bug in the caller and
/// panics.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<T>,
    capacity: usize,
}

impl<T> Arena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity <= u32::MAX as usize,
            "arena capacity {} does not fit a slot id",
            capacity
        );
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Place `value` in the next free slot
    ///
    /// # Panics
    ///
    /// Panics when the arena is full.
    #[inline]
    pub fn alloc(&mut self, value: T) -> SlotId {
        assert!(
            self.slots.len() < self.capacity,
            "arena exhausted: all {} slots in use",
            self.capacity
        );
        self.slots.push(value);
        SlotId((self.slots.len() - 1) as u32)
    }

    /// Number of slots handed out so far
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ids of all allocated slots, in allocation order
    pub fn ids(&self) -> impl Iterator<Item = SlotId> {
        (0..self.slots.len() as u32).map(SlotId)
    }
}

impl<T> Index<SlotId> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: SlotId) -> &T {
        &self.slots[id.index()]
    }
}

impl<T> IndexMut<SlotId> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, id: SlotId) -> &mut T {
        &mut self.slots[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_index() {
        let mut arena = Arena::with_capacity(3);
        let a = arena.alloc("a");
        let b = arena.alloc("b");

        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.capacity(), 3);

        arena[a] = "c";
        assert_eq!(arena[a], "c");
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(format!("{:?}", b), "slot_1");
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn test_overflow_panics() {
        let mut arena = Arena::with_capacity(1);
        arena.alloc(1u8);
        arena.alloc(2u8);
    }
}
