//! Free-list index allocator for pooled collections.
//!
//! [`MemoryRecycler`] runs parallel to a host `Vec` and hands out stable
//! integer indices. Deleted indices are threaded into a singly linked free
//! list stored in the jump table itself, so deleting and recycling never
//! allocates and never moves other live slots.
//!
//! # Slot states
//!
//! - **live** – the jump slot holds [`INVALID_INDEX`]
//! - **deleted** – the jump slot holds the next deleted index, or its own
//!   index when it is the tail of the free list
//!
//! # Usage
//!
//! ```
//! use cadence::recycler::MemoryRecycler;
//!
//! let mut slots: Vec<Option<&str>> = Vec::new();
//! let mut recycler = MemoryRecycler::new();
//!
//! let a = recycler.allocate();
//! slots.push(Some("a"));
//! recycler.delete(a);
//! slots[a] = None;
//!
//! assert!(recycler.can_recycle());
//! let b = recycler.recycle();
//! assert_eq!(a, b);
//! ```
//!
//! Misuse (double deletion, recycling with an empty free list, allocating
//! while a deleted slot is waiting) is a caller bug and panics.

/// Marker stored in the jump table for live slots.
pub const INVALID_INDEX: usize = usize::MAX;

/// Index allocator with a LIFO free list threaded through its jump table.
#[derive(Debug, Clone)]
pub struct MemoryRecycler {
    deleted_jump_table: Vec<usize>,
    /// Head of the free list (most recently deleted).
    last_deleted: usize,
    /// Tail of the free list (oldest deleted still waiting).
    first_deleted: usize,
    num_allocated: usize,
}

impl Default for MemoryRecycler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecycler {
    pub fn new() -> Self {
        Self {
            deleted_jump_table: Vec::new(),
            last_deleted: INVALID_INDEX,
            first_deleted: INVALID_INDEX,
            num_allocated: 0,
        }
    }

    /// Append a new live slot and return its index.
    ///
    /// # Panics
    ///
    /// Panics if a deleted slot is available; call [`recycle`](Self::recycle)
    /// first.
    pub fn allocate(&mut self) -> usize {
        assert!(
            !self.can_recycle(),
            "MemoryRecycler::allocate called while index {} is waiting to be recycled",
            self.last_deleted
        );
        self.deleted_jump_table.push(INVALID_INDEX);
        self.num_allocated += 1;
        self.deleted_jump_table.len() - 1
    }

    /// Pop the most recently deleted index and mark it live again.
    ///
    /// # Panics
    ///
    /// Panics if the free list is empty.
    pub fn recycle(&mut self) -> usize {
        assert!(
            self.can_recycle(),
            "MemoryRecycler::recycle called with an empty free list"
        );
        let index = self.last_deleted;
        let next = self.deleted_jump_table[index];
        if next == index {
            self.last_deleted = INVALID_INDEX;
            self.first_deleted = INVALID_INDEX;
        } else {
            self.last_deleted = next;
        }
        self.deleted_jump_table[index] = INVALID_INDEX;
        self.num_allocated += 1;
        index
    }

    /// Recycle a deleted index if one is waiting, otherwise allocate a new one.
    pub fn acquire(&mut self) -> usize {
        if self.can_recycle() {
            self.recycle()
        } else {
            self.allocate()
        }
    }

    /// Push a live index onto the free list.
    ///
    /// # Panics
    ///
    /// Panics if `index` was never allocated or is already deleted.
    pub fn delete(&mut self, index: usize) {
        assert!(
            index < self.deleted_jump_table.len(),
            "MemoryRecycler::delete: index {index} was never allocated"
        );
        assert!(
            self.deleted_jump_table[index] == INVALID_INDEX,
            "MemoryRecycler::delete: index {index} deleted twice"
        );
        if self.last_deleted == INVALID_INDEX {
            // Tail of the list points at itself.
            self.deleted_jump_table[index] = index;
            self.first_deleted = index;
        } else {
            self.deleted_jump_table[index] = self.last_deleted;
        }
        self.last_deleted = index;
        self.num_allocated -= 1;
    }

    /// Returns `true` if `index` currently sits in the free list.
    ///
    /// # Panics
    ///
    /// Panics if `index` was never allocated.
    pub fn is_deleted(&self, index: usize) -> bool {
        assert!(
            index < self.deleted_jump_table.len(),
            "MemoryRecycler::is_deleted: index {index} was never allocated"
        );
        self.deleted_jump_table[index] != INVALID_INDEX
    }

    /// Returns `true` if the free list is non-empty.
    pub fn can_recycle(&self) -> bool {
        self.last_deleted != INVALID_INDEX
    }

    /// Number of currently live indices.
    pub fn allocation_total(&self) -> usize {
        self.num_allocated
    }

    /// Number of slots ever handed out (live + deleted).
    pub fn slot_count(&self) -> usize {
        self.deleted_jump_table.len()
    }

    /// Oldest deleted index still waiting in the free list.
    pub fn oldest_deleted(&self) -> Option<usize> {
        (self.first_deleted != INVALID_INDEX).then_some(self.first_deleted)
    }

    /// Forget every slot.
    pub fn clear(&mut self) {
        self.deleted_jump_table.clear();
        self.last_deleted = INVALID_INDEX;
        self.first_deleted = INVALID_INDEX;
        self.num_allocated = 0;
    }
}
