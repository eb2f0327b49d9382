//! # Generational Pool — Fixed-Capacity Handle Allocation
//!
//! A [`GenerationalPool`] hands out [`Handle`]s: an index paired with the
//! slot's current generation. Releasing a handle bumps its slot's generation,
//! so every outstanding copy of the old handle becomes permanently stale even
//! after the index is reused.
//!
//! ## Memory Layout
//!
//! ```text
//! capacity:    4
//! generations: [0, 1, 0, 0]   ← one generation per slot, pre-allocated
//! occupied:    [1, 0, 1, 0]
//! free:        [3, 1]         ← LIFO stack, top is the next index handed out
//! ```
//!
//! Unlike a growable allocator, the capacity is fixed at construction. When
//! the free stack is empty, [`allocate`](GenerationalPool::allocate) returns
//! [`Handle::INVALID`] and the caller decides what to do.

use crate::error::{EcsError, Result};

/// An index plus the generation it was issued with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    pub index: u32,
    pub generation: u32,
}

impl Handle {
    /// The explicit "no handle" value returned by an exhausted pool.
    pub const INVALID: Handle = Handle {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Returns `false` only for [`Handle::INVALID`]. Says nothing about
    /// whether the handle is still current in its pool.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Fixed-capacity allocator of generational handles.
#[derive(Debug)]
pub struct GenerationalPool {
    generations: Vec<u32>,
    occupied: Vec<bool>,
    /// Indices available for allocation; the top of the stack is popped first.
    free: Vec<u32>,
}

impl GenerationalPool {
    /// Create a pool with `capacity` slots. A fresh pool hands out index 0
    /// first, then 1, and so on.
    pub fn new(capacity: u32) -> Self {
        Self {
            generations: vec![0; capacity as usize],
            occupied: vec![false; capacity as usize],
            free: (0..capacity).rev().collect(),
        }
    }

    /// Pop a free index and pair it with the slot's generation. Returns
    /// [`Handle::INVALID`] when every slot is in use.
    pub fn allocate(&mut self) -> Handle {
        let Some(index) = self.free.pop() else {
            return Handle::INVALID;
        };
        self.occupied[index as usize] = true;
        Handle {
            index,
            generation: self.generations[index as usize],
        }
    }

    /// Release a handle, invalidating every copy of it and recycling its index.
    ///
    /// Releasing a stale handle (including a second release of the same
    /// handle) is reported as [`EcsError::StaleHandle`] and changes nothing.
    pub fn release(&mut self, handle: Handle) -> Result<()> {
        if !self.is_valid(handle) {
            return Err(EcsError::StaleHandle {
                index: handle.index,
                generation: handle.generation,
            });
        }
        let idx = handle.index as usize;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.occupied[idx] = false;
        self.free.push(handle.index);
        Ok(())
    }

    /// Is this handle current: in range, allocated, and of the slot's
    /// present generation?
    pub fn is_valid(&self, handle: Handle) -> bool {
        if !handle.is_valid() {
            return false;
        }
        let idx = handle.index as usize;
        idx < self.generations.len()
            && self.occupied[idx]
            && self.generations[idx] == handle.generation
    }

    pub fn capacity(&self) -> u32 {
        self.generations.len() as u32
    }

    pub fn free_count(&self) -> u32 {
        self.free.len() as u32
    }

    pub fn used_count(&self) -> u32 {
        self.capacity() - self.free_count()
    }

    /// Iterate every currently allocated handle, in index order.
    pub fn iter_live(&self) -> impl Iterator<Item = Handle> + '_ {
        self.occupied
            .iter()
            .zip(&self.generations)
            .enumerate()
            .filter(|(_, (occupied, _))| **occupied)
            .map(|(index, (_, &generation))| Handle {
                index: index as u32,
                generation,
            })
    }
}
