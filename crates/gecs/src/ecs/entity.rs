//! # Entity — Lightweight Identifiers for Game Objects
//!
//! An [`Entity`] is just a number: it doesn't "contain" anything. The
//! [`World`](super::world::World) maps entities to their components.
//!
//! ## Design: Generational Indices
//!
//! Recycling indices naively breaks saved handles:
//!
//! ```text
//! 1. Create entity #5
//! 2. Store a reference: saved = Entity(5)
//! 3. Destroy entity #5
//! 4. Create a new entity, which gets recycled index #5
//! 5. Use `saved`: it now refers to the wrong entity!
//! ```
//!
//! Each index is therefore paired with a **generation** that is bumped when
//! the slot is released:
//!
//! ```text
//! Entity { index: 5, generation: 0 }  ← original
//! Entity { index: 5, generation: 1 }  ← after recycle
//! ```
//!
//! The stale handle still says `generation: 0`, so lookups fail safely.
//!
//! The allocation itself lives in [`GenerationalPool`]; [`EntityTable`] is the
//! entity-typed layer on top of it, and is also the only place that knows
//! which entities are alive.

use std::fmt;

use super::pool::{GenerationalPool, Handle};
use crate::error::{EcsError, Result};

/// A lightweight handle to an entity in the [`World`](super::world::World).
///
/// An `Entity` is only meaningful for the world that created it, and only
/// while its generation matches. Handles are `Copy` and safe to hold
/// indefinitely; check [`World::is_alive`](super::world::World::is_alive)
/// before trusting one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    /// Slot index. Recycled when the entity is destroyed.
    pub(crate) index: u32,
    /// Generation of the slot at creation time.
    pub(crate) generation: u32,
}

impl Entity {
    /// The explicit "no entity" handle.
    pub const INVALID: Entity = Entity {
        index: u32::MAX,
        generation: u32::MAX,
    };

    #[cfg(test)]
    pub(crate) fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the raw slot index. Dense in `[0, capacity)`.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation.
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Returns `false` only for [`Entity::INVALID`]. Liveness is a question
    /// for the world, not the handle.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl From<Handle> for Entity {
    fn from(handle: Handle) -> Self {
        Entity {
            index: handle.index,
            generation: handle.generation,
        }
    }
}

impl From<Entity> for Handle {
    fn from(entity: Entity) -> Self {
        Handle {
            index: entity.index,
            generation: entity.generation,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Entity lifecycle on top of a fixed-capacity [`GenerationalPool`].
#[derive(Debug)]
pub(crate) struct EntityTable {
    pool: GenerationalPool,
}

impl EntityTable {
    pub fn new(capacity: u32) -> Self {
        Self {
            pool: GenerationalPool::new(capacity),
        }
    }

    /// Create a new entity, or report that every slot is taken.
    pub fn create(&mut self) -> Result<Entity> {
        let handle = self.pool.allocate();
        if !handle.is_valid() {
            return Err(EcsError::EntityPoolExhausted {
                capacity: self.pool.capacity(),
            });
        }
        Ok(handle.into())
    }

    /// Retire an entity. Fails with [`EcsError::StaleHandle`] if it is
    /// already dead.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        self.pool.release(entity.into())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.pool.is_valid(entity.into())
    }

    pub fn capacity(&self) -> u32 {
        self.pool.capacity()
    }

    /// Number of alive entities.
    pub fn len(&self) -> usize {
        self.pool.used_count() as usize
    }

    #[cfg(feature = "diagnostics")]
    pub fn free_count(&self) -> usize {
        self.pool.free_count() as usize
    }

    /// Iterate alive entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.pool.iter_live().map(Entity::from)
    }
}
