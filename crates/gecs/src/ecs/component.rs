//! # Component — Packed Per-Type Storage
//!
//! Components are plain data: a `Position`, a `Velocity`, a `Health`. Each
//! component type gets exactly one [`ComponentStore<T>`], a sparse-set style
//! container that keeps every value in one contiguous `Vec<T>`.
//!
//! ## Memory Layout
//!
//! ```text
//! dense:           [pos_a, pos_c, pos_b]    ← Vec<T>, no holes
//! entities:        [a,     c,     b    ]    ← parallel owning entities
//! entity_to_dense: {a.index: 0, c.index: 1, b.index: 2}
//! dense_to_entity: {0: a.index, 1: c.index, 2: b.index}
//! ```
//!
//! ## Swap-Remove
//!
//! Removing from the middle moves the *last* element into the hole and pops
//! the tail, so the arrays never have gaps:
//!
//! ```text
//! remove(a):  dense [pos_b, pos_c]   entities [b, c]
//! ```
//!
//! Both maps are patched for the moved element. The price is that iteration
//! order is not preserved across removals.
//!
//! Values are moved, never boxed one by one. A reference handed out by
//! [`get`](ComponentStore::get) is only good until the next structural
//! change to the store, which the borrow checker enforces for us.

use std::any::Any;
use std::collections::HashMap;

use super::entity::Entity;
use crate::error::{EcsError, Result};

/// Packed storage for a single component type.
pub struct ComponentStore<T> {
    dense: Vec<T>,
    entities: Vec<Entity>,
    /// Entity index → position in `dense`.
    entity_to_dense: HashMap<u32, usize>,
    /// Position in `dense` → entity index.
    dense_to_entity: HashMap<usize, u32>,
}

impl<T: 'static + Send + Sync> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            entity_to_dense: HashMap::new(),
            dense_to_entity: HashMap::new(),
        }
    }

    /// Append a component for `entity`.
    pub fn insert(&mut self, entity: Entity, value: T) -> Result<()> {
        if self.entity_to_dense.contains_key(&entity.index) {
            return Err(EcsError::ComponentAlreadyPresent {
                entity,
                component: std::any::type_name::<T>(),
            });
        }
        let dense = self.dense.len();
        self.entity_to_dense.insert(entity.index, dense);
        self.dense_to_entity.insert(dense, entity.index);
        self.dense.push(value);
        self.entities.push(entity);
        Ok(())
    }

    /// Swap-remove `entity`'s component and return it. `None` if absent.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let dense = self.lookup(entity)?;
        let last = self.dense.len() - 1;

        let value = self.dense.swap_remove(dense);
        self.entities.swap_remove(dense);
        self.entity_to_dense.remove(&entity.index);
        self.dense_to_entity.remove(&last);

        // Something was moved into the hole; point both maps at its new slot.
        if dense < self.entities.len() {
            let moved = self.entities[dense].index;
            self.entity_to_dense.insert(moved, dense);
            self.dense_to_entity.insert(dense, moved);
        }
        Some(value)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.lookup(entity).map(|i| &self.dense[i])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.lookup(entity).map(|i| &mut self.dense[i])
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.lookup(entity).is_some()
    }

    /// Dense list of owning entities, in storage order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate `(owner, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(&self.dense)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Position of `entity_index` in the dense arrays, if stored.
    pub fn dense_index_of(&self, entity_index: u32) -> Option<usize> {
        self.entity_to_dense.get(&entity_index).copied()
    }

    /// Entity index owning dense slot `dense`, if occupied.
    pub fn entity_index_at(&self, dense: usize) -> Option<u32> {
        self.dense_to_entity.get(&dense).copied()
    }

    /// Dense position of `entity`, rejecting a stale handle whose index is
    /// now owned by a newer entity.
    fn lookup(&self, entity: Entity) -> Option<usize> {
        let dense = *self.entity_to_dense.get(&entity.index)?;
        (self.entities[dense] == entity).then_some(dense)
    }
}

impl<T: 'static + Send + Sync> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The type-erased face of a [`ComponentStore<T>`].
///
/// The world keeps one boxed `ErasedStore` per component type id. Cleanup on
/// entity death and query driving go through this trait; typed access
/// downcasts through [`as_any`](ErasedStore::as_any).
pub(crate) trait ErasedStore: Any {
    /// Drop `entity`'s component if this store holds one. Called for every
    /// store when an entity dies, so absence is normal.
    fn entity_destroyed(&mut self, entity: Entity);

    fn contains_entity(&self, entity: Entity) -> bool;

    fn owners(&self) -> &[Entity];

    fn component_count(&self) -> usize;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static + Send + Sync> ErasedStore for ComponentStore<T> {
    fn entity_destroyed(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn owners(&self) -> &[Entity] {
        self.entities()
    }

    fn component_count(&self) -> usize {
        self.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
