//! # Type Registry — Dense Ids for Component Types
//!
//! Every distinct component type gets a small integer id the first time the
//! world sees it. The id indexes the store array and names a bit in every
//! [`Signature`](super::signature::Signature), so lookups are array indexing
//! rather than hashing.
//!
//! The registry is an ordinary value owned by the `World`, not process-wide
//! static state: two worlds (or two tests) never share id assignments.

use std::any::TypeId;
use std::collections::HashMap;

use crate::error::{EcsError, Result};

/// Upper bound on distinct component types per registry. Every signature
/// bitset is this wide.
pub const MAX_COMPONENTS: usize = 128;

/// Dense component type id in `[0, MAX_COMPONENTS)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub(crate) u32);

impl ComponentTypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Assigns and remembers one [`ComponentTypeId`] per Rust type.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    ids: HashMap<TypeId, ComponentTypeId>,
    /// Type names, indexed by id.
    names: Vec<&'static str>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `T`, assigning the next free one on first use.
    ///
    /// Fails once [`MAX_COMPONENTS`] distinct types have been registered. The
    /// failure is recoverable: ids already handed out stay valid.
    pub fn register<T: 'static>(&mut self) -> Result<ComponentTypeId> {
        if let Some(&id) = self.ids.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
        let name = std::any::type_name::<T>();
        if self.names.len() >= MAX_COMPONENTS {
            log::warn!("Component type limit ({MAX_COMPONENTS}) reached, rejecting `{name}`");
            return Err(EcsError::TooManyComponentTypes {
                component: name,
                max: MAX_COMPONENTS,
            });
        }
        let id = ComponentTypeId(self.names.len() as u32);
        self.ids.insert(TypeId::of::<T>(), id);
        self.names.push(name);
        log::debug!("Registered component type `{name}` as id {}", id.0);
        Ok(id)
    }

    /// Look up `T`'s id without assigning one.
    pub fn id_of<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// The type name recorded when `id` was assigned.
    pub fn name_of(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
