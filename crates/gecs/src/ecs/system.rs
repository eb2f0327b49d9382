//! # System — Logic Units With Maintained Membership
//!
//! A system declares which components it needs through a [`Signature`]. The
//! [`SystemRegistry`] keeps, for every registered system, the exact set of
//! live entities whose signature is a superset of the system's:
//!
//! ```text
//! member(e)  ⇔  (signature(e) & required) == required
//! ```
//!
//! The set is never recomputed at read time. Every structural change in the
//! world (create, add, remove, destroy) notifies the registry, which updates
//! each set in place. A system that runs every frame therefore just walks its
//! set.
//!
//! ## Registration
//!
//! Systems are keyed by Rust type. Each type gets a dense [`SystemId`] the
//! same way component types get a `ComponentTypeId`; registering a type twice
//! is an error. A system with no signature set yet requires nothing, so it
//! matches every live entity.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};

use super::entity::Entity;
use super::signature::Signature;
use super::world::World;
use crate::error::{EcsError, Result};

/// A unit of logic run against the entities matching its signature.
///
/// `entities` is a snapshot of the membership set taken just before the call,
/// so the system may freely add, remove, or destroy while it runs. Entities
/// it destroys mid-run stay in the snapshot; check
/// [`World::is_alive`] if that matters.
///
/// ```ignore
/// struct Movement { dt: f32 }
///
/// impl System for Movement {
///     fn run(&mut self, world: &mut World, entities: &[Entity]) {
///         for &e in entities {
///             let vel = world.get_component::<Velocity>(e).unwrap().0;
///             world.get_component_mut::<Transform>(e).unwrap().position += vel * self.dt;
///         }
///     }
/// }
/// ```
pub trait System: 'static {
    fn run(&mut self, world: &mut World, entities: &[Entity]);
}

/// Dense id of a registered system type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(u32);

impl SystemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Object-safe wrapper so typed access can downcast without asking every
/// `System` implementor for `as_any` boilerplate.
trait StoredSystem {
    fn run(&mut self, world: &mut World, entities: &[Entity]);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: System> StoredSystem for S {
    fn run(&mut self, world: &mut World, entities: &[Entity]) {
        System::run(self, world, entities);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct SystemEntry {
    name: &'static str,
    /// `None` while the system is checked out by [`World::run_system`].
    system: Option<Box<dyn StoredSystem>>,
    signature: Signature,
    entities: BTreeSet<Entity>,
}

impl SystemEntry {
    fn refresh(&mut self, entity: Entity, entity_signature: &Signature) {
        if entity_signature.contains_all(&self.signature) {
            self.entities.insert(entity);
        } else {
            self.entities.remove(&entity);
        }
    }
}

/// Read-only view of one registration, for diagnostics.
#[cfg(feature = "diagnostics")]
pub(crate) struct SystemInfo<'a> {
    pub id: SystemId,
    pub name: &'static str,
    pub signature: &'a Signature,
    pub entity_count: usize,
}

/// Registered systems, their required signatures, and their membership sets.
#[derive(Default)]
pub(crate) struct SystemRegistry {
    ids: HashMap<TypeId, SystemId>,
    entries: Vec<SystemEntry>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `system` and seed its membership from the live entities.
    pub fn register<S: System>(
        &mut self,
        system: S,
        live: impl Iterator<Item = (Entity, Signature)>,
    ) -> Result<SystemId> {
        let name = std::any::type_name::<S>();
        if self.ids.contains_key(&TypeId::of::<S>()) {
            return Err(EcsError::SystemAlreadyRegistered(name));
        }
        let id = SystemId(self.entries.len() as u32);
        let mut entry = SystemEntry {
            name,
            system: Some(Box::new(system)),
            signature: Signature::EMPTY,
            entities: BTreeSet::new(),
        };
        for (entity, signature) in live {
            entry.refresh(entity, &signature);
        }
        self.ids.insert(TypeId::of::<S>(), id);
        self.entries.push(entry);
        log::debug!("Registered system `{name}` as id {}", id.0);
        Ok(id)
    }

    /// Replace `S`'s required signature and rebuild its membership set.
    pub fn set_signature<S: System>(
        &mut self,
        signature: Signature,
        live: impl Iterator<Item = (Entity, Signature)>,
    ) -> Result<()> {
        let id = self.id_of::<S>()?;
        let entry = &mut self.entries[id.index()];
        entry.signature = signature;
        entry.entities.clear();
        for (entity, entity_signature) in live {
            entry.refresh(entity, &entity_signature);
        }
        log::debug!(
            "System `{}` now requires {:?} ({} matching entities)",
            entry.name,
            signature,
            entry.entities.len()
        );
        Ok(())
    }

    /// Re-evaluate `entity` against every system after its signature changed.
    pub fn entity_signature_changed(&mut self, entity: Entity, signature: &Signature) {
        for entry in &mut self.entries {
            entry.refresh(entity, signature);
        }
    }

    /// Drop `entity` from every membership set.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for entry in &mut self.entries {
            entry.entities.remove(&entity);
        }
    }

    pub fn id_of<S: System>(&self) -> Result<SystemId> {
        self.ids
            .get(&TypeId::of::<S>())
            .copied()
            .ok_or(EcsError::SystemNotRegistered(std::any::type_name::<S>()))
    }

    pub fn entities<S: System>(&self) -> Result<&BTreeSet<Entity>> {
        let id = self.id_of::<S>()?;
        Ok(&self.entries[id.index()].entities)
    }

    pub fn signature<S: System>(&self) -> Result<&Signature> {
        let id = self.id_of::<S>()?;
        Ok(&self.entries[id.index()].signature)
    }

    pub fn get<S: System>(&self) -> Result<&S> {
        let id = self.id_of::<S>()?;
        self.entries[id.index()]
            .system
            .as_ref()
            .and_then(|s| s.as_any().downcast_ref::<S>())
            .ok_or(EcsError::SystemNotRegistered(std::any::type_name::<S>()))
    }

    pub fn get_mut<S: System>(&mut self) -> Result<&mut S> {
        let id = self.id_of::<S>()?;
        self.entries[id.index()]
            .system
            .as_mut()
            .and_then(|s| s.as_any_mut().downcast_mut::<S>())
            .ok_or(EcsError::SystemNotRegistered(std::any::type_name::<S>()))
    }

    /// Check a system out for running, along with a snapshot of its members.
    /// Returns `None` if it is already checked out.
    fn checkout(&mut self, id: SystemId) -> Option<(Box<dyn StoredSystem>, Vec<Entity>)> {
        let entry = self.entries.get_mut(id.index())?;
        let system = entry.system.take()?;
        Some((system, entry.entities.iter().copied().collect()))
    }

    fn checkin(&mut self, id: SystemId, system: Box<dyn StoredSystem>) {
        self.entries[id.index()].system = Some(system);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(feature = "diagnostics")]
    pub fn iter(&self) -> impl Iterator<Item = SystemInfo<'_>> {
        self.entries.iter().enumerate().map(|(i, entry)| SystemInfo {
            id: SystemId(i as u32),
            name: entry.name,
            signature: &entry.signature,
            entity_count: entry.entities.len(),
        })
    }
}

impl World {
    /// Run one system against a snapshot of its membership set.
    pub fn run_system<S: System>(&mut self) -> Result<()> {
        let id = self.systems.id_of::<S>()?;
        self.run_system_by_id(id);
        Ok(())
    }

    /// Run every registered system once, in registration order.
    pub fn run_systems(&mut self) {
        for i in 0..self.systems.len() {
            self.run_system_by_id(SystemId(i as u32));
        }
    }

    fn run_system_by_id(&mut self, id: SystemId) {
        // A system that runs itself re-entrantly finds its slot empty.
        let Some((mut system, entities)) = self.systems.checkout(id) else {
            log::warn!("System {} is already running, skipping nested run", id.0);
            return;
        };
        system.run(self, &entities);
        self.systems.checkin(id, system);
    }
}
