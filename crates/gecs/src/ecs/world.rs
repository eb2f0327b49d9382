//! # World — The Central Container
//!
//! The [`World`] owns all entities, components, and systems. It's the single
//! source of truth and the only API callers use.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ World                                                    │
//! │                                                          │
//! │  entities:   EntityTable (fixed-capacity generational)   │
//! │  registry:   TypeRegistry   Rust type → ComponentTypeId  │
//! │  stores:     [Option<Box<dyn ErasedStore>>; MAX]         │
//! │                indexed by ComponentTypeId                │
//! │  signatures: Vec<Signature>  indexed by entity index     │
//! │  systems:    SystemRegistry (materialized member sets)   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every structural change keeps three things in step: the store contents,
//! the entity's signature bit, and every system's member set.
//!
//! ## Errors instead of asserts
//!
//! Adding a component twice, reading a missing one, or touching a dead
//! entity returns an [`EcsError`] rather than panicking. Destroying an
//! already-dead entity is a harmless no-op.

use std::collections::BTreeSet;

use super::component::{ComponentStore, ErasedStore};
use super::entity::{Entity, EntityTable};
use super::query::{ComponentSet, Query};
use super::registry::{ComponentTypeId, MAX_COMPONENTS, TypeRegistry};
use super::signature::Signature;
use super::system::{System, SystemId, SystemRegistry};
use crate::config::WorldConfig;
use crate::error::{EcsError, Result};

/// The central container for all entity state.
pub struct World {
    config: WorldConfig,
    entities: EntityTable,
    registry: TypeRegistry,
    /// One slot per component type id, filled on first `add_component`.
    stores: Vec<Option<Box<dyn ErasedStore>>>,
    /// Component signature per entity index.
    signatures: Vec<Signature>,
    pub(crate) systems: SystemRegistry,
}

impl World {
    /// Create a world with the default configuration.
    pub fn new() -> Self {
        Self::build(WorldConfig::default(), TypeRegistry::new())
    }

    pub fn with_config(config: WorldConfig) -> Result<Self> {
        Self::with_registry(config, TypeRegistry::new())
    }

    /// Create a world around an existing registry, e.g. one with component
    /// types pre-registered so their ids are fixed up front.
    pub fn with_registry(config: WorldConfig, registry: TypeRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, registry))
    }

    fn build(config: WorldConfig, registry: TypeRegistry) -> Self {
        let capacity = config.entity_capacity;
        Self {
            entities: EntityTable::new(capacity),
            registry,
            stores: (0..MAX_COMPONENTS).map(|_| None).collect(),
            signatures: vec![Signature::EMPTY; capacity as usize],
            systems: SystemRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn type_registry(&self) -> &TypeRegistry {
        &self.registry
    }

    // ── Entity Management ────────────────────────────────────────────

    /// Create an entity with no components.
    pub fn create_entity(&mut self) -> Result<Entity> {
        let entity = self.entities.create().inspect_err(|err| {
            log::warn!("Cannot create entity: {err}");
        })?;
        let signature = &mut self.signatures[entity.index as usize];
        signature.reset();
        self.systems.entity_signature_changed(entity, signature);
        log::trace!("Created {entity:?}");
        Ok(entity)
    }

    /// Destroy an entity and every component it owns.
    ///
    /// Returns `true` if the entity was alive. Destroying a dead or stale
    /// handle does nothing and returns `false`.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if self.entities.destroy(entity).is_err() {
            return false;
        }
        for store in self.stores.iter_mut().flatten() {
            store.entity_destroyed(entity);
        }
        self.signatures[entity.index as usize].reset();
        self.systems.entity_destroyed(entity);
        log::trace!("Destroyed {entity:?}");
        true
    }

    /// Destroy every live entity. Registered systems and component stores
    /// survive, empty.
    pub fn clear(&mut self) {
        let alive: Vec<Entity> = self.entities.iter().collect();
        for &entity in &alive {
            self.destroy_entity(entity);
        }
        log::info!("Cleared world ({} entities destroyed)", alive.len());
    }

    /// Check if an entity is alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Maximum number of simultaneously alive entities.
    pub fn entity_capacity(&self) -> u32 {
        self.entities.capacity()
    }

    /// Iterate alive entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// The component signature of a live entity.
    pub fn signature(&self, entity: Entity) -> Option<Signature> {
        self.is_alive(entity)
            .then(|| self.signatures[entity.index as usize])
    }

    // ── Component Access ─────────────────────────────────────────────

    /// Attach a component to a live entity.
    ///
    /// Fails if the entity is dead, already has a `T`, or `T` would be one
    /// component type too many.
    pub fn add_component<T: 'static + Send + Sync>(&mut self, entity: Entity, value: T) -> Result<()> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        let (id, store) = self.store_or_insert::<T>()?;
        store.insert(entity, value)?;

        let signature = &mut self.signatures[entity.index as usize];
        signature.set(id);
        self.systems.entity_signature_changed(entity, signature);
        log::trace!("Added `{}` to {entity:?}", std::any::type_name::<T>());
        Ok(())
    }

    /// Detach and return `entity`'s `T`. `None` if it has none or is dead.
    pub fn remove_component<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        let id = self.registry.id_of::<T>()?;
        let value = self.store_mut::<T>()?.remove(entity)?;

        let signature = &mut self.signatures[entity.index as usize];
        signature.clear(id);
        self.systems.entity_signature_changed(entity, signature);
        log::trace!("Removed `{}` from {entity:?}", std::any::type_name::<T>());
        Some(value)
    }

    pub fn has_component<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.store::<T>().is_some_and(|store| store.contains(entity))
    }

    /// Get a shared reference to a component on a specific entity.
    ///
    /// The reference is invalidated by the next structural change to `T`'s
    /// store, since swap-removal can move any `T`.
    pub fn get_component<T: 'static + Send + Sync>(&self, entity: Entity) -> Result<&T> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.store::<T>()
            .and_then(|store| store.get(entity))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: std::any::type_name::<T>(),
            })
    }

    /// Get a mutable reference to a component on a specific entity.
    pub fn get_component_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Result<&mut T> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.store_mut::<T>()
            .and_then(|store| store.get_mut(entity))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: std::any::type_name::<T>(),
            })
    }

    /// Number of entities currently owning a `T`.
    pub fn component_count<T: 'static + Send + Sync>(&self) -> usize {
        self.store::<T>().map_or(0, ComponentStore::len)
    }

    /// Read-only access to `T`'s packed store, if it exists yet.
    pub fn store<T: 'static + Send + Sync>(&self) -> Option<&ComponentStore<T>> {
        let id = self.registry.id_of::<T>()?;
        self.stores[id.index()]
            .as_ref()?
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
    }

    fn store_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut ComponentStore<T>> {
        let id = self.registry.id_of::<T>()?;
        self.stores[id.index()]
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
    }

    /// `T`'s id and store, registering the type and creating the store on
    /// first use.
    fn store_or_insert<T: 'static + Send + Sync>(
        &mut self,
    ) -> Result<(ComponentTypeId, &mut ComponentStore<T>)> {
        let id = self.registry.register::<T>()?;
        let slot = &mut self.stores[id.index()];
        if slot.is_none() {
            log::debug!("Created component store for `{}`", std::any::type_name::<T>());
        }
        let store = slot
            .get_or_insert_with(|| Box::new(ComponentStore::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .unwrap_or_else(|| {
                panic!(
                    "Component store type mismatch: id {} is not `{}`",
                    id.index(),
                    std::any::type_name::<T>()
                )
            });
        Ok((id, store))
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Register a system. Its member set starts as every live entity, until
    /// [`set_system_signature`](Self::set_system_signature) narrows it.
    pub fn register_system<S: System>(&mut self, system: S) -> Result<SystemId> {
        let live = self
            .entities
            .iter()
            .map(|e| (e, self.signatures[e.index as usize]));
        self.systems.register(system, live)
    }

    /// Declare the components `S` requires and rebuild its member set.
    pub fn set_system_signature<S: System>(&mut self, signature: Signature) -> Result<()> {
        let live = self
            .entities
            .iter()
            .map(|e| (e, self.signatures[e.index as usize]));
        self.systems.set_signature::<S>(signature, live)
    }

    /// The combined signature of the component types in `C`, registering
    /// any that are new.
    pub fn signature_of<C: ComponentSet>(&mut self) -> Result<Signature> {
        let ids = C::register(&mut self.registry)?;
        Ok(ids.into_iter().fold(Signature::EMPTY, Signature::with))
    }

    /// The entities currently satisfying `S`'s signature.
    pub fn system_entities<S: System>(&self) -> Result<&BTreeSet<Entity>> {
        self.systems.entities::<S>()
    }

    pub fn system_signature<S: System>(&self) -> Result<&Signature> {
        self.systems.signature::<S>()
    }

    pub fn system<S: System>(&self) -> Result<&S> {
        self.systems.get::<S>()
    }

    pub fn system_mut<S: System>(&mut self) -> Result<&mut S> {
        self.systems.get_mut::<S>()
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Lazily iterate every entity owning all component types in `C`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// for e in world.query::<(Transform, Velocity)>() {
    ///     // ...
    /// }
    /// ```
    pub fn query<C: ComponentSet>(&self) -> Query<'_, C> {
        let stores = C::type_ids(&self.registry)
            .and_then(|ids| {
                ids.iter()
                    .map(|id| self.stores[id.index()].as_deref())
                    .collect::<Option<Vec<_>>>()
            })
            .unwrap_or_default();
        Query::new(stores)
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn stores(&self) -> impl Iterator<Item = (ComponentTypeId, &dyn ErasedStore)> {
        self.stores
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| Some((ComponentTypeId(i as u32), slot.as_deref()?)))
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn entity_table(&self) -> &EntityTable {
        &self.entities
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    #[derive(Debug, PartialEq)]
    struct Health(u32);
    struct Marker;

    struct Physics;
    impl System for Physics {
        fn run(&mut self, world: &mut World, entities: &[Entity]) {
            for &e in entities {
                let vel = *world.get_component::<Velocity>(e).unwrap();
                let pos = world.get_component_mut::<Position>(e).unwrap();
                pos.x += vel.dx;
                pos.y += vel.dy;
            }
        }
    }

    struct Medic;
    impl System for Medic {
        fn run(&mut self, world: &mut World, entities: &[Entity]) {
            for &e in entities {
                world.get_component_mut::<Health>(e).unwrap().0 += 1;
            }
        }
    }

    fn small_world(capacity: u32) -> World {
        World::with_config(WorldConfig::new().entity_capacity(capacity)).unwrap()
    }

    fn pos(x: f32, y: f32) -> Position {
        Position { x, y }
    }

    #[test]
    fn query_scenario() {
        let mut world = World::new();
        let e0 = world.create_entity().unwrap();
        let e1 = world.create_entity().unwrap();
        let e2 = world.create_entity().unwrap();
        world.add_component(e0, pos(0.0, 0.0)).unwrap();
        world.add_component(e2, pos(0.0, 0.0)).unwrap();

        let mut found: Vec<_> = world.query::<(Position,)>().collect();
        found.sort();
        assert_eq!(found, vec![e0, e2]);
        assert!(!found.contains(&e1));

        world.get_component_mut::<Position>(e2).unwrap().x = 7.0;
        assert!(world.destroy_entity(e0));
        assert!(!world.has_component::<Position>(e0));
        assert_eq!(*world.get_component::<Position>(e2).unwrap(), pos(7.0, 0.0));
    }

    #[test]
    fn destroyed_entity_stays_dead_after_reuse() {
        let mut world = small_world(1);
        let e = world.create_entity().unwrap();
        world.destroy_entity(e);
        assert!(!world.is_alive(e));

        let reused = world.create_entity().unwrap();
        assert_eq!(reused.index(), e.index());
        assert_ne!(reused, e);
        assert!(!world.is_alive(e));
        assert!(world.is_alive(reused));
    }

    #[test]
    fn stale_handle_cannot_reach_new_occupant() {
        let mut world = small_world(1);
        let old = world.create_entity().unwrap();
        world.add_component(old, Health(1)).unwrap();
        world.destroy_entity(old);

        let new = world.create_entity().unwrap();
        world.add_component(new, Health(2)).unwrap();
        assert!(!world.has_component::<Health>(old));
        assert_eq!(world.get_component::<Health>(old), Err(EcsError::DeadEntity(old)));
        assert_eq!(world.remove_component::<Health>(old), None);
        assert_eq!(world.get_component::<Health>(new).unwrap().0, 2);
    }

    #[test]
    fn double_destroy_is_noop() {
        let mut world = World::new();
        let a = world.create_entity().unwrap();
        let b = world.create_entity().unwrap();
        assert!(world.destroy_entity(a));
        assert!(!world.destroy_entity(a));
        assert_eq!(world.entity_count(), 1);
        assert!(world.is_alive(b));
        assert!(!world.destroy_entity(Entity::INVALID));
    }

    #[test]
    fn pool_exhaustion_is_reported() {
        let mut world = small_world(2);
        world.create_entity().unwrap();
        world.create_entity().unwrap();
        let err = world.create_entity().unwrap_err();
        assert_eq!(err, EcsError::EntityPoolExhausted { capacity: 2 });
        assert!(err.is_resource_exhaustion());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = WorldConfig::new().entity_capacity(0);
        assert!(matches!(World::with_config(config), Err(EcsError::InvalidConfig(_))));
    }

    #[test]
    fn add_component_errors() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Health(10)).unwrap();

        let err = world.add_component(e, Health(20)).unwrap_err();
        assert!(matches!(err, EcsError::ComponentAlreadyPresent { entity, .. } if entity == e));
        assert_eq!(world.get_component::<Health>(e).unwrap().0, 10);

        world.destroy_entity(e);
        assert_eq!(world.add_component(e, Marker), Err(EcsError::DeadEntity(e)));
    }

    #[test]
    fn missing_component_is_an_error() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        assert!(matches!(
            world.get_component::<Velocity>(e),
            Err(EcsError::MissingComponent { .. })
        ));
        assert!(world.get_component_mut::<Velocity>(e).is_err());
    }

    #[test]
    fn remove_component_returns_value() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, pos(1.0, 2.0)).unwrap();
        world.add_component(e, Marker).unwrap();

        assert_eq!(world.remove_component::<Position>(e), Some(pos(1.0, 2.0)));
        assert!(!world.has_component::<Position>(e));
        assert!(world.has_component::<Marker>(e));
        assert_eq!(world.remove_component::<Position>(e), None);
        // Never-registered type.
        assert_eq!(world.remove_component::<Velocity>(e), None);
    }

    #[test]
    fn remove_from_middle_preserves_survivors() {
        let mut world = World::new();
        let entities: Vec<_> = (0..5)
            .map(|i| {
                let e = world.create_entity().unwrap();
                world.add_component(e, Health(i * 10)).unwrap();
                e
            })
            .collect();

        world.remove_component::<Health>(entities[1]);
        assert_eq!(world.component_count::<Health>(), 4);
        for (i, &e) in entities.iter().enumerate() {
            if i == 1 {
                assert!(!world.has_component::<Health>(e));
            } else {
                assert_eq!(world.get_component::<Health>(e).unwrap().0, i as u32 * 10);
            }
        }
    }

    #[test]
    fn signature_tracks_components() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        assert_eq!(world.signature(e), Some(Signature::EMPTY));

        world.add_component(e, pos(0.0, 0.0)).unwrap();
        world.add_component(e, Marker).unwrap();
        let expected = world.signature_of::<(Position, Marker)>().unwrap();
        assert_eq!(world.signature(e), Some(expected));

        world.destroy_entity(e);
        assert_eq!(world.signature(e), None);
    }

    #[test]
    fn query_two_components() {
        let mut world = World::new();
        let mut both = Vec::new();
        for i in 0..10 {
            let e = world.create_entity().unwrap();
            world.add_component(e, pos(i as f32, 0.0)).unwrap();
            if i % 2 == 0 {
                world.add_component(e, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
                both.push(e);
            }
        }
        let mut found: Vec<_> = world.query::<(Position, Velocity)>().collect();
        found.sort();
        assert_eq!(found, both);

        // Order of the tuple doesn't matter.
        let mut flipped: Vec<_> = world.query::<(Velocity, Position)>().collect();
        flipped.sort();
        assert_eq!(flipped, both);
    }

    #[test]
    fn query_unknown_type_is_empty() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Marker).unwrap();
        assert_eq!(world.query::<(Marker, Health)>().count(), 0);
        assert_eq!(world.query::<(Health,)>().count(), 0);
    }

    #[test]
    fn system_membership_and_run() {
        let mut world = World::new();
        world.register_system(Physics).unwrap();
        let sig = world.signature_of::<(Position, Velocity)>().unwrap();
        world.set_system_signature::<Physics>(sig).unwrap();

        let moving = world.create_entity().unwrap();
        world.add_component(moving, pos(0.0, 0.0)).unwrap();
        world.add_component(moving, Velocity { dx: 1.0, dy: 2.0 }).unwrap();
        let still = world.create_entity().unwrap();
        world.add_component(still, pos(5.0, 5.0)).unwrap();

        let members: Vec<_> = world.system_entities::<Physics>().unwrap().iter().copied().collect();
        assert_eq!(members, vec![moving]);

        world.run_system::<Physics>().unwrap();
        assert_eq!(*world.get_component::<Position>(moving).unwrap(), pos(1.0, 2.0));
        assert_eq!(*world.get_component::<Position>(still).unwrap(), pos(5.0, 5.0));

        world.remove_component::<Velocity>(moving);
        assert!(world.system_entities::<Physics>().unwrap().is_empty());

        world.add_component(moving, Velocity { dx: 0.0, dy: 0.0 }).unwrap();
        world.destroy_entity(moving);
        assert!(world.system_entities::<Physics>().unwrap().is_empty());
    }

    #[test]
    fn late_signature_picks_up_existing_entities() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Health(1)).unwrap();

        world.register_system(Medic).unwrap();
        let sig = world.signature_of::<(Health,)>().unwrap();
        world.set_system_signature::<Medic>(sig).unwrap();
        assert!(world.system_entities::<Medic>().unwrap().contains(&e));
    }

    #[test]
    fn system_registration_errors() {
        let mut world = World::new();
        world.register_system(Medic).unwrap();
        assert!(matches!(
            world.register_system(Medic),
            Err(EcsError::SystemAlreadyRegistered(_))
        ));
        assert!(matches!(
            world.set_system_signature::<Physics>(Signature::EMPTY),
            Err(EcsError::SystemNotRegistered(_))
        ));
        assert!(world.run_system::<Physics>().is_err());
    }

    #[test]
    fn run_systems_in_registration_order() {
        struct Recorder(Vec<&'static str>);
        impl System for Recorder {
            fn run(&mut self, _world: &mut World, _entities: &[Entity]) {}
        }
        struct First;
        impl System for First {
            fn run(&mut self, world: &mut World, _entities: &[Entity]) {
                world.system_mut::<Recorder>().unwrap().0.push("first");
            }
        }
        struct Second;
        impl System for Second {
            fn run(&mut self, world: &mut World, _entities: &[Entity]) {
                world.system_mut::<Recorder>().unwrap().0.push("second");
            }
        }

        let mut world = World::new();
        world.register_system(Recorder(Vec::new())).unwrap();
        world.register_system(First).unwrap();
        world.register_system(Second).unwrap();
        world.run_systems();
        world.run_systems();
        assert_eq!(
            world.system::<Recorder>().unwrap().0,
            vec!["first", "second", "first", "second"]
        );
    }

    #[test]
    fn clear_destroys_everything() {
        let mut world = World::new();
        world.register_system(Medic).unwrap();
        let sig = world.signature_of::<(Health,)>().unwrap();
        world.set_system_signature::<Medic>(sig).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let e = world.create_entity().unwrap();
                world.add_component(e, Health(i)).unwrap();
                e
            })
            .collect();
        world.clear();

        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.component_count::<Health>(), 0);
        assert!(world.system_entities::<Medic>().unwrap().is_empty());
        assert!(handles.iter().all(|&e| !world.is_alive(e)));

        // The world is reusable after a reset.
        let e = world.create_entity().unwrap();
        world.add_component(e, Health(9)).unwrap();
        assert!(world.system_entities::<Medic>().unwrap().contains(&e));
    }

    #[test]
    fn preregistered_ids_are_kept() {
        let mut registry = TypeRegistry::new();
        registry.register::<Velocity>().unwrap();
        registry.register::<Position>().unwrap();
        let world = World::with_registry(WorldConfig::default(), registry).unwrap();
        assert_eq!(world.type_registry().id_of::<Position>().unwrap().index(), 1);
    }

    /// Apply a long random interleaving of structural changes and check,
    /// after every step, that each system's member set matches a from-scratch
    /// recomputation and every store is still packed.
    #[test]
    fn incremental_membership_matches_brute_force() {
        struct NeedsPos;
        impl System for NeedsPos {
            fn run(&mut self, _: &mut World, _: &[Entity]) {}
        }
        struct NeedsPosVel;
        impl System for NeedsPosVel {
            fn run(&mut self, _: &mut World, _: &[Entity]) {}
        }
        struct NeedsHealthMarker;
        impl System for NeedsHealthMarker {
            fn run(&mut self, _: &mut World, _: &[Entity]) {}
        }

        fn brute_force(world: &World, required: Signature) -> BTreeSet<Entity> {
            world
                .entities()
                .filter(|&e| world.signature(e).unwrap().contains_all(&required))
                .collect()
        }

        fn check_packed<T: 'static + Send + Sync>(world: &World) {
            let Some(store) = world.store::<T>() else { return };
            for (i, &owner) in store.entities().iter().enumerate() {
                assert!(world.is_alive(owner));
                assert_eq!(store.entity_index_at(i), Some(owner.index()));
                assert_eq!(store.dense_index_of(owner.index()), Some(i));
            }
        }

        let mut world = small_world(32);
        world.register_system(NeedsPos).unwrap();
        world.register_system(NeedsPosVel).unwrap();
        world.register_system(NeedsHealthMarker).unwrap();
        let pos_sig = world.signature_of::<(Position,)>().unwrap();
        let pos_vel_sig = world.signature_of::<(Position, Velocity)>().unwrap();
        let health_marker_sig = world.signature_of::<(Health, Marker)>().unwrap();
        world.set_system_signature::<NeedsPos>(pos_sig).unwrap();
        world.set_system_signature::<NeedsPosVel>(pos_vel_sig).unwrap();
        world
            .set_system_signature::<NeedsHealthMarker>(health_marker_sig)
            .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let mut handles: Vec<Entity> = Vec::new();

        for _ in 0..2_000 {
            let target = if handles.is_empty() {
                None
            } else {
                Some(handles[rng.gen_range(0..handles.len())])
            };
            match (rng.gen_range(0..10), target) {
                (0 | 1, _) | (_, None) => {
                    if let Ok(e) = world.create_entity() {
                        handles.push(e);
                    }
                }
                (2, Some(e)) => {
                    world.destroy_entity(e);
                }
                (3, Some(e)) => {
                    let _ = world.add_component(e, pos(1.0, 1.0));
                }
                (4, Some(e)) => {
                    let _ = world.add_component(e, Velocity { dx: 0.0, dy: 1.0 });
                }
                (5, Some(e)) => {
                    let _ = world.add_component(e, Health(3));
                }
                (6, Some(e)) => {
                    let _ = world.add_component(e, Marker);
                }
                (7, Some(e)) => {
                    world.remove_component::<Position>(e);
                }
                (8, Some(e)) => {
                    world.remove_component::<Velocity>(e);
                }
                (_, Some(e)) => {
                    world.remove_component::<Health>(e);
                    world.remove_component::<Marker>(e);
                }
            }
            handles.retain(|&e| world.is_alive(e));

            assert_eq!(*world.system_entities::<NeedsPos>().unwrap(), brute_force(&world, pos_sig));
            assert_eq!(
                *world.system_entities::<NeedsPosVel>().unwrap(),
                brute_force(&world, pos_vel_sig)
            );
            assert_eq!(
                *world.system_entities::<NeedsHealthMarker>().unwrap(),
                brute_force(&world, health_marker_sig)
            );

            let queried: BTreeSet<Entity> = world.query::<(Position, Velocity)>().collect();
            assert_eq!(queried.len(), world.query::<(Position, Velocity)>().count());
            let expected: BTreeSet<Entity> = world
                .entities()
                .filter(|&e| world.has_component::<Position>(e) && world.has_component::<Velocity>(e))
                .collect();
            assert_eq!(queried, expected);

            check_packed::<Position>(&world);
            check_packed::<Velocity>(&world);
            check_packed::<Health>(&world);
            check_packed::<Marker>(&world);
        }
    }
}
