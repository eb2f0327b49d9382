//! Diagnostics snapshot of a [`World`].
//!
//! Enabled by the `diagnostics` feature flag (on by default).
//! [`World::stats`] collects entity pool usage, per-store sizes, and
//! per-system membership counts into a [`WorldStats`] value that serializes
//! with serde, ready for whatever telemetry sink the host uses.

use serde::Serialize;

use crate::ecs::{ComponentTypeId, World};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldStats {
    pub entity_pool: EntityPoolStats,
    pub component_types: usize,
    pub stores: Vec<StoreStats>,
    pub systems: Vec<SystemStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityPoolStats {
    pub capacity: u32,
    pub alive_count: usize,
    pub free_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub type_id: u32,
    pub name: String,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub id: u32,
    pub name: String,
    /// Short names of the required component types.
    pub requires: Vec<String>,
    pub entity_count: usize,
}

impl World {
    /// Collect a diagnostics snapshot of entity, store, and system state.
    pub fn stats(&self) -> WorldStats {
        let registry = self.type_registry();
        let type_name = |id: ComponentTypeId| {
            registry
                .name_of(id)
                .map(short_type_name)
                .unwrap_or_else(|| format!("#{}", id.index()))
        };

        let table = self.entity_table();
        let entity_pool = EntityPoolStats {
            capacity: table.capacity(),
            alive_count: table.len(),
            free_count: table.free_count(),
        };

        let stores = self
            .stores()
            .map(|(id, store)| StoreStats {
                type_id: id.index() as u32,
                name: type_name(id),
                len: store.component_count(),
            })
            .collect();

        let systems = self
            .systems
            .iter()
            .map(|info| SystemStats {
                id: info.id.index() as u32,
                name: short_type_name(info.name),
                requires: info.signature.iter().map(&type_name).collect(),
                entity_count: info.entity_count,
            })
            .collect();

        WorldStats {
            entity_pool,
            component_types: registry.len(),
            stores,
            systems,
        }
    }
}

/// Strip the module path from a fully-qualified type name, keeping only the
/// short name (e.g. `game::components::Transform` → `Transform`).
///
/// Generic arguments are kept as written.
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let short = base.rsplit("::").next().unwrap_or(base);
    format!("{short}{}", &full[base.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Entity, System};

    struct Position;
    struct Velocity;

    struct Movement;
    impl System for Movement {
        fn run(&mut self, _world: &mut World, _entities: &[Entity]) {}
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name("game::Transform"), "Transform");
        assert_eq!(short_type_name("Plain"), "Plain");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper<b::Inner>");
    }

    #[test]
    fn snapshot_counts() {
        let mut world = World::new();
        world.register_system(Movement).unwrap();
        let sig = world.signature_of::<(Position, Velocity)>().unwrap();
        world.set_system_signature::<Movement>(sig).unwrap();

        let a = world.create_entity().unwrap();
        let b = world.create_entity().unwrap();
        world.add_component(a, Position).unwrap();
        world.add_component(a, Velocity).unwrap();
        world.add_component(b, Position).unwrap();
        let dead = world.create_entity().unwrap();
        world.destroy_entity(dead);

        let stats = world.stats();
        assert_eq!(stats.entity_pool.alive_count, 2);
        assert_eq!(stats.entity_pool.free_count, stats.entity_pool.capacity as usize - 2);
        assert_eq!(stats.component_types, 2);
        assert_eq!(
            stats.stores,
            vec![
                StoreStats {
                    type_id: 0,
                    name: "Position".to_string(),
                    len: 2
                },
                StoreStats {
                    type_id: 1,
                    name: "Velocity".to_string(),
                    len: 1
                },
            ]
        );
        assert_eq!(stats.systems.len(), 1);
        assert_eq!(stats.systems[0].name, "Movement");
        assert_eq!(stats.systems[0].requires, vec!["Position", "Velocity"]);
        assert_eq!(stats.systems[0].entity_count, 1);
    }

    #[test]
    fn serializes_to_json() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Position).unwrap();

        let json = serde_json::to_value(world.stats()).unwrap();
        assert_eq!(json["entity_pool"]["alive_count"], 1);
        assert_eq!(json["stores"][0]["name"], "Position");
        assert!(json["systems"].as_array().unwrap().is_empty());
    }
}
