//! Movement demo: ten entities with a transform, every other one also moving.
//!
//! Run with `RUST_LOG=debug cargo run --example movement` to see registration
//! and lifecycle logs.

use std::error::Error;

use gecs::prelude::*;
use glam::Vec3;

#[derive(Debug, Clone, Copy, Default)]
struct Transform {
    position: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct Velocity(Vec3);

struct MovementSystem {
    dt: f32,
}

impl System for MovementSystem {
    fn run(&mut self, world: &mut World, entities: &[Entity]) {
        for &entity in entities {
            let Ok(&Velocity(velocity)) = world.get_component::<Velocity>(entity) else {
                continue;
            };
            if let Ok(transform) = world.get_component_mut::<Transform>(entity) {
                transform.position += velocity * self.dt;
            }
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut world = World::with_config(WorldConfig::default().entity_capacity(64))?;

    world.register_system(MovementSystem { dt: 1.0 })?;
    let signature = world.signature_of::<(Transform, Velocity)>()?;
    world.set_system_signature::<MovementSystem>(signature)?;

    let mut entities = Vec::new();
    for i in 0..10 {
        let entity = world.create_entity()?;
        world.add_component(entity, Transform::default())?;
        if i % 2 == 0 {
            world.add_component(entity, Velocity(Vec3::X))?;
        }
        entities.push(entity);
    }
    println!(
        "Created {} entities, {} move",
        world.entity_count(),
        world.system_entities::<MovementSystem>()?.len()
    );

    world.run_system::<MovementSystem>()?;

    for (i, &entity) in entities.iter().enumerate() {
        let x = world.get_component::<Transform>(entity)?.position.x;
        let expected = if i % 2 == 0 { 1.0 } else { 0.0 };
        if x != expected {
            return Err(format!("entity {entity} ended at x = {x}, expected {expected}").into());
        }
    }
    println!("Movement ok");

    let moving = world.query::<(Transform, Velocity)>().count();
    if moving != 5 {
        return Err(format!("query matched {moving} entities, expected 5").into());
    }
    println!("Query ok ({moving} matches)");

    let doomed = entities[0];
    world.destroy_entity(doomed);
    if world.system_entities::<MovementSystem>()?.contains(&doomed) {
        return Err("destroyed entity is still a system member".into());
    }
    println!("Destroy ok");

    #[cfg(feature = "diagnostics")]
    println!("{:#?}", world.stats());

    Ok(())
}
