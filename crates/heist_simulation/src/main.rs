//! Headless симуляция Heist
//!
//! Склад с ящиками, охрана на патруле и один грабитель. Опционально:
//! путь к JSON конфигу первым аргументом.

use std::path::Path;

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use heist_simulation::geometry::StaticScene;
use heist_simulation::guards::{populate_guards, spawn_intruder};
use heist_simulation::{
    create_headless_app, log_error, world_snapshot, NpcBrain, SimulationConfig, TacticalPoints, WorldSolid,
};

/// Статичный ящик и в ECS, и в офлайн-сцене для генерации укрытий
fn spawn_crate(world: &mut World, scene: &mut StaticScene, center: Vec3, half_extents: Vec3) {
    let entity = world
        .spawn((
            WorldSolid,
            Transform::from_translation(center),
            Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        ))
        .id();
    scene.add_box(entity, center, half_extents);
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(Path::new(&path)).unwrap_or_else(|e| {
            log_error(&format!("{}: using defaults", e));
            SimulationConfig::default()
        }),
        None => SimulationConfig::default(),
    };
    println!("Starting Heist headless simulation (seed: {})", config.seed);

    let mut app = create_headless_app(config.seed);
    config.apply(&mut app);

    let world = app.world_mut();
    let mut scene = StaticScene::new();
    for (center, half) in [
        (Vec3::new(-6.0, 0.6, -4.0), Vec3::new(1.0, 0.6, 0.5)),
        (Vec3::new(5.0, 0.6, -8.0), Vec3::new(0.5, 0.6, 1.5)),
        (Vec3::new(0.0, 1.5, -15.0), Vec3::new(6.0, 1.5, 0.3)),
        (Vec3::new(8.0, 0.6, 6.0), Vec3::new(1.2, 0.6, 1.2)),
    ] {
        spawn_crate(world, &mut scene, center, half);
    }

    {
        let mut points = world.resource_mut::<TacticalPoints>();
        points.set_map_name("warehouse");
        for position in [
            Vec3::new(-6.0, 0.0, -3.0),
            Vec3::new(4.0, 0.0, -8.0),
            Vec3::new(-2.0, 0.0, -14.0),
            Vec3::new(8.0, 0.0, 7.5),
        ] {
            points.create_point(position, &scene);
        }
    }

    populate_guards(world, 3);
    spawn_intruder(world, Vec3::new(0.0, 0.0, -22.0));

    // 20 секунд симуляции
    for tick in 0..1200 {
        app.update();

        if tick % 120 == 0 {
            let world = app.world_mut();
            let mut npcs = world.query::<(Entity, &NpcBrain)>();
            let states: Vec<String> = npcs
                .iter(world)
                .map(|(entity, brain)| format!("{:?}={:?}", entity, brain.state))
                .collect();
            println!("Tick {}: {}", tick, states.join(", "));
        }
    }

    print!("{}", world_snapshot(app.world_mut()));
    println!("Simulation complete!");
}
