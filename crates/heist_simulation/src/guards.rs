//! Спавн охраны и нарушителей, debug-сценарии
//!
//! Функции работают с `&mut World` напрямую (вызываются при настройке сцены
//! или из debug-команд, не из систем).

use bevy::prelude::*;
use rand::Rng;

use crate::ai::target_memory::SWITCH_GRACE;
use crate::ai::{AiSettings, NpcBrain, PatrolRoute, TargetMemory};
use crate::combat::NpcWeapon;
use crate::config::DefaultNpcParams;
use crate::components::{Actor, Dead, Health, Intruder};
use crate::geometry::{actor_collider, ColliderOffset, NavArea, NavQuery, ACTOR_COLLIDER_OFFSET};
use crate::logger;
use crate::tactical::TacticalPoints;
use crate::DeterministicRng;

/// Конец маршрута патруля: кольцо вокруг точки спавна (m)
const PATROL_END_RADIUS: (f32, f32) = (3.2, 12.8);
/// Пауза на концах маршрута (s)
const PATROL_DELAY: (f32, f32) = (20.0, 30.0);

/// NPC-охранник с оружием. Стартует Inactive, Enable уже в очереди.
pub fn spawn_gunner(world: &mut World, position: Vec3, weapon: NpcWeapon) -> Entity {
    let cool = world
        .get_resource::<AiSettings>()
        .map_or(true, |settings| settings.start_cool);
    let params = world
        .get_resource::<DefaultNpcParams>()
        .map(|defaults| defaults.0.clone())
        .unwrap_or_default();

    let entity = world
        .spawn((
            NpcBrain::new(cool),
            params,
            weapon,
            Transform::from_translation(position),
            actor_collider(),
            ColliderOffset(ACTOR_COLLIDER_OFFSET),
        ))
        .id();
    crate::log(&format!("🛡️ Gunner {:?} spawned at {:?}", entity, position));
    entity
}

/// Нарушитель (игрок-грабитель): цель для сканирования охраны
pub fn spawn_intruder(world: &mut World, position: Vec3) -> Entity {
    world
        .spawn((
            Actor,
            Intruder,
            Health::new(100),
            Transform::from_translation(position),
            actor_collider(),
            ColliderOffset(ACTOR_COLLIDER_OFFSET),
        ))
        .id()
}

/// Расставляет `count` охранников у случайных tactical points, каждому :
/// маршрут патруля
pub fn populate_guards(world: &mut World, count: usize) -> Vec<Entity> {
    let positions = world
        .get_resource::<TacticalPoints>()
        .map(|points| points.positions())
        .unwrap_or_default();
    if positions.is_empty() {
        logger::log_warning("populate_guards: no tactical points on this map");
        return Vec::new();
    }
    let nav = world.get_resource::<NavArea>().copied().unwrap_or_default();

    let routes: Vec<PatrolRoute> = {
        let Some(mut rng) = world.get_resource_mut::<DeterministicRng>() else {
            logger::log_error("populate_guards: DeterministicRng resource missing");
            return Vec::new();
        };
        let rng = &mut rng.rng;
        (0..count)
            .map(|_| {
                let start = positions[rng.gen_range(0..positions.len())];
                let end = nav
                    .point_within_radius(start, PATROL_END_RADIUS.0, PATROL_END_RADIUS.1, rng)
                    .unwrap_or(start);
                let delay = rng.gen_range(PATROL_DELAY.0..=PATROL_DELAY.1);
                PatrolRoute { start, end, delay }
            })
            .collect()
    };

    let guards: Vec<Entity> = routes
        .into_iter()
        .map(|route| {
            let entity = spawn_gunner(world, route.start, NpcWeapon::pistol());
            world.entity_mut(entity).insert(route);
            entity
        })
        .collect();

    logger::log_info(&format!("🛡️ Populated {} guard(s)", guards.len()));
    guards
}

/// Debug: все живые NPC знают друг о друге и воюют каждый с каждым
pub fn start_battle_royale(world: &mut World) -> usize {
    let mut query = world.query_filtered::<(Entity, &Transform), (With<NpcBrain>, Without<Dead>)>();
    let mut npcs: Vec<(Entity, Vec3)> = query
        .iter(world)
        .map(|(entity, transform)| (entity, transform.translation))
        .collect();
    npcs.sort_by_key(|(entity, _)| *entity);

    let mut query = world.query_filtered::<(&mut NpcBrain, &mut TargetMemory), Without<Dead>>();
    for &(entity, _) in &npcs {
        let Ok((mut brain, mut memory)) = query.get_mut(world, entity) else {
            continue;
        };
        for &(other, position) in npcs.iter().filter(|(other, _)| *other != entity) {
            memory.record_sighting(other, position, SWITCH_GRACE);
        }
        brain.cool = false;
    }

    logger::log_info(&format!("⚔️ Battle royale: {} NPC(s)", npcs.len()));
    npcs.len()
}
