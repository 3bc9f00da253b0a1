//! Movement systems: steering → позиция, поворот тела и взгляда
//!
//! Кинематика без физики: горизонтальный шаг к цели steering со скоростью
//! `MovementSpeed`. Препятствия: забота навигации окружения.

use bevy::prelude::*;

use crate::ai::brain::NpcBrain;
use crate::ai::components::{CombatState, NpcParams};
use crate::ai::snapshots::ActorSnapshots;
use crate::ai::steering::{integrate_towards, Steering};
use crate::ai::target_memory::TargetMemory;
use crate::ai::turning::{turn, Aim, TurnInput};
use crate::components::{Crouching, Dead, EyeHeight, MovementSpeed, PhysicsBody};
use crate::geometry::NavArea;
use crate::{DeterministicRng, SimulationClock};

/// System: steering → Transform + velocity
#[allow(clippy::type_complexity)]
pub fn steer_actors(
    mut npcs: Query<
        (Entity, &mut Transform, &mut PhysicsBody, &mut Steering, &MovementSpeed),
        (With<NpcBrain>, Without<Dead>),
    >,
    nav: Res<NavArea>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();

    // Wander тянет числа из RNG: порядок обхода фиксирован
    let mut order: Vec<Entity> = npcs.iter().map(|(entity, ..)| entity).collect();
    order.sort();

    for entity in order {
        let Ok((_, mut transform, mut body, mut steering, speed)) = npcs.get_mut(entity) else {
            continue;
        };

        let goal = steering.next_goal(transform.translation, &*nav, &mut rng.rng, dt);
        let (position, velocity) = integrate_towards(transform.translation, goal, speed.speed, dt);
        transform.translation = position;
        body.velocity = velocity;
    }
}

/// System: поворот тела к цели / по ходу движения, глаза следом
#[allow(clippy::type_complexity)]
pub fn npc_turn(
    mut npcs: Query<
        (
            &NpcBrain,
            &TargetMemory,
            &NpcParams,
            &PhysicsBody,
            &EyeHeight,
            Has<Crouching>,
            &mut Transform,
            &mut Aim,
        ),
        Without<Dead>,
    >,
    actors: Res<ActorSnapshots>,
    clock: Res<SimulationClock>,
    time: Res<Time<Fixed>>,
) {
    for (brain, memory, params, body, eyes, crouching, mut transform, mut aim) in npcs.iter_mut() {
        if brain.state == CombatState::Inactive {
            continue;
        }

        let last = memory.last_target_position();
        let focus = (last != Vec3::ZERO).then(|| {
            // Живая позиция: только после реакции и пока цель "свежая"
            let fresh = memory.time_since_target_reappear() >= 0.0
                && memory.time_since_target_visible() < params.recent_sighting_time;
            memory
                .current()
                .filter(|_| fresh)
                .and_then(|target| actors.get(target))
                .map(|actor| actor.eye_position)
                .unwrap_or(last + Vec3::Y * eyes.standing)
        });

        let input = TurnInput {
            state: brain.state,
            position: transform.translation,
            eye_position: eyes.eye_position(transform.translation, crouching),
            focus,
            time_since_visible: memory.time_since_target_visible(),
            velocity: body.velocity,
            elapsed: clock.elapsed,
            dt: time.delta_secs(),
        };

        let (body_rotation, eye_rotation) = turn(transform.rotation, aim.eye_rotation, &input, params);
        transform.rotation = body_rotation;
        aim.eye_rotation = eye_rotation;
    }
}
