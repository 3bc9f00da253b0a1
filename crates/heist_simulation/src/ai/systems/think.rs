//! Think system: собирает контексты NPC и запускает `Npc::think`

use bevy::prelude::*;

use crate::ai::brain::{Npc, NpcBrain, NpcWorld};
use crate::ai::components::{AiSettings, NpcParams};
use crate::ai::snapshots::ActorSnapshots;
use crate::ai::steering::{PatrolRoute, Steering};
use crate::ai::target_memory::TargetMemory;
use crate::ai::turning::Aim;
use crate::combat::{NpcWeapon, WeaponCapability, WeaponFired};
use crate::components::{Crouching, Dead, EyeHeight, MovementSpeed};
use crate::geometry::{ColliderTraces, NavArea};
use crate::tactical::TacticalPoints;
use crate::{DeterministicRng, SimulationClock};

/// System: один think на каждого живого NPC
///
/// NPC обходятся по возрастанию Entity: кто раньше, тот первым занимает
/// укрытия и тянет числа из общего RNG.
#[allow(clippy::type_complexity, clippy::too_many_arguments)]
pub fn npc_think(
    mut npcs: Query<
        (
            Entity,
            &Transform,
            &Aim,
            &EyeHeight,
            Has<Crouching>,
            &mut NpcBrain,
            &mut TargetMemory,
            &mut Steering,
            &mut MovementSpeed,
            &NpcParams,
            Option<&PatrolRoute>,
            Option<&mut NpcWeapon>,
        ),
        Without<Dead>,
    >,
    mut fired: EventWriter<WeaponFired>,
    actors: Res<ActorSnapshots>,
    traces: ColliderTraces,
    nav: Res<NavArea>,
    mut points: ResMut<TacticalPoints>,
    mut rng: ResMut<DeterministicRng>,
    settings: Res<AiSettings>,
    clock: Res<SimulationClock>,
    time: Res<Time<Fixed>>,
) {
    let mut order: Vec<Entity> = npcs.iter().map(|(entity, ..)| entity).collect();
    order.sort();

    let mut world = NpcWorld {
        actors: &actors,
        geometry: &traces,
        nav: &*nav,
        points: &mut points,
        rng: &mut rng.rng,
        settings: &settings,
        tick: clock.tick,
        dt: time.delta_secs(),
    };

    for entity in order {
        let Ok((
            _,
            transform,
            aim,
            eyes,
            crouching,
            mut brain,
            mut memory,
            mut steering,
            mut speed,
            params,
            patrol,
            mut weapon,
        )) = npcs.get_mut(entity)
        else {
            continue;
        };

        let eye_position = eyes.eye_position(transform.translation, crouching);
        let eye_forward = aim.forward();

        let mut npc = Npc {
            entity,
            position: transform.translation,
            eye_position,
            eye_forward,
            body_forward: transform.rotation * Vec3::NEG_Z,
            brain: &mut brain,
            memory: &mut memory,
            steering: &mut steering,
            speed: &mut speed,
            params,
            patrol,
            weapon: weapon
                .as_mut()
                .map(|w| &mut **w as &mut dyn WeaponCapability),
        };
        npc.think(&mut world);

        if let Some(weapon) = weapon.as_mut() {
            for _ in 0..weapon.take_pending_shots() {
                fired.write(WeaponFired {
                    shooter: entity,
                    origin: eye_position,
                    direction: eye_forward,
                    damage: weapon.damage,
                    spread: weapon.spread,
                    range: weapon.range,
                });
            }
        }
    }
}
