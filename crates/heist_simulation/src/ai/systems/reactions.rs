//! AI reaction systems (смерть).

use bevy::prelude::*;

use crate::ai::brain::{disable_npc, NpcBrain};
use crate::ai::steering::Steering;
use crate::ai::target_memory::TargetMemory;
use crate::combat::EntityDied;
use crate::components::{Dead, PhysicsBody};
use crate::tactical::TacticalPoints;

/// System: смерть → AI отключён, тело остановлено, маркер Dead
///
/// Трупы остаются на месте; `Dead` исключает их из think/steering и из
/// трейсов (пули и взгляд проходят насквозь).
pub fn disable_dead_actors(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    mut actors: Query<(
        &mut PhysicsBody,
        Option<&mut NpcBrain>,
        Option<&mut TargetMemory>,
        Option<&mut Steering>,
    )>,
    mut points: ResMut<TacticalPoints>,
) {
    for event in deaths.read() {
        if let Ok((mut body, brain, memory, steering)) = actors.get_mut(event.entity) {
            body.velocity = Vec3::ZERO;

            if let (Some(mut brain), Some(mut memory), Some(mut steering)) = (brain, memory, steering) {
                disable_npc(event.entity, &mut brain, &mut memory, &mut steering, &mut points);
                crate::log(&format!("💤 {:?} died → AI disabled", event.entity));
            }
        }

        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert(Dead);
        }
    }
}
