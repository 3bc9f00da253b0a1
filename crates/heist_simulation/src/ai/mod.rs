//! AI decision-making module
//!
//! Боевой AI охраны: FSM (Inactive/Idle/Patrol/Search/Engage/Push) поверх
//! памяти о целях, зрения, подозрения и steering. Решения принимаются в
//! `Npc::think`, ECS системы только собирают контекст и применяют результат.

use bevy::prelude::*;

pub mod brain;
pub mod components;
pub mod snapshots;
pub mod steering;
pub mod systems;
pub mod target_memory;
pub mod turning;
pub mod visibility;


// Re-export основных типов
pub use brain::{disable_npc, Npc, NpcBrain, NpcWorld};
pub use components::{next_state, AiSettings, CombatState, NpcEvent, NpcParams};
pub use snapshots::{sync_actor_snapshots, ActorSnapshot, ActorSnapshots};
pub use steering::{select_cover_point, score_cover_point, PatrolRoute, Steering};
pub use target_memory::{TargetMemory, TargetRecord};
pub use turning::{look_rotation, Aim};
pub use visibility::{can_perceive, Observer, VisionCone};

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. sync_actor_snapshots: снимок позиций/health всех акторов
/// 2. release_stale_claims: точки мёртвых агентов свободны
/// 3. npc_think: FSM, зрение, steering решения, стрельба
/// 4. steer_actors: движение по steering
/// 5. npc_turn: поворот тела и взгляда
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AiSettings>()
            .init_resource::<ActorSnapshots>()
            .register_type::<NpcParams>()
            .register_type::<Steering>()
            .register_type::<Aim>();

        app.add_systems(
            FixedUpdate,
            (
                sync_actor_snapshots,
                crate::tactical::release_stale_claims,
                systems::npc_think,
                systems::steer_actors,
                systems::npc_turn,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::Ai),
        );
    }
}
