//! Combat module: оружие NPC и урон
//!
//! ECS ответственность:
//! - Weapon state: боезапас, cooldown, перезарядка (countdown)
//! - Трейс пули: WeaponFired → DamageTaken
//! - Damage rules: sneak attack, Health, EntityDied
//! - Реакция AI на урон (память + SeekTarget)

use bevy::prelude::*;

pub mod damage;
pub mod weapon;

pub use damage::{
    apply_incoming_damage, calculate_damage, resolve_weapon_fire, should_seek_attacker, DamageDealt,
    DamageTaken, EntityDied,
};
pub use weapon::{tick_weapons, NpcWeapon, WeaponCapability, WeaponFired};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (после AI think):
/// 1. tick_weapons: cooldown + reload countdown
/// 2. resolve_weapon_fire: выстрелы этого тика → DamageTaken
/// 3. apply_incoming_damage: Health, EntityDied, реакция жертвы
/// 4. disable_dead_actors: Inactive + Dead маркер
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WeaponFired>()
            .add_event::<DamageTaken>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (
                tick_weapons,
                resolve_weapon_fire,
                apply_incoming_damage,
                crate::ai::systems::disable_dead_actors,
            )
                .chain()
                .in_set(SimulationSet::Combat),
        );
    }
}
