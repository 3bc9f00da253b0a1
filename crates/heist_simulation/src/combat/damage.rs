//! Урон: попадания → Health → реакция AI
//!
//! `resolve_weapon_fire` превращает WeaponFired в DamageTaken (трейс пули),
//! `apply_incoming_damage` применяет урон:
//! - x3 по NPC, который ещё не в бою (Idle/Patrol)
//! - атакующий попадает в память жертвы, жертва больше не "спокойна"
//! - SeekTarget жертве, если она ещё не воюет с этим атакующим

use bevy::prelude::*;
use rand::Rng;

use super::weapon::WeaponFired;
use crate::ai::{CombatState, NpcBrain, NpcEvent, NpcParams, TargetMemory};
use crate::components::{Actor, Health};
use crate::geometry::{ColliderTraces, SpatialQuery, TraceRay};
use crate::{logger, DeterministicRng};

/// Событие: в entity попали (до модификаторов)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageTaken {
    pub target: Entity,
    pub attacker: Entity,
    pub amount: u32,
    /// Откуда прилетело (позиция стрелка, если его Transform недоступен)
    pub origin: Vec3,
}

/// Событие: урон нанесен (после модификаторов)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Final damage: sneak attack по ничего не подозревающему NPC
pub fn calculate_damage(base_damage: u32, victim_state: Option<CombatState>, sneak_multiplier: f32) -> u32 {
    let multiplier = match victim_state {
        Some(state) if state.is_unaware() => sneak_multiplier,
        _ => 1.0,
    };
    (base_damage as f32 * multiplier).round() as u32
}

/// Нужно ли жертве искать атакующего
///
/// Engage уже воюет (SeekTarget там недопустим), Push реагирует только на
/// нового атакующего.
pub fn should_seek_attacker(state: CombatState, attacker_known: bool) -> bool {
    match state {
        CombatState::Idle | CombatState::Patrol | CombatState::Search => true,
        CombatState::Push => !attacker_known,
        CombatState::Engage | CombatState::Inactive => false,
    }
}

/// Система: DamageTaken → Health, события, реакция AI
#[allow(clippy::type_complexity)]
pub fn apply_incoming_damage(
    mut incoming: EventReader<DamageTaken>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
    mut victims: Query<(
        &mut Health,
        Option<&mut NpcBrain>,
        Option<&mut TargetMemory>,
        Option<&NpcParams>,
    )>,
    positions: Query<&Transform>,
) {
    for hit in incoming.read() {
        let Ok((mut health, brain, memory, params)) = victims.get_mut(hit.target) else {
            logger::log_warning(&format!("DamageTaken: target {:?} has no Health", hit.target));
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        let sneak = params.map_or(1.0, |p| p.sneak_attack_multiplier);
        let damage = calculate_damage(hit.amount, brain.as_ref().map(|b| b.state), sneak);

        health.take_damage(damage);
        let died = !health.is_alive();

        dealt_events.write(DamageDealt {
            attacker: hit.attacker,
            target: hit.target,
            damage,
            target_died: died,
        });

        if died {
            died_events.write(EntityDied {
                entity: hit.target,
                killer: Some(hit.attacker),
            });
            logger::log_info(&format!("💀 {:?} killed by {:?}", hit.target, hit.attacker));
            continue;
        }

        let (Some(mut brain), Some(mut memory)) = (brain, memory) else {
            continue;
        };
        if hit.attacker == hit.target {
            continue;
        }

        let attacker_position = positions
            .get(hit.attacker)
            .map(|t| t.translation)
            .unwrap_or(hit.origin);
        let known = memory.contains(hit.attacker);
        memory.record_damage(hit.attacker, damage as f32, attacker_position);
        brain.cool = false;

        if should_seek_attacker(brain.state, known) {
            brain.queue_event(NpcEvent::SeekTarget, Some(hit.attacker));
        }

        crate::log(&format!(
            "🔥 {:?} hit by {:?} for {} (hp {}/{})",
            hit.target, hit.attacker, damage, health.current, health.max
        ));
    }
}

/// Отклонение направления выстрела на `spread`
fn scatter(direction: Vec3, spread: f32, rng: &mut impl Rng) -> Vec3 {
    if spread <= 0.0 {
        return direction;
    }
    let offset = Vec3::new(
        rng.gen_range(-spread..=spread),
        rng.gen_range(-spread..=spread),
        rng.gen_range(-spread..=spread),
    );
    (direction.normalize_or_zero() + offset).normalize_or(direction)
}

/// Система: WeaponFired → трейс пули → DamageTaken по попавшему актору
pub fn resolve_weapon_fire(
    mut fired: EventReader<WeaponFired>,
    mut damage_events: EventWriter<DamageTaken>,
    traces: ColliderTraces,
    actors: Query<(), With<Actor>>,
    mut rng: ResMut<DeterministicRng>,
) {
    for shot in fired.read() {
        let direction = scatter(shot.direction, shot.spread, &mut rng.rng);
        let ray = TraceRay::new(shot.origin, shot.origin + direction * shot.range).ignore(shot.shooter);
        let hit = traces.trace(&ray);

        let Some(target) = hit.entity.filter(|e| actors.contains(*e)) else {
            continue;
        };
        damage_events.write(DamageTaken {
            target,
            attacker: shot.shooter,
            amount: shot.damage,
            origin: shot.origin,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_sneak_attack_triples_damage_on_unaware_npc() {
        assert_eq!(calculate_damage(5, Some(CombatState::Idle), 3.0), 15);
        assert_eq!(calculate_damage(5, Some(CombatState::Patrol), 3.0), 15);
        assert_eq!(calculate_damage(5, Some(CombatState::Engage), 3.0), 5);
        assert_eq!(calculate_damage(5, Some(CombatState::Search), 3.0), 5);
        // Не NPC (игрок/нарушитель)
        assert_eq!(calculate_damage(5, None, 3.0), 5);
    }

    #[test]
    fn test_seek_rule() {
        assert!(should_seek_attacker(CombatState::Idle, false));
        assert!(should_seek_attacker(CombatState::Patrol, true));
        assert!(should_seek_attacker(CombatState::Search, true));
        assert!(should_seek_attacker(CombatState::Push, false));
        assert!(!should_seek_attacker(CombatState::Push, true));
        assert!(!should_seek_attacker(CombatState::Engage, false));
        assert!(!should_seek_attacker(CombatState::Inactive, false));
    }

    #[test]
    fn test_scatter_stays_close_to_aim() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let dir = scatter(Vec3::NEG_Z, 0.1, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-4);
            assert!(dir.angle_between(Vec3::NEG_Z).to_degrees() < 15.0);
        }
        assert_eq!(scatter(Vec3::X, 0.0, &mut rng), Vec3::X);
    }
}
