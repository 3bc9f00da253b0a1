//! Tests for FSM table and NPC params.

use super::fsm::{next_state, CombatState, NpcEvent};
use super::params::{AiSettings, NpcParams};

#[test]
fn test_combat_state_default() {
    assert_eq!(CombatState::default(), CombatState::Inactive);
}

#[test]
fn test_legal_transitions() {
    use CombatState::*;
    use NpcEvent::*;

    let legal = [
        (Inactive, Enable, Idle),
        (Idle, ResumePatrol, Patrol),
        (Patrol, PausePatrol, Idle),
        (Idle, GetTarget, Engage),
        (Patrol, GetTarget, Engage),
        (Search, GetTarget, Engage),
        (Engage, PushTarget, Push),
        (Search, PushTarget, Push),
        (Idle, SeekTarget, Search),
        (Patrol, SeekTarget, Search),
        (Push, SeekTarget, Search),
        (Search, SeekTarget, Search),
        (Engage, Disengage, Patrol),
        (Push, Disengage, Patrol),
        (Search, Disengage, Patrol),
    ];

    for (from, event, to) in legal {
        assert_eq!(next_state(from, event), Some(to), "{:?} + {:?}", from, event);
    }

    // Всё остальное запрещено (Disable обрабатывается отдельно)
    let mut allowed = 0;
    for from in CombatState::ALL {
        for event in NpcEvent::ALL {
            if next_state(from, event).is_some() {
                allowed += 1;
            }
        }
    }
    assert_eq!(allowed, legal.len());
}

#[test]
fn test_disable_is_not_in_table() {
    for from in CombatState::ALL {
        assert_eq!(next_state(from, NpcEvent::Disable), None);
    }
}

#[test]
fn test_unaware_states() {
    assert!(CombatState::Idle.is_unaware());
    assert!(CombatState::Patrol.is_unaware());
    assert!(!CombatState::Search.is_unaware());
    assert!(!CombatState::Engage.is_unaware());
}

#[test]
fn test_params_default_ranges_are_ordered() {
    let params = NpcParams::default();
    assert!(params.min_combat_distance < params.push_combat_distance);
    assert!(params.push_combat_distance < params.max_combat_distance);
    assert!(params.patrol_speed < params.combat_speed);
    assert!(params.engage_stale_time > params.push_stale_time);
}

#[test]
fn test_params_partial_json_uses_defaults() {
    let params: NpcParams = serde_json::from_str(r#"{ "combat_speed": 4.0 }"#).unwrap();
    assert_eq!(params.combat_speed, 4.0);
    assert_eq!(params.patrol_speed, NpcParams::default().patrol_speed);

    let settings: AiSettings = serde_json::from_str(r#"{ "vision_enabled": false }"#).unwrap();
    assert!(!settings.vision_enabled);
    assert!(settings.patrol_enabled);
}
