//! Combat integration test
//!
//! Полный headless App: охрана замечает грабителя, стреляет, реагирует на
//! урон, умирает; укрытия делятся между охранниками.

use bevy::prelude::*;
use heist_simulation::ai::Steering;
use heist_simulation::geometry::StaticScene;
use heist_simulation::guards::{spawn_gunner, spawn_intruder, start_battle_royale};
use heist_simulation::*;

/// Helper: App с "бдительной" охраной (без фазы подозрения)
fn create_alert_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(AiSettings {
        start_cool: false,
        ..Default::default()
    });
    app
}

/// Helper: прогон `seconds` секунд симуляции (первый update: нулевой delta)
fn run_seconds(app: &mut App, seconds: f32) {
    let ticks = (seconds * 60.0).round() as usize + 1;
    for _ in 0..ticks {
        app.update();
    }
}

fn state_of(app: &App, entity: Entity) -> CombatState {
    app.world().get::<NpcBrain>(entity).unwrap().state
}

fn health_of(app: &App, entity: Entity) -> u32 {
    app.world().get::<Health>(entity).unwrap().current
}

#[test]
fn test_guard_spots_and_shoots_intruder() {
    let mut app = create_alert_app(42);
    let guard = spawn_gunner(app.world_mut(), Vec3::ZERO, NpcWeapon::pistol());
    let intruder = spawn_intruder(app.world_mut(), Vec3::new(0.0, 0.0, -4.0));

    run_seconds(&mut app, 0.5);
    assert!(matches!(state_of(&app, guard), CombatState::Engage | CombatState::Push));

    run_seconds(&mut app, 5.0);
    let hp = health_of(&app, intruder);
    assert!(hp < 100, "intruder untouched after 5s of fire");

    let weapon = app.world().get::<NpcWeapon>(guard).unwrap();
    assert!(weapon.ammo_clip < weapon.clip_size || weapon.is_reloading());
}

#[test]
fn test_sneak_attack_then_guard_turns_and_engages() {
    let mut app = create_headless_app(7);
    let guard = spawn_gunner(app.world_mut(), Vec3::ZERO, NpcWeapon::pistol());
    // Сзади: охрана смотрит в −Z
    let intruder = spawn_intruder(app.world_mut(), Vec3::new(0.0, 0.0, 12.0));

    run_seconds(&mut app, 0.5);
    assert_eq!(state_of(&app, guard), CombatState::Idle);

    app.world_mut().send_event(DamageTaken {
        target: guard,
        attacker: intruder,
        amount: 5,
        origin: Vec3::new(0.0, 1.6, 12.0),
    });
    run_seconds(&mut app, 0.05);

    assert_eq!(health_of(&app, guard), 85, "Idle victim takes x3");
    let brain = app.world().get::<NpcBrain>(guard).unwrap();
    assert!(!brain.cool);
    assert_eq!(brain.state, CombatState::Search);
    let memory = app.world().get::<TargetMemory>(guard).unwrap();
    assert_eq!(memory.current(), Some(intruder));

    // Разворачивается к угаданной позиции, видит грабителя
    run_seconds(&mut app, 3.0);
    assert!(matches!(state_of(&app, guard), CombatState::Engage | CombatState::Push));
}

#[test]
fn test_dead_guard_is_disabled() {
    let mut app = create_alert_app(3);
    let guard = spawn_gunner(app.world_mut(), Vec3::ZERO, NpcWeapon::rifle());
    let intruder = spawn_intruder(app.world_mut(), Vec3::new(0.0, 0.0, -8.0));
    run_seconds(&mut app, 0.5);

    app.world_mut().send_event(DamageTaken {
        target: guard,
        attacker: intruder,
        amount: 1000,
        origin: Vec3::new(0.0, 1.6, -8.0),
    });
    run_seconds(&mut app, 0.1);

    assert_eq!(health_of(&app, guard), 0);
    assert!(app.world().get::<Dead>(guard).is_some());
    assert_eq!(state_of(&app, guard), CombatState::Inactive);
    assert_eq!(app.world().get::<Steering>(guard), Some(&Steering::Stopped));
    assert_eq!(app.world().get::<PhysicsBody>(guard).unwrap().velocity, Vec3::ZERO);

    // Мёртвый больше не думает и не двигается
    let position = app.world().get::<Transform>(guard).unwrap().translation;
    run_seconds(&mut app, 1.0);
    assert_eq!(state_of(&app, guard), CombatState::Inactive);
    assert_eq!(app.world().get::<Transform>(guard).unwrap().translation, position);
}

#[test]
fn test_cover_point_goes_to_first_guard_only() {
    let mut app = create_alert_app(11);
    {
        let mut points = app.world_mut().resource_mut::<TacticalPoints>();
        points.create_point(Vec3::new(0.0, 0.0, -4.0), &StaticScene::new());
    }
    let first = spawn_gunner(app.world_mut(), Vec3::new(-1.0, 0.0, 0.0), NpcWeapon::pistol());
    let second = spawn_gunner(app.world_mut(), Vec3::new(1.0, 0.0, 0.0), NpcWeapon::pistol());
    spawn_intruder(app.world_mut(), Vec3::new(0.0, 0.0, -12.0));

    run_seconds(&mut app, 1.0);

    let first_claim = app.world().get::<NpcBrain>(first).unwrap().claimed_point;
    let second_claim = app.world().get::<NpcBrain>(second).unwrap().claimed_point;
    assert!(first_claim.is_some());
    assert_eq!(second_claim, None);

    let points = app.world().resource::<TacticalPoints>();
    let claimed: Vec<_> = points.iter().filter_map(|p| p.claimant()).collect();
    assert_eq!(claimed, vec![first]);

    // Смерть владельца освобождает точку
    app.world_mut().send_event(DamageTaken {
        target: first,
        attacker: second,
        amount: 1000,
        origin: Vec3::ZERO,
    });
    run_seconds(&mut app, 0.1);
    let points = app.world().resource::<TacticalPoints>();
    assert!(points.iter().all(|p| p.claimant() != Some(first)));
}

#[test]
fn test_battle_royale_guards_fight_each_other() {
    let mut app = create_headless_app(5);
    let a = spawn_gunner(app.world_mut(), Vec3::new(0.0, 0.0, 0.0), NpcWeapon::pistol());
    let b = spawn_gunner(app.world_mut(), Vec3::new(0.0, 0.0, -6.0), NpcWeapon::pistol());

    assert_eq!(start_battle_royale(app.world_mut()), 2);
    run_seconds(&mut app, 6.0);

    for guard in [a, b] {
        let state = state_of(&app, guard);
        assert!(
            matches!(state, CombatState::Engage | CombatState::Push | CombatState::Inactive),
            "{:?} in {:?}",
            guard,
            state
        );
    }
    assert!(health_of(&app, a) + health_of(&app, b) < 200, "nobody got hurt");
}
