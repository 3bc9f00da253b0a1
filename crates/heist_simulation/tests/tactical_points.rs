//! Tactical points через App: authoring события и файл карты

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use heist_simulation::{create_headless_app, TacticalPointRequest, TacticalPoints, WorldSolid};

fn create_floor_app() -> App {
    let mut app = create_headless_app(42);
    app.world_mut().spawn((
        WorldSolid,
        Transform::from_xyz(0.0, -0.5, 0.0),
        Collider::cuboid(50.0, 0.5, 50.0),
    ));
    app.world_mut().resource_mut::<TacticalPoints>().set_map_name("vault");
    // Первый update: нулевой delta, fixed tick не срабатывает
    app.update();
    app
}

fn send(app: &mut App, request: TacticalPointRequest) {
    app.world_mut().send_event(request);
    app.update();
}

fn positions(app: &App) -> Vec<Vec3> {
    app.world().resource::<TacticalPoints>().positions()
}

#[test]
fn test_place_points_on_floor() {
    let mut app = create_floor_app();

    send(
        &mut app,
        TacticalPointRequest::Place {
            origin: Vec3::new(3.0, 1.6, -2.0),
            direction: Vec3::NEG_Y,
        },
    );
    send(
        &mut app,
        TacticalPointRequest::Place {
            origin: Vec3::new(0.0, 1.6, 0.0),
            direction: Vec3::new(0.0, -1.0, -1.0),
        },
    );

    let placed = positions(&app);
    assert_eq!(placed.len(), 2);
    assert!(placed[0].distance(Vec3::new(3.0, 0.0, -2.0)) < 1e-3);
    assert!(placed[1].distance(Vec3::new(0.0, 0.0, -1.6)) < 1e-3);

    let points = app.world().resource::<TacticalPoints>();
    assert!(points.iter().all(|p| p.has_visibility()));
}

#[test]
fn test_place_into_sky_does_nothing() {
    let mut app = create_floor_app();
    send(
        &mut app,
        TacticalPointRequest::Place {
            origin: Vec3::new(0.0, 1.6, 0.0),
            direction: Vec3::Y,
        },
    );
    assert!(positions(&app).is_empty());
}

#[test]
fn test_save_clear_load_restores_points() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = create_floor_app();

    for x in [-4.0, 0.0, 4.0] {
        send(
            &mut app,
            TacticalPointRequest::Place {
                origin: Vec3::new(x, 1.6, -3.0),
                direction: Vec3::NEG_Y,
            },
        );
    }
    let saved = positions(&app);
    assert_eq!(saved.len(), 3);

    send(&mut app, TacticalPointRequest::Save { dir: dir.path().to_path_buf() });
    assert!(dir.path().join("vault.json").exists());

    send(&mut app, TacticalPointRequest::Clear);
    assert!(positions(&app).is_empty());

    send(&mut app, TacticalPointRequest::Load { dir: dir.path().to_path_buf() });
    assert_eq!(positions(&app), saved);
}

#[test]
fn test_load_missing_file_keeps_current_points() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = create_floor_app();
    send(
        &mut app,
        TacticalPointRequest::Place {
            origin: Vec3::new(1.0, 1.6, 1.0),
            direction: Vec3::NEG_Y,
        },
    );

    send(&mut app, TacticalPointRequest::Load { dir: dir.path().to_path_buf() });
    assert_eq!(positions(&app).len(), 1);
}
