//! Patrol integration test
//!
//! Охранник с маршрутом доходит до обоих концов и стоит на каждом `delay`
//! секунд, несмотря на плановые steer refresh каждые 3s.

use bevy::prelude::*;
use heist_simulation::ai::PatrolRoute;
use heist_simulation::guards::spawn_gunner;
use heist_simulation::*;

/// Helper: x охранника после каждого update
fn record_patrol(route: PatrolRoute, updates: usize) -> Vec<f32> {
    let mut app = create_headless_app(42);
    let guard = spawn_gunner(app.world_mut(), route.start, NpcWeapon::pistol());
    app.world_mut().entity_mut(guard).insert(route);

    (0..updates)
        .map(|_| {
            app.update();
            app.world().get::<Transform>(guard).unwrap().translation.x
        })
        .collect()
}

#[test]
fn test_patrol_reaches_both_ends_and_dwells() {
    let route = PatrolRoute {
        start: Vec3::ZERO,
        end: Vec3::new(10.0, 0.0, 0.0),
        delay: 5.0,
    };
    // 3s Idle + ~10s к end + 5s + ~10s обратно + 5s
    let xs = record_patrol(route, 37 * 60);

    let (end_index, max_x) = xs
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, x)| if x > best.1 { (i, x) } else { best });
    assert!(max_x >= 9.6, "guard never reached patrol end (max x = {})", max_x);

    let at_end = xs.iter().filter(|x| **x >= 9.6).count();
    assert!(
        (290..=330).contains(&at_end),
        "dwell at end {:.2}s, expected {}s",
        at_end as f32 / 60.0,
        route.delay
    );

    let after_end = &xs[end_index..];
    assert!(
        after_end.iter().any(|x| *x <= 0.4),
        "guard never walked back to patrol start"
    );
    let at_start = after_end.iter().filter(|x| **x <= 0.4).count();
    assert!(
        (290..=330).contains(&at_start),
        "dwell at start {:.2}s, expected {}s",
        at_start as f32 / 60.0,
        route.delay
    );
}

#[test]
fn test_long_dwell_is_not_cut_by_steer_refresh() {
    let route = PatrolRoute {
        start: Vec3::ZERO,
        end: Vec3::new(2.0, 0.0, 0.0),
        delay: 20.0,
    };
    // 3s Idle + ~2s к end + 20s паузы
    let xs = record_patrol(route, 30 * 60);

    let arrived = xs
        .iter()
        .position(|x| *x >= 1.7 - 1e-4)
        .expect("guard never reached patrol end");
    let resting = xs[arrived..].iter().take_while(|x| **x >= 1.7 - 1e-4).count();
    assert!(
        resting as f32 / 60.0 >= 19.5,
        "dwell {:.2}s, expected {}s",
        resting as f32 / 60.0,
        route.delay
    );
}
