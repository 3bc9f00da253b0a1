//! Geometry capabilities, которые AI потребляет у окружения
//!
//! - `SpatialQuery`: ray traces (line-of-sight, cover sampling, стрельба)
//! - `NavQuery`: случайные/ближайшие точки навигации
//!
//! Решения AI не знают, кто отвечает на запросы: в headless симуляции это
//! `ColliderTraces` (rapier shapes) и `NavArea`, в игре: движок.

pub mod nav;
pub mod trace;

pub use nav::{NavArea, NavQuery};
pub use trace::{
    actor_collider, ColliderOffset, ColliderTraces, SpatialQuery, StaticScene, TraceHit, TraceRay,
    WorldSolid, ACTOR_COLLIDER_OFFSET,
};

/// Yaw bearing (радианы) горизонтального направления.
///
/// 0 = forward (-Z), положительный угол: поворот против часовой вокруг +Y
/// (совпадает с `Quat::from_rotation_y`).
pub fn yaw_of(direction: bevy::math::Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

/// Горизонтальное направление для yaw (обратное к `yaw_of`)
pub fn direction_from_yaw(yaw: f32) -> bevy::math::Vec3 {
    bevy::math::Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::{Quat, Vec3};

    #[test]
    fn test_yaw_matches_bevy_rotation() {
        for i in 0..8 {
            let yaw = std::f32::consts::FRAC_PI_4 * i as f32;
            let rotated = Quat::from_rotation_y(yaw) * Vec3::NEG_Z;
            let dir = direction_from_yaw(yaw);
            assert!((rotated - dir).length() < 1e-5, "yaw {} -> {:?} vs {:?}", yaw, rotated, dir);

            let back = yaw_of(dir).rem_euclid(std::f32::consts::TAU);
            assert!((back - yaw.rem_euclid(std::f32::consts::TAU)).abs() < 1e-4);
        }
    }
}
