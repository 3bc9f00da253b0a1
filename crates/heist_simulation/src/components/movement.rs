//! Movement компоненты: скорость, velocity

use bevy::prelude::*;

/// Текущая скорость тела (m/s), интегрируется в Transform системой steering
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec3,
}

/// Желаемая скорость движения актора (метры/сек)
///
/// NPC меняют её при каждом steer update (patrol vs combat speed).
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 1.0 } // 1 m/s: патрульный шаг
    }
}
