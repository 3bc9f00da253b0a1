//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (health, eye height, intruder/crouch маркеры)
//! - movement: скорость и velocity (PhysicsBody, MovementSpeed)

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
