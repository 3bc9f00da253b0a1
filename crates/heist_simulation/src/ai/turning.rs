//! Поворот тела и взгляда
//!
//! Тело: `Transform::rotation` (только yaw), глаза: `Aim::eye_rotation`
//! (yaw + pitch). Глаза сначала поворачиваются вместе с телом, потом
//! догоняют свою цель. Forward = −Z.

use bevy::prelude::*;

use super::components::{CombatState, NpcParams};
use crate::geometry::yaw_of;

/// Скорость поворота тела к цели (доля slerp за секунду)
const BODY_TURN_RATE: f32 = 5.0;
/// Скорость поворота глаз при прицеливании вплотную
const EYE_AIM_RATE: f32 = 15.0;
/// Дистанция, на которой прицеливание замедляется вдвое
const EYE_AIM_SLOWDOWN_DISTANCE: f32 = 25.0;
const EYE_SCAN_RATE: f32 = 5.0;
const EYE_IDLE_RATE: f32 = 10.0;
/// Амплитуды "осматривания" (градусы)
const SCAN_SWEEP_DEG: f32 = 75.0;
const IDLE_DRIFT_DEG: f32 = 60.0;
const SEARCH_SWAY_DEG: f32 = 45.0;
/// Дрожание прицела (градусы)
const AIM_JITTER_YAW_DEG: f32 = 2.0;
const AIM_JITTER_PITCH_DEG: f32 = 1.0;
/// Медленнее: тело не разворачивается по ходу движения
const MIN_TURN_VELOCITY: f32 = 0.01;
const WALK_TURN_SPEED: f32 = 2.5;
const WALK_TURN_RATE: f32 = 20.0;

/// Направление взгляда NPC
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Aim {
    pub eye_rotation: Quat,
}

impl Default for Aim {
    fn default() -> Self {
        Self {
            eye_rotation: Quat::IDENTITY,
        }
    }
}

impl Aim {
    pub fn forward(&self) -> Vec3 {
        self.eye_rotation * Vec3::NEG_Z
    }
}

/// Rotation, смотрящий вдоль `direction` (без roll)
pub fn look_rotation(direction: Vec3) -> Quat {
    let horizontal = direction.with_y(0.0).length();
    let pitch = direction.y.atan2(horizontal);
    Quat::from_euler(EulerRot::YXZ, yaw_of(direction), pitch, 0.0)
}

fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_y(yaw)
}

/// Что нужно знать для поворота за один тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnInput {
    pub state: CombatState,
    pub position: Vec3,
    pub eye_position: Vec3,
    /// Точка на уровне глаз, куда смотрим; `None`: цели нет
    pub focus: Option<Vec3>,
    pub time_since_visible: f32,
    pub velocity: Vec3,
    pub elapsed: f32,
    pub dt: f32,
}

/// Новые (тело, глаза)
pub fn turn(body: Quat, eyes: Quat, input: &TurnInput, params: &NpcParams) -> (Quat, Quat) {
    let t = input.elapsed;
    let dt = input.dt;

    let (body_goal, body_rate) = match input.focus {
        Some(focus) => {
            let to_focus = (focus - input.position).with_y(0.0);
            (Some(yaw_of(to_focus)), BODY_TURN_RATE)
        }
        None => {
            let velocity = input.velocity.with_y(0.0);
            let speed = velocity.length();
            if speed > MIN_TURN_VELOCITY {
                if input.state == CombatState::Search {
                    let sway = (t / 2.0).cos() * SEARCH_SWAY_DEG.to_radians();
                    (Some(yaw_of(velocity) + sway), BODY_TURN_RATE)
                } else {
                    let turn_speed = (speed / WALK_TURN_SPEED).clamp(0.0, 1.0);
                    (Some(yaw_of(velocity)), turn_speed * WALK_TURN_RATE)
                }
            } else {
                (None, 0.0)
            }
        }
    };

    let new_body = match body_goal {
        Some(yaw) => body.slerp(yaw_rotation(yaw), (body_rate * dt).min(1.0)),
        None => body,
    };
    // Глаза поворачиваются вместе с телом
    let mut new_eyes = (new_body * body.inverse() * eyes).normalize();

    let body_yaw = yaw_of(new_body * Vec3::NEG_Z);
    let (eye_goal, eye_rate) = match input.focus {
        Some(focus) if input.time_since_visible >= params.scanning_after => {
            // Давно не видим: осматриваемся вокруг last known position
            let yaw = yaw_of(focus - input.position) + (t * 2.0).sin() * SCAN_SWEEP_DEG.to_radians();
            (yaw_rotation(yaw), EYE_SCAN_RATE)
        }
        Some(focus) => {
            let to_focus = focus - input.eye_position;
            let base = look_rotation(to_focus);
            let jitter = Quat::from_euler(
                EulerRot::YXZ,
                (t / 2.0).sin() * AIM_JITTER_YAW_DEG.to_radians(),
                (t / 2.0).cos() * AIM_JITTER_PITCH_DEG.to_radians(),
                0.0,
            );
            let slowdown = (to_focus.length() / EYE_AIM_SLOWDOWN_DISTANCE).clamp(0.0, 1.0);
            (base * jitter, EYE_AIM_RATE * (1.0 - 0.5 * slowdown))
        }
        None => {
            let yaw = body_yaw + (t / 2.0).sin() * IDLE_DRIFT_DEG.to_radians();
            (yaw_rotation(yaw), EYE_IDLE_RATE)
        }
    };
    new_eyes = new_eyes.slerp(eye_goal, (eye_rate * dt).min(1.0)).normalize();

    (new_body, new_eyes)
}
