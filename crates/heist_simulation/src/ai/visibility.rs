//! Может ли NPC сейчас видеть конкретную цель
//!
//! Асимметричный gate: вблизи (near_distance) NPC "чувствует" цель почти
//! в любом направлении, дальше: только в узком конусе взгляда. Reduced vision
//! (для давно не виденных целей) строже по обоим параметрам. Gate прошёл :
//! трейс глаза → глаза, первым должна попасться сама цель.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::snapshots::ActorSnapshot;
use crate::geometry::{SpatialQuery, TraceRay};

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct VisionCone {
    pub near_distance: f32,
    pub near_max_deviation_deg: f32,
    pub far_max_deviation_deg: f32,
}

impl VisionCone {
    pub const NORMAL: VisionCone = VisionCone {
        near_distance: 2.4,
        near_max_deviation_deg: 180.0,
        far_max_deviation_deg: 100.0,
    };

    pub const REDUCED: VisionCone = VisionCone {
        near_distance: 1.6,
        near_max_deviation_deg: 135.0,
        far_max_deviation_deg: 75.0,
    };

    pub fn admits(&self, distance: f32, deviation_deg: f32) -> bool {
        if distance <= self.near_distance {
            // 180° = круговой обзор (acos может дать 180.00002)
            self.near_max_deviation_deg >= 180.0 || deviation_deg <= self.near_max_deviation_deg
        } else {
            deviation_deg < self.far_max_deviation_deg
        }
    }
}

/// Кто смотрит
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub entity: Entity,
    pub eye_position: Vec3,
    pub eye_forward: Vec3,
}

/// Угол (градусы) между forward и направлением на точку
pub fn angular_deviation_deg(forward: Vec3, direction: Vec3) -> f32 {
    if forward.length_squared() <= f32::EPSILON || direction.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    forward.angle_between(direction).to_degrees()
}

pub fn can_perceive<G: SpatialQuery + ?Sized>(
    observer: &Observer,
    target: Option<&ActorSnapshot>,
    cone: &VisionCone,
    geometry: &G,
) -> bool {
    let Some(target) = target else {
        return false;
    };
    if !target.is_alive() || target.entity == observer.entity {
        return false;
    }

    let to_target = target.eye_position - observer.eye_position;
    let deviation = angular_deviation_deg(observer.eye_forward, to_target);
    if !cone.admits(to_target.length(), deviation) {
        return false;
    }

    let ray = TraceRay::new(observer.eye_position, target.eye_position).ignore(observer.entity);
    geometry.trace(&ray).entity == Some(target.entity)
}
