//! Снимок акторов на начало тика
//!
//! AI читает чужие health/позиции только отсюда: агенты не лезут в компоненты
//! друг друга, а порядок обхода стабилен (BTreeMap по Entity).

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::components::{Actor, Crouching, EyeHeight, Health, Intruder, PhysicsBody};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    pub entity: Entity,
    pub position: Vec3,
    pub eye_position: Vec3,
    pub velocity: Vec3,
    pub health: Health,
    pub intruder: bool,
    pub crouching: bool,
}

impl ActorSnapshot {
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }
}

#[derive(Resource, Debug, Default, Clone)]
pub struct ActorSnapshots {
    actors: BTreeMap<Entity, ActorSnapshot>,
}

impl ActorSnapshots {
    pub fn insert(&mut self, snapshot: ActorSnapshot) {
        self.actors.insert(snapshot.entity, snapshot);
    }

    pub fn clear(&mut self) {
        self.actors.clear();
    }

    pub fn get(&self, entity: Entity) -> Option<&ActorSnapshot> {
        self.actors.get(&entity)
    }

    /// Существует и жив
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.get(entity).is_some_and(|a| a.is_alive())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.actors.values()
    }

    pub fn within(&self, center: Vec3, radius: f32) -> impl Iterator<Item = &ActorSnapshot> {
        let radius_sq = radius * radius;
        self.actors
            .values()
            .filter(move |a| a.position.distance_squared(center) <= radius_sq)
    }
}

/// Система: пересобирает снимок акторов
pub fn sync_actor_snapshots(
    mut snapshots: ResMut<ActorSnapshots>,
    actors: Query<
        (
            Entity,
            &Transform,
            &Health,
            &EyeHeight,
            &PhysicsBody,
            Has<Intruder>,
            Has<Crouching>,
        ),
        With<Actor>,
    >,
) {
    snapshots.clear();
    for (entity, transform, health, eyes, body, intruder, crouching) in actors.iter() {
        snapshots.insert(ActorSnapshot {
            entity,
            position: transform.translation,
            eye_position: eyes.eye_position(transform.translation, crouching),
            velocity: body.velocity,
            health: *health,
            intruder,
            crouching,
        });
    }
}

#[cfg(test)]
pub(crate) fn snapshot_at(entity: Entity, position: Vec3) -> ActorSnapshot {
    ActorSnapshot {
        entity,
        position,
        eye_position: EyeHeight::default().eye_position(position, false),
        velocity: Vec3::ZERO,
        health: Health::new(100),
        intruder: true,
        crouching: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_and_alive() {
        let mut snapshots = ActorSnapshots::default();
        let near = Entity::from_raw(1);
        let far = Entity::from_raw(2);
        snapshots.insert(snapshot_at(near, Vec3::new(3.0, 0.0, 0.0)));
        let mut dead = snapshot_at(far, Vec3::new(30.0, 0.0, 0.0));
        dead.health.take_damage(500);
        snapshots.insert(dead);

        let found: Vec<_> = snapshots.within(Vec3::ZERO, 10.0).map(|a| a.entity).collect();
        assert_eq!(found, vec![near]);
        assert!(snapshots.is_alive(near));
        assert!(!snapshots.is_alive(far));
        assert!(!snapshots.is_alive(Entity::from_raw(99)));
    }
}
