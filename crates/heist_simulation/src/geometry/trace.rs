//! Ray traces против collider shapes
//!
//! Используем только shape-запросы bevy_rapier3d (`Collider::cast_ray`) без
//! физического pipeline: коллайдеры статичны в пределах тика, ближайшее
//! попадание ищем перебором.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use crate::components::Dead;

/// Маркер: статичная геометрия мира (стены, ящики, колонны)
///
/// `TraceRay::world_only` видит только такие коллайдеры.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct WorldSolid;

/// Смещение центра коллайдера относительно Transform entity
///
/// Акторы стоят origin'ом на полу, а capsule центрирована: поднимаем её.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ColliderOffset(pub Vec3);

/// Запрос трейса: отрезок origin → end
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRay {
    pub origin: Vec3,
    pub end: Vec3,
    pub ignore: Vec<Entity>,
    pub world_only: bool,
}

impl TraceRay {
    pub fn new(origin: Vec3, end: Vec3) -> Self {
        Self {
            origin,
            end,
            ignore: Vec::new(),
            world_only: false,
        }
    }

    pub fn ignore(mut self, entity: Entity) -> Self {
        self.ignore.push(entity);
        self
    }

    pub fn world_only(mut self) -> Self {
        self.world_only = true;
        self
    }

    pub fn length(&self) -> f32 {
        (self.end - self.origin).length()
    }
}

/// Результат трейса
///
/// Пустой трейс (ничего не задели): `hit = false`, `fraction = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    pub hit: bool,
    pub entity: Option<Entity>,
    pub end_position: Vec3,
    pub fraction: f32,
    pub distance: f32,
}

impl TraceHit {
    pub fn miss(ray: &TraceRay) -> Self {
        Self {
            hit: false,
            entity: None,
            end_position: ray.end,
            fraction: 1.0,
            distance: ray.length(),
        }
    }
}

/// Capability: ray cast по миру
pub trait SpatialQuery {
    fn trace(&self, ray: &TraceRay) -> TraceHit;
}

/// Один коллайдер-кандидат для трейса
struct Shape<'a> {
    entity: Entity,
    translation: Vec3,
    rotation: Quat,
    collider: &'a Collider,
    world: bool,
}

fn nearest_hit<'a>(ray: &TraceRay, shapes: impl Iterator<Item = Shape<'a>>) -> TraceHit {
    let delta = ray.end - ray.origin;
    let length = delta.length();
    if length <= f32::EPSILON {
        return TraceHit::miss(ray);
    }
    let dir = delta / length;

    let mut best: Option<(f32, Entity)> = None;
    for shape in shapes {
        if ray.world_only && !shape.world {
            continue;
        }
        if ray.ignore.contains(&shape.entity) {
            continue;
        }

        let Some(toi) = shape.collider.cast_ray(
            shape.translation,
            shape.rotation,
            ray.origin,
            dir,
            length,
            true,
        ) else {
            continue;
        };

        // При равном toi побеждает меньший Entity (стабильный порядок)
        let closer = match best {
            None => true,
            Some((best_toi, best_entity)) => {
                toi < best_toi || (toi == best_toi && shape.entity < best_entity)
            }
        };
        if closer {
            best = Some((toi, shape.entity));
        }
    }

    match best {
        Some((toi, entity)) => TraceHit {
            hit: true,
            entity: Some(entity),
            end_position: ray.origin + dir * toi,
            fraction: (toi / length).clamp(0.0, 1.0),
            distance: toi,
        },
        None => TraceHit::miss(ray),
    }
}

/// SystemParam: трейсы по всем entity с `Collider`
///
/// Мёртвые акторы не блокируют лучи (трупы не укрытие).
#[derive(SystemParam)]
pub struct ColliderTraces<'w, 's> {
    colliders: Query<
        'w,
        's,
        (
            Entity,
            &'static Transform,
            &'static Collider,
            Option<&'static ColliderOffset>,
            Has<WorldSolid>,
            Has<Dead>,
        ),
    >,
}

impl SpatialQuery for ColliderTraces<'_, '_> {
    fn trace(&self, ray: &TraceRay) -> TraceHit {
        let shapes = self
            .colliders
            .iter()
            .filter(|(_, _, _, _, world, dead)| *world || !*dead)
            .map(|(entity, transform, collider, offset, world, _)| Shape {
                entity,
                translation: transform.translation
                    + transform.rotation * offset.map(|o| o.0).unwrap_or(Vec3::ZERO),
                rotation: transform.rotation,
                collider,
                world,
            });
        nearest_hit(ray, shapes)
    }
}

/// Офлайн-сцена без ECS: для генерации точек вне App и для тестов
#[derive(Default, Clone)]
pub struct StaticScene {
    shapes: Vec<(Entity, Transform, Collider, bool)>,
}

impl StaticScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Статичный ящик (`WorldSolid`) с центром `center`
    pub fn add_box(&mut self, entity: Entity, center: Vec3, half_extents: Vec3) -> &mut Self {
        self.shapes.push((
            entity,
            Transform::from_translation(center),
            Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
            true,
        ));
        self
    }

    /// Актор-capsule, стоящий ступнями в `feet`
    pub fn add_actor(&mut self, entity: Entity, feet: Vec3) -> &mut Self {
        self.shapes.push((
            entity,
            Transform::from_translation(feet + ACTOR_COLLIDER_OFFSET),
            actor_collider(),
            false,
        ));
        self
    }
}

impl SpatialQuery for StaticScene {
    fn trace(&self, ray: &TraceRay) -> TraceHit {
        let shapes = self.shapes.iter().map(|(entity, transform, collider, world)| Shape {
            entity: *entity,
            translation: transform.translation,
            rotation: transform.rotation,
            collider,
            world: *world,
        });
        nearest_hit(ray, shapes)
    }
}

/// Центр capsule актора над ступнями
pub const ACTOR_COLLIDER_OFFSET: Vec3 = Vec3::new(0.0, 0.9, 0.0);

/// Capsule актора: высота 1.8m (0.5 + 0.5 + 2 × 0.4), радиус 0.4m
pub fn actor_collider() -> Collider {
    Collider::capsule_y(0.5, 0.4)
}
