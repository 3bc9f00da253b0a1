//! Навигационные запросы
//!
//! Headless `NavArea`: прямоугольная проходимая область на одной высоте пола.
//! Pathfinding вне симуляции: steering идёт к цели по прямой.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Capability: точки навигационной сетки
pub trait NavQuery {
    /// Случайная проходимая точка в кольце [min_radius, max_radius] вокруг center
    fn point_within_radius(
        &self,
        center: Vec3,
        min_radius: f32,
        max_radius: f32,
        rng: &mut ChaCha8Rng,
    ) -> Option<Vec3>;

    /// Ближайшая проходимая точка
    fn closest_point(&self, position: Vec3) -> Option<Vec3>;
}

/// Сколько раз пробуем сэмплировать кольцо, прежде чем сдаться
const SAMPLE_ATTEMPTS: usize = 8;

/// Прямоугольная проходимая область (XZ) на высоте `floor_height`
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct NavArea {
    pub min: Vec2,
    pub max: Vec2,
    pub floor_height: f32,
}

impl Default for NavArea {
    fn default() -> Self {
        Self {
            min: Vec2::splat(-50.0),
            max: Vec2::splat(50.0),
            floor_height: 0.0,
        }
    }
}

impl NavArea {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            floor_height: 0.0,
        }
    }

    pub fn contains(&self, position: Vec3) -> bool {
        position.x >= self.min.x
            && position.x <= self.max.x
            && position.z >= self.min.y
            && position.z <= self.max.y
    }
}

impl NavQuery for NavArea {
    fn point_within_radius(
        &self,
        center: Vec3,
        min_radius: f32,
        max_radius: f32,
        rng: &mut ChaCha8Rng,
    ) -> Option<Vec3> {
        let lo = min_radius.max(0.0);
        let hi = max_radius.max(lo);

        for _ in 0..SAMPLE_ATTEMPTS {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = if hi > lo { rng.gen_range(lo..hi) } else { lo };
            let candidate = Vec3::new(
                center.x + angle.cos() * radius,
                self.floor_height,
                center.z + angle.sin() * radius,
            );
            if self.contains(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn closest_point(&self, position: Vec3) -> Option<Vec3> {
        Some(Vec3::new(
            position.x.clamp(self.min.x, self.max.x),
            self.floor_height,
            position.z.clamp(self.min.y, self.max.y),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_point_within_radius_stays_in_annulus() {
        let area = NavArea::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let center = Vec3::new(3.0, 0.0, -2.0);

        for _ in 0..100 {
            let p = area
                .point_within_radius(center, 2.0, 5.0, &mut rng)
                .expect("annulus fits inside the area");
            let r = (p - center).with_y(0.0).length();
            assert!(r >= 2.0 - 1e-4 && r <= 5.0 + 1e-4, "r = {}", r);
            assert!(area.contains(p));
        }
    }

    #[test]
    fn test_point_outside_area_is_rejected() {
        let area = NavArea::new(Vec2::splat(-1.0), Vec2::splat(1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // Кольцо 10..20 м вокруг центра не пересекает область 2×2 м
        assert!(area.point_within_radius(Vec3::ZERO, 10.0, 20.0, &mut rng).is_none());
    }

    #[test]
    fn test_closest_point_clamps() {
        let area = NavArea::new(Vec2::splat(-1.0), Vec2::splat(1.0));
        assert_eq!(
            area.closest_point(Vec3::new(5.0, 3.0, -0.5)),
            Some(Vec3::new(1.0, 0.0, -0.5))
        );
    }
}
