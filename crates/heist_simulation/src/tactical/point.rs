//! Tactical (cover) points
//!
//! Точка на навигационной сетке с предрассчитанной видимостью: для двух высот
//! глаз (присев / стоя) и 8 направлений храним длину луча до первого
//! препятствия. Оценка укрытия: lookup по этим сэмплам, без трейсов.

use bevy::prelude::*;

use crate::geometry::{direction_from_yaw, yaw_of, SpatialQuery, TraceRay};

/// Высоты глаз над точкой: присев, стоя (m)
pub const VISIBILITY_HEIGHTS: [f32; 2] = [0.8, 1.6];

/// Число yaw-направлений сэмплирования
pub const VISIBILITY_DIVISIONS: usize = 8;

/// Длина луча видимости (m); "ничего не задели" = эта длина
pub const MAX_VISIBILITY_DISTANCE: f32 = 25.0;

/// Полуширина окна запроса: берём минимум двух сэмплов вокруг bearing ±10°
const QUERY_HALF_WIDTH_DEG: f32 = 10.0;

/// Стабильный идентификатор точки внутри набора
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct TacticalPointId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct TacticalPoint {
    id: TacticalPointId,
    position: Vec3,
    claimant: Option<Entity>,
    /// [height][division], height-major
    samples: Vec<f32>,
}

impl TacticalPoint {
    pub fn new(id: TacticalPointId, position: Vec3) -> Self {
        Self {
            id,
            position,
            claimant: None,
            samples: Vec::new(),
        }
    }

    pub fn id(&self) -> TacticalPointId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn has_visibility(&self) -> bool {
        self.samples.len() == VISIBILITY_HEIGHTS.len() * VISIBILITY_DIVISIONS
    }

    /// Предрасчёт видимости по world-only трейсам
    ///
    /// Повторный вызов пересчитывает те же значения (чистая функция геометрии).
    pub fn generate_visibility<G: SpatialQuery + ?Sized>(&mut self, geometry: &G) {
        let mut samples = Vec::with_capacity(VISIBILITY_HEIGHTS.len() * VISIBILITY_DIVISIONS);
        for height in VISIBILITY_HEIGHTS {
            let origin = self.position + Vec3::Y * height;
            for division in 0..VISIBILITY_DIVISIONS {
                let dir = direction_from_yaw(division_yaw(division));
                let ray = TraceRay::new(origin, origin + dir * MAX_VISIBILITY_DISTANCE).world_only();
                let hit = geometry.trace(&ray);
                samples.push(hit.distance.min(MAX_VISIBILITY_DISTANCE));
            }
        }
        self.samples = samples;
    }

    /// Дальность видимости в сторону `target` для каждой высоты: [присев, стоя]
    ///
    /// Аппроксимация: минимум сэмплов, ближайших к bearing ±10°. Погрешность
    /// ограничена угловым шагом сетки. Без предрасчёта: максимальная дальность.
    pub fn visibility_distance_towards(&self, target: Vec3) -> [f32; 2] {
        if !self.has_visibility() {
            return [MAX_VISIBILITY_DISTANCE; 2];
        }

        let offset = (target - self.position).with_y(0.0);
        let bearing = if offset.length_squared() > f32::EPSILON {
            yaw_of(offset)
        } else {
            0.0
        };

        let half = QUERY_HALF_WIDTH_DEG.to_radians();
        let a = nearest_division(bearing - half);
        let b = nearest_division(bearing + half);

        let mut result = [MAX_VISIBILITY_DISTANCE; 2];
        for (h, slot) in result.iter_mut().enumerate() {
            let row = &self.samples[h * VISIBILITY_DIVISIONS..(h + 1) * VISIBILITY_DIVISIONS];
            *slot = row[a].min(row[b]);
        }
        result
    }

    pub fn is_claimed(&self) -> bool {
        self.claimant.is_some()
    }

    pub fn claimant(&self) -> Option<Entity> {
        self.claimant
    }

    pub fn is_available_to(&self, agent: Entity) -> bool {
        self.claimant.is_none_or(|owner| owner == agent)
    }

    /// Эксклюзивный захват. Повторный захват тем же агентом: успешный no-op.
    pub fn claim(&mut self, agent: Entity) -> bool {
        match self.claimant {
            Some(owner) => owner == agent,
            None => {
                self.claimant = Some(agent);
                true
            }
        }
    }

    /// Освободить может только текущий владелец
    pub fn unclaim(&mut self, agent: Entity) -> bool {
        if self.claimant == Some(agent) {
            self.claimant = None;
            true
        } else {
            false
        }
    }

    /// Принудительное освобождение (владелец умер или удалён)
    pub(crate) fn release(&mut self) -> Option<Entity> {
        self.claimant.take()
    }
}

fn division_step() -> f32 {
    std::f32::consts::TAU / VISIBILITY_DIVISIONS as f32
}

fn division_yaw(division: usize) -> f32 {
    division as f32 * division_step()
}

fn nearest_division(yaw: f32) -> usize {
    let index = (yaw / division_step()).round() as i64;
    index.rem_euclid(VISIBILITY_DIVISIONS as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StaticScene;

    fn agent(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    #[test]
    fn test_claim_exclusivity() {
        let mut point = TacticalPoint::new(TacticalPointId(0), Vec3::ZERO);
        let (a, b) = (agent(1), agent(2));

        assert!(point.claim(a));
        assert!(!point.claim(b), "второй агент не может занять чужую точку");
        assert!(point.claim(a), "повторный захват владельцем: no-op успех");
        assert_eq!(point.claimant(), Some(a));

        assert!(!point.unclaim(b), "чужой unclaim игнорируется");
        assert!(point.unclaim(a));
        assert!(point.claim(b));
        assert_eq!(point.claimant(), Some(b));
    }

    #[test]
    fn test_open_ground_sees_max_distance() {
        let mut point = TacticalPoint::new(TacticalPointId(0), Vec3::ZERO);
        point.generate_visibility(&StaticScene::new());

        assert!(point.has_visibility());
        assert!(point.samples().iter().all(|d| (*d - MAX_VISIBILITY_DISTANCE).abs() < 1e-4));
        assert_eq!(
            point.visibility_distance_towards(Vec3::new(3.0, 0.0, -7.0)),
            [MAX_VISIBILITY_DISTANCE; 2]
        );
    }

    #[test]
    fn test_chest_high_cover_blocks_only_crouch_height() {
        // Низкая стенка (1.2m) в 2m к северу (-Z) от точки
        let mut scene = StaticScene::new();
        scene.add_box(agent(100), Vec3::new(0.0, 0.6, -2.0), Vec3::new(3.0, 0.6, 0.1));

        let mut point = TacticalPoint::new(TacticalPointId(0), Vec3::ZERO);
        point.generate_visibility(&scene);

        let [crouch, stand] = point.visibility_distance_towards(Vec3::new(0.0, 0.0, -10.0));
        assert!((crouch - 1.9).abs() < 1e-3, "crouch = {}", crouch);
        assert!((stand - MAX_VISIBILITY_DISTANCE).abs() < 1e-3, "stand = {}", stand);

        // В обратную сторону стенки нет
        let [crouch_back, _] = point.visibility_distance_towards(Vec3::new(0.0, 0.0, 10.0));
        assert!((crouch_back - MAX_VISIBILITY_DISTANCE).abs() < 1e-3);
    }

    #[test]
    fn test_query_between_samples_takes_minimum() {
        let mut point = TacticalPoint::new(TacticalPointId(0), Vec3::ZERO);
        // Ручные сэмплы: division 0 (−Z) = 5m, division 1 (45°) = 9m
        point.samples = vec![MAX_VISIBILITY_DISTANCE; VISIBILITY_HEIGHTS.len() * VISIBILITY_DIVISIONS];
        point.samples[0] = 5.0;
        point.samples[1] = 9.0;

        // Bearing 22.5°: ±10° попадает в divisions 0 и 1
        let target = direction_from_yaw(22.5_f32.to_radians()) * 10.0;
        assert_eq!(point.visibility_distance_towards(target)[0], 5.0);

        // Bearing 45°: оба окна округляются к division 1
        let target = direction_from_yaw(45.0_f32.to_radians()) * 10.0;
        assert_eq!(point.visibility_distance_towards(target)[0], 9.0);
    }
}
