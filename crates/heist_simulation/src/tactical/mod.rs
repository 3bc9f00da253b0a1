//! Tactical points domain
//!
//! Содержит:
//! - TacticalPoint (точка укрытия + предрассчитанная видимость + claim)
//! - TacticalPoints (process-wide набор точек текущей карты)
//! - persistence (JSON файл `<map>.json`: упорядоченный список позиций)
//! - authoring (TacticalPointRequest: place/clear/save/load)

use bevy::prelude::*;

pub mod authoring;
pub mod persistence;
pub mod point;

pub use authoring::{handle_point_requests, TacticalPointRequest};
pub use persistence::{load_points, point_file_path, save_points, PointFileError};
pub use point::{
    TacticalPoint, TacticalPointId, MAX_VISIBILITY_DISTANCE, VISIBILITY_DIVISIONS,
    VISIBILITY_HEIGHTS,
};

use crate::ai::ActorSnapshots;
use crate::geometry::SpatialQuery;

/// Набор tactical points текущей карты
///
/// Единственный разделяемый между NPC ресурс с конкуренцией (claim). Системы
/// обходят агентов в стабильном порядке, поэтому кто первый в тике: тот и
/// занял точку.
#[derive(Resource, Debug, Default)]
pub struct TacticalPoints {
    map_name: String,
    points: Vec<TacticalPoint>,
    next_id: u32,
}

impl TacticalPoints {
    pub fn new(map_name: impl Into<String>) -> Self {
        Self {
            map_name: map_name.into(),
            ..Default::default()
        }
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn set_map_name(&mut self, map_name: impl Into<String>) {
        self.map_name = map_name.into();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Создаёт точку и сразу считает её видимость
    pub fn create_point<G: SpatialQuery + ?Sized>(
        &mut self,
        position: Vec3,
        geometry: &G,
    ) -> TacticalPointId {
        let id = TacticalPointId(self.next_id);
        self.next_id += 1;

        let mut point = TacticalPoint::new(id, position);
        point.generate_visibility(geometry);
        self.points.push(point);
        id
    }

    pub fn get(&self, id: TacticalPointId) -> Option<&TacticalPoint> {
        self.points.iter().find(|p| p.id() == id)
    }

    pub fn get_mut(&mut self, id: TacticalPointId) -> Option<&mut TacticalPoint> {
        self.points.iter_mut().find(|p| p.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TacticalPoint> {
        self.points.iter()
    }

    /// Позиции в порядке создания (формат файла карты)
    pub fn positions(&self) -> Vec<Vec3> {
        self.points.iter().map(|p| p.position()).collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Полная замена набора (load): старые точки и их claims исчезают
    pub fn replace_with<G: SpatialQuery + ?Sized>(&mut self, positions: &[Vec3], geometry: &G) {
        self.clear();
        for position in positions {
            self.create_point(*position, geometry);
        }
    }

    pub fn claim(&mut self, id: TacticalPointId, agent: Entity) -> bool {
        self.get_mut(id).is_some_and(|p| p.claim(agent))
    }

    pub fn unclaim(&mut self, id: TacticalPointId, agent: Entity) -> bool {
        self.get_mut(id).is_some_and(|p| p.unclaim(agent))
    }

    /// Освобождает все точки, чей владелец удовлетворяет предикату
    pub fn release_claims_where(&mut self, mut stale: impl FnMut(Entity) -> bool) -> usize {
        let mut released = 0;
        for point in self.points.iter_mut() {
            if point.claimant().is_some_and(&mut stale) {
                point.release();
                released += 1;
            }
        }
        released
    }
}

/// Система: освобождение точек, занятых мёртвыми или удалёнными агентами
pub fn release_stale_claims(mut points: ResMut<TacticalPoints>, actors: Res<ActorSnapshots>) {
    let released = points.release_claims_where(|agent| !actors.is_alive(agent));
    if released > 0 {
        crate::log(&format!("🪑 Released {} stale tactical point claim(s)", released));
    }
}
