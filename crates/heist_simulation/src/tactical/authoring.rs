//! Authoring tactical points (редакторский инструмент / debug-команды)
//!
//! Place: world-only луч из глаз автора, точка ставится в месте попадания.
//! Save/Load: файл карты. Ошибки I/O только логируются: симуляция продолжает работу.

use std::path::PathBuf;

use bevy::prelude::*;

use super::persistence::{load_points, save_points};
use super::TacticalPoints;
use crate::geometry::{ColliderTraces, SpatialQuery, TraceRay};
use crate::logger;

/// Дальность луча для Place (m)
pub const PLACE_TRACE_DISTANCE: f32 = 250.0;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum TacticalPointRequest {
    /// Поставить точку там, куда смотрит автор
    Place { origin: Vec3, direction: Vec3 },
    /// Удалить все точки
    Clear,
    /// Сохранить текущий набор в `<dir>/<map>.json`
    Save { dir: PathBuf },
    /// Заменить набор содержимым `<dir>/<map>.json`
    Load { dir: PathBuf },
}

/// Применяет один запрос; возвращает созданную точку для Place
pub fn apply_point_request<G: SpatialQuery + ?Sized>(
    request: &TacticalPointRequest,
    points: &mut TacticalPoints,
    geometry: &G,
) -> Option<super::TacticalPointId> {
    match request {
        TacticalPointRequest::Place { origin, direction } => {
            let dir = direction.normalize_or_zero();
            if dir == Vec3::ZERO {
                logger::log_warning("TacticalPointRequest::Place with zero direction ignored");
                return None;
            }

            let ray = TraceRay::new(*origin, *origin + dir * PLACE_TRACE_DISTANCE).world_only();
            let hit = geometry.trace(&ray);
            if !hit.hit {
                logger::log_warning(&format!("📍 Place: no world surface along {:?}", dir));
                return None;
            }

            let id = points.create_point(hit.end_position, geometry);
            crate::log(&format!("📍 Tactical point {:?} at {:?}", id, hit.end_position));
            Some(id)
        }
        TacticalPointRequest::Clear => {
            let count = points.len();
            points.clear();
            logger::log_info(&format!("📍 Cleared {} tactical point(s)", count));
            None
        }
        TacticalPointRequest::Save { dir } => {
            match save_points(dir, points.map_name(), &points.positions()) {
                Ok(path) => logger::log_info(&format!(
                    "💾 Saved {} tactical point(s) to {}",
                    points.len(),
                    path.display()
                )),
                Err(err) => logger::log_error(&format!("💾 Save failed: {}", err)),
            }
            None
        }
        TacticalPointRequest::Load { dir } => {
            match load_points(dir, points.map_name()) {
                Ok(positions) => {
                    points.replace_with(&positions, geometry);
                    logger::log_info(&format!("💾 Loaded {} tactical point(s)", points.len()));
                }
                Err(err) => logger::log_error(&format!("💾 Load failed: {}", err)),
            }
            None
        }
    }
}

/// Система: обработка TacticalPointRequest событий
pub fn handle_point_requests(
    mut requests: EventReader<TacticalPointRequest>,
    mut points: ResMut<TacticalPoints>,
    traces: ColliderTraces,
) {
    for request in requests.read() {
        apply_point_request(request, &mut points, &traces);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StaticScene;

    fn floor_scene() -> StaticScene {
        let mut scene = StaticScene::new();
        scene.add_box(Entity::from_raw(100), Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0));
        scene
    }

    #[test]
    fn test_place_creates_point_on_surface() {
        let scene = floor_scene();
        let mut points = TacticalPoints::new("bank");

        let request = TacticalPointRequest::Place {
            origin: Vec3::new(2.0, 1.6, 0.0),
            direction: Vec3::new(0.0, -1.0, -1.0),
        };
        let id = apply_point_request(&request, &mut points, &scene).unwrap();

        let position = points.get(id).unwrap().position();
        assert!((position - Vec3::new(2.0, 0.0, -1.6)).length() < 1e-3, "{:?}", position);
    }

    #[test]
    fn test_place_into_the_sky_is_ignored() {
        let scene = floor_scene();
        let mut points = TacticalPoints::new("bank");

        let request = TacticalPointRequest::Place {
            origin: Vec3::new(0.0, 1.6, 0.0),
            direction: Vec3::Y,
        };
        assert!(apply_point_request(&request, &mut points, &scene).is_none());
        assert!(points.is_empty());
    }

    #[test]
    fn test_save_clear_load_workflow() {
        let scene = floor_scene();
        let dir = tempfile::tempdir().unwrap();
        let mut points = TacticalPoints::new("bank");
        points.create_point(Vec3::new(1.0, 0.0, 1.0), &scene);
        points.create_point(Vec3::new(-4.0, 0.0, 2.5), &scene);
        let before = points.positions();

        let save = TacticalPointRequest::Save { dir: dir.path().to_path_buf() };
        apply_point_request(&save, &mut points, &scene);
        apply_point_request(&TacticalPointRequest::Clear, &mut points, &scene);
        assert!(points.is_empty());

        let load = TacticalPointRequest::Load { dir: dir.path().to_path_buf() };
        apply_point_request(&load, &mut points, &scene);
        assert_eq!(points.positions(), before);
        assert!(points.iter().all(|p| p.has_visibility()));
    }

    #[test]
    fn test_failed_load_keeps_existing_points() {
        let scene = floor_scene();
        let dir = tempfile::tempdir().unwrap();
        let mut points = TacticalPoints::new("missing_map");
        points.create_point(Vec3::ZERO, &scene);

        let load = TacticalPointRequest::Load { dir: dir.path().to_path_buf() };
        apply_point_request(&load, &mut points, &scene);
        assert_eq!(points.len(), 1);
    }
}
