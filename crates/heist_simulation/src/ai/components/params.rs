//! Параметры NPC и глобальные AI настройки
//!
//! Все дистанции в метрах, времена в секундах. Значения: конфигурация,
//! не инварианты: загружаются из JSON через `SimulationConfig`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::visibility::VisionCone;

/// Тюнинг одного NPC
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct NpcParams {
    pub patrol_speed: f32,
    pub combat_speed: f32,

    /// Темп стрельбы полуавтоматом (выстрелов/сек) + случайная добавка
    pub weapon_semi_rate: f32,
    pub weapon_semi_variance: f32,

    /// Ближе: отходим
    pub min_combat_distance: f32,
    /// Дальше: сближаемся, если в Push
    pub push_combat_distance: f32,
    /// Дальше: не стреляем эффективно, сокращаем дистанцию
    pub max_combat_distance: f32,
    /// Радиус поиска укрытий вокруг NPC
    pub cover_search_radius: f32,

    pub scan_interval: f32,
    pub scan_radius: f32,
    pub steer_refresh_interval: f32,

    /// Engage → Push, если health цели ниже этой доли
    pub push_health_fraction: f32,
    /// Search → Push при повторном обнаружении
    pub search_push_health_fraction: f32,
    /// "Недавно видели" для Push-проверки и выбора позиции цели
    pub recent_sighting_time: f32,
    pub push_stale_time: f32,
    pub engage_stale_time: f32,
    pub search_give_up_time: f32,

    pub idle_patrol_delay: f32,
    pub patrol_pause_interval: f32,

    pub aim_tolerance_deg: f32,
    /// Минимальный time-since-reappear для выстрела
    pub reaction_time: f32,
    /// Не стреляем по цели, невидимой дольше этого
    pub max_fire_staleness: f32,

    pub sneak_attack_multiplier: f32,
    /// Разброс угадываемой позиции "неизвестной" цели
    pub unknown_target_offset: f32,

    pub suspicion_gain: f32,
    pub suspicion_decay: f32,
    pub suspicion_range: f32,

    pub normal_vision: VisionCone,
    pub reduced_vision: VisionCone,
    /// Цель не видна дольше: проверяем reduced vision
    pub reduced_vision_after: f32,
    /// Цель не видна дольше: "осматриваемся" головой
    pub scanning_after: f32,
    /// Трейс до last known position свободен хотя бы на эту долю → забываем её
    pub forget_position_fraction: f32,
}

impl Default for NpcParams {
    fn default() -> Self {
        Self {
            patrol_speed: 1.0,
            combat_speed: 2.5,

            weapon_semi_rate: 3.0,
            weapon_semi_variance: 0.5,

            min_combat_distance: 2.0,
            push_combat_distance: 7.5,
            max_combat_distance: 19.0,
            cover_search_radius: 25.0,

            scan_interval: 0.2,
            scan_radius: 50.0,
            steer_refresh_interval: 3.0,

            push_health_fraction: 0.4,
            search_push_health_fraction: 0.75,
            recent_sighting_time: 2.0,
            push_stale_time: 5.0,
            engage_stale_time: 10.0,
            search_give_up_time: 30.0,

            idle_patrol_delay: 3.0,
            patrol_pause_interval: 60.0,

            aim_tolerance_deg: 15.0,
            reaction_time: 0.5,
            max_fire_staleness: 1.0,

            sneak_attack_multiplier: 3.0,
            unknown_target_offset: 3.2,

            suspicion_gain: 0.5,
            suspicion_decay: 0.15,
            suspicion_range: 25.0,

            normal_vision: VisionCone::NORMAL,
            reduced_vision: VisionCone::REDUCED,
            reduced_vision_after: 2.0,
            scanning_after: 3.0,
            forget_position_fraction: 0.95,
        }
    }
}

/// Глобальные переключатели AI (замена console variables)
#[derive(Resource, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct AiSettings {
    /// false: NPC слепы (не видят и не сканируют)
    pub vision_enabled: bool,
    /// false: Idle NPC не начинают патруль
    pub patrol_enabled: bool,
    /// NPC стартуют "спокойными": сначала копят подозрение
    pub start_cool: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            vision_enabled: true,
            patrol_enabled: true,
            start_cool: true,
        }
    }
}
