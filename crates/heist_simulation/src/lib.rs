//! Heist Simulation Core
//!
//! Headless ECS-симуляция боевого AI охраны (Bevy 0.16, FixedUpdate 60Hz).
//!
//! - ai: FSM, память о целях, зрение, steering, поворот
//! - tactical: укрытия (видимость, claim, файл карты)
//! - combat: оружие NPC, трейс пуль, урон, смерть
//! - geometry: capabilities окружения (трейсы, навигация)
//! - guards: спавн охраны, debug-сценарии

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod geometry;
pub mod guards;
pub mod logger;
pub mod tactical;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, AiSettings, CombatState, NpcBrain, NpcEvent, NpcParams, TargetMemory};
pub use combat::{CombatPlugin, DamageTaken, EntityDied, NpcWeapon, WeaponFired};
pub use components::*;
pub use config::{ConfigError, DefaultNpcParams, SimulationConfig};
pub use geometry::{NavArea, WorldSolid};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter,
};
pub use tactical::{TacticalPointRequest, TacticalPoints};

/// Фазы тика (FixedUpdate), выполняются строго по порядку
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Часы, authoring запросы
    Input,
    /// Снимок акторов, think, движение, поворот
    Ai,
    /// Оружие, урон, смерть
    Combat,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<SimulationClock>()
            .init_resource::<NavArea>()
            .init_resource::<TacticalPoints>()
            .init_resource::<DefaultNpcParams>()
            .add_event::<TacticalPointRequest>()
            .configure_sets(
                FixedUpdate,
                (SimulationSet::Input, SimulationSet::Ai, SimulationSet::Combat).chain(),
            )
            .add_systems(
                FixedUpdate,
                (advance_clock, tactical::handle_point_requests)
                    .chain()
                    .in_set(SimulationSet::Input),
            )
            // Подсистемы
            .add_plugins((AIPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Номер тика и время симуляции
///
/// `tick`: ключ кэша видимости (одна проверка на NPC за тик).
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    pub tick: u64,
    pub elapsed: f32,
}

/// System: продвигает часы симуляции
pub fn advance_clock(mut clock: ResMut<SimulationClock>, time: Res<Time<Fixed>>) {
    clock.tick += 1;
    clock.elapsed += time.delta_secs();
}

/// Один `App::update` = ровно один fixed tick
pub const TICK: Duration = Duration::from_nanos(16_666_667);

/// Создаёт Bevy App для headless симуляции
///
/// Время продвигается вручную на `TICK` за update: прогон не зависит от
/// wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_duration(TICK))
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Позиции, health и состояние FSM всех акторов по возрастанию Entity.
pub fn world_snapshot(world: &mut World) -> String {
    let mut query = world.query::<(Entity, &Transform, &Health, Option<&NpcBrain>)>();
    let mut actors: Vec<_> = query.iter(world).collect();
    actors.sort_by_key(|(entity, ..)| *entity);

    actors
        .into_iter()
        .map(|(entity, transform, health, brain)| {
            format!(
                "{:?} {:?} {:?} hp={} state={:?}\n",
                entity,
                transform.translation,
                transform.rotation,
                health.current,
                brain.map(|b| b.state)
            )
        })
        .collect()
}
