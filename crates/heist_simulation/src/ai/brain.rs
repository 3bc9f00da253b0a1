//! Мозг NPC: FSM + think-цикл
//!
//! `NpcBrain`: компонент с состоянием FSM, таймерами и очередью событий.
//! Вся логика одного тика живёт на `Npc` (контекст из мутабельных ссылок
//! на компоненты NPC) и `NpcWorld` (общие ресурсы тика). Система собирает
//! контексты и зовёт `Npc::think` для NPC по порядку Entity.
//!
//! Think (порядок фиксирован):
//! 1. таймеры + память о целях
//! 2. очередь событий (Enable после спавна, SeekTarget от урона)
//! 3. Inactive → стоп
//! 4. выбор лучшей цели
//! 5. видимость известных целей (кэш на тик)
//! 6. сканирование новых целей (раз в scan_interval)
//! 7. переходы FSM
//! 8. плановый steer update
//! 9. стрельба / перезарядка

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::components::{next_state, AiSettings, CombatState, NpcEvent, NpcParams};
use super::snapshots::{ActorSnapshot, ActorSnapshots};
use super::steering::{PatrolRoute, Steering};
use super::target_memory::{TargetMemory, SWITCH_GRACE};
use super::turning::Aim;
use super::visibility::{angular_deviation_deg, can_perceive, Observer};
use crate::combat::WeaponCapability;
use crate::components::{Actor, MovementSpeed};
use crate::geometry::{NavQuery, SpatialQuery};
use crate::logger;
use crate::tactical::{TacticalPointId, TacticalPoints};

#[derive(Debug, Clone, Copy, PartialEq)]
struct VisionCache {
    tick: u64,
    visible: bool,
}

/// Состояние FSM и таймеры одного NPC
#[derive(Component, Debug, Clone)]
#[require(Actor, TargetMemory, Steering, NpcParams, MovementSpeed, Aim)]
pub struct NpcBrain {
    pub state: CombatState,
    pub time_in_state: f32,
    pub time_since_steer: f32,
    pub time_since_scan: f32,
    /// Сдвиг каденса полуавтомата к `time_since_primary_attack` оружия (s),
    /// случайный после каждого выстрела
    pub attack_jitter: f32,
    /// 0..1+; ≥ 1: NPC перестаёт быть "спокойным"
    pub suspicion: f32,
    /// Спокойный NPC копит подозрение вместо мгновенного обнаружения
    pub cool: bool,
    pub claimed_point: Option<TacticalPointId>,
    vision_cache: Option<VisionCache>,
    pending: Vec<(NpcEvent, Option<Entity>)>,
}

impl Default for NpcBrain {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NpcBrain {
    /// Новый NPC стартует в Inactive с Enable в очереди
    pub fn new(cool: bool) -> Self {
        Self {
            state: CombatState::Inactive,
            time_in_state: 0.0,
            time_since_steer: 0.0,
            time_since_scan: 0.0,
            attack_jitter: 0.0,
            suspicion: 0.0,
            cool,
            claimed_point: None,
            vision_cache: None,
            pending: vec![(NpcEvent::Enable, None)],
        }
    }

    /// Событие будет обработано в начале следующего think
    pub fn queue_event(&mut self, event: NpcEvent, payload: Option<Entity>) {
        self.pending.push((event, payload));
    }

    pub fn pending_events(&self) -> &[(NpcEvent, Option<Entity>)] {
        &self.pending
    }

    fn advance(&mut self, dt: f32) {
        self.time_in_state += dt;
        self.time_since_steer += dt;
        self.time_since_scan += dt;
    }

    fn cached_visibility(&self, tick: u64) -> Option<bool> {
        self.vision_cache
            .filter(|cache| cache.tick == tick)
            .map(|cache| cache.visible)
    }
}

/// Отключение NPC: Inactive из любого состояния
///
/// Общая часть для события Disable и для смерти NPC.
pub fn disable_npc(
    entity: Entity,
    brain: &mut NpcBrain,
    memory: &mut TargetMemory,
    steering: &mut Steering,
    points: &mut TacticalPoints,
) {
    brain.state = CombatState::Inactive;
    brain.time_in_state = 0.0;
    memory.clear_current();
    *steering = Steering::Stopped;
    if let Some(id) = brain.claimed_point.take() {
        points.unclaim(id, entity);
    }
}

/// Общие ресурсы одного тика
pub struct NpcWorld<'a> {
    pub actors: &'a ActorSnapshots,
    pub geometry: &'a dyn SpatialQuery,
    pub nav: &'a dyn NavQuery,
    pub points: &'a mut TacticalPoints,
    pub rng: &'a mut ChaCha8Rng,
    pub settings: &'a AiSettings,
    pub tick: u64,
    pub dt: f32,
}

/// Один NPC в контексте тика
pub struct Npc<'a> {
    pub entity: Entity,
    /// Ступни
    pub position: Vec3,
    pub eye_position: Vec3,
    pub eye_forward: Vec3,
    pub body_forward: Vec3,
    pub brain: &'a mut NpcBrain,
    pub memory: &'a mut TargetMemory,
    pub steering: &'a mut Steering,
    pub speed: &'a mut MovementSpeed,
    pub params: &'a NpcParams,
    pub patrol: Option<&'a PatrolRoute>,
    pub weapon: Option<&'a mut dyn WeaponCapability>,
}

impl Npc<'_> {
    pub fn state(&self) -> CombatState {
        self.brain.state
    }

    pub fn observer(&self) -> Observer {
        Observer {
            entity: self.entity,
            eye_position: self.eye_position,
            eye_forward: self.eye_forward,
        }
    }

    pub(crate) fn release_claim(&mut self, world: &mut NpcWorld) {
        if let Some(id) = self.brain.claimed_point.take() {
            world.points.unclaim(id, self.entity);
        }
    }

    /// Один тик AI
    pub fn think(&mut self, world: &mut NpcWorld) {
        self.brain.advance(world.dt);
        self.memory.advance(world.dt);

        for (event, payload) in std::mem::take(&mut self.brain.pending) {
            self.fire_event(world, event, payload);
        }

        if self.brain.state == CombatState::Inactive {
            return;
        }

        let actors = world.actors;
        self.memory
            .evaluate_best(|entity| actors.is_alive(entity), |record| record.enmity);

        self.check_target_visibility(world);

        if self.brain.time_since_scan >= self.params.scan_interval {
            self.scan_for_targets(world);
        }

        self.state_update(world);

        if self.brain.time_since_steer > self.params.steer_refresh_interval {
            self.steer_update(world);
        }

        self.update_weapon(world);
    }

    /// Событие FSM. Недопустимый переход: warning и без изменений.
    ///
    /// Возвращает состояние после события.
    pub fn fire_event(
        &mut self,
        world: &mut NpcWorld,
        event: NpcEvent,
        payload: Option<Entity>,
    ) -> CombatState {
        let from = self.brain.state;

        if event == NpcEvent::Disable {
            disable_npc(self.entity, self.brain, self.memory, self.steering, world.points);
            crate::log(&format!("💤 {:?}: {:?} -> Inactive", self.entity, from));
            return self.brain.state;
        }

        let Some(to) = next_state(from, event) else {
            logger::log_warning(&format!(
                "{:?}: invalid transition {:?} --{:?}-->",
                self.entity, from, event
            ));
            return from;
        };

        self.brain.state = to;
        self.brain.time_in_state = 0.0;
        crate::log(&format!(
            "🧠 {:?}: {:?} --{:?}--> {:?} (target {:?})",
            self.entity, from, event, to, payload
        ));

        match event {
            NpcEvent::GetTarget | NpcEvent::PushTarget => {
                self.set_target(world, payload);
                self.steer_update(world);
            }
            NpcEvent::SeekTarget => {
                self.set_unknown_target(world, payload);
                self.steer_update(world);
            }
            NpcEvent::Disengage => {
                self.forget_target();
                self.steer_update(world);
            }
            NpcEvent::Enable | NpcEvent::ResumePatrol | NpcEvent::PausePatrol => {
                self.steer_update(world);
            }
            NpcEvent::Disable => {}
        }

        to
    }

    /// Цель из payload становится текущей; NPC больше не "спокоен"
    fn set_target(&mut self, world: &NpcWorld, payload: Option<Entity>) {
        if let Some(target) = payload {
            if !self.memory.contains(target) {
                if let Some(actor) = world.actors.get(target) {
                    self.memory.record_sighting(target, actor.position, SWITCH_GRACE);
                }
            }
            self.memory.set_current(target);
        }
        self.brain.cool = false;
    }

    /// Знаем, что цель есть, но не где: позиция угадывается с разбросом
    fn set_unknown_target(&mut self, world: &mut NpcWorld, payload: Option<Entity>) {
        let Some(target) = payload else {
            return;
        };
        if self.memory.current() == Some(target) {
            return;
        }
        let Some(actor) = world.actors.get(target).filter(|a| a.is_alive()) else {
            return;
        };

        let angle = world.rng.gen_range(0.0..TAU);
        let radius = world.rng.gen_range(0.0..=self.params.unknown_target_offset);
        let guess = actor.position + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        self.memory.record_unknown(target, guess);
    }

    fn forget_target(&mut self) {
        self.memory.forget_current();
        if self.memory.is_empty() {
            self.brain.suspicion = 0.0;
        }
    }

    /// Видима ли текущая цель; попутно обновляет все видимые записи
    ///
    /// Результат кэшируется на тик.
    pub fn check_target_visibility(&mut self, world: &NpcWorld) -> bool {
        if let Some(visible) = self.brain.cached_visibility(world.tick) {
            return visible;
        }

        let mut visible = false;
        let unaware = self.brain.cool && self.brain.suspicion < 1.0;
        if world.settings.vision_enabled && !unaware {
            let observer = self.observer();
            let current = self.memory.current();
            let candidates: Vec<(Entity, f32)> = self
                .memory
                .iter()
                .map(|record| (record.entity, record.time_since_visible))
                .collect();

            for (entity, unseen) in candidates {
                let cone = if unseen >= self.params.reduced_vision_after {
                    &self.params.reduced_vision
                } else {
                    &self.params.normal_vision
                };
                let actor = world.actors.get(entity);
                if !can_perceive(&observer, actor, cone, world.geometry) {
                    continue;
                }
                if let Some(actor) = actor {
                    self.memory.mark_visible(entity, actor.position);
                }
                if current == Some(entity) {
                    visible = true;
                }
            }
        }

        self.brain.vision_cache = Some(VisionCache {
            tick: world.tick,
            visible,
        });
        visible
    }

    /// Поиск новых нарушителей в радиусе (reduced vision)
    pub fn scan_for_targets(&mut self, world: &mut NpcWorld) {
        self.brain.time_since_scan = 0.0;
        if !world.settings.vision_enabled {
            return;
        }

        let params = self.params;
        self.brain.suspicion = (self.brain.suspicion - params.suspicion_decay).max(0.0);

        let observer = self.observer();
        let candidates: Vec<ActorSnapshot> = world
            .actors
            .within(self.position, params.scan_radius)
            .filter(|actor| actor.intruder && actor.entity != self.entity)
            .copied()
            .collect();

        let mut acquired = false;
        for actor in candidates {
            if !can_perceive(&observer, Some(&actor), &params.reduced_vision, world.geometry) {
                continue;
            }

            if self.memory.contains(actor.entity) {
                self.memory.mark_visible(actor.entity, actor.position);
                continue;
            }

            if self.brain.cool && self.brain.suspicion < 1.0 {
                let gain = self.suspicion_gain(&actor);
                self.brain.suspicion += gain;
                continue;
            }

            self.memory
                .record_sighting(actor.entity, actor.position, SWITCH_GRACE);
            crate::log(&format!("👁️ {:?} spotted {:?}", self.entity, actor.entity));

            let state = self.brain.state;
            if !acquired
                && matches!(state, CombatState::Idle | CombatState::Patrol | CombatState::Search)
            {
                self.fire_event(world, NpcEvent::GetTarget, Some(actor.entity));
                acquired = true;
            }
        }
    }

    /// Прирост подозрения за одно наблюдение
    ///
    /// Ближе, прямее по взгляду и в полный рост: быстрее. Каждый фактор
    /// не меньше 0.25.
    pub fn suspicion_gain(&self, actor: &ActorSnapshot) -> f32 {
        let params = self.params;
        let distance = actor.position.distance(self.position);
        let distance_factor =
            ((params.suspicion_range - distance) / params.suspicion_range).clamp(0.25, 1.0);
        let deviation = angular_deviation_deg(self.eye_forward, actor.eye_position - self.eye_position);
        let angle_factor =
            (1.0 - deviation / params.reduced_vision.far_max_deviation_deg).clamp(0.25, 1.0);
        let stance_factor = if actor.crouching { 0.5 } else { 1.0 };

        params.suspicion_gain * distance_factor * angle_factor * stance_factor
    }

    /// Переходы FSM по таймерам и состоянию цели
    pub fn state_update(&mut self, world: &mut NpcWorld) {
        let params = self.params;
        let target = self.memory.current();
        let snapshot = target.and_then(|entity| world.actors.get(entity)).copied();
        let alive = snapshot.is_some_and(|actor| actor.is_alive());
        let health_fraction = snapshot.map_or(0.0, |actor| actor.health.fraction());
        let unseen = self.memory.time_since_target_visible();
        let time_in_state = self.brain.time_in_state;

        let event = match self.brain.state {
            CombatState::Push => {
                if !alive {
                    Some(NpcEvent::Disengage)
                } else if unseen >= params.push_stale_time {
                    Some(NpcEvent::SeekTarget)
                } else {
                    None
                }
            }
            CombatState::Engage => {
                if !alive || unseen >= params.engage_stale_time {
                    Some(NpcEvent::Disengage)
                } else if unseen <= params.recent_sighting_time
                    && health_fraction < params.push_health_fraction
                {
                    Some(NpcEvent::PushTarget)
                } else {
                    None
                }
            }
            CombatState::Search => {
                if time_in_state >= params.search_give_up_time {
                    Some(NpcEvent::Disengage)
                } else if unseen <= 0.0 {
                    if !alive {
                        Some(NpcEvent::Disengage)
                    } else if health_fraction < params.search_push_health_fraction {
                        Some(NpcEvent::PushTarget)
                    } else {
                        Some(NpcEvent::GetTarget)
                    }
                } else {
                    None
                }
            }
            CombatState::Idle => {
                if target.is_some() {
                    Some(NpcEvent::GetTarget)
                } else if world.settings.patrol_enabled && time_in_state >= params.idle_patrol_delay {
                    Some(NpcEvent::ResumePatrol)
                } else {
                    None
                }
            }
            CombatState::Patrol => {
                if target.is_some() {
                    Some(NpcEvent::GetTarget)
                } else if time_in_state >= params.patrol_pause_interval {
                    Some(NpcEvent::PausePatrol)
                } else {
                    None
                }
            }
            CombatState::Inactive => None,
        };

        if let Some(event) = event {
            self.fire_event(world, event, target);
        }
    }

    /// Стрельба по видимой цели, иначе перезарядка
    fn update_weapon(&mut self, world: &mut NpcWorld) {
        let params = self.params;
        let target = self.memory.current();
        let unseen = self.memory.time_since_target_visible();
        let reappear = self.memory.time_since_target_reappear();
        let aim_deviation = target
            .and_then(|entity| world.actors.get(entity))
            .map(|actor| {
                angular_deviation_deg(self.body_forward, (actor.position - self.position).with_y(0.0))
            });

        let Some(weapon) = self.weapon.as_deref_mut() else {
            return;
        };

        match (target, aim_deviation) {
            (Some(_), Some(deviation)) if unseen <= 0.0 => {
                let semi_ready = weapon.automatic()
                    || weapon.time_since_primary_attack() + self.brain.attack_jitter
                        > 1.0 / params.weapon_semi_rate;
                if deviation <= params.aim_tolerance_deg
                    && reappear >= params.reaction_time
                    && unseen <= params.max_fire_staleness
                    && weapon.can_primary_attack()
                    && semi_ready
                {
                    weapon.attack_primary();
                    let jitter = world.rng.gen::<f32>() - 0.5;
                    self.brain.attack_jitter =
                        jitter * (params.weapon_semi_variance / params.weapon_semi_rate);
                } else if weapon.ammo_clip() == 0 && weapon.can_reload() {
                    weapon.reload();
                }
            }
            (Some(_), _) => {}
            (None, _) => {
                if weapon.ammo_clip() < weapon.clip_size() && weapon.can_reload() {
                    weapon.reload();
                }
            }
        }
    }
}
