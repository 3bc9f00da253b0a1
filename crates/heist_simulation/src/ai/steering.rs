//! Steering: куда и с какой скоростью идёт NPC
//!
//! `Steering`: активная стратегия движения (компонент). `steer_update`
//! перезаписывает её по текущему состоянию FSM; отмены нет, следующий
//! steer update просто заменяет директиву.
//!
//! Политика по состояниям:
//! - Idle: стоим. Patrol: маршрут (два конца + пауза) или свободное блуждание.
//! - Search: last known position видна насквозь → забываем и осматриваемся
//!   рядом; иначе идём к ней (сразу, если grace ещё не истёк).
//! - Engage: укрытие; нет укрытия и цель далеко → сближаемся до середины;
//!   иначе топчемся на месте.
//! - Push: далеко → сближаемся; близко → "shadow dance" вокруг цели.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::brain::{Npc, NpcWorld};
use super::components::{CombatState, NpcParams};
use crate::geometry::{NavQuery, TraceRay};
use crate::tactical::{TacticalPoint, TacticalPointId, TacticalPoints};

/// Ближе этого к цели движения: прибыли (m, по горизонтали)
pub const ARRIVE_DISTANCE: f32 = 0.3;

/// Свободное блуждание в патруле без маршрута
const PATROL_WANDER: (f32, f32) = (5.0, 12.5);
/// "Осмотреться" в Search, когда last known position видна
const LOOK_AROUND: (f32, f32) = (5.0, 10.0);
/// Подход к last known position
const SEARCH_APPROACH: (f32, f32) = (2.5, 5.0);
/// Топтание у занятого укрытия
const COVER_WANDER: (f32, f32) = (0.25, 1.25);
/// Топтание в Engage без укрытия
const ENGAGE_WANDER: (f32, f32) = (1.0, 2.5);
/// Сближение в Engage: радиусы × clamp(dist / scale, 1, 3)
const ENGAGE_ADVANCE: (f32, f32) = (2.5, 5.0);
const ENGAGE_ADVANCE_SCALE: f32 = 10.0;
/// Сближение в Push
const PUSH_ADVANCE: (f32, f32) = (1.25, 2.0);
const PUSH_ADVANCE_SCALE: f32 = 6.25;

/// Маршрут патруля: два конца и пауза на каждом
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub start: Vec3,
    pub end: Vec3,
    pub delay: f32,
}

/// Активная стратегия движения
#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum Steering {
    #[default]
    Stopped,
    MoveTo {
        target: Vec3,
    },
    /// Блуждание вокруг текущей позиции
    Wander {
        min_radius: f32,
        max_radius: f32,
        goal: Option<Vec3>,
    },
    /// Блуждание вокруг фиксированной точки
    WanderPoint {
        anchor: Vec3,
        min_radius: f32,
        max_radius: f32,
        goal: Option<Vec3>,
    },
    Patrol {
        route: PatrolRoute,
        heading_to_end: bool,
        pause_remaining: f32,
        goal: Option<Vec3>,
    },
}

fn arrived(position: Vec3, goal: Vec3) -> bool {
    (goal - position).with_y(0.0).length() <= ARRIVE_DISTANCE
}

impl Steering {
    pub fn wander((min_radius, max_radius): (f32, f32)) -> Self {
        Steering::Wander {
            min_radius,
            max_radius,
            goal: None,
        }
    }

    pub fn wander_point(anchor: Vec3, (min_radius, max_radius): (f32, f32)) -> Self {
        Steering::WanderPoint {
            anchor,
            min_radius,
            max_radius,
            goal: None,
        }
    }

    pub fn patrol(route: PatrolRoute) -> Self {
        Steering::Patrol {
            route,
            heading_to_end: false,
            pause_remaining: 0.0,
            goal: None,
        }
    }

    /// Текущая цель движения; обновляет внутреннее состояние (новые точки
    /// блуждания, паузы патруля). `None`: стоим.
    pub fn next_goal(
        &mut self,
        position: Vec3,
        nav: &dyn NavQuery,
        rng: &mut ChaCha8Rng,
        dt: f32,
    ) -> Option<Vec3> {
        match self {
            Steering::Stopped => None,
            Steering::MoveTo { target } => (!arrived(position, *target)).then_some(*target),
            Steering::Wander {
                min_radius,
                max_radius,
                goal,
            } => {
                if goal.is_none_or(|g| arrived(position, g)) {
                    *goal = nav.point_within_radius(position, *min_radius, *max_radius, rng);
                }
                *goal
            }
            Steering::WanderPoint {
                anchor,
                min_radius,
                max_radius,
                goal,
            } => {
                if goal.is_none_or(|g| arrived(position, g)) {
                    *goal = nav.point_within_radius(*anchor, *min_radius, *max_radius, rng);
                }
                *goal
            }
            Steering::Patrol {
                route,
                heading_to_end,
                pause_remaining,
                goal,
            } => {
                if *pause_remaining > 0.0 {
                    *pause_remaining -= dt;
                    return None;
                }
                match *goal {
                    Some(g) if arrived(position, g) => {
                        // Дошли до конца: перерыв
                        *goal = None;
                        *pause_remaining = route.delay;
                        None
                    }
                    Some(g) => Some(g),
                    None => {
                        // Идём к дальнему концу
                        let to_end = position.distance(route.start) <= position.distance(route.end);
                        *heading_to_end = to_end;
                        let destination = if to_end { route.end } else { route.start };
                        *goal = Some(nav.closest_point(destination).unwrap_or(destination));
                        *goal
                    }
                }
            }
        }
    }
}

/// Шаг движения к цели по горизонтали: (новая позиция, velocity)
pub fn integrate_towards(position: Vec3, goal: Option<Vec3>, speed: f32, dt: f32) -> (Vec3, Vec3) {
    let Some(goal) = goal else {
        return (position, Vec3::ZERO);
    };
    let offset = (goal - position).with_y(0.0);
    let distance = offset.length();
    if distance <= f32::EPSILON || dt <= 0.0 {
        return (position, Vec3::ZERO);
    }

    let dir = offset / distance;
    let step = (speed * dt).min(distance);
    (position + dir * step, dir * (step / dt))
}

/// Оценка укрытия; `None`: точка вне радиуса поиска
///
/// - линия огня: стоя видно цель (+10)
/// - укрытие по грудь: присев луч упирается раньше цели (до +25)
/// - близость к NPC (до +10, −1 за каждые 1.25m)
/// - дистанция до цели в идеальном диапазоне (+10)
pub fn score_cover_point(
    point: &TacticalPoint,
    agent_position: Vec3,
    target_position: Vec3,
    params: &NpcParams,
) -> Option<i32> {
    let from_agent = point.position().distance(agent_position);
    if from_agent > params.cover_search_radius {
        return None;
    }

    let to_target = point.position().distance(target_position).max(f32::EPSILON);
    let [crouch, stand] = point.visibility_distance_towards(target_position);

    let mut score = 0;
    if stand >= to_target {
        score += 10;
    }
    if crouch < to_target {
        score += (25.0 - crouch / to_target * 25.0).clamp(0.0, 25.0).round() as i32;
    }
    score += (10.0 - from_agent / 1.25).clamp(0.0, 10.0).round() as i32;
    if to_target > params.min_combat_distance && to_target < params.push_combat_distance {
        score += 10;
    }
    Some(score)
}

/// Лучшая доступная агенту точка с положительным score
///
/// При равном score побеждает точка, созданная раньше.
pub fn select_cover_point(
    points: &TacticalPoints,
    agent: Entity,
    agent_position: Vec3,
    target_position: Vec3,
    params: &NpcParams,
) -> Option<TacticalPointId> {
    let mut best: Option<(TacticalPointId, i32)> = None;
    for point in points.iter().filter(|p| p.is_available_to(agent)) {
        let Some(score) = score_cover_point(point, agent_position, target_position, params) else {
            continue;
        };
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((point.id(), score));
        }
    }
    best.map(|(id, _)| id)
}

impl Npc<'_> {
    /// Пересчёт steering по текущему состоянию и цели
    pub fn steer_update(&mut self, world: &mut NpcWorld) {
        self.brain.time_since_steer = 0.0;

        match (self.brain.state, self.memory.current()) {
            (CombatState::Search, _) => {
                self.release_claim(world);
                self.steer_search(world);
            }
            (CombatState::Engage, Some(target)) => self.steer_engage(world, target),
            (CombatState::Push, Some(target)) => {
                self.release_claim(world);
                self.steer_push(world, target);
            }
            (state, _) => {
                self.release_claim(world);
                self.speed.speed = self.params.patrol_speed;
                // Плановый refresh не сбрасывает прогресс патруля (конец, пауза)
                let next = match (state, self.patrol) {
                    (CombatState::Patrol, Some(route)) => match &*self.steering {
                        Steering::Patrol { route: current, .. } if current == route => return,
                        _ => Steering::patrol(*route),
                    },
                    (CombatState::Patrol, None) => match &*self.steering {
                        Steering::Wander {
                            min_radius,
                            max_radius,
                            ..
                        } if (*min_radius, *max_radius) == PATROL_WANDER => return,
                        _ => Steering::wander(PATROL_WANDER),
                    },
                    _ => Steering::Stopped,
                };
                *self.steering = next;
            }
        }
    }

    /// Позиция цели: живая, если видели недавно; иначе last known position
    fn tracked_target_position(&self, world: &NpcWorld, target: Entity) -> Vec3 {
        let live = world.actors.get(target).map(|a| a.position);
        if self.memory.time_since_target_visible() < self.params.recent_sighting_time {
            if let Some(position) = live {
                return position;
            }
        }
        match self.memory.last_target_position() {
            Vec3::ZERO => live.unwrap_or(self.position),
            last => last,
        }
    }

    fn steer_search(&mut self, world: &mut NpcWorld) {
        self.speed.speed = self.params.patrol_speed;

        let mut last = self.memory.last_target_position();
        if last != Vec3::ZERO {
            let ray = TraceRay::new(self.eye_position, last).ignore(self.entity);
            if world.geometry.trace(&ray).fraction >= self.params.forget_position_fraction {
                // Last known position и так видна: там никого нет
                self.memory.set_last_target_position(Vec3::ZERO);
                last = Vec3::ZERO;
            }
        }

        if last == Vec3::ZERO {
            *self.steering = Steering::wander(LOOK_AROUND);
            return;
        }

        let destination = if self.memory.time_since_target_reappear() < 0.0 {
            Some(last)
        } else {
            world
                .nav
                .point_within_radius(last, SEARCH_APPROACH.0, SEARCH_APPROACH.1, world.rng)
        };
        *self.steering = Steering::MoveTo {
            target: destination.unwrap_or(last),
        };
    }

    fn steer_engage(&mut self, world: &mut NpcWorld, target: Entity) {
        let target_position = self.tracked_target_position(world, target);
        let distance = self.position.distance(target_position);
        let closer = self.position + (target_position - self.position) * 0.5;
        self.speed.speed = self.params.combat_speed;

        if let Some(id) =
            select_cover_point(world.points, self.entity, self.position, target_position, self.params)
        {
            if world.points.claim(id, self.entity) {
                if self.brain.claimed_point != Some(id) {
                    self.release_claim(world);
                    self.brain.claimed_point = Some(id);
                }
                let anchor = world.points.get(id).map_or(self.position, |p| p.position());
                *self.steering = Steering::wander_point(anchor, COVER_WANDER);
                return;
            }
        }

        // Укрытия нет (или его заняли первым): fallback по дистанции
        self.release_claim(world);
        if distance > self.params.max_combat_distance {
            let mult = (distance / ENGAGE_ADVANCE_SCALE).clamp(1.0, 3.0);
            let destination = world.nav.point_within_radius(
                closer,
                ENGAGE_ADVANCE.0 * mult,
                ENGAGE_ADVANCE.1 * mult,
                world.rng,
            );
            *self.steering = Steering::MoveTo {
                target: destination.unwrap_or(target_position),
            };
        } else {
            *self.steering = Steering::wander(ENGAGE_WANDER);
        }
    }

    fn steer_push(&mut self, world: &mut NpcWorld, target: Entity) {
        let target_position = self.tracked_target_position(world, target);
        let distance = self.position.distance(target_position);
        let closer = self.position + (target_position - self.position) * 0.5;
        let p = self.params;
        self.speed.speed = p.combat_speed;

        let destination = if distance > p.push_combat_distance {
            let mult = (distance / PUSH_ADVANCE_SCALE).clamp(1.0, 3.0);
            world
                .nav
                .point_within_radius(closer, PUSH_ADVANCE.0 * mult, PUSH_ADVANCE.1 * mult, world.rng)
        } else {
            // Shadow dance: кольцо вокруг цели, не вплотную
            let outer = (p.min_combat_distance * 1.5).max(p.push_combat_distance * 0.75);
            world
                .nav
                .point_within_radius(target_position, p.min_combat_distance, outer, world.rng)
        };
        *self.steering = Steering::MoveTo {
            target: destination.unwrap_or(target_position),
        };
    }
}
