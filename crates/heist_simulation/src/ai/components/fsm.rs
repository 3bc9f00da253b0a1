//! Combat FSM: состояния, события, таблица переходов

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Боевое состояние NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum CombatState {
    /// Ничего не делает (после спавна / смерти / Disable)
    #[default]
    Inactive,
    /// Стоит на месте, осматривается
    Idle,
    /// Патрулирует маршрут или бродит
    Patrol,
    /// Ищет цель у последней известной позиции
    Search,
    /// Держит дистанцию, занимает укрытие
    Engage,
    /// Сближается с ослабленной целью
    Push,
}

/// События FSM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum NpcEvent {
    Enable,
    Disable,
    ResumePatrol,
    PausePatrol,
    GetTarget,
    PushTarget,
    SeekTarget,
    Disengage,
}

impl CombatState {
    pub const ALL: [CombatState; 6] = [
        CombatState::Inactive,
        CombatState::Idle,
        CombatState::Patrol,
        CombatState::Search,
        CombatState::Engage,
        CombatState::Push,
    ];

    /// Состояния, в которых NPC ещё не знает о противнике (sneak attack)
    pub fn is_unaware(&self) -> bool {
        matches!(self, CombatState::Idle | CombatState::Patrol)
    }
}

impl NpcEvent {
    pub const ALL: [NpcEvent; 8] = [
        NpcEvent::Enable,
        NpcEvent::Disable,
        NpcEvent::ResumePatrol,
        NpcEvent::PausePatrol,
        NpcEvent::GetTarget,
        NpcEvent::PushTarget,
        NpcEvent::SeekTarget,
        NpcEvent::Disengage,
    ];
}

/// Таблица переходов. `None`: переход запрещён.
///
/// Disable сюда не входит: он легален из любого состояния и обрабатывается
/// отдельно (сброс цели и steering).
pub fn next_state(from: CombatState, event: NpcEvent) -> Option<CombatState> {
    use CombatState::*;
    use NpcEvent::*;

    match (from, event) {
        (Inactive, Enable) => Some(Idle),
        (Idle, ResumePatrol) => Some(Patrol),
        (Patrol, PausePatrol) => Some(Idle),
        (Idle | Patrol | Search, GetTarget) => Some(Engage),
        (Engage | Search, PushTarget) => Some(Push),
        (Idle | Patrol | Push | Search, SeekTarget) => Some(Search),
        (Engage | Push | Search, Disengage) => Some(Patrol),
        _ => None,
    }
}
