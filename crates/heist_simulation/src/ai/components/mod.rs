//! AI components (FSM таблица, параметры NPC).

pub mod fsm;
pub mod params;

#[cfg(test)]
mod fsm_tests;

pub use fsm::{next_state, CombatState, NpcEvent};
pub use params::{AiSettings, NpcParams};
