//! Конфигурация симуляции из JSON
//!
//! Все поля опциональны: отсутствующие берутся из `Default`.
//!
//! ```json
//! {
//!   "seed": 7,
//!   "ai": { "vision_enabled": true, "patrol_enabled": false },
//!   "npc": { "combat_speed": 3.0, "reaction_time": 0.3 }
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::{AiSettings, NpcParams};
use crate::DeterministicRng;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config {path} is malformed: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Параметры, с которыми спавнятся новые NPC
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct DefaultNpcParams(pub NpcParams);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub ai: AiSettings,
    pub npc: NpcParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ai: AiSettings::default(),
            npc: NpcParams::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Ставит RNG, AI настройки и параметры новых NPC в App
    pub fn apply(&self, app: &mut App) {
        app.insert_resource(DeterministicRng::new(self.seed))
            .insert_resource(self.ai.clone())
            .insert_resource(DefaultNpcParams(self.npc.clone()));
    }
}
