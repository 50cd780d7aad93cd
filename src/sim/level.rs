//! Level data: arena geometry, spawn points and wave scripts
//!
//! Levels are immutable configuration loaded before a run. The built-in
//! table ships as JSON embedded in the binary.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rect::Rect;
use super::wave::Wave;

const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to parse level data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level table is empty")]
    NoLevels,
    #[error("level `{id}` has no player spawn points")]
    NoPlayerSpawns { id: String },
    #[error("level `{id}` has no enemy spawn points")]
    NoEnemySpawns { id: String },
    #[error("level `{id}` wave {index}: {reason}")]
    InvalidWave {
        id: String,
        index: usize,
        reason: &'static str,
    },
}

/// One arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub name: String,
    /// Music theme key
    #[serde(default)]
    pub theme: Option<String>,
    pub player_spawns: Vec<Vec2>,
    pub enemy_spawns: Vec<Vec2>,
    pub platforms: Vec<Rect>,
    #[serde(default)]
    pub waves: Vec<Wave>,
}

impl Level {
    /// The levels bundled with the game
    pub fn builtin() -> Result<Vec<Level>, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    /// Parse and validate a JSON level table
    pub fn from_json(json: &str) -> Result<Vec<Level>, LevelError> {
        let levels: Vec<Level> = serde_json::from_str(json)?;
        if levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        levels.into_iter().map(Level::validated).collect()
    }

    /// Reject data the simulation cannot run
    pub fn validated(self) -> Result<Self, LevelError> {
        if self.player_spawns.is_empty() {
            return Err(LevelError::NoPlayerSpawns { id: self.id });
        }
        if self.enemy_spawns.is_empty() && self.waves.iter().any(|w| w.count > 0) {
            return Err(LevelError::NoEnemySpawns { id: self.id });
        }
        for (index, wave) in self.waves.iter().enumerate() {
            if wave.count > 0 && wave.simultaneous == 0 {
                return Err(LevelError::InvalidWave {
                    id: self.id.clone(),
                    index,
                    reason: "simultaneous cap must be at least 1",
                });
            }
            if !wave.interval_ms.is_finite() || wave.interval_ms < 0.0 {
                return Err(LevelError::InvalidWave {
                    id: self.id.clone(),
                    index,
                    reason: "spawn interval must be a non-negative number",
                });
            }
        }
        Ok(self)
    }

    /// Spawn point for player `index`, wrapping around the list
    pub fn player_spawn(&self, index: usize) -> Vec2 {
        self.player_spawns[index % self.player_spawns.len()]
    }

    /// Uniformly chosen enemy spawn point
    pub fn random_enemy_spawn(&self, rng: &mut impl Rng) -> Vec2 {
        self.enemy_spawns[rng.random_range(0..self.enemy_spawns.len())]
    }

    /// Total enemies across every wave
    pub fn total_enemies(&self) -> usize {
        self.waves.iter().map(|w| w.count).sum()
    }
}

/// Wrap any index (negative included) into `0..count`
pub fn normalize_level_index(index: i64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    index.rem_euclid(count as i64) as usize
}
