//! Discrete simulation events for audio and particle collaborators
//!
//! Events are fire-and-forget: the simulation never reads anything back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What dealt damage to an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSource {
    Dash { player: u32 },
    Projectile { player: u32 },
}

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelLoaded { level_index: usize },
    Jumped { player: u32, feet: Vec2 },
    Dashed { player: u32, center: Vec2, facing: f32 },
    Fired { player: u32, projectile: u32 },
    EnemySpawned { enemy: u32, position: Vec2 },
    /// Damage actually applied (blocked hits emit nothing)
    EnemyHit { enemy: u32, at: Vec2, by: HitSource },
    EnemyKilled { enemy: u32, at: Vec2 },
    PlayerHit { player: u32, at: Vec2 },
    PlayerDied { player: u32 },
    WaveAdvanced { wave_index: usize },
    LevelComplete { has_next: bool },
    Defeated,
}

/// Receiver for simulation events
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}
