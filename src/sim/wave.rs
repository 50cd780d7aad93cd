//! Wave director
//!
//! Paces a level's enemy population. Each wave spawns its full count one
//! enemy at a time, throttled by a live-enemy cap and a spawn interval, then
//! drains until every enemy is dead before the next wave begins. Waves never
//! overlap in spawning.

use serde::{Deserialize, Serialize};

use super::enemy::EnemyModifiers;
use crate::consts::{DEFAULT_SIMULTANEOUS, DEFAULT_SPAWN_INTERVAL_MS};

fn default_simultaneous() -> usize {
    DEFAULT_SIMULTANEOUS
}

fn default_interval() -> f32 {
    DEFAULT_SPAWN_INTERVAL_MS
}

/// A scripted batch of enemies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    /// Total enemies spawned by this wave
    pub count: usize,
    /// Maximum live enemies while this wave spawns
    #[serde(default = "default_simultaneous")]
    pub simultaneous: usize,
    /// Minimum time between spawns (ms)
    #[serde(default = "default_interval")]
    pub interval_ms: f32,
    #[serde(default)]
    pub modifiers: EnemyModifiers,
}

impl Wave {
    pub fn new(count: usize, simultaneous: usize, interval_ms: f32) -> Self {
        Self {
            count,
            simultaneous,
            interval_ms,
            modifiers: EnemyModifiers::default(),
        }
    }
}

/// Director state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DirectorState {
    /// Level loaded, nothing evaluated yet
    Idle { wave_index: usize },
    /// Wave is still releasing enemies
    Spawning {
        wave_index: usize,
        spawned: usize,
        live_cap: usize,
        interval_ms: f32,
    },
    /// Full count spawned; waiting for the survivors to die
    Draining { wave_index: usize },
    /// Every wave spawned and cleared
    Complete,
}

/// What the orchestrator should do after a director update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectorAction {
    None,
    Spawn {
        wave_index: usize,
        modifiers: EnemyModifiers,
    },
    WaveAdvanced { wave_index: usize },
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    state: DirectorState,
    /// Time since the last spawn or wave start (ms)
    spawn_timer: f32,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDirector {
    pub fn new() -> Self {
        Self {
            state: DirectorState::Idle { wave_index: 0 },
            spawn_timer: 0.0,
        }
    }

    pub fn state(&self) -> DirectorState {
        self.state
    }

    pub fn wave_index(&self, waves: &[Wave]) -> usize {
        match self.state {
            DirectorState::Idle { wave_index }
            | DirectorState::Spawning { wave_index, .. }
            | DirectorState::Draining { wave_index } => wave_index,
            DirectorState::Complete => waves.len(),
        }
    }

    /// Enemies released so far by the current wave
    pub fn spawned_in_wave(&self, waves: &[Wave]) -> usize {
        match self.state {
            DirectorState::Idle { .. } => 0,
            DirectorState::Spawning { spawned, .. } => spawned,
            DirectorState::Draining { wave_index } => {
                waves.get(wave_index).map_or(0, |w| w.count)
            }
            DirectorState::Complete => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == DirectorState::Complete
    }

    /// Enemies not yet spawned in this and every later wave
    pub fn pending(&self, waves: &[Wave]) -> usize {
        let index = self.wave_index(waves);
        let current = waves
            .get(index)
            .map_or(0, |w| w.count.saturating_sub(self.spawned_in_wave(waves)));
        let later: usize = waves.iter().skip(index + 1).map(|w| w.count).sum();
        current + later
    }

    fn begin_wave(&mut self, waves: &[Wave], wave_index: usize) {
        self.spawn_timer = 0.0;
        self.state = match waves.get(wave_index) {
            Some(wave) => DirectorState::Spawning {
                wave_index,
                spawned: 0,
                live_cap: wave.simultaneous,
                interval_ms: wave.interval_ms,
            },
            None => DirectorState::Complete,
        };
    }

    /// Evaluate one frame. `live_enemies` is the active enemy count after
    /// this frame's removals.
    pub fn update(&mut self, waves: &[Wave], live_enemies: usize, elapsed_ms: f32) -> DirectorAction {
        self.spawn_timer += elapsed_ms;

        if let DirectorState::Idle { wave_index } = self.state {
            if wave_index >= waves.len() {
                if live_enemies == 0 {
                    self.state = DirectorState::Complete;
                    return DirectorAction::Complete;
                }
                return DirectorAction::None;
            }
            let timer = self.spawn_timer;
            self.begin_wave(waves, wave_index);
            self.spawn_timer = timer;
        }

        match self.state {
            DirectorState::Idle { .. } | DirectorState::Complete => DirectorAction::None,
            DirectorState::Draining { wave_index } => {
                if live_enemies > 0 {
                    return DirectorAction::None;
                }
                let next = wave_index + 1;
                self.begin_wave(waves, next);
                if self.is_complete() {
                    log::info!("all {} waves cleared", waves.len());
                    DirectorAction::Complete
                } else {
                    log::info!("wave {} begins", next + 1);
                    DirectorAction::WaveAdvanced { wave_index: next }
                }
            }
            DirectorState::Spawning {
                wave_index,
                spawned,
                live_cap,
                interval_ms,
            } => {
                let Some(wave) = waves.get(wave_index) else {
                    self.state = DirectorState::Complete;
                    return DirectorAction::None;
                };
                if spawned >= wave.count {
                    self.state = DirectorState::Draining { wave_index };
                    return DirectorAction::None;
                }
                if live_enemies >= live_cap || self.spawn_timer < interval_ms {
                    return DirectorAction::None;
                }

                self.spawn_timer = 0.0;
                let spawned = spawned + 1;
                self.state = if spawned >= wave.count {
                    DirectorState::Draining { wave_index }
                } else {
                    DirectorState::Spawning {
                        wave_index,
                        spawned,
                        live_cap,
                        interval_ms,
                    }
                };
                DirectorAction::Spawn {
                    wave_index,
                    modifiers: wave.modifiers,
                }
            }
        }
    }
}
