//! Game state and run management
//!
//! Owns every entity in flight plus the level list and the run queue. All
//! randomness flows through the seeded `rng` so a run is reproducible from
//! its settings and input stream.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::entity::EntityIds;
use super::events::{EventSink, GameEvent};
use super::level::{Level, LevelError, normalize_level_index};
use super::player::{PLAYER_PRESETS, Player, TrailPoint};
use super::projectile::{Palette, Projectile};
use super::wave::WaveDirector;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No level loaded
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Every wave cleared
    Victory { has_next: bool },
    /// Every player down
    Defeated,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub phase: GamePhase,
    pub levels: Vec<Level>,
    /// Index into `levels` of the level being played
    pub level_index: usize,
    /// Level indices queued for this run, in play order
    pub run_queue: Vec<usize>,
    /// Position within `run_queue`
    pub run_cursor: usize,
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub director: WaveDirector,
    pub rng: Pcg32,
    pub ids: EntityIds,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// New session on the built-in levels
    pub fn new(settings: Settings) -> Result<Self, LevelError> {
        Self::with_levels(settings, Level::builtin()?)
    }

    /// New session on a custom level table. Every level is validated.
    pub fn with_levels(settings: Settings, levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        let levels = levels
            .into_iter()
            .map(Level::validated)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            phase: GamePhase::Menu,
            levels,
            level_index: 0,
            run_queue: Vec::new(),
            run_cursor: 0,
            players: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            director: WaveDirector::new(),
            ids: EntityIds::default(),
            events: Vec::new(),
        })
    }

    pub fn level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    /// Begin a run at `index` (wrapped into range). The run continues
    /// through every later level in table order.
    pub fn start_level(&mut self, index: i64) {
        let count = self.levels.len();
        let normalized = normalize_level_index(index, count);
        if index < 0 || index as usize >= count {
            log::warn!("level index {index} out of range, using {normalized}");
        }
        self.run_queue = (normalized..count).collect();
        self.run_cursor = 0;
        self.players.clear();
        self.load_level(normalized);
    }

    /// Move to the next queued level, or back to the menu when the run is over
    pub fn advance_to_next_level(&mut self) {
        if self.run_cursor + 1 >= self.run_queue.len() {
            log::info!("run complete");
            self.return_to_menu();
            return;
        }
        self.run_cursor += 1;
        let next = self.run_queue[self.run_cursor];
        self.load_level(next);
    }

    /// Replay the current level with fresh players
    pub fn retry_level(&mut self) {
        self.players.clear();
        self.load_level(self.level_index);
    }

    /// Abandon the run. Everything in flight is dropped.
    pub fn return_to_menu(&mut self) {
        self.phase = GamePhase::Menu;
        self.players.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.run_queue.clear();
        self.run_cursor = 0;
        self.director = WaveDirector::new();
    }

    /// Reset the arena for level `index`. Existing players are reset in
    /// place; missing ones are created.
    fn load_level(&mut self, index: usize) {
        self.level_index = index;
        self.enemies.clear();
        self.projectiles.clear();
        self.director = WaveDirector::new();

        let count = self.settings.effective_player_count();
        let level = &self.levels[index];
        if self.players.len() != count {
            self.players = PLAYER_PRESETS
                .iter()
                .take(count)
                .enumerate()
                .map(|(slot, preset)| {
                    Player::new(self.ids.next_id(), slot, preset, level.player_spawn(slot))
                })
                .collect();
        } else {
            for (slot, player) in self.players.iter_mut().enumerate() {
                player.reset(level.player_spawn(slot));
            }
        }

        log::info!(
            "level {} loaded: {} ({} waves, {} platforms)",
            index,
            level.name,
            level.waves.len(),
            level.platforms.len()
        );
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::LevelLoaded { level_index: index });
    }

    /// Take every pending event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forward pending events to `sink`
    pub fn dispatch(&mut self, sink: &mut impl EventSink) {
        for event in self.events.drain(..) {
            sink.emit(event);
        }
    }

    /// Read-only view for rendering and the HUD
    pub fn snapshot(&self) -> Snapshot {
        let (level_name, wave, wave_total, queued) = match self.phase {
            GamePhase::Menu => (String::new(), 0, 0, 0),
            _ => {
                let level = self.level();
                let total = level.waves.len();
                let current = (self.director.wave_index(&level.waves) + 1).min(total);
                (
                    level.name.clone(),
                    current,
                    total,
                    self.director.pending(&level.waves),
                )
            }
        };

        Snapshot {
            phase: self.phase,
            level_index: self.level_index,
            level_name,
            wave,
            wave_total,
            active_enemies: self.enemies.len(),
            queued_enemies: queued,
            players: self.players.iter().map(PlayerView::from).collect(),
            enemies: self.enemies.iter().map(EnemyView::from).collect(),
            projectiles: self.projectiles.iter().map(ProjectileView::from).collect(),
        }
    }
}

/// Frame state exposed to rendering and audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub level_index: usize,
    pub level_name: String,
    /// 1-based wave shown on the HUD
    pub wave: usize,
    pub wave_total: usize,
    pub active_enemies: usize,
    /// Enemies not yet spawned in this and later waves
    pub queued_enemies: usize,
    pub players: Vec<PlayerView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: u32,
    pub element: &'static str,
    pub color: u32,
    pub accent: u32,
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub health: i32,
    pub max_health: i32,
    pub facing: f32,
    pub dashing: bool,
    pub invulnerable_until: f64,
    pub trail: Vec<TrailPoint>,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            element: player.element,
            color: player.color,
            accent: player.accent,
            position: player.body.position,
            width: player.body.width,
            height: player.body.height,
            health: player.body.health.max(0),
            max_health: player.max_health,
            facing: player.facing,
            dashing: player.is_dashing(),
            invulnerable_until: player.body.invulnerable_until,
            trail: player.trail.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub health: i32,
    pub target: Option<u32>,
}

impl From<&Enemy> for EnemyView {
    fn from(enemy: &Enemy) -> Self {
        Self {
            id: enemy.id,
            position: enemy.body.position,
            width: enemy.body.width,
            height: enemy.body.height,
            health: enemy.body.health,
            target: enemy.current_target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub position: Vec2,
    pub radius: f32,
    pub palette: Palette,
}

impl From<&Projectile> for ProjectileView {
    fn from(projectile: &Projectile) -> Self {
        Self {
            id: projectile.id,
            position: projectile.position,
            radius: projectile.radius,
            palette: projectile.palette,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rect::Rect;
    use crate::sim::wave::Wave;

    fn arena(id: &str) -> Level {
        Level {
            id: id.to_string(),
            name: format!("Arena {id}"),
            theme: None,
            player_spawns: vec![Vec2::new(100.0, 400.0), Vec2::new(800.0, 400.0)],
            enemy_spawns: vec![Vec2::new(480.0, 60.0)],
            platforms: vec![Rect::new(0.0, 500.0, 960.0, 20.0)],
            waves: vec![Wave::new(3, 2, 500.0), Wave::new(4, 2, 500.0)],
        }
    }

    fn state_with(levels: usize) -> GameState {
        let levels = (0..levels).map(|i| arena(&i.to_string())).collect();
        GameState::with_levels(Settings::default(), levels).expect("levels")
    }

    #[test]
    fn test_new_starts_in_menu() {
        let state = GameState::new(Settings::default()).expect("builtin levels");
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.players.is_empty());
        assert!(state.levels.len() >= 3);
        assert!(matches!(
            GameState::with_levels(Settings::default(), Vec::new()),
            Err(LevelError::NoLevels)
        ));
    }

    #[test]
    fn test_custom_levels_are_validated() {
        let mut no_players = arena("a");
        no_players.player_spawns.clear();
        assert!(matches!(
            GameState::with_levels(Settings::default(), vec![no_players]),
            Err(LevelError::NoPlayerSpawns { id }) if id == "a"
        ));

        let mut no_enemy_spawns = arena("b");
        no_enemy_spawns.enemy_spawns.clear();
        no_enemy_spawns.waves = vec![Wave::new(1, 1, 0.0)];
        assert!(matches!(
            GameState::with_levels(Settings::default(), vec![arena("ok"), no_enemy_spawns]),
            Err(LevelError::NoEnemySpawns { id }) if id == "b"
        ));
    }

    #[test]
    fn test_retry_builds_fresh_players() {
        let mut state = state_with(1);
        state.start_level(0);
        let before: Vec<u32> = state.players.iter().map(|p| p.id).collect();
        state.players[0].facing = -1.0;
        state.players[0].body.invulnerable_until = 9_000.0;

        state.retry_level();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.players.len(), 2);
        assert!(state.players.iter().all(|p| !before.contains(&p.id)));
        assert_eq!(state.players[0].facing, 1.0);
        assert_eq!(state.players[0].body.invulnerable_until, 0.0);
    }

    #[test]
    fn test_start_level_builds_queue_and_players() {
        let mut state = state_with(4);
        state.start_level(1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.run_queue, vec![1, 2, 3]);
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[0].body.position, Vec2::new(100.0, 400.0));
        assert_eq!(state.players[1].element, "ice");
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::LevelLoaded { level_index: 1 }]
        );
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_start_level_wraps_index() {
        let mut state = state_with(3);
        state.start_level(-1);
        assert_eq!(state.level_index, 2);
        assert_eq!(state.run_queue, vec![2]);

        state.start_level(7);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.run_queue, vec![1, 2]);
    }

    #[test]
    fn test_advance_keeps_players_and_resets_them() {
        let mut state = state_with(2);
        state.start_level(0);
        let ids: Vec<u32> = state.players.iter().map(|p| p.id).collect();
        state.players[0].body.health = 1;
        state.players[0].body.set_position(Vec2::new(300.0, 100.0));

        state.advance_to_next_level();
        assert_eq!(state.level_index, 1);
        assert_eq!(state.run_cursor, 1);
        let after: Vec<u32> = state.players.iter().map(|p| p.id).collect();
        assert_eq!(ids, after);
        assert_eq!(state.players[0].body.health, 3);
        assert_eq!(state.players[0].body.position, Vec2::new(100.0, 400.0));

        // End of the queue
        state.advance_to_next_level();
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.players.is_empty());
    }

    #[test]
    fn test_single_player_setting() {
        let mut settings = Settings::default();
        settings.player_count = 1;
        let mut state = GameState::with_levels(settings, vec![arena("solo")]).expect("levels");
        state.start_level(0);
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].element, "fire");
    }

    #[test]
    fn test_snapshot_hud_values() {
        let mut state = state_with(1);
        assert_eq!(state.snapshot().wave_total, 0);

        state.start_level(0);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.level_name, "Arena 0");
        assert_eq!(snapshot.wave, 1);
        assert_eq!(snapshot.wave_total, 2);
        assert_eq!(snapshot.queued_enemies, 7);
        assert_eq!(snapshot.players.len(), 2);
        assert!(serde_json::to_string(&snapshot).is_ok());
    }

    #[test]
    fn test_dispatch_forwards_events() {
        let mut state = state_with(1);
        state.start_level(0);
        let mut sink: Vec<GameEvent> = Vec::new();
        state.dispatch(&mut sink);
        assert_eq!(sink.len(), 1);
        assert!(state.events.is_empty());
    }
}
