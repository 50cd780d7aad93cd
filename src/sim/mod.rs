//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time comes in from the caller (elapsed + timestamp)
//! - Seeded RNG only
//! - Stable iteration order (list order, oldest first)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod input;
pub mod level;
pub mod player;
pub mod projectile;
pub mod rect;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::{circle_hits_rect, rects_overlap, resolve_against_platforms};
pub use enemy::{Enemy, EnemyModifiers};
pub use entity::{Body, Combatant, Damage, FrameTime};
pub use events::{EventSink, GameEvent, HitSource};
pub use input::{Action, ActionQuery, FrameInput, KeyboardInput, MenuAction};
pub use level::{Level, LevelError};
pub use player::{PLAYER_PRESETS, Player, PlayerPreset};
pub use projectile::Projectile;
pub use rect::Rect;
pub use state::{GamePhase, GameState, Snapshot};
pub use tick::{tick, update};
pub use wave::{DirectorAction, DirectorState, Wave, WaveDirector};
