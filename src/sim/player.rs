//! Player controller
//!
//! Turns action queries into movement, jumps, dashes and shots, then moves
//! the body through the level geometry.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::resolve_against_platforms;
use super::entity::{Body, Combatant, EntityIds, FrameTime};
use super::events::{EventSink, GameEvent};
use super::input::{Action, ActionQuery, Controls};
use super::projectile::{Palette, Projectile};
use super::rect::Rect;
use crate::consts::*;
use crate::frame_scale;

/// Static description of a player character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPreset {
    pub id: &'static str,
    pub color: u32,
    pub accent: u32,
    /// Key codes in [`Action::ALL`] order
    pub keys: [&'static str; 5],
}

impl PlayerPreset {
    pub fn controls(&self) -> Controls {
        let [left, right, jump, dash, shoot] = self.keys;
        Controls {
            left: left.to_string(),
            right: right.to_string(),
            jump: jump.to_string(),
            dash: dash.to_string(),
            shoot: shoot.to_string(),
        }
    }
}

/// The two cooperative characters
pub const PLAYER_PRESETS: [PlayerPreset; 2] = [
    PlayerPreset {
        id: "fire",
        color: 0xf43f5e,
        accent: 0xf97316,
        keys: ["keya", "keyd", "keyw", "keyk", "keyj"],
    },
    PlayerPreset {
        id: "ice",
        color: 0x38bdf8,
        accent: 0x22d3ee,
        keys: ["arrowleft", "arrowright", "arrowup", "period", "enter"],
    },
];

/// Trail snapshot for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub facing: f32,
    /// Remaining life (ms)
    pub life: f32,
}

/// A player character
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    /// Input slot queried for this player's actions
    pub slot: usize,
    pub element: &'static str,
    pub color: u32,
    pub accent: u32,
    pub controls: Controls,
    pub body: Body,
    pub max_health: i32,
    /// -1.0 (left) or 1.0 (right)
    pub facing: f32,
    /// Earliest timestamp a dash may start
    pub next_dash: f64,
    /// Earliest timestamp a shot may fire
    pub next_shot: f64,
    /// Remaining dash-active time (ms)
    pub dash_timer: f32,
    /// Recent positions, newest first
    pub trail: Vec<TrailPoint>,
    trail_timer: f32,
}

impl Combatant for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Player {
    pub fn new(id: u32, slot: usize, preset: &PlayerPreset, spawn: Vec2) -> Self {
        Self {
            id,
            slot,
            element: preset.id,
            color: preset.color,
            accent: preset.accent,
            controls: preset.controls(),
            body: Body::new(spawn, PLAYER_WIDTH, PLAYER_HEIGHT, PLAYER_MAX_HEALTH),
            max_health: PLAYER_MAX_HEALTH,
            facing: 1.0,
            next_dash: 0.0,
            next_shot: 0.0,
            dash_timer: 0.0,
            trail: Vec::with_capacity(TRAIL_MAX_POINTS + 1),
            trail_timer: 0.0,
        }
    }

    /// Contact with enemies counts as an attack while true
    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    /// Advance one frame: resolve intents, integrate, collide, clamp
    pub fn update(
        &mut self,
        input: &impl ActionQuery,
        platforms: &[Rect],
        time: FrameTime,
        projectiles: &mut Vec<Projectile>,
        ids: &mut EntityIds,
        events: &mut impl EventSink,
    ) {
        let scale = frame_scale(time.elapsed_ms);
        let was_grounded = self.body.on_ground;

        self.apply_horizontal_input(input, scale);
        self.apply_gravity(scale);
        self.handle_jump(input, was_grounded, events);
        self.handle_dash(input, time.now, events);
        if let Some(projectile) = self.handle_shoot(input, time.now, ids) {
            events.emit(GameEvent::Fired {
                player: self.id,
                projectile: projectile.id,
            });
            projectiles.push(projectile);
        }
        self.dash_timer = (self.dash_timer - time.elapsed_ms).max(0.0);

        self.body.on_ground = false;
        self.body.integrate(scale);
        resolve_against_platforms(&mut self.body, platforms);

        let floor_y = ARENA_HEIGHT - self.body.height - PLAYER_FLOOR_MARGIN;
        self.body.clamp_position(
            Vec2::new(PLAYER_WALL_MARGIN, 0.0),
            Vec2::new(
                ARENA_WIDTH - self.body.width - PLAYER_WALL_MARGIN,
                floor_y,
            ),
        );

        // Backstop in case platform resolution lets the player sink
        if self.body.position.y >= floor_y - 0.5 && self.body.velocity.y >= 0.0 {
            self.body.position.y = floor_y;
            self.body.on_ground = true;
            self.body.velocity.y = 0.0;
        }
        self.body.sync_hitbox();

        self.update_trail(time.elapsed_ms);
    }

    fn apply_horizontal_input(&mut self, input: &impl ActionQuery, scale: f32) {
        let mut intent = 0.0;
        if input.is_held(self.slot, Action::Left) {
            intent -= 1.0;
        }
        if input.is_held(self.slot, Action::Right) {
            intent += 1.0;
        }
        if intent != 0.0 {
            self.facing = intent;
        }

        let vel = &mut self.body.velocity;
        vel.x += intent * PLAYER_MOVE_ACCEL * scale;
        if intent == 0.0 {
            vel.x *= PLAYER_FRICTION;
        }
        vel.x = vel.x.clamp(-PLAYER_MAX_SPEED, PLAYER_MAX_SPEED);
    }

    fn apply_gravity(&mut self, scale: f32) {
        let vel = &mut self.body.velocity;
        vel.y += PLAYER_GRAVITY * scale;
        vel.y = vel.y.min(PLAYER_MAX_SPEED * PLAYER_TERMINAL_FACTOR);
    }

    fn handle_jump(&mut self, input: &impl ActionQuery, can_jump: bool, events: &mut impl EventSink) {
        if can_jump && input.was_pressed(self.slot, Action::Jump) {
            self.body.velocity.y = PLAYER_JUMP_VELOCITY;
            self.body.on_ground = false;
            events.emit(GameEvent::Jumped {
                player: self.id,
                feet: Vec2::new(
                    self.body.position.x + self.body.width / 2.0,
                    self.body.position.y + self.body.height,
                ),
            });
        }
    }

    fn handle_dash(&mut self, input: &impl ActionQuery, now: f64, events: &mut impl EventSink) {
        if input.was_pressed(self.slot, Action::Dash) && now >= self.next_dash {
            self.body.velocity.x = self.facing * DASH_BOOST;
            self.body.velocity.y *= DASH_VERTICAL_DAMPING;
            self.next_dash = now + DASH_COOLDOWN_MS;
            self.dash_timer = DASH_ACTIVE_MS;
            events.emit(GameEvent::Dashed {
                player: self.id,
                center: self.body.center(),
                facing: self.facing,
            });
        }
    }

    fn handle_shoot(
        &mut self,
        input: &impl ActionQuery,
        now: f64,
        ids: &mut EntityIds,
    ) -> Option<Projectile> {
        if !input.was_pressed(self.slot, Action::Shoot) || now < self.next_shot {
            return None;
        }
        self.next_shot = now + FIRE_COOLDOWN_MS;
        Some(Projectile::new(
            ids.next_id(),
            self.body.center(),
            Vec2::new(self.facing, 0.0),
            PROJECTILE_SPEED,
            PROJECTILE_RADIUS,
            self.id,
            Palette {
                core: self.accent,
                glow: self.color,
            },
            now,
        ))
    }

    fn update_trail(&mut self, elapsed_ms: f32) {
        self.trail_timer = (self.trail_timer - elapsed_ms).max(0.0);
        for point in &mut self.trail {
            point.life -= elapsed_ms;
        }
        self.trail.retain(|p| p.life > 0.0);

        if !self.body.is_alive() {
            return;
        }
        let moving = self.body.velocity.length() > TRAIL_MIN_SPEED || self.is_dashing();
        if !moving || self.trail_timer > 0.0 {
            return;
        }
        self.trail_timer = if self.is_dashing() {
            TRAIL_DASH_INTERVAL_MS
        } else {
            TRAIL_INTERVAL_MS
        };
        self.trail.insert(
            0,
            TrailPoint {
                pos: self.body.center(),
                facing: self.facing,
                life: TRAIL_LIFE_MS,
            },
        );
        self.trail.truncate(TRAIL_MAX_POINTS);
    }

    /// Respawn at `spawn` with full health and fresh cooldowns
    pub fn reset(&mut self, spawn: Vec2) {
        self.body.velocity = Vec2::ZERO;
        self.body.health = self.max_health;
        self.body.set_position(spawn);
        self.next_dash = 0.0;
        self.next_shot = 0.0;
        self.dash_timer = 0.0;
        self.trail.clear();
        self.trail_timer = 0.0;
    }
}
