//! Shared kinematic and health state for players and enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::INVULNERABILITY_MS;

/// Timing for one simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Real time since the previous step (ms)
    pub elapsed_ms: f32,
    /// Current timestamp (ms)
    pub now: f64,
}

impl FrameTime {
    pub fn new(elapsed_ms: f32, now: f64) -> Self {
        Self { elapsed_ms, now }
    }
}

/// Monotonic id source shared by every entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Outcome of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Damage {
    /// Health was reduced (false while invulnerable)
    pub applied: bool,
    /// This hit took health to zero or below
    pub died: bool,
}

impl Damage {
    pub const BLOCKED: Damage = Damage {
        applied: false,
        died: false,
    };
}

/// Position, velocity, hitbox and health of a moving combatant.
///
/// `hitbox` mirrors `position` and the size. Every method that moves the
/// body re-syncs it; code that writes `position` directly must call
/// [`Body::sync_hitbox`] before anything reads the hitbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    pub hitbox: Rect,
    pub on_ground: bool,
    pub health: i32,
    /// Timestamp (ms) before which damage is ignored
    pub invulnerable_until: f64,
}

impl Body {
    pub fn new(position: Vec2, width: f32, height: f32, health: i32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            width,
            height,
            hitbox: Rect::new(position.x, position.y, width, height),
            on_ground: false,
            health,
            invulnerable_until: 0.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }

    pub fn sync_hitbox(&mut self) {
        self.hitbox = Rect::new(self.position.x, self.position.y, self.width, self.height);
    }

    /// Teleport and re-sync
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.sync_hitbox();
    }

    /// Advance position by velocity over `scale` reference frames
    pub fn integrate(&mut self, scale: f32) {
        self.position += self.velocity * scale;
        self.sync_hitbox();
    }

    /// Clamp the top-left corner into `[min, max]` and re-sync
    pub fn clamp_position(&mut self, min: Vec2, max: Vec2) {
        self.position.x = self.position.x.clamp(min.x, max.x);
        self.position.y = self.position.y.clamp(min.y, max.y);
        self.sync_hitbox();
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    #[inline]
    pub fn is_invulnerable(&self, now: f64) -> bool {
        now < self.invulnerable_until
    }

    /// Apply damage unless inside the invulnerability window.
    ///
    /// This is the only code path that lowers health.
    pub fn take_damage(&mut self, amount: i32, now: f64) -> Damage {
        if self.is_invulnerable(now) {
            return Damage::BLOCKED;
        }
        self.health -= amount;
        self.invulnerable_until = now + INVULNERABILITY_MS;
        Damage {
            applied: true,
            died: self.health <= 0,
        }
    }
}

/// Anything that carries a [`Body`]: the closed set of players and enemies.
pub trait Combatant {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn center(&self) -> Vec2 {
        self.body().center()
    }

    fn hitbox(&self) -> &Rect {
        &self.body().hitbox
    }

    fn is_alive(&self) -> bool {
        self.body().is_alive()
    }

    fn take_damage(&mut self, amount: i32, now: f64) -> Damage {
        self.body_mut().take_damage(amount, now)
    }
}
