//! Player projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, PROJECTILE_LIFETIME_MS};
use crate::frame_scale;

/// Core and glow colours (0xRRGGBB) used to draw a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub core: u32,
    pub glow: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            core: 0xf8fafc,
            glow: 0x94a3b8,
        }
    }
}

/// A straight-flying shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub position: Vec2,
    /// Units per reference frame
    pub velocity: Vec2,
    pub radius: f32,
    /// Id of the player that fired it
    pub owner: u32,
    pub palette: Palette,
    /// Timestamp (ms) of creation
    pub spawn_time: f64,
}

impl Projectile {
    /// Create a shot travelling along `direction` (normalized here) at `speed`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        position: Vec2,
        direction: Vec2,
        speed: f32,
        radius: f32,
        owner: u32,
        palette: Palette,
        spawn_time: f64,
    ) -> Self {
        Self {
            id,
            position,
            velocity: direction.normalize_or_zero() * speed,
            radius,
            owner,
            palette,
            spawn_time,
        }
    }

    pub fn update(&mut self, elapsed_ms: f32) {
        self.position += self.velocity * frame_scale(elapsed_ms);
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.spawn_time > PROJECTILE_LIFETIME_MS
    }

    /// Centre outside `[0, W] x [0, H]`
    pub fn is_out_of_bounds(&self) -> bool {
        self.position.x < 0.0
            || self.position.x > ARENA_WIDTH
            || self.position.y < 0.0
            || self.position.y > ARENA_HEIGHT
    }
}
