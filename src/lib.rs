//! Ember Arena - two-player cooperative wave arena
//!
//! Core modules:
//! - `sim`: Simulation and combat resolution (kinematics, collisions, AI, waves)
//! - `settings`: Session configuration
//! - `audio`: Sound cue mapping for simulation events

pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 960.0;
    pub const ARENA_HEIGHT: f32 = 540.0;

    /// Reference update rate all per-frame tuning values are expressed in
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Duration of one reference frame (ms)
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / REFERENCE_FPS;

    /// Damage immunity after a successful hit (ms)
    pub const INVULNERABILITY_MS: f64 = 350.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 28.0;
    pub const PLAYER_HEIGHT: f32 = 28.0;
    pub const PLAYER_MAX_SPEED: f32 = 5.2;
    pub const PLAYER_MOVE_ACCEL: f32 = 0.45;
    /// Horizontal velocity multiplier per frame with no horizontal intent
    pub const PLAYER_FRICTION: f32 = 0.82;
    pub const PLAYER_JUMP_VELOCITY: f32 = -11.0;
    pub const PLAYER_GRAVITY: f32 = 0.45;
    /// Terminal fall speed as a multiple of max speed
    pub const PLAYER_TERMINAL_FACTOR: f32 = 3.0;
    pub const PLAYER_MAX_HEALTH: i32 = 3;
    /// Side wall inset for player bounds
    pub const PLAYER_WALL_MARGIN: f32 = 8.0;
    /// Floor inset for player bounds
    pub const PLAYER_FLOOR_MARGIN: f32 = 4.0;

    /// Dash
    pub const DASH_BOOST: f32 = 66.0;
    pub const DASH_VERTICAL_DAMPING: f32 = 0.35;
    pub const DASH_COOLDOWN_MS: f64 = 900.0;
    pub const DASH_ACTIVE_MS: f32 = 220.0;

    /// Shooting
    pub const FIRE_COOLDOWN_MS: f64 = 280.0;

    /// Trail history (render only)
    pub const TRAIL_MAX_POINTS: usize = 14;
    pub const TRAIL_LIFE_MS: f32 = 240.0;
    pub const TRAIL_INTERVAL_MS: f32 = 55.0;
    pub const TRAIL_DASH_INTERVAL_MS: f32 = 35.0;
    pub const TRAIL_MIN_SPEED: f32 = 0.6;

    /// Enemy defaults
    pub const ENEMY_WIDTH: f32 = 26.0;
    pub const ENEMY_HEIGHT: f32 = 26.0;
    pub const ENEMY_SPEED: f32 = 3.2;
    pub const ENEMY_STEER_FORCE: f32 = 0.12;
    pub const ENEMY_GRAVITY: f32 = 0.25;
    pub const ENEMY_AGGRO_RADIUS: f32 = 440.0;
    /// Upward and downward speed caps as multiples of enemy speed
    pub const ENEMY_MAX_RISE_FACTOR: f32 = 2.0;
    pub const ENEMY_MAX_FALL_FACTOR: f32 = 2.4;
    /// Target commitment window (ms)
    pub const RETARGET_LOCK_MS: f32 = 800.0;
    /// Strafe phase advance per ms
    pub const ENEMY_PHASE_RATE: f32 = 0.0035;
    pub const ENEMY_STRAFE_STRENGTH: f32 = 0.45;
    pub const ENEMY_CLOSE_RANGE: f32 = 36.0;

    /// Target scoring weights
    pub const SCORE_WEAKNESS: f32 = 110.0;
    pub const SCORE_MOBILITY: f32 = 18.0;
    pub const SCORE_MOBILITY_THRESHOLD: f32 = 2.0;
    pub const SCORE_ALTITUDE: f32 = 40.0;

    /// Lead-aim prediction
    pub const LOOKAHEAD_DISTANCE_SCALE: f32 = 520.0;
    pub const LOOKAHEAD_MIN: f32 = 0.12;
    pub const LOOKAHEAD_MAX: f32 = 0.6;
    pub const LOOKAHEAD_FRAMES: f32 = 32.0;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 9.0;
    pub const PROJECTILE_RADIUS: f32 = 5.0;
    pub const PROJECTILE_LIFETIME_MS: f64 = 1800.0;
    pub const PROJECTILE_DAMAGE: i32 = 1;

    /// Contact resolution
    pub const CONTACT_DAMAGE: i32 = 1;
    pub const DASH_KNOCKBACK: f32 = 3.0;
    pub const PLAYER_KNOCKBACK: f32 = 4.0;
    pub const PLAYER_KNOCKUP: f32 = -4.0;
    pub const ENEMY_RECOIL: f32 = 2.0;

    /// Wave defaults when a wave omits them
    pub const DEFAULT_SIMULTANEOUS: usize = 3;
    pub const DEFAULT_SPAWN_INTERVAL_MS: f32 = 800.0;

    /// Grounding tolerance for vertical collision resolution
    pub const GROUND_TOLERANCE: f32 = 1.0;
}

/// Fraction of a 60 Hz reference frame covered by `elapsed_ms`
#[inline]
pub fn frame_scale(elapsed_ms: f32) -> f32 {
    elapsed_ms / consts::REFERENCE_FRAME_MS
}
