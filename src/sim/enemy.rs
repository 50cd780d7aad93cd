//! Homing enemies
//!
//! Each enemy scores the living players, commits to the best one for a short
//! window, leads its aim by the target's velocity and steers toward that
//! point with a rate-limited turn plus a sinusoidal strafe.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::resolve_against_platforms;
use super::entity::{Body, Combatant};
use super::player::Player;
use super::rect::Rect;
use crate::consts::*;
use crate::frame_scale;

/// Per-wave multipliers applied to spawned enemies
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyModifiers {
    pub health: Option<i32>,
    pub speed_multiplier: Option<f32>,
    /// Falls back to `speed_multiplier` when unset
    pub steer_multiplier: Option<f32>,
    pub gravity_multiplier: Option<f32>,
}

/// The player an enemy is chasing and where it is aiming
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetLock {
    pub player: u32,
    pub point: Vec2,
}

/// A homing enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub speed: f32,
    pub steer_force: f32,
    pub max_vertical: f32,
    pub gravity: f32,
    /// Strafe oscillator phase (radians)
    pub phase: f32,
    /// Id of the locked player, looked up in the live set every frame
    pub current_target: Option<u32>,
    /// Remaining commitment to `current_target` (ms)
    pub retarget_delay: f32,
}

impl Combatant for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// How attractive `player` is to an enemy centred at `from`
pub fn target_score(from: Vec2, player: &Player) -> f32 {
    let player_center = player.body.center();
    let distance = from.distance(player_center);
    let proximity = (ENEMY_AGGRO_RADIUS - distance).max(0.0);
    let weakness = (player.max_health - player.body.health) as f32 * SCORE_WEAKNESS;
    let mobility =
        (player.body.velocity.length() - SCORE_MOBILITY_THRESHOLD).max(0.0) * SCORE_MOBILITY;
    let altitude = if player_center.y < from.y {
        SCORE_ALTITUDE
    } else {
        0.0
    };
    proximity + weakness + mobility + altitude
}

impl Enemy {
    pub fn new(id: u32, spawn: Vec2, modifiers: &EnemyModifiers, phase: f32) -> Self {
        let speed_mult = modifiers.speed_multiplier.unwrap_or(1.0);
        let steer_mult = modifiers.steer_multiplier.unwrap_or(speed_mult);
        let speed = ENEMY_SPEED * speed_mult;
        Self {
            id,
            body: Body::new(
                spawn,
                ENEMY_WIDTH,
                ENEMY_HEIGHT,
                modifiers.health.unwrap_or(1),
            ),
            speed,
            steer_force: ENEMY_STEER_FORCE * steer_mult,
            max_vertical: speed * ENEMY_MAX_FALL_FACTOR,
            gravity: ENEMY_GRAVITY * modifiers.gravity_multiplier.unwrap_or(1.0),
            phase,
            current_target: None,
            retarget_delay: 0.0,
        }
    }

    /// Pick (or keep) a target among the living players
    pub fn acquire_target(&mut self, players: &[Player]) -> Option<TargetLock> {
        if !players.iter().any(|p| p.body.is_alive()) {
            self.current_target = None;
            return None;
        }

        if self.retarget_delay > 0.0 {
            let locked = self
                .current_target
                .and_then(|id| players.iter().find(|p| p.id == id))
                .filter(|p| p.body.is_alive());
            if let Some(player) = locked {
                return Some(TargetLock {
                    player: player.id,
                    point: self.predict_future(player),
                });
            }
        }

        let center = self.body.center();
        let mut best: Option<(&Player, f32)> = None;
        for player in players.iter().filter(|p| p.body.is_alive()) {
            let score = target_score(center, player);
            // Strictly greater: the first of equal scores wins
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((player, score));
            }
        }

        let (player, _) = best?;
        if self.current_target != Some(player.id) {
            log::debug!("enemy {} locks onto player {}", self.id, player.id);
        }
        self.current_target = Some(player.id);
        self.retarget_delay = RETARGET_LOCK_MS;
        Some(TargetLock {
            player: player.id,
            point: self.predict_future(player),
        })
    }

    /// Where `player` will be after a distance-scaled lookahead, inside the arena
    pub fn predict_future(&self, player: &Player) -> Vec2 {
        let target = player.body.center();
        let distance = self.body.center().distance(target);
        let lookahead = (distance / LOOKAHEAD_DISTANCE_SCALE).clamp(LOOKAHEAD_MIN, LOOKAHEAD_MAX);
        let predicted = target + player.body.velocity * (lookahead * LOOKAHEAD_FRAMES);
        Vec2::new(
            predicted.x.clamp(0.0, ARENA_WIDTH),
            predicted.y.clamp(0.0, ARENA_HEIGHT),
        )
    }

    /// Advance one frame of steering and movement
    pub fn update(
        &mut self,
        players: &[Player],
        platforms: &[Rect],
        elapsed_ms: f32,
        rng: &mut impl Rng,
    ) {
        let scale = frame_scale(elapsed_ms);
        self.phase += elapsed_ms * ENEMY_PHASE_RATE;
        self.retarget_delay = (self.retarget_delay - elapsed_ms).max(0.0);

        if let Some(lock) = self.acquire_target(players) {
            self.steer_toward(lock.point, scale);
        } else {
            // Idle drift
            self.body.velocity.x += (rng.random::<f32>() - 0.5) * 0.06 * scale;
        }

        let vel = &mut self.body.velocity;
        vel.y += self.gravity * scale;
        vel.x = vel.x.clamp(-self.speed, self.speed);
        vel.y = vel.y.clamp(-self.speed * ENEMY_MAX_RISE_FACTOR, self.max_vertical);

        self.body.integrate(scale);
        resolve_against_platforms(&mut self.body, platforms);
        self.body.clamp_position(
            Vec2::ZERO,
            Vec2::new(
                ARENA_WIDTH - self.body.width,
                ARENA_HEIGHT - self.body.height,
            ),
        );
    }

    fn steer_toward(&mut self, point: Vec2, scale: f32) {
        let to_target = point - self.body.center();
        let distance = match to_target.length() {
            d if d > 0.0 => d,
            _ => 1.0,
        };
        let desired = to_target.normalize_or_zero() * self.speed;
        let steer = desired - self.body.velocity;
        self.body.velocity += steer * self.steer_force * scale;

        if distance > ENEMY_AGGRO_RADIUS {
            self.body.velocity *= 0.94;
        } else if distance < ENEMY_CLOSE_RANGE {
            self.body.velocity *= 0.88;
        }

        // Keep enemies sharing a target from stacking on one path
        let strafe = to_target.perp().normalize_or_zero()
            * ((self.phase * 1.7).sin() * ENEMY_STRAFE_STRENGTH);
        self.body.velocity += strafe * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PLAYER_PRESETS;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f32 = 1000.0 / 60.0;

    fn player(id: u32, x: f32, y: f32) -> Player {
        Player::new(id, (id as usize) % 2, &PLAYER_PRESETS[(id as usize) % 2], Vec2::new(x, y))
    }

    fn enemy_at(x: f32, y: f32) -> Enemy {
        Enemy::new(100, Vec2::new(x, y), &EnemyModifiers::default(), 0.0)
    }

    #[test]
    fn test_modifiers_scale_profile() {
        let mods = EnemyModifiers {
            speed_multiplier: Some(1.5),
            health: Some(2),
            ..Default::default()
        };
        let enemy = Enemy::new(1, Vec2::ZERO, &mods, 0.0);
        assert!((enemy.speed - ENEMY_SPEED * 1.5).abs() < 1e-5);
        // Steer falls back to the speed multiplier
        assert!((enemy.steer_force - ENEMY_STEER_FORCE * 1.5).abs() < 1e-5);
        assert!((enemy.max_vertical - enemy.speed * 2.4).abs() < 1e-4);
        assert_eq!(enemy.body.health, 2);
    }

    #[test]
    fn test_prefers_closer_player() {
        let players = [player(1, 800.0, 300.0), player(2, 150.0, 300.0)];
        let mut enemy = enemy_at(100.0, 300.0);
        let lock = enemy.acquire_target(&players).expect("target");
        assert_eq!(lock.player, 2);
        assert_eq!(enemy.retarget_delay, RETARGET_LOCK_MS);
    }

    #[test]
    fn test_prefers_wounded_player() {
        let mut players = [player(1, 300.0, 300.0), player(2, 340.0, 300.0)];
        players[1].body.health = 1;
        let mut enemy = enemy_at(280.0, 300.0);
        assert_eq!(enemy.acquire_target(&players).map(|l| l.player), Some(2));
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let players = [player(1, 200.0, 300.0), player(2, 400.0, 300.0)];
        // Equidistant, same health, both at rest on the same level
        let mut enemy = enemy_at(300.0 - ENEMY_WIDTH / 2.0 + PLAYER_WIDTH / 2.0, 300.0);
        let center = enemy.body.center();
        assert_eq!(target_score(center, &players[0]), target_score(center, &players[1]));
        assert_eq!(enemy.acquire_target(&players).map(|l| l.player), Some(1));
    }

    #[test]
    fn test_lock_held_for_commitment_window() {
        let mut players = [player(1, 200.0, 300.0), player(2, 900.0, 300.0)];
        let mut enemy = enemy_at(150.0, 300.0);
        let mut rng = Pcg32::seed_from_u64(1);

        assert_eq!(enemy.acquire_target(&players).map(|l| l.player), Some(1));

        // Player 2 becomes far more attractive
        players[1].body.set_position(Vec2::new(160.0, 300.0));
        players[1].body.health = 1;

        // 47 frames is ~783 ms, still inside the window
        for _ in 0..47 {
            enemy.update(&players, &[], FRAME, &mut rng);
            assert_eq!(enemy.current_target, Some(1));
        }
        // Window runs out: re-evaluate
        for _ in 0..3 {
            enemy.update(&players, &[], FRAME, &mut rng);
        }
        assert_eq!(enemy.current_target, Some(2));
    }

    #[test]
    fn test_dead_lock_is_dropped_immediately() {
        let mut players = [player(1, 200.0, 300.0), player(2, 900.0, 300.0)];
        let mut enemy = enemy_at(150.0, 300.0);
        enemy.acquire_target(&players);
        assert_eq!(enemy.current_target, Some(1));

        players[0].body.health = 0;
        let lock = enemy.acquire_target(&players).expect("fallback target");
        assert_eq!(lock.player, 2);
    }

    #[test]
    fn test_no_living_players_clears_target() {
        let mut players = [player(1, 200.0, 300.0)];
        let mut enemy = enemy_at(150.0, 300.0);
        enemy.acquire_target(&players);
        players[0].body.health = 0;
        assert!(enemy.acquire_target(&players).is_none());
        assert!(enemy.current_target.is_none());
        assert!(enemy.acquire_target(&[]).is_none());
    }

    #[test]
    fn test_prediction_leads_and_clamps() {
        let mut target = player(1, 900.0, 100.0);
        target.body.velocity = Vec2::new(5.0, 0.0);
        let enemy = enemy_at(100.0, 100.0);

        let predicted = enemy.predict_future(&target);
        // Far away: max lookahead of 0.6 * 32 frames, clamped to the right wall
        assert_eq!(predicted.x, ARENA_WIDTH);

        let near = enemy_at(880.0, 100.0);
        let predicted = near.predict_future(&target);
        let expected = target.body.center().x + 5.0 * LOOKAHEAD_MIN * LOOKAHEAD_FRAMES;
        assert!((predicted.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_homes_toward_target() {
        let players = [player(1, 700.0, 300.0)];
        let mut enemy = enemy_at(200.0, 300.0);
        let mut rng = Pcg32::seed_from_u64(7);
        let start = enemy.body.center().distance(players[0].body.center());
        for _ in 0..90 {
            enemy.update(&players, &[], FRAME, &mut rng);
            assert!(enemy.body.velocity.x.abs() <= enemy.speed + 1e-4);
            assert_eq!(enemy.body.hitbox.x, enemy.body.position.x);
        }
        let end = enemy.body.center().distance(players[0].body.center());
        assert!(end < start, "enemy should close distance: {start} -> {end}");
    }

    #[test]
    fn test_stays_inside_arena() {
        let players: [Player; 0] = [];
        let mut enemy = enemy_at(ARENA_WIDTH - ENEMY_WIDTH, ARENA_HEIGHT - ENEMY_HEIGHT);
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            enemy.update(&players, &[], FRAME, &mut rng);
            let p = enemy.body.position;
            assert!(p.x >= 0.0 && p.x <= ARENA_WIDTH - ENEMY_WIDTH);
            assert!(p.y >= 0.0 && p.y <= ARENA_HEIGHT - ENEMY_HEIGHT);
        }
    }

    #[test]
    fn test_falls_onto_platform_and_rests() {
        let players: [Player; 0] = [];
        let platform = Rect::new(0.0, 400.0, ARENA_WIDTH, 20.0);
        let mut enemy = enemy_at(480.0, 200.0);
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..240 {
            enemy.update(&players, &[platform], FRAME, &mut rng);
            assert!(enemy.body.hitbox.bottom() <= platform.y + GROUND_TOLERANCE);
        }
        assert!(enemy.body.on_ground);
        assert_eq!(enemy.body.velocity.y, 0.0);
        assert!((enemy.body.hitbox.bottom() - platform.y).abs() <= GROUND_TOLERANCE);
    }
}
