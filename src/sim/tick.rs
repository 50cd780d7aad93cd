//! Per-frame orchestration
//!
//! Advances every entity, resolves combat, drives the wave director and
//! evaluates terminal conditions. Order within a frame matters: contacts
//! and projectile hits both land before dead enemies are removed.

use std::f32::consts::TAU;

use rand::Rng;

use super::collision::projectile_hits;
use super::enemy::Enemy;
use super::entity::{Combatant, FrameTime};
use super::events::{EventSink, GameEvent, HitSource};
use super::input::{ActionQuery, FrameInput, MenuAction};
use super::player::Player;
use super::projectile::Projectile;
use super::state::{GamePhase, GameState};
use super::wave::DirectorAction;
use crate::consts::*;

/// Advance the session by one external frame.
///
/// `elapsed_ms` is real time since the previous call and `now` the current
/// timestamp. Long frames are clamped and split into sub-steps when the
/// settings ask for it; one-shot presses only reach the first sub-step.
pub fn update(state: &mut GameState, input: &FrameInput, elapsed_ms: f32, now: f64) {
    let elapsed_ms = state.settings.clamp_frame_delta(elapsed_ms);

    let Some(step) = state.settings.effective_substep() else {
        tick(state, input, FrameTime::new(elapsed_ms, now));
        return;
    };
    if elapsed_ms <= step {
        tick(state, input, FrameTime::new(elapsed_ms, now));
        return;
    }

    let steps = (elapsed_ms / step).ceil() as usize;
    let dt = elapsed_ms / steps as f32;
    let start = now - elapsed_ms as f64;
    let phase = state.phase;
    let held = input.held_only();
    for i in 0..steps {
        let step_input = if i == 0 { input } else { &held };
        let step_now = start + dt as f64 * (i + 1) as f64;
        tick(state, step_input, FrameTime::new(dt, step_now));
        if state.phase != phase {
            break;
        }
    }
}

/// Advance one step of whatever phase the session is in
pub fn tick(state: &mut GameState, input: &impl ActionQuery, time: FrameTime) {
    match state.phase {
        GamePhase::Menu => {}
        GamePhase::Playing => tick_playing(state, input, time),
        GamePhase::Victory { has_next } => {
            if input.menu_pressed(MenuAction::Confirm) {
                if has_next {
                    state.advance_to_next_level();
                } else {
                    state.return_to_menu();
                }
            } else if input.menu_pressed(MenuAction::Back) {
                state.return_to_menu();
            }
        }
        GamePhase::Defeated => {
            if input.menu_pressed(MenuAction::Confirm) {
                state.retry_level();
            } else if input.menu_pressed(MenuAction::Back) {
                state.return_to_menu();
            }
        }
    }
}

fn tick_playing(state: &mut GameState, input: &impl ActionQuery, time: FrameTime) {
    let platforms = &state.levels[state.level_index].platforms;

    for player in state.players.iter_mut().filter(|p| p.is_alive()) {
        player.update(
            input,
            platforms,
            time,
            &mut state.projectiles,
            &mut state.ids,
            &mut state.events,
        );
    }

    for enemy in &mut state.enemies {
        enemy.update(&state.players, platforms, time.elapsed_ms, &mut state.rng);
    }

    for projectile in &mut state.projectiles {
        projectile.update(time.elapsed_ms);
    }
    state
        .projectiles
        .retain(|p| !p.is_out_of_bounds() && !p.is_expired(time.now));

    resolve_contacts(&mut state.players, &mut state.enemies, time.now, &mut state.events);
    resolve_projectiles(
        &mut state.projectiles,
        &mut state.enemies,
        time.now,
        &mut state.events,
    );
    remove_dead_enemies(&mut state.enemies, &mut state.events);

    run_director(state, time.elapsed_ms);

    if state.players.iter().all(|p| !p.is_alive()) {
        log::info!("all players down on level {}", state.level_index);
        state.enemies.clear();
        state.projectiles.clear();
        state.phase = GamePhase::Defeated;
        state.events.push(GameEvent::Defeated);
        return;
    }

    if state.director.is_complete() && state.enemies.is_empty() {
        let has_next = state.run_cursor + 1 < state.run_queue.len();
        log::info!("level {} cleared", state.level_index);
        state.projectiles.clear();
        state.phase = GamePhase::Victory { has_next };
        state.events.push(GameEvent::LevelComplete { has_next });
    }
}

/// Resolve body contact between every live enemy and every live player.
///
/// A dashing player hurts the enemy; otherwise the enemy hurts the player.
/// Knockback applies even when invulnerability blocks the damage.
pub fn resolve_contacts(
    players: &mut [Player],
    enemies: &mut [Enemy],
    now: f64,
    events: &mut impl EventSink,
) {
    for enemy in enemies.iter_mut() {
        for player in players.iter_mut() {
            if !enemy.is_alive() {
                break;
            }
            if !player.is_alive() || !enemy.hitbox().overlaps(player.hitbox()) {
                continue;
            }

            if player.is_dashing() {
                let hit = enemy.take_damage(CONTACT_DAMAGE, now);
                enemy.body.velocity.x += player.facing * DASH_KNOCKBACK;
                if hit.applied {
                    events.emit(GameEvent::EnemyHit {
                        enemy: enemy.id,
                        at: enemy.center(),
                        by: HitSource::Dash { player: player.id },
                    });
                }
                continue;
            }

            let hit = player.take_damage(CONTACT_DAMAGE, now);
            let dir = if player.center().x - enemy.center().x < 0.0 {
                -1.0
            } else {
                1.0
            };
            player.body.velocity.x += dir * PLAYER_KNOCKBACK;
            player.body.velocity.y = PLAYER_KNOCKUP;
            enemy.body.velocity.x -= dir * ENEMY_RECOIL;
            if hit.applied {
                events.emit(GameEvent::PlayerHit {
                    player: player.id,
                    at: player.center(),
                });
            }
            if hit.died {
                log::info!("player {} down", player.id);
                events.emit(GameEvent::PlayerDied { player: player.id });
            }
        }
    }
}

/// Test every projectile against the live enemies in list order. The first
/// hit consumes the projectile, whether or not the damage lands.
pub fn resolve_projectiles(
    projectiles: &mut Vec<Projectile>,
    enemies: &mut [Enemy],
    now: f64,
    events: &mut impl EventSink,
) {
    projectiles.retain(|projectile| {
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| e.is_alive() && projectile_hits(&e.body, projectile))
        else {
            return true;
        };
        let hit = enemy.take_damage(PROJECTILE_DAMAGE, now);
        if hit.applied {
            events.emit(GameEvent::EnemyHit {
                enemy: enemy.id,
                at: projectile.position,
                by: HitSource::Projectile {
                    player: projectile.owner,
                },
            });
        }
        false
    });
}

/// Drop enemies with no health left
pub fn remove_dead_enemies(enemies: &mut Vec<Enemy>, events: &mut impl EventSink) {
    enemies.retain(|enemy| {
        if enemy.is_alive() {
            return true;
        }
        log::debug!("enemy {} destroyed", enemy.id);
        events.emit(GameEvent::EnemyKilled {
            enemy: enemy.id,
            at: enemy.center(),
        });
        false
    });
}

fn run_director(state: &mut GameState, elapsed_ms: f32) {
    let level = &state.levels[state.level_index];
    match state
        .director
        .update(&level.waves, state.enemies.len(), elapsed_ms)
    {
        DirectorAction::Spawn {
            wave_index,
            modifiers,
        } => {
            let spawn = level.random_enemy_spawn(&mut state.rng);
            let phase = state.rng.random::<f32>() * TAU;
            let enemy = Enemy::new(state.ids.next_id(), spawn, &modifiers, phase);
            log::debug!(
                "wave {} spawns enemy {} at ({:.0}, {:.0})",
                wave_index + 1,
                enemy.id,
                spawn.x,
                spawn.y
            );
            state.events.push(GameEvent::EnemySpawned {
                enemy: enemy.id,
                position: spawn,
            });
            state.enemies.push(enemy);
        }
        DirectorAction::WaveAdvanced { wave_index } => {
            state.events.push(GameEvent::WaveAdvanced { wave_index });
        }
        DirectorAction::Complete | DirectorAction::None => {}
    }
}
