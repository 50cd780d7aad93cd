//! Ember Arena headless runner
//!
//! Plays a session without a window: a simple autopilot drives both players
//! through the keyboard layer, frames advance at a fixed 60 Hz and progress is
//! logged. Useful for soak-testing levels and checking determinism.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;

use ember_arena::audio::{CueQueue, Theme};
use ember_arena::consts::REFERENCE_FRAME_MS;
use ember_arena::sim::{
    Action, Combatant, GamePhase, GameState, KeyboardInput, PLAYER_PRESETS, Player, update,
};
use ember_arena::Settings;

/// Run Ember Arena headlessly with an autopilot
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Level to start on; out-of-range values wrap
    #[arg(short, long, allow_hyphen_values = true)]
    level: Option<i64>,

    /// RNG seed, overriding the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 60 * 60)]
    frames: u32,

    /// Print the final snapshot as JSON
    #[arg(long)]
    dump: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    let _ = Builder::from_env(env).try_init();
}

/// Keys the autopilot wants held for one player this frame
fn autopilot_keys(state: &GameState, player: &Player) -> Vec<Action> {
    let center = player.center();
    let Some(enemy) = state
        .enemies
        .iter()
        .min_by(|a, b| {
            center
                .distance_squared(a.center())
                .total_cmp(&center.distance_squared(b.center()))
        })
    else {
        return Vec::new();
    };

    let to_enemy = enemy.center() - center;
    let mut keys = vec![if to_enemy.x < 0.0 {
        Action::Left
    } else {
        Action::Right
    }];
    if to_enemy.y < -60.0 && player.body.on_ground {
        keys.push(Action::Jump);
    }
    if to_enemy.y.abs() < 24.0 {
        keys.push(Action::Shoot);
    }
    if to_enemy.length() < 70.0 {
        keys.push(Action::Dash);
    }
    keys
}

/// Shoot only registers on a fresh press, so it is released every other frame
fn drive(state: &GameState, keyboard: &mut KeyboardInput, frame: u32) {
    for player in state.players.iter().filter(|p| p.is_alive()) {
        let wanted = autopilot_keys(state, player);
        for action in Action::ALL {
            let key = player.controls.key_for(action);
            let hold = match action {
                Action::Shoot => frame % 2 == 0,
                _ => true,
            };
            if hold && wanted.contains(&action) {
                keyboard.key_down(key);
            } else {
                keyboard.key_up(key);
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    let start = args.level.unwrap_or(settings.start_level as i64);

    let mut state = GameState::new(settings).context("loading built-in levels")?;
    let mut keyboard = KeyboardInput::new(PLAYER_PRESETS.iter().map(|p| p.controls()).collect());
    let mut cues = CueQueue::new();

    state.start_level(start);
    log::info!(
        "starting on {} (theme {})",
        state.level().name,
        Theme::for_level(state.level()).as_str()
    );

    let mut now = 0.0f64;
    let mut cue_count = 0usize;
    for frame in 0..args.frames {
        match state.phase {
            GamePhase::Playing => drive(&state, &mut keyboard, frame),
            GamePhase::Victory { .. } | GamePhase::Defeated => {
                // Release first so enter registers as a fresh press
                keyboard.key_up("enter");
                keyboard.key_down("enter");
            }
            GamePhase::Menu => break,
        }

        let input = keyboard.snapshot();
        now += REFERENCE_FRAME_MS as f64;
        update(&mut state, &input, REFERENCE_FRAME_MS, now);
        keyboard.next_frame();

        state.dispatch(&mut cues);
        cue_count += cues.drain().len();

        if frame % 600 == 0 && state.phase == GamePhase::Playing {
            let hud = state.snapshot();
            log::info!(
                "frame {frame}: {} wave {}/{} enemies {} queued {}",
                hud.level_name,
                hud.wave,
                hud.wave_total,
                hud.active_enemies,
                hud.queued_enemies
            );
        }
    }

    log::info!("finished in phase {:?} after {cue_count} sound cues", state.phase);
    if args.dump {
        let snapshot = serde_json::to_string_pretty(&state.snapshot())?;
        println!("{snapshot}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_arena::consts::ENEMY_HEIGHT;
    use ember_arena::sim::{Enemy, EnemyModifiers};
    use glam::Vec2;

    #[test]
    fn test_autopilot_taps_shoot() {
        let mut state = GameState::new(Settings::default()).expect("builtin levels");
        state.start_level(0);
        let center = state.players[0].center();
        let spawn = Vec2::new(center.x + 200.0, center.y - ENEMY_HEIGHT / 2.0);
        state
            .enemies
            .push(Enemy::new(900, spawn, &EnemyModifiers::default(), 0.0));
        let mut keyboard =
            KeyboardInput::new(PLAYER_PRESETS.iter().map(|p| p.controls()).collect());

        let mut presses = Vec::new();
        for frame in 0..4 {
            drive(&state, &mut keyboard, frame);
            presses.push(keyboard.snapshot().pressed[0].contains(Action::Shoot));
            keyboard.next_frame();
        }
        assert_eq!(presses, vec![true, false, true, false]);
    }
}
