//! Audio cue mapping
//!
//! Turns simulation events into procedural sound descriptions and picks the
//! music bed for a level. Playback belongs to the host; nothing here touches
//! an audio device.

use crate::sim::events::{EventSink, GameEvent, HitSource};
use crate::sim::level::Level;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

/// A pitch sweep with a short attack and exponential release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub freq_start: f32,
    pub freq_end: f32,
    pub duration_ms: f32,
    pub peak_gain: f32,
}

/// Attack time shared by every effect (ms)
pub const ATTACK_MS: f32 = 12.0;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Dash triggered, or a dash strike landing on an enemy
    Dash,
    /// Shot fired
    Pulse,
    /// Anything taking damage, and defeat
    Hit,
}

impl SoundEffect {
    /// The cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Dashed { .. }
            | GameEvent::EnemyHit {
                by: HitSource::Dash { .. },
                ..
            } => Some(SoundEffect::Dash),
            GameEvent::EnemyHit {
                by: HitSource::Projectile { .. },
                ..
            }
            | GameEvent::PlayerHit { .. }
            | GameEvent::Defeated => Some(SoundEffect::Hit),
            GameEvent::Fired { .. } => Some(SoundEffect::Pulse),
            _ => None,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            SoundEffect::Dash => Tone {
                waveform: Waveform::Sawtooth,
                freq_start: 660.0,
                freq_end: 440.0,
                duration_ms: 180.0,
                peak_gain: 0.35,
            },
            SoundEffect::Hit => Tone {
                waveform: Waveform::Square,
                freq_start: 180.0,
                freq_end: 90.0,
                duration_ms: 320.0,
                peak_gain: 0.35,
            },
            SoundEffect::Pulse => Tone {
                waveform: Waveform::Sawtooth,
                freq_start: 420.0,
                freq_end: 360.0,
                duration_ms: 220.0,
                peak_gain: 0.35,
            },
        }
    }
}

/// One sustained oscillator in a music bed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub frequency: f32,
    pub gain: f32,
    /// Cents
    pub detune: f32,
}

const fn voice(waveform: Waveform, frequency: f32, gain: f32, detune: f32) -> Voice {
    Voice {
        waveform,
        frequency,
        gain,
        detune,
    }
}

/// Music gain applied on top of every voice
pub const MUSIC_GAIN: f32 = 0.16;

/// Level music beds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Default,
    Neon,
    Underwater,
    Network,
    Natural,
    Space,
}

impl Theme {
    /// Unknown keys fall back to the default bed
    pub fn from_key(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "neon" => Theme::Neon,
            "underwater" => Theme::Underwater,
            "network" => Theme::Network,
            "natural" => Theme::Natural,
            "space" => Theme::Space,
            _ => Theme::Default,
        }
    }

    pub fn for_level(level: &Level) -> Self {
        level.theme.as_deref().map_or(Theme::Default, Theme::from_key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Neon => "neon",
            Theme::Underwater => "underwater",
            Theme::Network => "network",
            Theme::Natural => "natural",
            Theme::Space => "space",
        }
    }

    pub fn voices(&self) -> &'static [Voice] {
        use Waveform::*;
        const DEFAULT: [Voice; 2] = [
            voice(Triangle, 220.0, 0.07, 0.0),
            voice(Triangle, 330.0, 0.05, 0.0),
        ];
        const NEON: [Voice; 3] = [
            voice(Sawtooth, 440.0, 0.05, 0.0),
            voice(Sawtooth, 880.0, 0.03, 0.0),
            voice(Triangle, 660.0, 0.04, 0.0),
        ];
        const UNDERWATER: [Voice; 3] = [
            voice(Sine, 110.0, 0.08, 0.0),
            voice(Sine, 220.0, 0.05, 12.0),
            voice(Triangle, 330.0, 0.03, 0.0),
        ];
        const NETWORK: [Voice; 3] = [
            voice(Square, 260.0, 0.05, 0.0),
            voice(Square, 520.0, 0.04, 0.0),
            voice(Sawtooth, 155.0, 0.03, 0.0),
        ];
        const NATURAL: [Voice; 3] = [
            voice(Sine, 196.0, 0.06, 0.0),
            voice(Triangle, 294.0, 0.05, 0.0),
            voice(Sine, 392.0, 0.04, 0.0),
        ];
        const SPACE: [Voice; 3] = [
            voice(Triangle, 180.0, 0.05, 0.0),
            voice(Sawtooth, 360.0, 0.04, 8.0),
            voice(Triangle, 720.0, 0.025, 0.0),
        ];
        match self {
            Theme::Default => &DEFAULT,
            Theme::Neon => &NEON,
            Theme::Underwater => &UNDERWATER,
            Theme::Network => &NETWORK,
            Theme::Natural => &NATURAL,
            Theme::Space => &SPACE,
        }
    }
}

/// Event sink that queues the cues a frame should play
#[derive(Debug, Default)]
pub struct CueQueue {
    pending: Vec<SoundEffect>,
}

impl CueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues collected since the last drain
    pub fn drain(&mut self) -> Vec<SoundEffect> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl EventSink for CueQueue {
    fn emit(&mut self, event: GameEvent) {
        if let Some(effect) = SoundEffect::for_event(&event) {
            self.pending.push(effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_event_cues() {
        let dash_hit = GameEvent::EnemyHit {
            enemy: 1,
            at: Vec2::ZERO,
            by: HitSource::Dash { player: 1 },
        };
        let shot_hit = GameEvent::EnemyHit {
            enemy: 1,
            at: Vec2::ZERO,
            by: HitSource::Projectile { player: 2 },
        };
        let dashed = GameEvent::Dashed {
            player: 1,
            center: Vec2::ZERO,
            facing: -1.0,
        };
        assert_eq!(SoundEffect::for_event(&dashed), Some(SoundEffect::Dash));
        assert_eq!(SoundEffect::for_event(&dash_hit), Some(SoundEffect::Dash));
        assert_eq!(SoundEffect::for_event(&shot_hit), Some(SoundEffect::Hit));
        assert_eq!(SoundEffect::for_event(&GameEvent::Defeated), Some(SoundEffect::Hit));
        assert_eq!(
            SoundEffect::for_event(&GameEvent::WaveAdvanced { wave_index: 1 }),
            None
        );
    }

    #[test]
    fn test_tones_sweep_down() {
        for effect in [SoundEffect::Dash, SoundEffect::Pulse, SoundEffect::Hit] {
            let tone = effect.tone();
            assert!(tone.freq_end < tone.freq_start);
            assert!(tone.duration_ms > ATTACK_MS);
        }
        assert_eq!(SoundEffect::Hit.tone().waveform, Waveform::Square);
    }

    #[test]
    fn test_themes() {
        assert_eq!(Theme::from_key("Neon"), Theme::Neon);
        assert_eq!(Theme::from_key("lava"), Theme::Default);
        assert_eq!(Theme::Space.as_str(), "space");
        assert_eq!(Theme::Default.voices().len(), 2);
        assert_eq!(Theme::Underwater.voices()[1].detune, 12.0);

        let levels = Level::builtin().expect("builtin levels parse");
        assert_eq!(Theme::for_level(&levels[0]), Theme::Default);
        assert!(levels.iter().any(|l| Theme::for_level(l) == Theme::Space));
    }

    #[test]
    fn test_dash_press_queues_dash_cue() {
        use crate::Settings;
        use crate::consts::REFERENCE_FRAME_MS;
        use crate::sim::{Action, FrameInput, GameState, update};

        let mut state = GameState::new(Settings::default()).expect("builtin levels");
        state.start_level(0);
        state.drain_events();

        let dash = FrameInput::default().press(0, Action::Dash);
        update(&mut state, &dash, REFERENCE_FRAME_MS, 1000.0);
        let mut queue = CueQueue::new();
        state.dispatch(&mut queue);
        assert!(queue.drain().contains(&SoundEffect::Dash));
    }

    #[test]
    fn test_cue_queue_filters_events() {
        let mut queue = CueQueue::new();
        queue.emit(GameEvent::Fired {
            player: 1,
            projectile: 4,
        });
        queue.emit(GameEvent::LevelLoaded { level_index: 0 });
        queue.emit(GameEvent::PlayerHit {
            player: 1,
            at: Vec2::ZERO,
        });
        assert_eq!(queue.drain(), vec![SoundEffect::Pulse, SoundEffect::Hit]);
        assert!(queue.is_empty());
    }
}
