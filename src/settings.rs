//! Session settings
//!
//! Everything a run needs that is not level data or a tuning constant.
//! Stored as JSON; missing fields fall back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::input::MAX_SLOTS;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for every random draw in the simulation
    pub seed: u64,
    /// Level the run starts on (wrapped into range)
    pub start_level: usize,

    // === Timing ===
    /// Upper bound on a single frame's elapsed time (ms). Unset means
    /// stalls are passed through unchanged.
    pub max_frame_delta_ms: Option<f32>,
    /// Split long frames into sub-steps no longer than this (ms)
    pub substep_ms: Option<f32>,

    // === Players ===
    /// Number of local players (1 or 2)
    pub player_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            start_level: 0,
            max_frame_delta_ms: None,
            substep_ms: None,
            player_count: MAX_SLOTS,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Player count clamped to the supported slots
    pub fn effective_player_count(&self) -> usize {
        self.player_count.clamp(1, MAX_SLOTS)
    }

    /// Frame time after the stall clamp
    pub fn clamp_frame_delta(&self, elapsed_ms: f32) -> f32 {
        let elapsed_ms = elapsed_ms.max(0.0);
        match self.max_frame_delta_ms {
            Some(max) if max > 0.0 => elapsed_ms.min(max),
            _ => elapsed_ms,
        }
    }

    /// Sub-step length, if sub-stepping is enabled
    pub fn effective_substep(&self) -> Option<f32> {
        self.substep_ms.filter(|step| *step > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.player_count, 2);
        assert_eq!(settings.start_level, 0);
        assert_eq!(settings.max_frame_delta_ms, None);
        assert_eq!(settings.effective_substep(), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"seed": 42, "player_count": 1}"#).expect("valid");
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.player_count, 1);
        assert_eq!(settings.start_level, 0);
    }

    #[test]
    fn test_roundtrip_and_errors() {
        let mut settings = Settings::default();
        settings.substep_ms = Some(8.0);
        let json = settings.to_json().expect("serialize");
        assert_eq!(Settings::from_json(&json).expect("parse"), settings);

        assert!(matches!(
            Settings::from_json("not json"),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::load("/nonexistent/ember-arena/settings.json"),
            Err(SettingsError::Io(_))
        ));
    }

    #[test]
    fn test_frame_clamps() {
        let mut settings = Settings::default();
        assert_eq!(settings.clamp_frame_delta(5000.0), 5000.0);
        assert_eq!(settings.clamp_frame_delta(-3.0), 0.0);

        settings.max_frame_delta_ms = Some(50.0);
        assert_eq!(settings.clamp_frame_delta(5000.0), 50.0);
        assert_eq!(settings.clamp_frame_delta(16.0), 16.0);

        settings.player_count = 7;
        assert_eq!(settings.effective_player_count(), 2);
        settings.player_count = 0;
        assert_eq!(settings.effective_player_count(), 1);
    }
}
