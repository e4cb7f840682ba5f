//! Run rules and difficulty settings
//!
//! Stored as JSON next to the host's other preferences.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier applied to every score award
    pub fn score_factor(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    /// Multiplier applied to enemy flight speed
    pub fn enemy_speed(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.85,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.2,
        }
    }
}

/// When per-category kill counters are bumped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KillAccounting {
    /// Counters move at the moment of the kill
    #[default]
    Immediate,
    /// Counters move once per tick after all collision work, scanning for
    /// intercepted entities that have not been counted yet
    Deferred,
}

/// Rules for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub kill_accounting: KillAccounting,
    /// Open the store between waves instead of advancing automatically
    pub store_between_waves: bool,
    /// Fixed RNG seed (None = host picks one)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            kill_accounting: KillAccounting::Immediate,
            store_between_waves: false,
            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from disk, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings file: {e}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<(), SimError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| SimError::Config(e.to_string()))?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("norm"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(Difficulty::Easy.as_str(), "Easy");
    }

    #[test]
    fn test_settings_json_roundtrip_keeps_accounting() {
        let settings = Settings {
            kill_accounting: KillAccounting::Deferred,
            seed: Some(7),
            ..Settings::from_difficulty(Difficulty::Hard)
        };
        let parsed = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(parsed.kill_accounting, KillAccounting::Deferred);
        assert_eq!(parsed.difficulty, Difficulty::Hard);
        assert_eq!(parsed.seed, Some(7));
    }

    #[test]
    fn test_malformed_settings_is_config_error() {
        let err = Settings::from_json("{\"difficulty\": 3}").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let settings = Settings::load(Path::new("/nonexistent/skyguard.json"));
        assert_eq!(settings.difficulty, Difficulty::Normal);
        assert!(!settings.store_between_waves);
    }
}
