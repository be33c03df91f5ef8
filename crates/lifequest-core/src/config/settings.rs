use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::scoring::ScoringRules;
use crate::error::CoreError;
use crate::storage::SNAPSHOT_KEY;

/// Tracker settings, read from a JSON file. Every field falls back to its
/// default so an old or partial file still loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub scoring: ScoringRules,
    /// How many recent history entries accompany a coaching request.
    pub coaching_history_window: usize,
    pub note_xp: NoteXpPolicy,
    pub auto_coach: AutoCoachPolicy,
    /// Name of the persisted record (also the schema version tag).
    pub storage_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scoring: ScoringRules::V3,
            coaching_history_window: 3,
            note_xp: NoteXpPolicy::default(),
            auto_coach: AutoCoachPolicy::default(),
            storage_key: SNAPSHOT_KEY.to_string(),
        }
    }
}

/// Grants a small amount of XP whenever a note is edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoteXpPolicy {
    pub enabled: bool,
    pub amount: u64,
}

impl Default for NoteXpPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 2,
        }
    }
}

/// Flags a coaching request as due after every `every_n_ratings` ratings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoCoachPolicy {
    pub enabled: bool,
    pub every_n_ratings: u32,
}

impl Default for AutoCoachPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            every_n_ratings: 3,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let settings: Settings = serde_json::from_str(&text)?;
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(CoreError::Io(e)),
        }
    }

    /// Write settings as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
