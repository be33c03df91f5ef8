use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// The in-progress rating session. There is always exactly one; finalizing
/// empties it and the next session starts implicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RatingSession {
    #[serde(default)]
    pub ratings: BTreeMap<String, u8>,
    #[serde(default)]
    pub category_notes: BTreeMap<String, String>,
    #[serde(default)]
    pub session_note: String,
}

impl RatingSession {
    /// Check a score is in 1..=5.
    pub fn validate_score(score: u8) -> Result<u8, CoreError> {
        if (MIN_SCORE..=MAX_SCORE).contains(&score) {
            Ok(score)
        } else {
            Err(CoreError::InvalidScore(score))
        }
    }

    pub fn rating(&self, category: &str) -> Option<u8> {
        self.ratings.get(category).copied()
    }

    pub fn note(&self, category: &str) -> Option<&str> {
        self.category_notes.get(category).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty() && self.category_notes.is_empty() && self.session_note.is_empty()
    }

    /// Empty all three fields, returning what they held.
    pub(crate) fn take(&mut self) -> RatingSession {
        std::mem::take(self)
    }
}
