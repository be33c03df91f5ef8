use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::session::RatingSession;

/// Identifier of a finalized session.
/// Generated as UUID v7 hex (no dashes), so ids sort in creation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().as_simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// Older logs used millisecond timestamps as numeric ids.
impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => EntryId(s),
            RawId::Number(n) => EntryId(n.to_string()),
        })
    }
}

/// One finalized rating session. Immutable once recorded; `xp_gained` keeps
/// the award computed at finalize time regardless of later rule changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: EntryId,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub ratings: BTreeMap<String, u8>,
    #[serde(default, alias = "categoryNotes")]
    pub category_notes: BTreeMap<String, String>,
    #[serde(default, alias = "sessionNotes")]
    pub session_note: String,
    #[serde(alias = "xpGained")]
    pub xp_gained: u64,
}

impl HistoryEntry {
    /// Check every stored score lies in the rating range.
    pub fn validate(&self) -> Result<(), CoreError> {
        for &score in self.ratings.values() {
            RatingSession::validate_score(score)?;
        }
        Ok(())
    }

    /// Sum of the rating points in this entry.
    pub fn total_points(&self) -> u64 {
        self.ratings.values().map(|&s| u64::from(s)).sum()
    }

    /// Mean score, or `None` when nothing was rated.
    pub fn average_score(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            None
        } else {
            Some(self.total_points() as f64 / self.ratings.len() as f64)
        }
    }
}
