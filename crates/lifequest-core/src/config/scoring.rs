use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Versioned constants that turn ratings into XP.
///
/// Two scoring schemes have shipped: `LEGACY` (5 per point, 50 base) and the
/// current `V3` (10 per point, 100 base). Stored history entries keep the award
/// they were granted with, so switching rules never rewrites the past.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScoringRules {
    pub version: u32,
    /// XP per rating point.
    pub multiplier: u64,
    /// Flat XP granted per finalized session.
    pub base_award: u64,
    /// XP granted for completing a planner goal.
    pub goal_award: u64,
}

impl ScoringRules {
    pub const V3: ScoringRules = ScoringRules {
        version: 3,
        multiplier: 10,
        base_award: 100,
        goal_award: 25,
    };

    pub const LEGACY: ScoringRules = ScoringRules {
        version: 2,
        multiplier: 5,
        base_award: 50,
        goal_award: 25,
    };

    /// XP awarded for a session with these ratings. Saturates, since the
    /// constants can come from a hand-edited settings file.
    pub fn session_award(&self, ratings: &BTreeMap<String, u8>) -> u64 {
        let points: u64 = ratings.values().map(|&s| u64::from(s)).sum();
        points
            .saturating_mul(self.multiplier)
            .saturating_add(self.base_award)
    }

    /// Award the in-progress ratings would earn if finalized right now.
    pub fn preview_award(&self, ratings: &BTreeMap<String, u8>) -> u64 {
        self.session_award(ratings)
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::V3
    }
}
