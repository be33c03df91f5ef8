use serde::{Deserialize, Serialize};

/// XP needed to complete one level. Shared by every ledger in the process.
pub const LEVEL_CAPACITY: u64 = 169;

/// Level a character must reach before being ranked `Master`.
const MASTER_LEVEL: u32 = 10;

/// The progression ledger: level, XP within the level, lifetime XP, streak.
///
/// `current_xp < LEVEL_CAPACITY` holds after every [`grant_xp`](Self::grant_xp).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressionState {
    pub level: u32,
    pub current_xp: u64,
    pub lifetime_xp: u64,
    pub streak: u32,
}

/// Totals after a grant, plus how many levels it crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpGrant {
    pub amount: u64,
    pub level: u32,
    pub current_xp: u64,
    pub lifetime_xp: u64,
    pub leveled_up: bool,
    pub levels_gained: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Apprentice,
    Master,
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::Apprentice => write!(f, "Apprentice"),
            Rank::Master => write!(f, "Master"),
        }
    }
}

impl ProgressionState {
    /// A brand-new ledger at level 1 with nothing earned.
    pub fn fresh() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            lifetime_xp: 0,
            streak: 0,
        }
    }

    /// The state a first run starts from: level 3 with 235 lifetime XP.
    pub fn starter() -> Self {
        Self {
            level: 3,
            current_xp: 0,
            lifetime_xp: 235,
            streak: 0,
        }
    }

    /// Add XP, carrying any overflow into as many level-ups as it covers.
    ///
    /// Amounts are unsigned, so a negative grant cannot be expressed.
    pub fn grant_xp(&mut self, amount: u64) -> XpGrant {
        self.lifetime_xp = self.lifetime_xp.saturating_add(amount);
        let total = self.current_xp.saturating_add(amount);
        let levels_gained = u32::try_from(total / LEVEL_CAPACITY).unwrap_or(u32::MAX);
        self.current_xp = total % LEVEL_CAPACITY;
        self.level = self.level.saturating_add(levels_gained);

        if levels_gained > 0 {
            tracing::info!(
                level = self.level,
                levels_gained,
                "Level up ({} XP carried over)",
                self.current_xp
            );
        }

        XpGrant {
            amount,
            level: self.level,
            current_xp: self.current_xp,
            lifetime_xp: self.lifetime_xp,
            leveled_up: levels_gained > 0,
            levels_gained,
        }
    }

    /// Count one more finalized session.
    pub fn bump_streak(&mut self) -> u32 {
        self.streak = self.streak.saturating_add(1);
        self.streak
    }

    pub fn rank(&self) -> Rank {
        if self.level < MASTER_LEVEL {
            Rank::Apprentice
        } else {
            Rank::Master
        }
    }

    /// Share of the current level already earned, 0.0 to 100.0.
    pub fn progress_percent(&self) -> f64 {
        self.current_xp as f64 / LEVEL_CAPACITY as f64 * 100.0
    }

    /// XP still needed to reach the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        LEVEL_CAPACITY - self.current_xp
    }

    /// Carry a stored `current_xp` that is out of range into levels. Lifetime
    /// XP is left alone since nothing new was earned.
    pub(crate) fn normalize(&mut self) {
        if self.current_xp >= LEVEL_CAPACITY {
            let carried = u32::try_from(self.current_xp / LEVEL_CAPACITY).unwrap_or(u32::MAX);
            tracing::warn!(
                current_xp = self.current_xp,
                "Stored XP exceeds level capacity, carrying {carried} level(s)"
            );
            self.current_xp %= LEVEL_CAPACITY;
            self.level = self.level.saturating_add(carried);
        }
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::starter()
    }
}
