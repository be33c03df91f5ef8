use chrono::Utc;

use crate::config::ScoringRules;
use crate::error::CoreError;
use crate::model::{
    CadenceFilter, EntryId, HistoryEntry, ProgressionState, RatingSession, XpGrant,
};
use crate::registry::CategoryRegistry;

/// Result of a successful finalize.
#[derive(Debug, Clone, PartialEq)]
pub struct Finalized {
    pub entry: HistoryEntry,
    pub grant: XpGrant,
    pub streak: u32,
}

/// Owns the in-progress session and the newest-first history of finalized ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecorder {
    session: RatingSession,
    history: Vec<HistoryEntry>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a recorder from stored history (expected newest first).
    pub fn with_history(history: Vec<HistoryEntry>) -> Self {
        Self {
            session: RatingSession::default(),
            history,
        }
    }

    /// Record a score for a category, replacing any earlier score this session.
    pub fn rate(
        &mut self,
        registry: &CategoryRegistry,
        category: &str,
        score: u8,
    ) -> Result<(), CoreError> {
        if !registry.contains(category) {
            return Err(CoreError::UnknownCategory {
                name: category.to_string(),
            });
        }
        let score = RatingSession::validate_score(score)?;
        self.session.ratings.insert(category.to_string(), score);
        Ok(())
    }

    /// Overwrite the note for a category. Returns whether the text changed.
    pub fn set_category_note(&mut self, category: &str, text: &str) -> bool {
        let previous = self
            .session
            .category_notes
            .insert(category.to_string(), text.to_string());
        previous.as_deref() != Some(text)
    }

    /// Overwrite the free-text session note. Returns whether the text changed.
    pub fn set_session_note(&mut self, text: &str) -> bool {
        if self.session.session_note == text {
            return false;
        }
        self.session.session_note = text.to_string();
        true
    }

    /// Categories under the filter that have no rating yet, in registry order.
    pub fn missing(&self, registry: &CategoryRegistry, filter: &CadenceFilter) -> Vec<String> {
        registry
            .list(filter)
            .into_iter()
            .filter(|c| !self.session.ratings.contains_key(&c.name))
            .map(|c| c.name.clone())
            .collect()
    }

    /// True when every category under the filter has been rated. Trivially
    /// true when no category matches.
    pub fn can_finalize(&self, registry: &CategoryRegistry, filter: &CadenceFilter) -> bool {
        self.missing(registry, filter).is_empty()
    }

    /// How many categories under the filter are rated, out of how many.
    pub fn completion(&self, registry: &CategoryRegistry, filter: &CadenceFilter) -> (usize, usize) {
        let eligible = registry.list(filter);
        let rated = eligible
            .iter()
            .filter(|c| self.session.ratings.contains_key(&c.name))
            .count();
        (rated, eligible.len())
    }

    /// Close the session: award XP, bump the streak, prepend a history entry,
    /// and start an empty session.
    ///
    /// Fails with [`CoreError::IncompleteSession`] without touching any state
    /// when a category under the filter is still unrated.
    pub fn finalize(
        &mut self,
        registry: &CategoryRegistry,
        progression: &mut ProgressionState,
        rules: &ScoringRules,
        filter: &CadenceFilter,
    ) -> Result<Finalized, CoreError> {
        let missing = self.missing(registry, filter);
        if !missing.is_empty() {
            tracing::debug!(?missing, "Finalize refused");
            return Err(CoreError::IncompleteSession { missing });
        }

        let xp_award = rules.session_award(&self.session.ratings);
        let grant = progression.grant_xp(xp_award);
        let streak = progression.bump_streak();

        let closed = self.session.take();
        let entry = HistoryEntry {
            id: EntryId::new(),
            timestamp: Utc::now(),
            ratings: closed.ratings,
            category_notes: closed.category_notes,
            session_note: closed.session_note,
            xp_gained: xp_award,
        };
        self.history.insert(0, entry.clone());

        tracing::info!(
            id = %entry.id,
            xp = xp_award,
            level = grant.level,
            streak,
            "Session finalized"
        );

        Ok(Finalized {
            entry,
            grant,
            streak,
        })
    }

    pub fn session(&self) -> &RatingSession {
        &self.session
    }

    /// Finalized sessions, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The `n` most recent history entries.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        &self.history[..n.min(self.history.len())]
    }
}
