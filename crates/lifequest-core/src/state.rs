use crate::config::ScoringRules;
use crate::error::CoreError;
use crate::model::{
    Cadence, CadenceFilter, Category, Goal, HistoryEntry, Planner, ProgressionState,
    RatingSession, XpGrant,
};
use crate::recorder::{Finalized, SessionRecorder};
use crate::registry::CategoryRegistry;
use crate::storage::PersistedSnapshot;

/// The whole tracker state as one owned value. Front ends hold one of these
/// and mutate it only through its methods.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestState {
    progression: ProgressionState,
    categories: CategoryRegistry,
    recorder: SessionRecorder,
    planner: Planner,
    rules: ScoringRules,
}

impl QuestState {
    /// First-run state: starter progression, categories, and goals.
    pub fn new(rules: ScoringRules) -> Self {
        Self {
            progression: ProgressionState::starter(),
            categories: CategoryRegistry::starter(),
            recorder: SessionRecorder::new(),
            planner: Planner::starter(),
            rules,
        }
    }

    pub fn from_snapshot(snapshot: PersistedSnapshot, rules: ScoringRules) -> Self {
        Self {
            progression: snapshot.progression,
            categories: snapshot.categories,
            recorder: SessionRecorder::with_history(snapshot.history),
            planner: snapshot.goals,
            rules,
        }
    }

    /// Capture everything that outlives a session. The in-progress ratings
    /// are not part of the snapshot.
    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            progression: self.progression.clone(),
            categories: self.categories.clone(),
            history: self.recorder.history().to_vec(),
            goals: self.planner.clone(),
        }
    }

    // -- Progression --

    pub fn grant_xp(&mut self, amount: u64) -> XpGrant {
        self.progression.grant_xp(amount)
    }

    // -- Session --

    pub fn rate(&mut self, category: &str, score: u8) -> Result<(), CoreError> {
        self.recorder.rate(&self.categories, category, score)
    }

    pub fn set_category_note(&mut self, category: &str, text: &str) -> bool {
        self.recorder.set_category_note(category, text)
    }

    pub fn set_session_note(&mut self, text: &str) -> bool {
        self.recorder.set_session_note(text)
    }

    pub fn can_finalize(&self, filter: &CadenceFilter) -> bool {
        self.recorder.can_finalize(&self.categories, filter)
    }

    pub fn finalize(&mut self, filter: &CadenceFilter) -> Result<Finalized, CoreError> {
        self.recorder
            .finalize(&self.categories, &mut self.progression, &self.rules, filter)
    }

    /// XP the current ratings would earn if finalized now.
    pub fn preview_award(&self) -> u64 {
        self.rules.preview_award(&self.recorder.session().ratings)
    }

    pub fn completion(&self, filter: &CadenceFilter) -> (usize, usize) {
        self.recorder.completion(&self.categories, filter)
    }

    // -- Categories --

    pub fn add_category(&mut self, name: &str, cadence: Cadence) -> Result<(), CoreError> {
        self.categories.add(name, cadence).map(|_| ())
    }

    pub fn remove_category(&mut self, name: &str) -> Option<Category> {
        self.categories.remove(name)
    }

    pub fn list_categories(&self, filter: &CadenceFilter) -> Vec<&Category> {
        self.categories.list(filter)
    }

    // -- Planner --

    pub fn add_goal(&mut self, text: &str) -> Result<String, CoreError> {
        self.planner.add(text).map(|g| g.id.clone())
    }

    /// Complete a goal, paying the goal award the first time only.
    pub fn complete_goal(&mut self, id: &str) -> Result<Option<XpGrant>, CoreError> {
        if self.planner.complete(id)? {
            Ok(Some(self.progression.grant_xp(self.rules.goal_award)))
        } else {
            Ok(None)
        }
    }

    pub fn delete_goal(&mut self, id: &str) -> Result<Goal, CoreError> {
        self.planner.delete(id)
    }

    // -- Accessors --

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn session(&self) -> &RatingSession {
        self.recorder.session()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.recorder.history()
    }

    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        self.recorder.recent(n)
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }
}

impl Default for QuestState {
    fn default() -> Self {
        Self::new(ScoringRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_scenario_end_to_end() {
        let mut state = QuestState::new(ScoringRules::V3);
        for name in ["Learning", "Creativity", "Mindset"] {
            state.remove_category(name);
        }
        state.rate("Health", 5).unwrap();
        state.rate("Work", 4).unwrap();
        state.rate("Social", 3).unwrap();
        assert_eq!(state.preview_award(), 220);

        let done = state.finalize(&CadenceFilter::All).unwrap();
        assert_eq!(done.entry.xp_gained, 220);

        let p = state.progression();
        assert_eq!((p.level, p.current_xp, p.lifetime_xp, p.streak), (4, 51, 455, 1));
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_removing_category_keeps_history() {
        let mut state = QuestState::default();
        for c in state.categories().all().to_vec() {
            state.rate(&c.name, 4).unwrap();
        }
        state.finalize(&CadenceFilter::All).unwrap();
        let before = state.history()[0].ratings.clone();

        state.remove_category("Health");
        assert_eq!(state.history()[0].ratings, before);
        assert_eq!(state.history()[0].ratings["Health"], 4);
    }

    #[test]
    fn test_goal_award_paid_once() {
        let mut state = QuestState::default();
        let id = state.add_goal("Meal prep").unwrap();
        let before = state.progression().lifetime_xp;

        let grant = state.complete_goal(&id).unwrap().unwrap();
        assert_eq!(grant.lifetime_xp, before + 25);
        assert!(state.complete_goal(&id).unwrap().is_none());
        assert_eq!(state.progression().lifetime_xp, before + 25);
        assert_eq!(state.progression().streak, 0);
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_snapshot_excludes_open_session() {
        let mut state = QuestState::default();
        state.rate("Health", 2).unwrap();
        let restored = QuestState::from_snapshot(state.snapshot(), ScoringRules::V3);
        assert!(restored.session().is_empty());
        assert_eq!(restored.progression(), state.progression());
        assert_eq!(restored.categories(), state.categories());
    }

    #[test]
    fn test_legacy_rules() {
        let mut state = QuestState::new(ScoringRules::LEGACY);
        for c in state.categories().all().to_vec() {
            state.rate(&c.name, 1).unwrap();
        }
        let done = state.finalize(&CadenceFilter::All).unwrap();
        assert_eq!(done.entry.xp_gained, 6 * 5 + 50);
    }
}
