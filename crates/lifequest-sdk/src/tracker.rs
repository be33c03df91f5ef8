use lifequest_coach::{
    CalendarEvent, CalendarFeed, CalendarSource, ChatTurn, CoachingService, Conversation,
};
use lifequest_core::model::{
    Cadence, CadenceFilter, Category, HistoryEntry, ProgressionState, XpGrant,
};
use lifequest_core::storage::{PersistedSnapshot, StorageAdapter};
use lifequest_core::{Finalized, QuestState, Settings};

use crate::notice::Notice;

/// What a successful rating means for the optional policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateOutcome {
    /// The auto-coach policy says a coaching request is due now.
    pub coach_due: bool,
}

/// The owned state a front end hands to its event handlers.
///
/// Every mutation goes through a core operation and is followed by a save.
/// Failures are recorded as a [`Notice`] rather than returned.
pub struct Tracker<S: StorageAdapter> {
    state: QuestState,
    settings: Settings,
    store: S,
    filter: CadenceFilter,
    conversation: Conversation,
    calendar: CalendarFeed,
    ratings_since_coach: u32,
    /// Set while the stored record could not be read, so it is never
    /// overwritten with defaults.
    detached: bool,
    notice: Option<Notice>,
}

impl<S: StorageAdapter> Tracker<S> {
    /// Load the stored snapshot, default-filling whatever is missing. Never
    /// fails. If the store itself cannot be read the tracker starts from
    /// defaults but stays detached: nothing is written back until
    /// [`reload`](Self::reload) succeeds or the user wipes.
    pub fn open(store: S, settings: Settings) -> Self {
        let mut tracker = Self {
            state: QuestState::new(settings.scoring),
            settings,
            store,
            filter: CadenceFilter::All,
            conversation: Conversation::new(),
            calendar: CalendarFeed::new(),
            ratings_since_coach: 0,
            detached: false,
            notice: None,
        };
        tracker.reload();
        tracker
    }

    /// Re-read the stored snapshot, replacing the in-memory state. Returns
    /// `false` when the store could not be read.
    pub fn reload(&mut self) -> bool {
        let raw = match self.store.read() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Could not read stored snapshot, not saving until it can be: {e}");
                self.detached = true;
                self.notice = Some(Notice::StoreUnreadable(e.to_string()));
                return false;
            }
        };

        let restored = PersistedSnapshot::restore(raw.as_deref());
        if let Some(e) = restored.malformed() {
            self.notice = Some(Notice::from(e));
        }
        tracing::debug!(
            level = restored.snapshot.progression.level,
            history = restored.snapshot.history.len(),
            "Tracker loaded"
        );
        self.state = QuestState::from_snapshot(restored.snapshot, self.settings.scoring);
        self.detached = false;
        true
    }

    // -- Session --

    /// Rate a category in the current session.
    pub fn rate(&mut self, category: &str, score: u8) -> Option<RateOutcome> {
        if let Err(e) = self.state.rate(category, score) {
            self.notice = Some(e.into());
            return None;
        }

        let policy = &self.settings.auto_coach;
        let mut outcome = RateOutcome::default();
        if policy.enabled && policy.every_n_ratings > 0 {
            self.ratings_since_coach += 1;
            if self.ratings_since_coach >= policy.every_n_ratings {
                self.ratings_since_coach = 0;
                outcome.coach_due = true;
            }
        }
        Some(outcome)
    }

    pub fn set_category_note(&mut self, category: &str, text: &str) {
        if self.state.set_category_note(category, text) {
            self.note_edited();
        }
    }

    pub fn set_session_note(&mut self, text: &str) {
        if self.state.set_session_note(text) {
            self.note_edited();
        }
    }

    fn note_edited(&mut self) {
        let policy = &self.settings.note_xp;
        if policy.enabled && policy.amount > 0 {
            let amount = policy.amount;
            self.state.grant_xp(amount);
            self.persist();
        }
    }

    /// Which cadences the current session must cover.
    pub fn set_filter(&mut self, filter: CadenceFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &CadenceFilter {
        &self.filter
    }

    pub fn can_finalize(&self) -> bool {
        self.state.can_finalize(&self.filter)
    }

    /// Rated and eligible category counts for the active filter.
    pub fn completion(&self) -> (usize, usize) {
        self.state.completion(&self.filter)
    }

    pub fn preview_award(&self) -> u64 {
        self.state.preview_award()
    }

    /// Close the session. On an incomplete session nothing changes and a
    /// notice lists the unrated categories.
    pub fn finalize(&mut self) -> Option<Finalized> {
        match self.state.finalize(&self.filter) {
            Ok(done) => {
                self.persist();
                Some(done)
            }
            Err(e) => {
                self.notice = Some(e.into());
                None
            }
        }
    }

    // -- Categories --

    pub fn add_category(&mut self, name: &str, cadence: Cadence) -> bool {
        match self.state.add_category(name, cadence) {
            Ok(()) => {
                self.persist();
                true
            }
            Err(e) => {
                self.notice = Some(e.into());
                false
            }
        }
    }

    pub fn remove_category(&mut self, name: &str) -> bool {
        let removed = self.state.remove_category(name).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    /// Categories under the active filter.
    pub fn categories(&self) -> Vec<&Category> {
        self.state.list_categories(&self.filter)
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories().into_iter().map(|c| c.name.clone()).collect()
    }

    // -- Planner --

    pub fn add_goal(&mut self, text: &str) -> Option<String> {
        match self.state.add_goal(text) {
            Ok(id) => {
                self.persist();
                Some(id)
            }
            Err(e) => {
                self.notice = Some(e.into());
                None
            }
        }
    }

    /// Complete a goal; the XP grant is returned the first time only.
    pub fn complete_goal(&mut self, id: &str) -> Option<XpGrant> {
        match self.state.complete_goal(id) {
            Ok(grant) => {
                if grant.is_some() {
                    self.persist();
                }
                grant
            }
            Err(e) => {
                self.notice = Some(e.into());
                None
            }
        }
    }

    pub fn delete_goal(&mut self, id: &str) -> bool {
        match self.state.delete_goal(id) {
            Ok(_) => {
                self.persist();
                true
            }
            Err(e) => {
                self.notice = Some(e.into());
                false
            }
        }
    }

    // -- Collaborators --

    /// Ask the coach. A failed request appends the fallback reply.
    pub async fn ask_coach<C: CoachingService + ?Sized>(
        &mut self,
        service: &C,
        message: &str,
    ) -> Option<&ChatTurn> {
        self.ratings_since_coach = 0;
        let window = self.settings.coaching_history_window;
        let asked = self
            .conversation
            .ask(service, message, self.state.history(), window)
            .await
            .is_some();
        if !asked {
            return None;
        }
        if let Some(err) = self.conversation.last_error() {
            self.notice = Some(Notice::ServiceUnavailable(err.to_string()));
        }
        self.conversation.turns().last()
    }

    /// Give up on a coaching request whose future was dropped before the
    /// reply arrived.
    pub fn abandon_coach(&mut self) -> bool {
        self.conversation.abandon()
    }

    /// Refresh upcoming events. Failures leave an empty list.
    pub async fn refresh_calendar<C: CalendarSource + ?Sized>(
        &mut self,
        source: &C,
        credential: Option<&str>,
    ) -> &[CalendarEvent] {
        self.calendar.refresh(source, credential).await;
        if let Some(err) = self.calendar.last_error() {
            self.notice = Some(Notice::ServiceUnavailable(err.to_string()));
        }
        self.calendar.events()
    }

    // -- Lifecycle --

    /// Erase the stored record and start over from the first-run defaults.
    pub fn wipe(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Could not clear stored snapshot: {e}");
            self.notice = Some(e.into());
            return;
        }
        tracing::info!("Tracker wiped");
        self.state = QuestState::new(self.settings.scoring);
        self.conversation = Conversation::new();
        self.calendar = CalendarFeed::new();
        self.ratings_since_coach = 0;
        self.detached = false;
    }

    fn persist(&mut self) {
        if self.detached {
            tracing::debug!("Stored snapshot unreadable, skipping save");
            return;
        }
        let result = self
            .state
            .snapshot()
            .to_json()
            .and_then(|json| self.store.write(&json));
        if let Err(e) = result {
            tracing::warn!("Could not save snapshot: {e}");
            self.notice = Some(e.into());
        }
    }

    // -- Accessors --

    pub fn state(&self) -> &QuestState {
        &self.state
    }

    pub fn progression(&self) -> &ProgressionState {
        self.state.progression()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.state.history()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn calendar(&self) -> &CalendarFeed {
        &self.calendar
    }

    /// Whether changes are being kept in memory only because the stored
    /// record could not be read.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Take the pending notice, clearing it.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use lifequest_coach::{CoachError, CoachingRequest, FALLBACK_REPLY};
    use lifequest_core::config::{AutoCoachPolicy, NoteXpPolicy};
    use lifequest_core::storage::{FileStore, MemoryStore};
    use lifequest_core::CoreError;
    use tempfile::TempDir;

    use super::*;

    fn three_category_tracker() -> Tracker<MemoryStore> {
        let mut tracker = Tracker::open(MemoryStore::new(), Settings::default());
        for name in ["Learning", "Creativity", "Mindset"] {
            assert!(tracker.remove_category(name));
        }
        tracker
    }

    #[test]
    fn test_first_run_defaults() {
        let tracker = Tracker::open(MemoryStore::new(), Settings::default());
        let p = tracker.progression();
        assert_eq!((p.level, p.current_xp, p.lifetime_xp, p.streak), (3, 0, 235, 0));
        assert_eq!(tracker.categories().len(), 6);
        assert!(tracker.history().is_empty());
        assert!(tracker.notice().is_none());
    }

    #[test]
    fn test_finalize_scenario_persists() {
        let mut tracker = three_category_tracker();
        tracker.rate("Health", 5).unwrap();
        tracker.rate("Work", 4).unwrap();
        tracker.rate("Social", 3).unwrap();
        assert_eq!(tracker.completion(), (3, 3));
        assert_eq!(tracker.preview_award(), 220);

        let done = tracker.finalize().unwrap();
        assert_eq!(done.entry.xp_gained, 220);
        let p = tracker.progression();
        assert_eq!((p.level, p.current_xp, p.lifetime_xp, p.streak), (4, 51, 455, 1));

        let raw = tracker.store.read().unwrap().unwrap();
        let stored = PersistedSnapshot::restore(Some(&raw)).snapshot;
        assert_eq!(stored, tracker.state().snapshot());
    }

    #[test]
    fn test_incomplete_finalize_sets_notice() {
        let mut tracker = three_category_tracker();
        tracker.rate("Health", 5).unwrap();
        let before = tracker.state().clone();

        assert!(tracker.finalize().is_none());
        assert_eq!(tracker.state(), &before);
        assert_eq!(
            tracker.take_notice(),
            Some(Notice::IncompleteSession(vec!["Work".into(), "Social".into()]))
        );
        assert!(tracker.notice().is_none());
        assert_eq!(tracker.store.read().unwrap(), None);
    }

    #[test]
    fn test_filter_limits_required_categories() {
        let mut tracker = three_category_tracker();
        assert!(tracker.add_category("Finances", Cadence::Weekly));
        tracker.set_filter(CadenceFilter::only(Cadence::Weekly));
        assert_eq!(tracker.category_names(), vec!["Finances"]);

        tracker.rate("Finances", 2).unwrap();
        assert!(tracker.can_finalize());
        assert_eq!(tracker.finalize().unwrap().entry.xp_gained, 120);
    }

    #[test]
    fn test_invalid_input_sets_notice() {
        let mut tracker = three_category_tracker();
        assert!(tracker.rate("Health", 9).is_none());
        assert!(matches!(tracker.take_notice(), Some(Notice::InvalidInput(_))));

        assert!(!tracker.add_category("Health", Cadence::Daily));
        assert!(matches!(tracker.take_notice(), Some(Notice::InvalidInput(_))));

        assert!(!tracker.remove_category("Nope"));
        assert!(tracker.complete_goal("nope").is_none());
        assert!(tracker.notice().is_some());
    }

    #[test]
    fn test_reopen_from_file_store() {
        let tmp = TempDir::new().unwrap();
        let key = Settings::default().storage_key;
        let snapshot = {
            let store = FileStore::open_with_key(tmp.path(), &key).unwrap();
            let mut tracker = Tracker::open(store, Settings::default());
            for name in tracker.category_names() {
                tracker.rate(&name, 3).unwrap();
            }
            tracker.finalize().unwrap();
            let goal = tracker.add_goal("Call mom").unwrap();
            tracker.complete_goal(&goal).unwrap();
            tracker.state().snapshot()
        };

        let store = FileStore::open_with_key(tmp.path(), &key).unwrap();
        let tracker = Tracker::open(store, Settings::default());
        assert_eq!(tracker.state().snapshot(), snapshot);
        assert_eq!(tracker.history().len(), 1);
        assert_eq!(tracker.progression().lifetime_xp, 235 + 280 + 25);
    }

    #[test]
    fn test_corrupt_store_opens_with_notice() {
        let store = MemoryStore::with_record(r#"{"progression": {"level": "x"}}"#);
        let tracker = Tracker::open(store, Settings::default());
        assert_eq!(tracker.progression().level, 3);
        assert!(matches!(tracker.notice(), Some(Notice::SnapshotRepaired(_))));
    }

    #[test]
    fn test_note_xp_policy() {
        let settings = Settings {
            note_xp: NoteXpPolicy {
                enabled: true,
                amount: 2,
            },
            ..Default::default()
        };
        let mut tracker = Tracker::open(MemoryStore::new(), settings);
        tracker.set_session_note("a");
        tracker.set_session_note("a");
        tracker.set_category_note("Health", "slept well");
        assert_eq!(tracker.progression().lifetime_xp, 235 + 4);
        assert!(tracker.store.read().unwrap().is_some());
    }

    #[test]
    fn test_note_xp_policy_disabled_by_default() {
        let mut tracker = Tracker::open(MemoryStore::new(), Settings::default());
        tracker.set_session_note("a");
        assert_eq!(tracker.progression().lifetime_xp, 235);
    }

    #[test]
    fn test_auto_coach_every_third_rating() {
        let settings = Settings {
            auto_coach: AutoCoachPolicy {
                enabled: true,
                every_n_ratings: 3,
            },
            ..Default::default()
        };
        let mut tracker = Tracker::open(MemoryStore::new(), settings);
        let due: Vec<bool> = ["Health", "Work", "Social", "Learning", "Creativity", "Mindset"]
            .into_iter()
            .map(|name| tracker.rate(name, 4).unwrap().coach_due)
            .collect();
        assert_eq!(due, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_wipe_resets_everything() {
        let mut tracker = Tracker::open(MemoryStore::new(), Settings::default());
        for name in tracker.category_names() {
            tracker.rate(&name, 5).unwrap();
        }
        tracker.finalize().unwrap();
        tracker.remove_category("Health");

        tracker.wipe();
        assert_eq!(tracker.progression(), &ProgressionState::starter());
        assert!(tracker.history().is_empty());
        assert_eq!(tracker.categories().len(), 6);
        assert_eq!(tracker.store.read().unwrap(), None);
    }

    struct FailingStore;

    impl StorageAdapter for FailingStore {
        fn read(&self) -> Result<Option<String>, CoreError> {
            Ok(None)
        }
        fn write(&self, _record: &str) -> Result<(), CoreError> {
            Err(CoreError::Storage("offline".into()))
        }
        fn clear(&self) -> Result<(), CoreError> {
            Err(CoreError::Storage("offline".into()))
        }
    }

    #[test]
    fn test_storage_failure_never_blocks_progress() {
        let mut tracker = Tracker::open(FailingStore, Settings::default());
        assert!(tracker.notice().is_none());

        for name in tracker.category_names() {
            tracker.rate(&name, 1).unwrap();
        }
        let done = tracker.finalize().unwrap();
        assert_eq!(done.entry.xp_gained, 160);
        assert_eq!(tracker.progression().streak, 1);
        assert!(matches!(tracker.notice(), Some(Notice::StorageFailed(_))));
    }

    /// Holds a real record but fails reads until told otherwise.
    struct LockedStore {
        inner: MemoryStore,
        locked: AtomicBool,
    }

    impl StorageAdapter for LockedStore {
        fn read(&self) -> Result<Option<String>, CoreError> {
            if self.locked.load(Ordering::SeqCst) {
                return Err(CoreError::Storage("record is locked".into()));
            }
            self.inner.read()
        }
        fn write(&self, record: &str) -> Result<(), CoreError> {
            self.inner.write(record)
        }
        fn clear(&self) -> Result<(), CoreError> {
            self.inner.clear()
        }
    }

    const VETERAN: &str =
        r#"{"progression": {"level": 40, "current_xp": 12, "lifetime_xp": 9000, "streak": 77}}"#;

    #[test]
    fn test_unreadable_store_is_never_overwritten() {
        let store = LockedStore {
            inner: MemoryStore::with_record(VETERAN),
            locked: AtomicBool::new(true),
        };
        let mut tracker = Tracker::open(&store, Settings::default());
        assert!(tracker.is_detached());
        assert!(matches!(tracker.take_notice(), Some(Notice::StoreUnreadable(_))));
        assert_eq!(tracker.progression().level, 3);

        assert!(tracker.add_category("Finances", Cadence::Weekly));
        tracker.add_goal("Stretch").unwrap();
        assert_eq!(store.inner.read().unwrap().as_deref(), Some(VETERAN));

        store.locked.store(false, Ordering::SeqCst);
        assert!(tracker.reload());
        assert!(!tracker.is_detached());
        assert_eq!(tracker.progression().level, 40);
        assert_eq!(tracker.progression().streak, 77);

        assert!(tracker.add_category("Finances", Cadence::Weekly));
        let raw = store.inner.read().unwrap().unwrap();
        let stored = PersistedSnapshot::restore(Some(&raw)).snapshot;
        assert_eq!(stored.progression.lifetime_xp, 9000);
        assert!(stored.categories.contains("Finances"));
    }

    #[test]
    fn test_wipe_reattaches_unreadable_store() {
        let store = LockedStore {
            inner: MemoryStore::with_record(VETERAN),
            locked: AtomicBool::new(true),
        };
        let mut tracker = Tracker::open(&store, Settings::default());
        tracker.wipe();
        assert!(!tracker.is_detached());

        assert!(tracker.add_category("Finances", Cadence::Weekly));
        let raw = store.inner.read().unwrap().unwrap();
        assert_eq!(
            PersistedSnapshot::restore(Some(&raw)).snapshot.progression.level,
            3
        );
    }

    struct StalledCoach;

    #[async_trait]
    impl CoachingService for StalledCoach {
        async fn advise(&self, _request: &CoachingRequest) -> Result<String, CoachError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_dropped_coach_request_is_rolled_back() {
        let mut tracker = Tracker::open(MemoryStore::new(), Settings::default());
        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            tracker.ask_coach(&StalledCoach, "anyone there?"),
        )
        .await;
        assert!(timed_out.is_err());
        assert!(tracker.conversation().is_waiting());

        assert!(tracker.abandon_coach());
        assert!(!tracker.conversation().is_waiting());
        assert!(tracker.conversation().turns().is_empty());

        let reply = tracker.ask_coach(&ScriptedCoach(Ok("Here.")), "hello").await;
        assert_eq!(reply.unwrap().content, "Here.");
        assert_eq!(tracker.conversation().turns().len(), 2);
    }

    struct ScriptedCoach(Result<&'static str, &'static str>);

    #[async_trait]
    impl CoachingService for ScriptedCoach {
        async fn advise(&self, request: &CoachingRequest) -> Result<String, CoachError> {
            assert!(request.recent_history.len() <= 3);
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(e) => Err(CoachError::Unavailable(e.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_ask_coach() {
        let mut tracker = Tracker::open(MemoryStore::new(), Settings::default());
        let before = tracker.state().clone();

        let reply = tracker
            .ask_coach(&ScriptedCoach(Ok("Sleep more.")), "Thoughts?")
            .await
            .unwrap();
        assert_eq!(reply.content, "Sleep more.");

        let reply = tracker
            .ask_coach(&ScriptedCoach(Err("timeout")), "Again?")
            .await
            .unwrap();
        assert_eq!(reply.content, FALLBACK_REPLY);
        assert_eq!(tracker.conversation().turns().len(), 4);
        assert!(matches!(tracker.notice(), Some(Notice::ServiceUnavailable(_))));
        assert_eq!(tracker.state(), &before);
    }

    struct NoCalendar;

    #[async_trait]
    impl CalendarSource for NoCalendar {
        async fn upcoming_events(
            &self,
            _credential: &str,
            _max_results: usize,
        ) -> Result<Vec<CalendarEvent>, CoachError> {
            Err(CoachError::Unavailable("no network".into()))
        }
    }

    #[tokio::test]
    async fn test_calendar_failure_degrades() {
        let mut tracker = Tracker::open(MemoryStore::new(), Settings::default());
        assert!(tracker.refresh_calendar(&NoCalendar, Some("t")).await.is_empty());
        assert!(!tracker.calendar().is_loading());
        assert!(matches!(tracker.notice(), Some(Notice::ServiceUnavailable(_))));
    }
}
