//! The tracker a LifeQuest front end holds on to.
//!
//! # Example
//! ```no_run
//! use lifequest_core::model::Cadence;
//! use lifequest_core::storage::FileStore;
//! use lifequest_core::Settings;
//! use lifequest_sdk::Tracker;
//!
//! let store = FileStore::open(std::path::Path::new("./data")).unwrap();
//! let mut tracker = Tracker::open(store, Settings::default());
//! tracker.add_category("Finances", Cadence::Weekly);
//! for name in tracker.category_names() {
//!     tracker.rate(&name, 4);
//! }
//! tracker.set_session_note("Good week");
//! if let Some(done) = tracker.finalize() {
//!     println!("+{} XP, level {}", done.entry.xp_gained, done.grant.level);
//! }
//! ```

mod notice;
mod tracker;

pub use notice::Notice;
pub use tracker::{RateOutcome, Tracker};

// Re-export core types that front ends need
pub use lifequest_coach::{CalendarEvent, CalendarSource, ChatTurn, CoachingService};
pub use lifequest_core::model::{
    Cadence, CadenceFilter, Category, Goal, HistoryEntry, ProgressionState, Rank, XpGrant,
};
pub use lifequest_core::{Finalized, QuestState, Settings};
