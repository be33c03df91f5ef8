pub mod category;
pub mod history;
pub mod planner;
pub mod progression;
pub mod session;

pub use category::{Cadence, CadenceFilter, Category};
pub use history::{EntryId, HistoryEntry};
pub use planner::{Goal, Planner, Priority};
pub use progression::{ProgressionState, Rank, XpGrant, LEVEL_CAPACITY};
pub use session::{RatingSession, MAX_SCORE, MIN_SCORE};
