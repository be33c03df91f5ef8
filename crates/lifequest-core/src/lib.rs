//! Progression and session-recording engine for LifeQuest.
//!
//! A user rates their categories 1-5, finalizes the session, and earns XP that
//! accrues into levels. [`QuestState`] owns the whole state; storage adapters
//! persist its [`PersistedSnapshot`](storage::PersistedSnapshot).

pub mod config;
pub mod error;
pub mod model;
pub mod recorder;
pub mod registry;
pub mod state;
pub mod storage;

pub use config::{ScoringRules, Settings};
pub use error::CoreError;
pub use recorder::{Finalized, SessionRecorder};
pub use registry::CategoryRegistry;
pub use state::QuestState;
