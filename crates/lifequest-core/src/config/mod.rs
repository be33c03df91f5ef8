pub mod scoring;
pub mod settings;

pub use scoring::ScoringRules;
pub use settings::{AutoCoachPolicy, NoteXpPolicy, Settings};
