use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Session incomplete: {} still unrated ({})", unrated_count(.missing), .missing.join(", "))]
    IncompleteSession { missing: Vec<String> },

    #[error("Unknown category: {name}")]
    UnknownCategory { name: String },

    #[error("Score must be between 1 and 5, got {0}")]
    InvalidScore(u8),

    #[error("Category already exists: {name}")]
    DuplicateCategory { name: String },

    #[error("Invalid category name: {0:?}")]
    InvalidCategoryName(String),

    #[error("Goal not found: {id}")]
    GoalNotFound { id: String },

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn unrated_count(missing: &[String]) -> String {
    match missing.len() {
        1 => "1 category".to_string(),
        n => format!("{n} categories"),
    }
}

impl CoreError {
    /// Whether the user can recover by supplying more input (as opposed to an
    /// environment failure such as an unwritable store).
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::IncompleteSession { .. }
                | CoreError::UnknownCategory { .. }
                | CoreError::InvalidScore(_)
                | CoreError::DuplicateCategory { .. }
                | CoreError::InvalidCategoryName(_)
                | CoreError::GoalNotFound { .. }
                | CoreError::InvalidGoal(_)
        )
    }
}
