use serde::Serialize;
use thiserror::Error;

use lifequest_core::CoreError;

/// A problem the front end should show. The tracker records these instead of
/// returning errors, so no failure escapes to the user as a crash.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Notice {
    #[error("Rate every category before finalizing ({})", .0.join(", "))]
    IncompleteSession(Vec<String>),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Progress could not be saved: {0}")]
    StorageFailed(String),

    #[error("Saved progress could not be read, changes are not being saved: {0}")]
    StoreUnreadable(String),

    #[error("Some saved data was unreadable and has been reset: {0}")]
    SnapshotRepaired(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<CoreError> for Notice {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::IncompleteSession { missing } => Notice::IncompleteSession(missing),
            CoreError::MalformedSnapshot(detail) => Notice::SnapshotRepaired(detail),
            e if e.is_user_recoverable() => Notice::InvalidInput(e.to_string()),
            e => Notice::StorageFailed(e.to_string()),
        }
    }
}
