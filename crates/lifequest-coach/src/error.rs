use thiserror::Error;

/// Failures of the outside services. All of them are recoverable: callers
/// degrade to a fallback reply or an empty event list.
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("External service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid response from external service: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
