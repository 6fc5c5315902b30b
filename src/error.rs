//! Bingo Caller Error Types
//!
//! Centralized error handling for the caller core and its boundaries.

use thiserror::Error;

/// Central error type for the bingo caller
#[derive(Error, Debug)]
pub enum CallerError {
    /// A draw was attempted with no numbers left
    #[error("no numbers remaining in the pool")]
    EmptyPool,

    #[error("no categories enabled")]
    NoCategories,

    #[error("Narration error: {0}")]
    Narration(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Keep-awake lock error: {0}")]
    WakeLock(String),

    #[error("Unrecognized command: {0}")]
    Command(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for caller operations
pub type CallerResult<T> = Result<T, CallerError>;
