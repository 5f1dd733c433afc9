//! Error types for voclens-core

use thiserror::Error;

/// Main error type for the voclens-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid schedule configuration (non-positive period, inverted date range)
    #[error("invalid schedule config: {0}")]
    InvalidScheduleConfig(String),

    /// Schedule not found
    #[error("schedule not found: {0}")]
    ScheduleNotFound(String),

    /// Tag not found
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// Aggregation invariant violated
    #[error("internal inconsistency: {0}")]
    Inconsistency(String),

    /// Collaborator API call failed
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// Result type alias for voclens-core
pub type Result<T> = std::result::Result<T, Error>;
