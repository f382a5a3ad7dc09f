//! Error types for tubelens-core

use thiserror::Error;

/// Main error type for the tubelens-core library
///
/// Analytics never return these for thin data; see [`crate::analytics::Analysis`].
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

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed input such as a missing required column
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Thumbnail bytes could not be decoded
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Two records share one video identifier
    #[error("duplicate video id: {0}")]
    DuplicateVideo(String),

    /// Video not found
    #[error("video not found: {0}")]
    VideoNotFound(String),

    /// Storage handle unusable (poisoned lock)
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for tubelens-core
pub type Result<T> = std::result::Result<T, Error>;
