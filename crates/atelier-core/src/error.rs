//! Error types for atelier-core

use thiserror::Error;

/// Main error type for atelier-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for atelier-core
pub type Result<T> = std::result::Result<T, Error>;
