//! Error types for wilder

use thiserror::Error;

/// Main error type for wilder operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid grid size: {0}")]
    InvalidGridSize(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("GBIF error: {0}")]
    Gbif(String),
}

/// Result type alias for wilder operations
pub type Result<T> = std::result::Result<T, Error>;
