//! Error types for Guaxinim.

use thiserror::Error;

/// Library-level error type for Guaxinim operations.
#[derive(Error, Debug)]
pub enum GuaxinimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No documents found in {location}")]
    CorpusEmpty { location: String },

    #[error("Malformed record {origin}: {reason}")]
    MalformedRecord { origin: String, reason: String },

    #[error("Dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GuaxinimError {
    /// Whether this error only affects a single record and can be skipped.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            GuaxinimError::MalformedRecord { .. } | GuaxinimError::DimensionMismatch { .. }
        )
    }
}

/// Result type alias for Guaxinim operations.
pub type Result<T> = std::result::Result<T, GuaxinimError>;
