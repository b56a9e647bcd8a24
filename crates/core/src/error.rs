//! Error types for factguard.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, vector index, answer generation,
//! ingestion, prompt and serialization errors.

use thiserror::Error;

/// Unified error type for factguard.
///
/// All fallible functions return `Result<T, AppError>`.
/// Errors are represented and propagated, never panicked on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (including rejected input at the boundary)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vector index errors (open, search, count, write)
    #[error("Index error: {0}")]
    Index(String),

    /// Answer generator errors (transport, timeout, malformed output)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Source parsing and chunking errors
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error came from the vector index.
    pub fn is_index(&self) -> bool {
        matches!(self, AppError::Index(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
