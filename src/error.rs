// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FillerError>;

#[derive(Error, Debug)]
pub enum FillerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to read questions from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector search error: {0}")]
    Search(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Failed to write answers to {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FillerError {
    /// Errors that only cost the current question its answer.
    pub fn is_per_question(&self) -> bool {
        matches!(self, FillerError::Embedding(_) | FillerError::Search(_))
    }
}

impl From<serde_json::Error> for FillerError {
    fn from(err: serde_json::Error) -> Self {
        FillerError::Serialization(err.to_string())
    }
}
