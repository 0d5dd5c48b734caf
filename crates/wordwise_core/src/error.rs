//! Error types for checker backends, configuration, and collaborators.
use thiserror::Error;

/// Failure raised by a checking backend (dictionary, grammar service, filter).
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Affix rule error on line {line}: {message}")]
    Affix { line: usize, message: String },

    #[error("Dictionary error: {0}")]
    Dictionary(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Invalid configuration value read from the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: String, value: String },
}

/// Failure reported by a document history collaborator.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Not found")]
    NotFound,

    #[error("Invalid entry: {0}")]
    Invalid(String),
}

/// Failure reported by a draft generator.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DraftError {
    #[error("Prompt is required")]
    Empty,

    #[error("Draft backend error: {0}")]
    Backend(String),
}
