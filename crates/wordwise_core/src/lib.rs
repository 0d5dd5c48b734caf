//! Core domain library for WordWise (config, models, tokenizer, checker backends).

/// Checking backends: dictionary, grammar service, profanity list.
pub mod checks;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Draft generation collaborator.
pub mod draft;
/// Error types for backends and collaborators.
pub mod error;
/// History collaborator.
pub mod history;
/// Findings, tokens, and history records.
pub mod models;
/// Tokenization and text normalization.
pub mod text;

pub use config::{env_flag_enabled, parse_env_flag, Config};
pub use error::{CheckError, ConfigError, DraftError, HistoryError};
pub use models::{CheckKind, Finding, GrammarRule, Token};
