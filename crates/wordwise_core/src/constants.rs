//! Shared constants used across WordWise crates.

/// Default LanguageTool endpoint used for grammar checks.
pub const DEFAULT_GRAMMAR_URL: &str = "https://api.languagetool.org/v2/check";

/// Default language tag sent with grammar checks.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default request timeout for the grammar service, in seconds.
pub const DEFAULT_GRAMMAR_TIMEOUT_SECS: u64 = 10;

/// Debounce delay for spelling after the last edit.
pub const DEFAULT_SPELL_DEBOUNCE_MS: u64 = 500;
/// Debounce delay for grammar after the last edit.
pub const DEFAULT_GRAMMAR_DEBOUNCE_MS: u64 = 1_000;
/// Debounce delay for profanity after the last edit.
pub const DEFAULT_PROFANITY_DEBOUNCE_MS: u64 = 500;

/// Delay before re-validating text edited by an applied suggestion.
pub const DEFAULT_REVALIDATE_MS: u64 = 150;

/// Number of history entries kept by the in-memory history store.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Upper bound on spelling suggestions returned per word.
pub const MAX_SUGGESTIONS: usize = 8;

/// Separator placed between block texts in the plain-text projection.
pub const BLOCK_SEPARATOR: &str = "\n\n";
