//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_GRAMMAR_DEBOUNCE_MS, DEFAULT_GRAMMAR_TIMEOUT_SECS, DEFAULT_GRAMMAR_URL,
    DEFAULT_HISTORY_LIMIT, DEFAULT_LANGUAGE, DEFAULT_PROFANITY_DEBOUNCE_MS,
    DEFAULT_REVALIDATE_MS, DEFAULT_SPELL_DEBOUNCE_MS,
};
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the checking pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub aff_path: PathBuf,
    pub dic_path: PathBuf,
    pub grammar_url: String,
    pub grammar_enabled: bool,
    pub grammar_timeout_secs: u64,
    pub language: String,
    pub spell_debounce_ms: u64,
    pub grammar_debounce_ms: u64,
    pub profanity_debounce_ms: u64,
    pub revalidate_ms: u64,
    pub profanity_list: Option<PathBuf>,
    pub history_limit: usize,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_dictionary_dir() -> PathBuf {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".local")
        .join("share")
        .join("wordwise")
        .join("dictionaries")
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn parse_number<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: raw,
        }),
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map-backed closure instead of
    /// mutating the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a numeric value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dictionary_dir = default_dictionary_dir();
        let path_or = |key: &str, fallback: PathBuf| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(|value| PathBuf::from(expand_tilde(value)))
                .unwrap_or(fallback)
        };
        Ok(Self {
            aff_path: path_or("WORDWISE_AFF_PATH", dictionary_dir.join("en_US.aff")),
            dic_path: path_or("WORDWISE_DIC_PATH", dictionary_dir.join("en_US.dic")),
            grammar_url: lookup("WORDWISE_GRAMMAR_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GRAMMAR_URL.to_string()),
            grammar_enabled: lookup("WORDWISE_GRAMMAR_ENABLED")
                .and_then(|value| parse_env_flag(&value))
                .unwrap_or(true),
            grammar_timeout_secs: parse_number(
                &lookup,
                "WORDWISE_GRAMMAR_TIMEOUT_SECS",
                DEFAULT_GRAMMAR_TIMEOUT_SECS,
            )?,
            language: lookup("WORDWISE_LANGUAGE")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            spell_debounce_ms: parse_number(
                &lookup,
                "WORDWISE_SPELL_DEBOUNCE_MS",
                DEFAULT_SPELL_DEBOUNCE_MS,
            )?,
            grammar_debounce_ms: parse_number(
                &lookup,
                "WORDWISE_GRAMMAR_DEBOUNCE_MS",
                DEFAULT_GRAMMAR_DEBOUNCE_MS,
            )?,
            profanity_debounce_ms: parse_number(
                &lookup,
                "WORDWISE_PROFANITY_DEBOUNCE_MS",
                DEFAULT_PROFANITY_DEBOUNCE_MS,
            )?,
            revalidate_ms: parse_number(&lookup, "WORDWISE_REVALIDATE_MS", DEFAULT_REVALIDATE_MS)?,
            profanity_list: lookup("WORDWISE_PROFANITY_LIST")
                .filter(|value| !value.trim().is_empty())
                .map(|value| PathBuf::from(expand_tilde(value))),
            history_limit: parse_number(&lookup, "WORDWISE_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
        })
    }
}
