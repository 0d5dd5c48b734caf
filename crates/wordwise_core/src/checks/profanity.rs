//! Word-list profanity filter.

use crate::error::CheckError;
use crate::text::tokenize;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_WORDS: &[&str] = &[
    "arse", "arsehole", "ass", "asshole", "bastard", "bitch", "bollocks", "bullshit", "crap",
    "damn", "dick", "dickhead", "fuck", "fucked", "fucker", "fucking", "goddamn", "hell",
    "motherfucker", "piss", "pissed", "prick", "shit", "shitty", "slut", "twat", "wanker",
    "whore",
];

/// Case-insensitive matcher over a fixed word list.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    words: HashSet<String>,
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::from_words(BUILTIN_WORDS.iter().copied())
    }
}

impl ProfanityFilter {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|word| word.as_ref().trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        }
    }

    /// Load a list with one word per line. Blank lines and `#` comments are skipped.
    ///
    /// # Errors
    /// Returns [`CheckError::Io`] when the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, CheckError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_words(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        ))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Flagged words in `text`, lowercased, deduplicated, in first-seen order.
    pub fn flagged_words(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        tokenize(text)
            .into_iter()
            .map(|token| token.word.to_lowercase())
            .filter(|word| self.words.contains(word) && seen.insert(word.clone()))
            .collect()
    }
}
