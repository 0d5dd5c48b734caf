//! Checker findings and the tokens they are computed from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Which checker produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Spelling,
    Grammar,
    Profanity,
}

impl CheckKind {
    /// Every kind, in dispatch order.
    pub const ALL: [CheckKind; 3] = [CheckKind::Spelling, CheckKind::Grammar, CheckKind::Profanity];

    /// Stable lowercase label used in logs and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::Spelling => "spelling",
            CheckKind::Grammar => "grammar",
            CheckKind::Profanity => "profanity",
        }
    }

    /// Dense index for per-kind tables.
    pub fn index(self) -> usize {
        match self {
            CheckKind::Spelling => 0,
            CheckKind::Grammar => 1,
            CheckKind::Profanity => 2,
        }
    }

    /// Whether findings of this kind are drawn as positional markers.
    pub fn is_positional(self) -> bool {
        !matches!(self, CheckKind::Profanity)
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A checkable word extracted from plain text.
///
/// `start` and `length` count chars, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub start: usize,
    pub length: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Rule metadata attached to grammar findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarRule {
    pub id: String,
    pub description: String,
    pub category: String,
}

/// A located writing issue with optional replacement suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: CheckKind,
    /// The misspelled word, or the grammar message.
    pub text: String,
    pub start: usize,
    pub length: usize,
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<GrammarRule>,
}

impl Finding {
    /// Build a spelling finding for `word` at `start`.
    pub fn spelling(word: impl Into<String>, start: usize, length: usize, suggestions: Vec<String>) -> Self {
        Self {
            kind: CheckKind::Spelling,
            text: word.into(),
            start,
            length,
            suggestions,
            rule: None,
        }
    }

    /// Build a grammar finding carrying a human-readable message.
    pub fn grammar(
        message: impl Into<String>,
        start: usize,
        length: usize,
        replacements: Vec<String>,
        rule: Option<GrammarRule>,
    ) -> Self {
        Self {
            kind: CheckKind::Grammar,
            text: message.into(),
            start,
            length,
            suggestions: replacements,
            rule,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Plain-text span covered by this finding.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// `true` when `[start, end)` overlaps `range`. Empty ranges overlap nothing.
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        if range.start >= range.end || self.length == 0 {
            return false;
        }
        self.start < range.end && range.start < self.end()
    }
}
