//! Protocol types for the checker worker threads.

use std::fmt;
use wordwise_core::{CheckKind, Finding};

/// Correlates a dispatched check with its reply. Displayed as `req_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req_{}", self.0)
    }
}

/// Commands sent by the owning thread for a worker to execute.
#[derive(Debug)]
pub enum CheckCmd {
    /// Spell-check a plain-text snapshot.
    Spelling { id: RequestId, text: String },
    /// Grammar-check a snapshot in the given language.
    Grammar {
        id: RequestId,
        text: String,
        language: String,
    },
    /// Collect profane words in a snapshot.
    Profanity { id: RequestId, text: String },
}

impl CheckCmd {
    pub fn id(&self) -> RequestId {
        match self {
            CheckCmd::Spelling { id, .. }
            | CheckCmd::Grammar { id, .. }
            | CheckCmd::Profanity { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> CheckKind {
        match self {
            CheckCmd::Spelling { .. } => CheckKind::Spelling,
            CheckCmd::Grammar { .. } => CheckKind::Grammar,
            CheckCmd::Profanity { .. } => CheckKind::Profanity,
        }
    }
}

/// Events produced by the workers and drained by [`super::CheckerClient::pump`].
///
/// Result events always carry a value; `error` is set when the value is an
/// empty stand-in for a failed or superseded check.
#[derive(Debug)]
pub enum CheckEvent {
    /// The dictionary finished loading.
    SpellcheckerReady,
    /// The dictionary could not be loaded; spelling stays unavailable.
    SpellcheckerFailed { message: String },
    Spelling {
        id: RequestId,
        findings: Vec<Finding>,
        error: Option<String>,
    },
    Grammar {
        id: RequestId,
        findings: Vec<Finding>,
        error: Option<String>,
    },
    Profanity {
        id: RequestId,
        words: Vec<String>,
        error: Option<String>,
    },
}
