//! Data models shared by the checking pipeline and its collaborators.

pub mod finding;
pub mod history;

pub use finding::{CheckKind, Finding, GrammarRule, Token};
pub use history::{HistoryItem, HistoryUpdate};
