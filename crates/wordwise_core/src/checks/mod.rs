//! Checking backends: dictionary spelling, remote grammar, and the profanity list.

pub mod dictionary;
pub mod grammar;
pub mod profanity;

pub use dictionary::{DictionarySource, SpellChecker, SpellDictionary};
pub use grammar::{parse_response, DisabledGrammar, GrammarService, LanguageToolClient};
pub use profanity::ProfanityFilter;
