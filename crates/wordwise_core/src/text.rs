//! Tokenization and text normalization helpers.
//!
//! All offsets produced here count chars, matching the editor's position
//! model; regex byte offsets are converted before they leave this module.

use crate::models::Token;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}\p{N}'’-]+").expect("valid word pattern"))
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bhttps?://\S+").expect("valid url pattern"))
}

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '’' | '-')
}

/// Converts ascending byte offsets into char offsets in one forward pass.
struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn advance_to(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            return byte_to_char_offset(self.text, byte);
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// Split `text` into checkable word tokens.
///
/// Words are runs of letters, digits, apostrophes, and hyphens. URL-like
/// chunks and purely numeric words are never emitted. Leading and trailing
/// apostrophes/hyphens are stripped, and `start`/`length` describe the
/// stripped word as found at its match position.
pub fn tokenize(text: &str) -> Vec<Token> {
    let urls: Vec<Range<usize>> = url_pattern().find_iter(text).map(|m| m.range()).collect();
    let mut cursor = CharCursor::new(text);
    let mut tokens = Vec::new();

    for found in word_pattern().find_iter(text) {
        let in_url = urls
            .iter()
            .any(|url| found.start() < url.end && url.start < found.end());
        if in_url {
            continue;
        }

        let raw = found.as_str();
        let stripped = raw.trim_matches(is_joiner);
        if stripped.is_empty() || stripped.chars().all(|c| c.is_numeric() || is_joiner(c)) {
            continue;
        }

        let leading = raw.len() - raw.trim_start_matches(is_joiner).len();
        let start = cursor.advance_to(found.start() + leading);
        tokens.push(Token {
            word: stripped.to_string(),
            start,
            length: stripped.chars().count(),
        });
    }

    tokens
}

/// Convert a byte offset into a char offset, clamping past the end.
pub fn byte_to_char_offset(text: &str, byte: usize) -> usize {
    let mut clamped = byte.min(text.len());
    while !text.is_char_boundary(clamped) {
        clamped -= 1;
    }
    text[..clamped].chars().count()
}

/// Convert a UTF-16 code unit offset into a char offset.
///
/// Offsets that land inside a surrogate pair resolve to the char containing
/// them; offsets past the end clamp to the char length.
pub fn utf16_to_char_offset(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (index, c) in text.chars().enumerate() {
        if units >= utf16 {
            return index;
        }
        units += c.len_utf16();
        if units > utf16 {
            return index;
        }
    }
    text.chars().count()
}

/// Normalize a replacement before it is written into a document.
///
/// Newlines and tabs are dropped, interior whitespace runs collapse to one
/// space, and the result is trimmed.
pub fn normalize_replacement(value: &str) -> String {
    value
        .split(|c: char| c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase `word` and uppercase its first char ("tHIS" becomes "This").
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
