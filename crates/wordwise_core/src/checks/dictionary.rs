//! Hunspell-subset dictionary loading, lookup, and suggestions.
//!
//! Supported affix directives: `SET`, `TRY`, `FLAG`, `PFX`, `SFX`. Other
//! directives are ignored. Words are expanded eagerly at load time so each
//! lookup is one hash-set query.

use crate::constants::MAX_SUGGESTIONS;
use crate::error::CheckError;
use crate::models::Finding;
use crate::text::{capitalize, tokenize};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_TRY: &str = "esianrtolcdugmphbyfvkwzqjx'";
const EDITS2_MAX_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagMode {
    Char,
    Long,
    Num,
}

impl FlagMode {
    fn split(self, raw: &str) -> Vec<String> {
        match self {
            FlagMode::Char => raw.chars().map(String::from).collect(),
            FlagMode::Long => raw
                .chars()
                .collect::<Vec<_>>()
                .chunks(2)
                .map(|pair| pair.iter().collect())
                .collect(),
            FlagMode::Num => raw
                .split(',')
                .map(str::trim)
                .filter(|flag| !flag.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AffixKind {
    Prefix,
    Suffix,
}

#[derive(Debug)]
struct AffixRule {
    strip: String,
    add: String,
    condition: Option<Regex>,
}

impl AffixRule {
    fn apply(&self, kind: AffixKind, word: &str) -> Option<String> {
        if let Some(condition) = &self.condition {
            if !condition.is_match(word) {
                return None;
            }
        }
        match kind {
            AffixKind::Suffix => {
                let root = word.strip_suffix(self.strip.as_str())?;
                Some(format!("{root}{}", self.add))
            }
            AffixKind::Prefix => {
                let root = word.strip_prefix(self.strip.as_str())?;
                Some(format!("{}{root}", self.add))
            }
        }
    }
}

#[derive(Debug)]
struct AffixGroup {
    kind: AffixKind,
    cross_product: bool,
    expected: usize,
    rules: Vec<AffixRule>,
}

#[derive(Debug)]
struct AffixTable {
    flag_mode: FlagMode,
    try_chars: Vec<char>,
    groups: HashMap<String, AffixGroup>,
}

fn affix_error(line: usize, message: impl Into<String>) -> CheckError {
    CheckError::Affix {
        line,
        message: message.into(),
    }
}

fn empty_marker(value: &str) -> String {
    if value == "0" {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_affixes(aff: &str) -> Result<AffixTable, CheckError> {
    let mut table = AffixTable {
        flag_mode: FlagMode::Char,
        try_chars: DEFAULT_TRY.chars().collect(),
        groups: HashMap::new(),
    };

    for (index, raw_line) in aff.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields[0] {
            "FLAG" => {
                table.flag_mode = match fields.get(1).copied() {
                    Some("long") => FlagMode::Long,
                    Some("num") => FlagMode::Num,
                    Some("UTF-8") | None => FlagMode::Char,
                    Some(other) => {
                        return Err(affix_error(line_no, format!("unsupported FLAG mode {other}")))
                    }
                };
            }
            "TRY" => {
                if let Some(chars) = fields.get(1) {
                    let mut seen = HashSet::new();
                    table.try_chars = chars
                        .chars()
                        .filter(|c| !c.is_uppercase())
                        .filter(|c| seen.insert(*c))
                        .collect();
                }
            }
            "PFX" | "SFX" => {
                let kind = if fields[0] == "PFX" {
                    AffixKind::Prefix
                } else {
                    AffixKind::Suffix
                };
                let flag = fields
                    .get(1)
                    .ok_or_else(|| affix_error(line_no, "missing affix flag"))?
                    .to_string();
                let is_header = !table.groups.get(&flag).is_some_and(|group| {
                    group.kind == kind && group.rules.len() < group.expected
                });
                if is_header {
                    if fields.len() < 4 {
                        return Err(affix_error(line_no, "affix header needs 4 fields"));
                    }
                    let expected = fields[3]
                        .parse()
                        .map_err(|_| affix_error(line_no, "affix rule count is not a number"))?;
                    table.groups.insert(
                        flag,
                        AffixGroup {
                            kind,
                            cross_product: fields[2] == "Y",
                            expected,
                            rules: Vec::new(),
                        },
                    );
                    continue;
                }
                if fields.len() < 4 {
                    return Err(affix_error(line_no, "affix rule needs strip and add fields"));
                }
                let add = fields[3].split('/').next().unwrap_or_default();
                let condition = match fields.get(4).copied() {
                    None | Some(".") => None,
                    Some(cond) => {
                        let anchored = match kind {
                            AffixKind::Suffix => format!("{cond}$"),
                            AffixKind::Prefix => format!("^{cond}"),
                        };
                        Some(Regex::new(&anchored)?)
                    }
                };
                if let Some(group) = table.groups.get_mut(&flag) {
                    group.rules.push(AffixRule {
                        strip: empty_marker(fields[2]),
                        add: empty_marker(add),
                        condition,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(table)
}

/// Expanded word list with case-aware lookup and edit-distance suggestions.
#[derive(Debug, Default)]
pub struct SpellDictionary {
    words: HashSet<String>,
    try_chars: Vec<char>,
}

impl SpellDictionary {
    /// Build a dictionary from Hunspell `.aff` and `.dic` texts.
    ///
    /// # Errors
    /// Returns [`CheckError::Affix`] for malformed affix rules and
    /// [`CheckError::Dictionary`] when the word list is empty.
    pub fn from_hunspell(aff: &str, dic: &str) -> Result<Self, CheckError> {
        let table = parse_affixes(aff)?;
        let mut words = HashSet::new();

        for (index, raw_line) in dic.lines().enumerate() {
            let entry = raw_line.split_whitespace().next().unwrap_or_default();
            if entry.is_empty() || (index == 0 && entry.chars().all(|c| c.is_ascii_digit())) {
                continue;
            }
            let (stem, flags) = match entry.split_once('/') {
                Some((stem, flags)) => (stem, table.flag_mode.split(flags)),
                None => (entry, Vec::new()),
            };
            expand_entry(&table, stem, &flags, &mut words);
        }

        if words.is_empty() {
            return Err(CheckError::Dictionary("word list is empty".to_string()));
        }

        Ok(Self {
            words,
            try_chars: table.try_chars,
        })
    }

    /// Build a dictionary from plain words, without affix rules.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            try_chars: DEFAULT_TRY.chars().collect(),
        }
    }

    /// Number of expanded word forms.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// `true` when `word` is spelled correctly.
    ///
    /// Capitalized and all-caps forms of lowercase entries are accepted,
    /// hyphenated compounds are accepted when every part is, and words
    /// containing digits are never flagged.
    pub fn check(&self, word: &str) -> bool {
        let word = word.replace('’', "'");
        if word.is_empty() || word.chars().any(char::is_numeric) {
            return true;
        }
        if self.words.contains(word.as_str()) {
            return true;
        }
        let lower = word.to_lowercase();
        let mut chars = word.chars();
        let first_upper = chars.next().is_some_and(char::is_uppercase);
        let rest_lower = chars.clone().all(|c| !c.is_uppercase());
        let all_upper = word.chars().count() > 1 && word.chars().all(|c| !c.is_lowercase());

        if first_upper && rest_lower && self.words.contains(lower.as_str()) {
            return true;
        }
        if all_upper
            && (self.words.contains(lower.as_str()) || self.words.contains(capitalize(&lower).as_str()))
        {
            return true;
        }
        if word.contains('-') {
            let mut parts = word.split('-').filter(|part| !part.is_empty()).peekable();
            return parts.peek().is_some() && parts.all(|part| self.check(part));
        }
        false
    }

    /// Suggest up to [`MAX_SUGGESTIONS`] replacements, closest first.
    ///
    /// The capitalization of `word` is carried over to the suggestions.
    pub fn suggest(&self, word: &str) -> Vec<String> {
        if self.check(word) {
            return Vec::new();
        }
        let lower = word.replace('’', "'").to_lowercase();
        let mut ranked: Vec<(usize, String)> = Vec::new();
        let mut seen = HashSet::new();

        let first = self.edits(&lower);
        for candidate in &first {
            self.push_known(candidate, 1, &mut ranked, &mut seen);
        }
        if ranked.len() < MAX_SUGGESTIONS && lower.chars().count() <= EDITS2_MAX_LEN {
            for edit in &first {
                for candidate in self.edits(edit) {
                    self.push_known(&candidate, 2, &mut ranked, &mut seen);
                }
            }
        }

        let lead = lower.chars().next();
        let len = lower.chars().count();
        ranked.sort_by(|(da, a), (db, b)| {
            let key = |distance: &usize, candidate: &String| {
                (
                    *distance,
                    candidate.to_lowercase().chars().next() != lead,
                    candidate.chars().count().abs_diff(len),
                    candidate.clone(),
                )
            };
            key(da, a).cmp(&key(db, b))
        });

        ranked
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, candidate)| match_case(word, &candidate))
            .collect()
    }

    /// Spell-check every token of `text`.
    pub fn check_text(&self, text: &str) -> Vec<Finding> {
        tokenize(text)
            .into_iter()
            .filter(|token| !self.check(&token.word))
            .map(|token| {
                let suggestions = self.suggest(&token.word);
                Finding::spelling(token.word, token.start, token.length, suggestions)
            })
            .collect()
    }

    fn push_known(
        &self,
        candidate: &str,
        distance: usize,
        ranked: &mut Vec<(usize, String)>,
        seen: &mut HashSet<String>,
    ) {
        let known = if self.words.contains(candidate) {
            Some(candidate.to_string())
        } else {
            let proper = capitalize(candidate);
            self.words.contains(proper.as_str()).then_some(proper)
        };
        if let Some(known) = known {
            if seen.insert(known.clone()) {
                ranked.push((distance, known));
            }
        }
    }

    fn edits(&self, word: &str) -> HashSet<String> {
        let chars: Vec<char> = word.chars().collect();
        let mut out = HashSet::new();
        for i in 0..=chars.len() {
            let (left, right) = chars.split_at(i);
            if let Some((_, tail)) = right.split_first() {
                out.insert(left.iter().chain(tail).collect());
            }
            if right.len() > 1 {
                let mut swapped: Vec<char> = chars.clone();
                swapped.swap(i, i + 1);
                out.insert(swapped.into_iter().collect());
            }
            for &c in &self.try_chars {
                if let Some((_, tail)) = right.split_first() {
                    out.insert(left.iter().chain(std::iter::once(&c)).chain(tail).collect());
                }
                out.insert(left.iter().chain(std::iter::once(&c)).chain(right).collect());
            }
        }
        out.remove(word);
        out
    }
}

fn expand_entry(table: &AffixTable, stem: &str, flags: &[String], words: &mut HashSet<String>) {
    words.insert(stem.to_string());
    let groups: Vec<&AffixGroup> = flags.iter().filter_map(|flag| table.groups.get(flag)).collect();

    let mut cross_suffixed = Vec::new();
    for group in groups.iter().filter(|group| group.kind == AffixKind::Suffix) {
        for rule in &group.rules {
            if let Some(form) = rule.apply(AffixKind::Suffix, stem) {
                if group.cross_product {
                    cross_suffixed.push(form.clone());
                }
                words.insert(form);
            }
        }
    }

    for group in groups.iter().filter(|group| group.kind == AffixKind::Prefix) {
        for rule in &group.rules {
            if let Some(form) = rule.apply(AffixKind::Prefix, stem) {
                words.insert(form);
            }
            if group.cross_product {
                for suffixed in &cross_suffixed {
                    if let Some(form) = rule.apply(AffixKind::Prefix, suffixed) {
                        words.insert(form);
                    }
                }
            }
        }
    }
}

fn match_case(original: &str, candidate: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return candidate.to_uppercase();
    }
    if letters.first().is_some_and(|c| c.is_uppercase()) {
        let mut chars = candidate.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    candidate.to_string()
}

/// Where the spelling worker loads its dictionary from.
#[derive(Debug, Clone)]
pub enum DictionarySource {
    /// `.aff` and `.dic` files on disk.
    Files { aff: PathBuf, dic: PathBuf },
    /// Dictionary texts already held in memory.
    Inline { aff: String, dic: String },
}

impl DictionarySource {
    /// Read and parse the dictionary.
    ///
    /// # Errors
    /// Propagates file I/O and parse failures.
    pub fn load(&self) -> Result<SpellDictionary, CheckError> {
        match self {
            DictionarySource::Files { aff, dic } => {
                let aff_text = std::fs::read_to_string(aff)?;
                let dic_text = std::fs::read_to_string(dic)?;
                SpellDictionary::from_hunspell(&aff_text, &dic_text)
            }
            DictionarySource::Inline { aff, dic } => SpellDictionary::from_hunspell(aff, dic),
        }
    }
}

/// Spell checker readiness, owned by whichever thread performs checks.
#[derive(Debug, Default)]
pub enum SpellChecker {
    #[default]
    Loading,
    Ready(SpellDictionary),
    Unavailable(String),
}

impl SpellChecker {
    /// Load the dictionary and move to `Ready`, or to `Unavailable` on error.
    ///
    /// # Errors
    /// Returns the load failure after recording it in the state.
    pub fn initialize(&mut self, source: &DictionarySource) -> Result<(), CheckError> {
        match source.load() {
            Ok(dictionary) => {
                info!(
                    target: "wordwise_core::checks",
                    words = dictionary.len(),
                    "spell checker ready"
                );
                *self = SpellChecker::Ready(dictionary);
                Ok(())
            }
            Err(err) => {
                warn!(
                    target: "wordwise_core::checks",
                    error = %err,
                    "spell checker unavailable"
                );
                *self = SpellChecker::Unavailable(err.to_string());
                Err(err)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SpellChecker::Ready(_))
    }

    /// Check `text`, failing when the dictionary is not loaded.
    ///
    /// # Errors
    /// Returns [`CheckError::Dictionary`] unless the checker is ready.
    pub fn check_text(&self, text: &str) -> Result<Vec<Finding>, CheckError> {
        match self {
            SpellChecker::Ready(dictionary) => Ok(dictionary.check_text(text)),
            SpellChecker::Loading => Err(CheckError::Dictionary(
                "spell checker not initialized".to_string(),
            )),
            SpellChecker::Unavailable(reason) => Err(CheckError::Dictionary(reason.clone())),
        }
    }
}
