//! Authoritative store of current findings, keyed by [`FindingId`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Range;
use tracing::debug;
use wordwise_core::{CheckKind, Finding};

/// Stable handle for a stored finding. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FindingId(pub u64);

impl fmt::Display for FindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Lifecycle of a finding, traced on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingState {
    Discovered,
    Marked,
    Resolved,
    Invalidated,
    Superseded,
}

impl FindingState {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingState::Discovered => "discovered",
            FindingState::Marked => "marked",
            FindingState::Resolved => "resolved",
            FindingState::Invalidated => "invalidated",
            FindingState::Superseded => "superseded",
        }
    }
}

fn trace_transition(id: FindingId, finding: &Finding, state: FindingState) {
    debug!(
        target: "wordwise_editor::annotations",
        finding_id = %id,
        kind = finding.kind.as_str(),
        start = finding.start,
        length = finding.length,
        state = state.as_str(),
        "finding transition"
    );
}

#[derive(Debug, Default)]
pub struct AnnotationStore {
    next_id: u64,
    findings: BTreeMap<FindingId, Finding>,
    profanity: Vec<String>,
    markers: [Vec<(Range<usize>, FindingId)>; 3],
    revisions: [u64; 3],
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> FindingId {
        self.next_id += 1;
        FindingId(self.next_id)
    }

    fn bump(&mut self, kind: CheckKind) {
        let slot = &mut self.revisions[kind.index()];
        *slot = slot.wrapping_add(1);
    }

    /// Change counter for `kind`, bumped whenever its findings change.
    pub fn revision(&self, kind: CheckKind) -> u64 {
        self.revisions[kind.index()]
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count(&self, kind: CheckKind) -> usize {
        self.findings.values().filter(|f| f.kind == kind).count()
    }

    /// Swap every finding of `kind` for `findings`.
    ///
    /// Within the new set, entries sharing `(start, length)` collapse to the
    /// last one. Findings of other kinds are untouched.
    ///
    /// # Returns
    /// Ids of the stored findings in ascending start order.
    pub fn replace(&mut self, kind: CheckKind, findings: Vec<Finding>) -> Vec<FindingId> {
        let stale: Vec<FindingId> = self
            .findings
            .iter()
            .filter(|(_, finding)| finding.kind == kind)
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            if let Some(finding) = self.findings.remove(&id) {
                trace_transition(id, &finding, FindingState::Superseded);
            }
        }
        self.markers[kind.index()].clear();

        let mut unique: BTreeMap<(usize, usize), Finding> = BTreeMap::new();
        for mut finding in findings {
            finding.kind = kind;
            unique.insert((finding.start, finding.length), finding);
        }

        let mut ids = Vec::with_capacity(unique.len());
        for (_, finding) in unique {
            let id = self.allocate_id();
            trace_transition(id, &finding, FindingState::Discovered);
            self.findings.insert(id, finding);
            ids.push(id);
        }
        self.bump(kind);
        ids
    }

    /// Remove every finding whose span intersects `range`.
    ///
    /// # Returns
    /// The number of findings removed. Empty ranges remove nothing.
    pub fn invalidate_range(&mut self, range: Range<usize>) -> usize {
        let hit: Vec<FindingId> = self
            .findings
            .iter()
            .filter(|(_, finding)| finding.intersects(&range))
            .map(|(id, _)| *id)
            .collect();
        let mut touched = HashSet::new();
        for id in &hit {
            if let Some(finding) = self.findings.remove(id) {
                trace_transition(*id, &finding, FindingState::Invalidated);
                touched.insert(finding.kind);
            }
        }
        for kind in touched {
            self.bump(kind);
        }
        hit.len()
    }

    /// Account for a user edit replacing `range` with `inserted` chars.
    ///
    /// Findings touching the edit, including direct neighbours, are
    /// invalidated; findings after it shift by the length delta.
    ///
    /// # Returns
    /// The number of findings invalidated.
    pub fn apply_edit(&mut self, range: Range<usize>, inserted: usize) -> usize {
        let widened = range.start.saturating_sub(1)..range.end + 1;
        let invalidated = self.invalidate_range(widened);

        let removed = range.end.saturating_sub(range.start);
        if removed == inserted {
            return invalidated;
        }
        let mut touched = HashSet::new();
        for finding in self.findings.values_mut() {
            if finding.start >= range.end {
                finding.start = finding.start - removed + inserted;
                touched.insert(finding.kind);
            }
        }
        for kind in touched {
            self.bump(kind);
        }
        invalidated
    }

    /// Move recorded markers across a document edit replacing `edited` with
    /// `inserted` positions.
    ///
    /// Markers before the edit stay, markers after it shift, and markers
    /// overlapping it are dropped.
    pub fn remap_markers(&mut self, edited: Range<usize>, inserted: usize) {
        let removed = edited.end.saturating_sub(edited.start);
        for markers in &mut self.markers {
            markers.retain_mut(|(range, _)| {
                if range.end <= edited.start {
                    return true;
                }
                if range.start >= edited.end {
                    range.start = range.start - removed + inserted;
                    range.end = range.end - removed + inserted;
                    return true;
                }
                false
            });
        }
    }

    /// Remove a finding that has been resolved by an applied suggestion.
    pub fn remove(&mut self, id: FindingId) -> Option<Finding> {
        let finding = self.findings.remove(&id)?;
        trace_transition(id, &finding, FindingState::Resolved);
        self.bump(finding.kind);
        Some(finding)
    }

    pub fn get(&self, id: FindingId) -> Option<&Finding> {
        self.findings.get(&id)
    }

    /// Findings of `kind` ordered by start offset.
    pub fn findings(&self, kind: CheckKind) -> Vec<(FindingId, &Finding)> {
        let mut out: Vec<(FindingId, &Finding)> = self
            .findings
            .iter()
            .filter(|(_, finding)| finding.kind == kind)
            .map(|(id, finding)| (*id, finding))
            .collect();
        out.sort_by_key(|(id, finding)| (finding.start, finding.length, *id));
        out
    }

    /// Spelling suggestions currently known for `word`.
    pub fn suggestions_for(&self, word: &str) -> Vec<String> {
        self.findings
            .values()
            .find(|finding| finding.kind == CheckKind::Spelling && finding.text == word)
            .map(|finding| finding.suggestions.clone())
            .unwrap_or_default()
    }

    pub fn set_profanity(&mut self, words: Vec<String>) {
        if self.profanity != words {
            self.profanity = words;
            self.bump(CheckKind::Profanity);
        }
    }

    pub fn profanity_words(&self) -> &[String] {
        &self.profanity
    }

    /// Record which document ranges the renderer marked for `kind`.
    pub fn record_markers(&mut self, kind: CheckKind, markers: Vec<(Range<usize>, FindingId)>) {
        for (_, id) in &markers {
            if let Some(finding) = self.findings.get(id) {
                trace_transition(*id, finding, FindingState::Marked);
            }
        }
        self.markers[kind.index()] = markers;
    }

    /// Live finding whose marker covers document position `pos`.
    ///
    /// Overlapping markers resolve to the narrowest range.
    pub fn finding_at(&self, pos: usize) -> Option<FindingId> {
        self.markers
            .iter()
            .flatten()
            .filter(|(range, id)| range.start <= pos && pos < range.end && self.findings.contains_key(id))
            .min_by_key(|(range, _)| range.end - range.start)
            .map(|(_, id)| *id)
    }

    /// Drop all findings, markers, and profanity words.
    pub fn clear(&mut self) {
        self.findings.clear();
        self.profanity.clear();
        for markers in &mut self.markers {
            markers.clear();
        }
        for kind in CheckKind::ALL {
            self.bump(kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spelling(word: &str, start: usize) -> Finding {
        Finding::spelling(word, start, word.chars().count(), vec![format!("{word}!")])
    }

    fn grammar(start: usize, length: usize) -> Finding {
        Finding::grammar("message", start, length, Vec::new(), None)
    }

    fn spans(store: &AnnotationStore, kind: CheckKind) -> Vec<(usize, usize)> {
        store
            .findings(kind)
            .into_iter()
            .map(|(_, f)| (f.start, f.length))
            .collect()
    }

    #[test]
    fn replace_swaps_one_kind_and_deduplicates() {
        let mut store = AnnotationStore::new();
        store.replace(CheckKind::Grammar, vec![grammar(0, 4)]);
        store.replace(CheckKind::Spelling, vec![spelling("Ths", 0), spelling("tset", 9)]);

        let mut dup = spelling("Ths", 0);
        dup.suggestions = vec!["This".to_string()];
        let ids = store.replace(CheckKind::Spelling, vec![spelling("Ths", 0), dup]);

        assert_eq!(ids.len(), 1);
        assert_eq!(spans(&store, CheckKind::Spelling), vec![(0, 3)]);
        assert_eq!(store.get(ids[0]).map(|f| f.suggestions.clone()), Some(vec!["This".to_string()]));
        assert_eq!(spans(&store, CheckKind::Grammar), vec![(0, 4)]);
    }

    #[test]
    fn replace_with_same_set_is_idempotent_in_content() {
        let mut store = AnnotationStore::new();
        let set = vec![spelling("Ths", 0), spelling("tset", 9)];
        store.replace(CheckKind::Spelling, set.clone());
        let first = spans(&store, CheckKind::Spelling);
        store.replace(CheckKind::Spelling, set);
        assert_eq!(spans(&store, CheckKind::Spelling), first);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn invalidate_range_removes_intersecting_findings_only() {
        let mut store = AnnotationStore::new();
        store.replace(CheckKind::Spelling, vec![spelling("Ths", 0), spelling("tset", 9)]);
        store.replace(CheckKind::Grammar, vec![grammar(2, 5)]);

        assert_eq!(store.invalidate_range(4..4), 0);
        assert_eq!(store.invalidate_range(3..9), 1);
        assert_eq!(spans(&store, CheckKind::Spelling), vec![(0, 3), (9, 4)]);
        assert!(store.findings(CheckKind::Grammar).is_empty());
    }

    #[test]
    fn apply_edit_invalidates_neighbours_and_shifts_later_findings() {
        let mut store = AnnotationStore::new();
        store.replace(
            CheckKind::Spelling,
            vec![spelling("Ths", 0), spelling("wrd", 4), spelling("tset", 9)],
        );
        // Typing two chars right after "Ths".
        let invalidated = store.apply_edit(3..3, 2);
        assert_eq!(invalidated, 1);
        assert_eq!(spans(&store, CheckKind::Spelling), vec![(6, 3), (11, 4)]);

        // Deleting the char right after "wrd" touches it.
        assert_eq!(store.apply_edit(9..10, 0), 1);
        assert_eq!(spans(&store, CheckKind::Spelling), vec![(10, 4)]);
    }

    #[test]
    fn remove_and_revisions() {
        let mut store = AnnotationStore::new();
        let ids = store.replace(CheckKind::Spelling, vec![spelling("Ths", 0)]);
        let before = store.revision(CheckKind::Spelling);
        assert_eq!(store.remove(ids[0]).map(|f| f.text), Some("Ths".to_string()));
        assert!(store.revision(CheckKind::Spelling) > before);
        assert!(store.remove(ids[0]).is_none());
        assert_eq!(store.revision(CheckKind::Grammar), 0);
    }

    #[test]
    fn suggestions_for_reads_spelling_findings() {
        let mut store = AnnotationStore::new();
        store.replace(CheckKind::Spelling, vec![spelling("Ths", 0)]);
        assert_eq!(store.suggestions_for("Ths"), vec!["Ths!".to_string()]);
        assert!(store.suggestions_for("other").is_empty());
    }

    #[test]
    fn finding_at_prefers_narrowest_live_marker() {
        let mut store = AnnotationStore::new();
        let spelling_ids = store.replace(CheckKind::Spelling, vec![spelling("Ths", 0)]);
        let grammar_ids = store.replace(CheckKind::Grammar, vec![grammar(0, 8)]);
        store.record_markers(CheckKind::Spelling, vec![(1..4, spelling_ids[0])]);
        store.record_markers(CheckKind::Grammar, vec![(1..9, grammar_ids[0])]);

        assert_eq!(store.finding_at(2), Some(spelling_ids[0]));
        assert_eq!(store.finding_at(6), Some(grammar_ids[0]));
        assert_eq!(store.finding_at(9), None);

        store.remove(spelling_ids[0]);
        assert_eq!(store.finding_at(2), Some(grammar_ids[0]));
    }

    #[test]
    fn markers_follow_edits_before_the_next_render() {
        let mut store = AnnotationStore::new();
        // "a tset Ths": "tset" at text 2..6 (doc 3..7), "Ths" at 7..10 (doc 8..11).
        let ids = store.replace(CheckKind::Spelling, vec![spelling("tset", 2), spelling("Ths", 7)]);
        store.record_markers(CheckKind::Spelling, vec![(3..7, ids[0]), (8..11, ids[1])]);

        // Typing "xx " at doc position 2 (text offset 1).
        store.apply_edit(1..1, 3);
        store.remap_markers(2..2, 3);

        assert_eq!(store.finding_at(8), Some(ids[0]));
        assert_eq!(store.finding_at(12), Some(ids[1]));
        assert_eq!(store.finding_at(3), None);

        // Deleting inside "tset" drops its marker; "Ths" moves back.
        store.apply_edit(6..7, 0);
        store.remap_markers(7..8, 0);
        assert_eq!(store.finding_at(8), None);
        assert_eq!(store.finding_at(11), Some(ids[1]));
    }

    #[test]
    fn profanity_words_are_stored_separately() {
        let mut store = AnnotationStore::new();
        store.set_profanity(vec!["damn".to_string()]);
        let revision = store.revision(CheckKind::Profanity);
        store.set_profanity(vec!["damn".to_string()]);
        assert_eq!(store.revision(CheckKind::Profanity), revision);
        assert_eq!(store.profanity_words(), ["damn".to_string()]);
        assert!(store.is_empty());
    }
}
