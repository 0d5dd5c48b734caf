//! Marker reconciliation between the annotation store and the document.

use crate::annotations::{AnnotationStore, FindingId};
use crate::document::{Document, Mark, TextCoords};
use std::ops::Range;
use tracing::{debug, trace};
use wordwise_core::CheckKind;

/// Outcome of one reconcile pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub cleared: usize,
    pub applied: usize,
    pub skipped: usize,
}

/// Make the document's marks of `kind` mirror the store.
///
/// All marks of `kind` are removed before any are reapplied, so running this
/// twice with an unchanged store leaves the same mark set. Findings whose span
/// no longer translates into the document are skipped.
pub fn reconcile(doc: &mut Document, store: &mut AnnotationStore, kind: CheckKind) -> RenderReport {
    let mut report = RenderReport {
        cleared: doc.remove_marks(kind),
        ..RenderReport::default()
    };
    if !kind.is_positional() {
        store.record_markers(kind, Vec::new());
        return report;
    }

    let coords = TextCoords::new(doc);
    let size = doc.size();
    let planned: Vec<(FindingId, Option<Range<usize>>, String)> = store
        .findings(kind)
        .into_iter()
        .map(|(id, finding)| {
            (
                id,
                coords.text_range_to_doc(finding.span()),
                finding.text.clone(),
            )
        })
        .collect();

    let mut markers = Vec::with_capacity(planned.len());
    for (id, range, label) in planned {
        let Some(range) = range.filter(|range| range.start < range.end && range.end <= size) else {
            trace!(
                target: "wordwise_editor::render",
                kind = kind.as_str(),
                finding_id = %id,
                "finding span no longer maps into the document; skipped"
            );
            report.skipped += 1;
            continue;
        };
        let mark = Mark {
            kind,
            range: range.clone(),
            label,
            finding: id,
        };
        match doc.add_mark(mark) {
            Ok(()) => {
                markers.push((range, id));
                report.applied += 1;
            }
            Err(err) => {
                trace!(
                    target: "wordwise_editor::render",
                    kind = kind.as_str(),
                    finding_id = %id,
                    error = %err,
                    "mark rejected; skipped"
                );
                report.skipped += 1;
            }
        }
    }
    store.record_markers(kind, markers);

    debug!(
        target: "wordwise_editor::render",
        kind = kind.as_str(),
        cleared = report.cleared,
        applied = report.applied,
        skipped = report.skipped,
        "markers reconciled"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;
    use wordwise_core::Finding;

    fn setup() -> (Document, AnnotationStore) {
        let doc = Document::new(vec![Block::paragraph("Ths is"), Block::paragraph("a tset")]);
        let mut store = AnnotationStore::new();
        store.replace(
            CheckKind::Spelling,
            vec![
                Finding::spelling("Ths", 0, 3, vec!["This".to_string()]),
                Finding::spelling("tset", 10, 4, vec!["test".to_string()]),
            ],
        );
        (doc, store)
    }

    fn mark_ranges(doc: &Document, kind: CheckKind) -> Vec<Range<usize>> {
        let mut ranges: Vec<_> = doc.marks_of(kind).map(|mark| mark.range.clone()).collect();
        ranges.sort_by_key(|range| range.start);
        ranges
    }

    #[test]
    fn reconcile_marks_every_translatable_finding() {
        let (mut doc, mut store) = setup();
        let report = reconcile(&mut doc, &mut store, CheckKind::Spelling);
        assert_eq!(report, RenderReport { cleared: 0, applied: 2, skipped: 0 });
        assert_eq!(mark_ranges(&doc, CheckKind::Spelling), vec![1..4, 11..15]);
        assert_eq!(doc.text_between(11..15).as_deref(), Some("tset"));
        assert_eq!(doc.marks()[0].label, "Ths");
    }

    #[test]
    fn reconcile_is_idempotent() {
        let (mut doc, mut store) = setup();
        reconcile(&mut doc, &mut store, CheckKind::Spelling);
        let first = doc.marks().to_vec();
        let report = reconcile(&mut doc, &mut store, CheckKind::Spelling);
        assert_eq!(report.cleared, 2);
        assert_eq!(report.applied, 2);
        assert_eq!(doc.marks().to_vec(), first);
    }

    #[test]
    fn reconcile_clears_marks_of_removed_findings_and_leaves_other_kinds() {
        let (mut doc, mut store) = setup();
        store.replace(
            CheckKind::Grammar,
            vec![Finding::grammar("Agreement", 4, 2, Vec::new(), None)],
        );
        reconcile(&mut doc, &mut store, CheckKind::Spelling);
        reconcile(&mut doc, &mut store, CheckKind::Grammar);

        store.replace(CheckKind::Spelling, Vec::new());
        let report = reconcile(&mut doc, &mut store, CheckKind::Spelling);
        assert_eq!(report.cleared, 2);
        assert!(doc.marks_of(CheckKind::Spelling).next().is_none());
        assert_eq!(mark_ranges(&doc, CheckKind::Grammar), vec![5..7]);
    }

    #[test]
    fn reconcile_skips_spans_past_the_document() {
        let (mut doc, mut store) = setup();
        store.replace(
            CheckKind::Spelling,
            vec![
                Finding::spelling("Ths", 0, 3, Vec::new()),
                Finding::spelling("gone", 40, 4, Vec::new()),
                Finding::spelling("", 5, 0, Vec::new()),
            ],
        );
        let report = reconcile(&mut doc, &mut store, CheckKind::Spelling);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn profanity_is_never_marked() {
        let (mut doc, mut store) = setup();
        store.set_profanity(vec!["damn".to_string()]);
        let report = reconcile(&mut doc, &mut store, CheckKind::Profanity);
        assert_eq!(report, RenderReport::default());
        assert!(doc.marks().is_empty());
    }

    #[test]
    fn rendered_markers_answer_clicks() {
        let (mut doc, mut store) = setup();
        reconcile(&mut doc, &mut store, CheckKind::Spelling);
        let id = store.finding_at(12).expect("finding under click");
        assert_eq!(store.get(id).map(|f| f.text.as_str()), Some("tset"));
        assert_eq!(store.finding_at(6), None);
    }
}
