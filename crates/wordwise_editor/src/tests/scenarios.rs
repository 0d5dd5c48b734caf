use super::*;
use crate::export::{ExportError, ExportStatus};

#[test]
fn misspelling_is_marked_and_fixed_by_its_suggestion() {
    let mut session = quiet_session();
    session.open("Ths is a test.", Instant::now());
    settle(&mut session);

    let spelling = session.spelling_findings();
    assert_eq!(spelling.len(), 1);
    let (id, finding) = &spelling[0];
    assert_eq!(finding.text, "Ths");
    assert_eq!((finding.start, finding.length), (0, 3));
    assert!(finding.suggestions.contains(&"This".to_string()));

    let doc = session.document().expect("open document");
    let ranges: Vec<_> = doc
        .marks_of(CheckKind::Spelling)
        .map(|mark| mark.range.clone())
        .collect();
    assert_eq!(ranges, vec![1..4]);
    assert_eq!(session.finding_at(2).map(|(hit, _)| hit), Some(*id));

    let applied = session
        .apply_suggestion(*id, "This", Instant::now())
        .expect("suggestion applied");
    assert_eq!(applied.range, 1..4);
    assert_eq!(applied.replacement, "This");
    assert_eq!(session.text().as_deref(), Some("This is a test."));

    settle(&mut session);
    assert!(session.spelling_findings().is_empty());
    assert_eq!(session.export_status(), ExportStatus::Ready);
}

#[test]
fn words_inside_urls_are_not_flagged() {
    let mut session = quiet_session();
    session.open("this is https://exampel.com/tset a test", Instant::now());
    settle(&mut session);
    assert!(session.spelling_findings().is_empty());
}

#[test]
fn grammar_suggestion_replaces_span_and_clears_its_mark() {
    let mut session = session_with(GatedGrammar::open(|text| {
        if text.contains("This be") {
            vec![grammar_at(5, 2, "is")]
        } else {
            Vec::new()
        }
    }));
    session.open("This be a test.", Instant::now());
    settle(&mut session);

    let grammar = session.grammar_findings();
    assert_eq!(grammar.len(), 1);
    let (id, finding) = grammar[0].clone();
    assert_eq!((finding.start, finding.length), (5, 2));
    let doc = session.document().expect("open document");
    assert_eq!(
        doc.marks_of(CheckKind::Grammar)
            .map(|mark| mark.range.clone())
            .collect::<Vec<_>>(),
        vec![6..8]
    );

    let applied = session
        .apply_suggestion(id, "is", Instant::now())
        .expect("suggestion applied");
    assert_eq!(applied.range, 6..8);
    assert_eq!(session.text().as_deref(), Some("This is a test."));
    let doc = session.document().expect("open document");
    assert!(doc.marks_of(CheckKind::Grammar).next().is_none());

    settle(&mut session);
    assert!(session.grammar_findings().is_empty());
    assert!(session.export_status().is_ready());
}

#[test]
fn profanity_blocks_export_until_removed() {
    let mut session = quiet_session();
    session.open("this is a damn test", Instant::now());
    settle(&mut session);

    assert_eq!(session.profanity_words(), ["damn".to_string()]);
    let status = session.export_status();
    assert!(!status.is_ready());
    assert_eq!(status.profane_words(), ["damn".to_string()]);

    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("draft.md");
    match session.export_to(&path) {
        Err(ExportError::Blocked(blocked)) => {
            assert_eq!(blocked.to_string(), "cannot export while 1 issue remains (flagged words: damn)");
        }
        other => panic!("expected blocked export, got {:?}", other),
    }
    assert!(!path.exists());

    // "damn " occupies text offsets 10..15, document positions 11..16.
    session
        .delete_range(11..16, Instant::now())
        .expect("delete profanity");
    assert_eq!(session.text().as_deref(), Some("this is a test"));
    settle(&mut session);

    assert!(session.profanity_words().is_empty());
    assert_eq!(session.export_to(&path).expect("export"), 1);
    assert_eq!(
        std::fs::read_to_string(&path).expect("read export"),
        "this is a test\n"
    );
}

#[test]
fn findings_follow_edits_before_the_next_check() {
    let mut session = quiet_session();
    session.open("a test tset", Instant::now());
    settle(&mut session);
    let before = session.spelling_findings();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].1.start, 7);

    // Insert at the very start; the finding shifts without being rechecked yet.
    session.insert_text(1, "this is ", Instant::now()).expect("insert");
    let shifted = session.spelling_findings();
    assert_eq!(shifted.len(), 1);
    assert_eq!(shifted[0].1.start, 15);

    session.tick(Instant::now());
    let doc = session.document().expect("open document");
    assert_eq!(doc.text_between(16..20).as_deref(), Some("tset"));
    assert_eq!(
        doc.marks_of(CheckKind::Spelling)
            .map(|mark| mark.range.clone())
            .collect::<Vec<_>>(),
        vec![16..20]
    );

    settle(&mut session);
    assert_eq!(session.spelling_findings().len(), 1);
}

#[test]
fn click_lookup_follows_edits_before_the_next_tick() {
    let mut session = quiet_session();
    session.open("a tset Ths", Instant::now());
    settle(&mut session);
    assert_eq!(session.finding_at(4).map(|(_, f)| f.text.as_str()), Some("tset"));

    // "a|" -> "axx |": both words move right by three positions.
    session.insert_text(2, "xx ", Instant::now()).expect("insert");
    assert_eq!(session.finding_at(8).map(|(_, f)| f.text.as_str()), Some("tset"));
    assert_eq!(session.finding_at(12).map(|(_, f)| f.text.as_str()), Some("Ths"));
    assert!(session.finding_at(3).is_none());

    // Typing inside "tset" leaves nothing to click there.
    session.insert_text(8, "e", Instant::now()).expect("insert");
    assert!(session.finding_at(8).is_none());
    assert_eq!(session.finding_at(13).map(|(_, f)| f.text.as_str()), Some("Ths"));
}

#[test]
fn typing_inside_a_finding_invalidates_it() {
    let mut session = quiet_session();
    session.open("Ths is a test", Instant::now());
    settle(&mut session);
    assert_eq!(session.spelling_findings().len(), 1);

    // "Th|s" -> "This"
    session.insert_text(3, "i", Instant::now()).expect("insert");
    assert!(session.spelling_findings().is_empty());
    session.tick(Instant::now());
    let doc = session.document().expect("open document");
    assert!(doc.marks_of(CheckKind::Spelling).next().is_none());

    settle(&mut session);
    assert!(session.spelling_findings().is_empty());
}

#[test]
fn multi_block_positions_skip_separators() {
    let mut session = quiet_session();
    session.open("# A tset\n\nthis is Ths", Instant::now());
    settle(&mut session);

    let words: Vec<(String, usize)> = session
        .spelling_findings()
        .into_iter()
        .map(|(_, finding)| (finding.text, finding.start))
        .collect();
    assert_eq!(words, vec![("tset".to_string(), 2), ("Ths".to_string(), 16)]);

    let doc = session.document().expect("open document");
    assert_eq!(doc.text_between(3..7).as_deref(), Some("tset"));
    assert_eq!(doc.text_between(17..20).as_deref(), Some("Ths"));
    let (_, hit) = session.finding_at(18).expect("finding in second block");
    assert_eq!(hit.text, "Ths");
}
