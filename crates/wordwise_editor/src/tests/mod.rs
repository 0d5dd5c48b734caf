//! End-to-end session tests against real worker threads.

use crate::checker::test_support::{inline_dictionary, GatedGrammar};
use crate::checker::{CheckerClient, CheckerServices};
use crate::session::{EditorOptions, EditorSession};
use std::time::{Duration, Instant};
use wordwise_core::checks::ProfanityFilter;
use wordwise_core::{CheckKind, Finding};

mod scenarios;

const WAIT: Duration = Duration::from_secs(2);

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn fast_options() -> EditorOptions {
    EditorOptions {
        spelling_delay: ms(10),
        grammar_delay: ms(20),
        profanity_delay: ms(10),
        revalidate_delay: ms(5),
        ..EditorOptions::default()
    }
}

fn session_with(grammar: GatedGrammar) -> EditorSession {
    let mut client = CheckerClient::spawn(CheckerServices::new(
        inline_dictionary(),
        Box::new(grammar),
        ProfanityFilter::default(),
    ));
    assert!(client.wait_until_spelling_settled(WAIT));
    EditorSession::new(client, fast_options())
}

fn quiet_session() -> EditorSession {
    session_with(GatedGrammar::open(|_| Vec::new()))
}

fn settle(session: &mut EditorSession) {
    assert!(session.run_until_idle(WAIT), "session never went idle");
}

/// Tick until a check of `kind` has been dispatched.
fn tick_until_dispatched(session: &mut EditorSession, kind: CheckKind) {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        let report = session.tick(Instant::now());
        if report.dispatched.iter().any(|(fired, _)| *fired == kind) {
            return;
        }
        std::thread::sleep(ms(2));
    }
    panic!("{} check never dispatched", kind);
}

fn grammar_at(start: usize, length: usize, replacement: &str) -> Finding {
    Finding::grammar(
        "Possible agreement error",
        start,
        length,
        vec![replacement.to_string()],
        None,
    )
}
