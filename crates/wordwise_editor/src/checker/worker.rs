//! Checker worker threads.
//!
//! Spelling and profanity share one thread that owns the loaded dictionary.
//! Grammar runs on its own thread so service latency never delays spelling.

use super::protocol::{CheckCmd, CheckEvent, RequestId};
use crossbeam_channel::{Receiver, Sender};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use wordwise_core::checks::{
    DictionarySource, DisabledGrammar, GrammarService, LanguageToolClient, ProfanityFilter,
    SpellChecker,
};
use wordwise_core::{env_flag_enabled, CheckError, Config};

/// Error attached to grammar requests dropped in favour of a newer snapshot.
pub const SUPERSEDED: &str = "superseded";

/// Backends moved into the worker threads.
pub struct CheckerServices {
    pub dictionary: DictionarySource,
    pub grammar: Box<dyn GrammarService>,
    pub profanity: ProfanityFilter,
}

impl CheckerServices {
    pub fn new(
        dictionary: DictionarySource,
        grammar: Box<dyn GrammarService>,
        profanity: ProfanityFilter,
    ) -> Self {
        Self {
            dictionary,
            grammar,
            profanity,
        }
    }

    /// Build the default backends described by `config`.
    ///
    /// # Errors
    /// Returns [`CheckError`] when the profanity list cannot be read or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, CheckError> {
        let grammar: Box<dyn GrammarService> = if config.grammar_enabled {
            Box::new(LanguageToolClient::new(
                config.grammar_url.clone(),
                Duration::from_secs(config.grammar_timeout_secs),
            )?)
        } else {
            Box::new(DisabledGrammar)
        };
        let profanity = match &config.profanity_list {
            Some(path) => ProfanityFilter::from_file(path)?,
            None => ProfanityFilter::default(),
        };
        Ok(Self::new(
            DictionarySource::Files {
                aff: config.aff_path.clone(),
                dic: config.dic_path.clone(),
            },
            grammar,
            profanity,
        ))
    }
}

/// Channel endpoints and join handles for the running workers.
pub struct CheckerHandle {
    text_tx: Sender<CheckCmd>,
    grammar_tx: Sender<CheckCmd>,
    pub evt_rx: Receiver<CheckEvent>,
    threads: Vec<JoinHandle<()>>,
}

impl CheckerHandle {
    /// Route a command to the thread that serves its kind.
    ///
    /// # Errors
    /// Returns the command back when that worker has exited.
    pub fn send(&self, cmd: CheckCmd) -> Result<(), CheckCmd> {
        let tx = match cmd {
            CheckCmd::Grammar { .. } => &self.grammar_tx,
            CheckCmd::Spelling { .. } | CheckCmd::Profanity { .. } => &self.text_tx,
        };
        tx.send(cmd).map_err(|err| err.into_inner())
    }

    /// Close the command channels and wait up to `timeout` for the threads to exit.
    ///
    /// # Returns
    /// `true` when every thread exited in time. Threads still running are detached.
    pub fn shutdown_and_join(self, timeout: Duration) -> bool {
        let CheckerHandle {
            text_tx,
            grammar_tx,
            evt_rx: _,
            threads,
        } = self;
        drop(text_tx);
        drop(grammar_tx);

        let deadline = Instant::now() + timeout;
        let mut all_joined = true;
        for handle in threads {
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            if handle.is_finished() {
                if handle.join().is_err() {
                    warn!(target: "wordwise_editor::checker", "checker worker panicked");
                }
            } else {
                let name = handle.thread().name().unwrap_or("checker").to_string();
                warn!(
                    target: "wordwise_editor::checker",
                    thread = name.as_str(),
                    timeout_ms = timeout.as_millis() as u64,
                    "checker worker did not exit before timeout; detaching"
                );
                all_joined = false;
            }
        }
        all_joined
    }
}

fn trace_pass(enabled: bool, kind: &str, id: RequestId, text_len: usize, started: Instant) {
    if !enabled {
        return;
    }
    let elapsed_ms = started.elapsed().as_secs_f32() * 1000.0;
    info!(
        target: "wordwise_editor::checker",
        event = "worker_done",
        kind = kind,
        request_id = %id,
        text_len = text_len,
        elapsed_ms = elapsed_ms,
        "checker worker pass"
    );
}

/// Spawn the spelling/profanity and grammar worker threads.
///
/// # Errors
/// Returns the OS error when a thread cannot be spawned.
pub fn spawn_checker(services: CheckerServices) -> io::Result<CheckerHandle> {
    let CheckerServices {
        dictionary,
        grammar,
        profanity,
    } = services;
    let (text_tx, text_rx) = crossbeam_channel::unbounded();
    let (grammar_tx, grammar_rx) = crossbeam_channel::unbounded();
    let (evt_tx, evt_rx) = crossbeam_channel::unbounded();
    let trace_enabled = env_flag_enabled("WORDWISE_CHECK_TRACE");

    let text_evt_tx = evt_tx.clone();
    let text_thread = thread::Builder::new()
        .name("wordwise-spelling".to_string())
        .spawn(move || run_text_worker(dictionary, profanity, text_rx, text_evt_tx, trace_enabled))?;

    let grammar_thread = thread::Builder::new()
        .name("wordwise-grammar".to_string())
        .spawn(move || run_grammar_worker(grammar, grammar_rx, evt_tx, trace_enabled))?;

    Ok(CheckerHandle {
        text_tx,
        grammar_tx,
        evt_rx,
        threads: vec![text_thread, grammar_thread],
    })
}

fn run_text_worker(
    dictionary: DictionarySource,
    profanity: ProfanityFilter,
    rx: Receiver<CheckCmd>,
    tx: Sender<CheckEvent>,
    trace_enabled: bool,
) {
    let mut speller = SpellChecker::default();
    let ready_event = match speller.initialize(&dictionary) {
        Ok(()) => CheckEvent::SpellcheckerReady,
        Err(err) => CheckEvent::SpellcheckerFailed {
            message: err.to_string(),
        },
    };
    if tx.send(ready_event).is_err() {
        return;
    }

    for cmd in rx.iter() {
        let started = Instant::now();
        let event = match cmd {
            CheckCmd::Spelling { id, text } => {
                let event = match speller.check_text(&text) {
                    Ok(findings) => CheckEvent::Spelling {
                        id,
                        findings,
                        error: None,
                    },
                    Err(err) => {
                        warn!(
                            target: "wordwise_editor::checker",
                            kind = "spelling",
                            request_id = %id,
                            error = %err,
                            "spell check failed"
                        );
                        CheckEvent::Spelling {
                            id,
                            findings: Vec::new(),
                            error: Some(err.to_string()),
                        }
                    }
                };
                trace_pass(trace_enabled, "spelling", id, text.len(), started);
                event
            }
            CheckCmd::Profanity { id, text } => {
                let words = profanity.flagged_words(&text);
                trace_pass(trace_enabled, "profanity", id, text.len(), started);
                CheckEvent::Profanity {
                    id,
                    words,
                    error: None,
                }
            }
            CheckCmd::Grammar { id, .. } => CheckEvent::Grammar {
                id,
                findings: Vec::new(),
                error: Some("grammar requests are served by the grammar worker".to_string()),
            },
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}

fn run_grammar_worker(
    grammar: Box<dyn GrammarService>,
    rx: Receiver<CheckCmd>,
    tx: Sender<CheckEvent>,
    trace_enabled: bool,
) {
    for cmd in rx.iter() {
        let mut latest = cmd;
        // Coalesce backlog bursts; only the newest snapshot is worth a round trip.
        while let Ok(next) = rx.try_recv() {
            let superseded = CheckEvent::Grammar {
                id: latest.id(),
                findings: Vec::new(),
                error: Some(SUPERSEDED.to_string()),
            };
            if tx.send(superseded).is_err() {
                return;
            }
            latest = next;
        }

        let (id, text, language) = match latest {
            CheckCmd::Grammar { id, text, language } => (id, text, language),
            other => {
                let _ = tx.send(CheckEvent::Grammar {
                    id: other.id(),
                    findings: Vec::new(),
                    error: Some("unexpected command for the grammar worker".to_string()),
                });
                continue;
            }
        };

        let started = Instant::now();
        let event = match grammar.check(&text, &language) {
            Ok(findings) => CheckEvent::Grammar {
                id,
                findings,
                error: None,
            },
            Err(err) => {
                warn!(
                    target: "wordwise_editor::checker",
                    kind = "grammar",
                    request_id = %id,
                    error = %err,
                    "grammar check failed"
                );
                CheckEvent::Grammar {
                    id,
                    findings: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };
        trace_pass(trace_enabled, "grammar", id, text.len(), started);
        if tx.send(event).is_err() {
            break;
        }
    }
}
