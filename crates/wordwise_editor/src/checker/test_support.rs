//! Shared fixtures for checker and session tests.

use crossbeam_channel::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wordwise_core::checks::{DictionarySource, GrammarService};
use wordwise_core::{CheckError, Finding};

pub(crate) const TEST_AFF: &str = "SET UTF-8
TRY esianrtolcdugmphbyfvkwz'
SFX S Y 1
SFX S   0     s          .
";

pub(crate) const TEST_DIC: &str = "9
this
is
a
test/S
the
quick
brown
fox
damn
";

pub(crate) fn inline_dictionary() -> DictionarySource {
    DictionarySource::Inline {
        aff: TEST_AFF.to_string(),
        dic: TEST_DIC.to_string(),
    }
}

type Respond = Box<dyn Fn(&str) -> Vec<Finding> + Send + Sync>;

/// Grammar backend whose replies can be held until the test releases them.
pub(crate) struct GatedGrammar {
    gate: Option<Receiver<()>>,
    started_tx: Sender<()>,
    texts: Arc<Mutex<Vec<String>>>,
    respond: Respond,
    control: GrammarControl,
}

/// Test-side handle for a [`GatedGrammar`].
#[derive(Clone)]
pub(crate) struct GrammarControl {
    gate_tx: Sender<()>,
    started_rx: Receiver<()>,
    texts: Arc<Mutex<Vec<String>>>,
}

fn first_word_finding(text: &str) -> Vec<Finding> {
    let length = text.chars().take_while(|c| !c.is_whitespace()).count();
    vec![Finding::grammar("Possible style issue", 0, length, Vec::new(), None)]
}

impl GatedGrammar {
    /// Every check blocks until [`GrammarControl::release`] lets it through.
    pub(crate) fn new() -> Self {
        Self::build(true, Box::new(first_word_finding))
    }

    /// Checks answer immediately with `respond`.
    pub(crate) fn open(respond: impl Fn(&str) -> Vec<Finding> + Send + Sync + 'static) -> Self {
        Self::build(false, Box::new(respond))
    }

    /// Checks block on the gate and answer with `respond`.
    pub(crate) fn gated(respond: impl Fn(&str) -> Vec<Finding> + Send + Sync + 'static) -> Self {
        Self::build(true, Box::new(respond))
    }

    fn build(gated: bool, respond: Respond) -> Self {
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let (started_tx, started_rx) = crossbeam_channel::unbounded();
        let texts = Arc::new(Mutex::new(Vec::new()));
        Self {
            gate: gated.then_some(gate_rx),
            started_tx,
            texts: Arc::clone(&texts),
            respond,
            control: GrammarControl {
                gate_tx,
                started_rx,
                texts,
            },
        }
    }

    pub(crate) fn control(&self) -> GrammarControl {
        self.control.clone()
    }
}

impl GrammarService for GatedGrammar {
    fn check(&self, text: &str, _language: &str) -> Result<Vec<Finding>, CheckError> {
        let _ = self.started_tx.send(());
        if let Some(gate) = &self.gate {
            gate.recv_timeout(Duration::from_secs(5))
                .map_err(|_| CheckError::Malformed("gate never released".to_string()))?;
        }
        self.texts
            .lock()
            .expect("texts lock")
            .push(text.to_string());
        Ok((self.respond)(text))
    }
}

impl GrammarControl {
    pub(crate) fn wait_started(&self) {
        self.started_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("grammar check started");
    }

    pub(crate) fn release(&self, count: usize) {
        for _ in 0..count {
            self.gate_tx.send(()).expect("gate open");
        }
    }

    pub(crate) fn checked_texts(&self) -> Vec<String> {
        self.texts.lock().expect("texts lock").clone()
    }
}
