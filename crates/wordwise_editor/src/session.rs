//! Editor session: the single-threaded orchestrator driven by [`EditorSession::tick`].
//!
//! Edits restart the debounce timers; fired timers dispatch plain-text
//! snapshots to the checker client; replies are applied only when their
//! generation is current and the document has not changed since dispatch;
//! changed kinds are reconciled into document marks.

use crate::annotations::{AnnotationStore, FindingId};
use crate::checker::{CheckReply, CheckerClient, PendingCheck, RequestId};
use crate::document::{extract_text, Document, DocumentError, TextCoords};
use crate::export::{
    export_readiness, paginate, write_export, ExportError, ExportStatus, DEFAULT_LINES_PER_PAGE,
};
use crate::render::{reconcile, RenderReport};
use crate::scheduler::{CheckScheduler, Generation};
use std::ops::Range;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wordwise_core::constants::{
    DEFAULT_GRAMMAR_DEBOUNCE_MS, DEFAULT_LANGUAGE, DEFAULT_PROFANITY_DEBOUNCE_MS,
    DEFAULT_REVALIDATE_MS, DEFAULT_SPELL_DEBOUNCE_MS,
};
use wordwise_core::text::normalize_replacement;
use wordwise_core::{CheckKind, Config, Finding};

/// Tunables for an [`EditorSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub language: String,
    pub spelling_delay: Duration,
    pub grammar_delay: Duration,
    pub profanity_delay: Duration,
    /// Delay before re-checking a kind after one of its suggestions is applied.
    pub revalidate_delay: Duration,
    pub lines_per_page: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            spelling_delay: Duration::from_millis(DEFAULT_SPELL_DEBOUNCE_MS),
            grammar_delay: Duration::from_millis(DEFAULT_GRAMMAR_DEBOUNCE_MS),
            profanity_delay: Duration::from_millis(DEFAULT_PROFANITY_DEBOUNCE_MS),
            revalidate_delay: Duration::from_millis(DEFAULT_REVALIDATE_MS),
            lines_per_page: DEFAULT_LINES_PER_PAGE,
        }
    }
}

impl EditorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.language.clone(),
            spelling_delay: Duration::from_millis(config.spell_debounce_ms),
            grammar_delay: Duration::from_millis(config.grammar_debounce_ms),
            profanity_delay: Duration::from_millis(config.profanity_debounce_ms),
            revalidate_delay: Duration::from_millis(config.revalidate_ms),
            ..Self::default()
        }
    }
}

/// What one [`EditorSession::tick`] did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Worker events drained from the client.
    pub events: usize,
    pub dispatched: Vec<(CheckKind, Generation)>,
    pub applied: Vec<CheckKind>,
    /// Kinds whose reply carried an error; their previous findings were kept.
    pub failed: Vec<CheckKind>,
    /// Replies dropped because a newer check or an edit made them stale.
    pub discarded: usize,
    pub rendered: Vec<(CheckKind, RenderReport)>,
}

/// Result of a successfully applied suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSuggestion {
    pub finding: Finding,
    /// Document range that was replaced.
    pub range: Range<usize>,
    /// The normalized text written into the document.
    pub replacement: String,
}

enum PendingValue {
    Findings(PendingCheck<Vec<Finding>>),
    Words(PendingCheck<Vec<String>>),
}

enum Reply {
    Findings(CheckReply<Vec<Finding>>),
    Words(CheckReply<Vec<String>>),
}

impl Reply {
    fn error(&self) -> Option<&str> {
        match self {
            Reply::Findings(reply) => reply.error.as_deref(),
            Reply::Words(reply) => reply.error.as_deref(),
        }
    }
}

struct InFlight {
    generation: Generation,
    revision: u64,
    pending: PendingValue,
}

impl InFlight {
    fn request_id(&self) -> RequestId {
        match &self.pending {
            PendingValue::Findings(pending) => pending.id(),
            PendingValue::Words(pending) => pending.id(),
        }
    }

    fn try_take(&self) -> Option<Reply> {
        match &self.pending {
            PendingValue::Findings(pending) => pending.try_take().map(Reply::Findings),
            PendingValue::Words(pending) => pending.try_take().map(Reply::Words),
        }
    }
}

pub struct EditorSession {
    doc: Option<Document>,
    store: AnnotationStore,
    scheduler: CheckScheduler,
    client: CheckerClient,
    options: EditorOptions,
    in_flight: [Option<InFlight>; 3],
    rendered: [Option<u64>; 3],
    spelling_ready_seen: bool,
}

impl EditorSession {
    pub fn new(client: CheckerClient, options: EditorOptions) -> Self {
        let scheduler = CheckScheduler::new(
            options.spelling_delay,
            options.grammar_delay,
            options.profanity_delay,
        );
        Self {
            doc: None,
            store: AnnotationStore::new(),
            scheduler,
            client,
            options,
            in_flight: [None, None, None],
            rendered: [None; 3],
            spelling_ready_seen: false,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn document(&self) -> Option<&Document> {
        self.doc.as_ref()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn client(&self) -> &CheckerClient {
        &self.client
    }

    /// Plain-text projection of the open document.
    pub fn text(&self) -> Option<String> {
        self.doc.as_ref().map(extract_text)
    }

    /// Load a markdown seed and schedule every check.
    pub fn open(&mut self, markdown: &str, now: Instant) {
        self.open_document(Document::from_markdown(markdown), now);
    }

    /// Replace the open document and schedule every check.
    pub fn open_document(&mut self, doc: Document, now: Instant) {
        info!(
            target: "wordwise_editor::session",
            blocks = doc.blocks().len(),
            size = doc.size(),
            "document opened"
        );
        self.doc = Some(doc);
        self.store.clear();
        self.in_flight = [None, None, None];
        self.rendered = [None; 3];
        self.scheduler.on_edit(now);
    }

    pub fn insert_text(&mut self, pos: usize, text: &str, now: Instant) -> Result<(), DocumentError> {
        self.edit(pos..pos, text, now)
    }

    pub fn delete_range(&mut self, range: Range<usize>, now: Instant) -> Result<(), DocumentError> {
        self.edit(range, "", now)
    }

    pub fn replace_range(
        &mut self,
        range: Range<usize>,
        text: &str,
        now: Instant,
    ) -> Result<(), DocumentError> {
        self.edit(range, text, now)
    }

    /// Apply a user edit: shift or invalidate findings, mutate the document,
    /// and restart every debounce timer.
    ///
    /// # Errors
    /// Returns the document's rejection; nothing changes in that case. A
    /// torn-down session rejects every edit as out of bounds.
    fn edit(&mut self, range: Range<usize>, text: &str, now: Instant) -> Result<(), DocumentError> {
        let Some(doc) = self.doc.as_mut() else {
            return Err(DocumentError::OutOfBounds {
                from: range.start,
                to: range.end,
                size: 0,
            });
        };
        doc.validate_range(&range)?;
        let text_range = TextCoords::new(doc).doc_range_to_text(range.clone());
        doc.replace_range(range.clone(), text)?;
        let inserted = text.chars().count();
        if let Some(text_range) = text_range {
            self.store.apply_edit(text_range, inserted);
        }
        self.store.remap_markers(range, inserted);
        self.rendered = [None; 3];
        self.scheduler.on_edit(now);
        Ok(())
    }

    /// Advance the session: pump, harvest, dispatch, reconcile.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport {
            events: self.client.pump(),
            ..TickReport::default()
        };

        if self.client.is_spelling_ready() && !self.spelling_ready_seen {
            self.spelling_ready_seen = true;
            if self.doc.is_some() {
                self.scheduler
                    .schedule_after(CheckKind::Spelling, now, Duration::ZERO);
            }
        }

        self.harvest(now, &mut report);
        self.dispatch_due(now, &mut report);
        self.reconcile_changed(&mut report);
        report
    }

    fn harvest(&mut self, now: Instant, report: &mut TickReport) {
        let revision = self.doc.as_ref().map(Document::revision);
        for kind in CheckKind::ALL {
            let slot = &mut self.in_flight[kind.index()];
            let Some(reply) = slot.as_ref().and_then(InFlight::try_take) else {
                continue;
            };
            let Some(entry) = slot.take() else {
                continue;
            };

            if !self.scheduler.is_current(kind, entry.generation) {
                debug!(
                    target: "wordwise_editor::session",
                    kind = kind.as_str(),
                    generation = entry.generation.0,
                    "stale generation discarded"
                );
                report.discarded += 1;
                continue;
            }
            if revision != Some(entry.revision) {
                debug!(
                    target: "wordwise_editor::session",
                    kind = kind.as_str(),
                    generation = entry.generation.0,
                    "reply computed on an older document; rescheduling"
                );
                report.discarded += 1;
                if self.doc.is_some() && !self.scheduler.timer(kind).is_armed() {
                    self.scheduler.schedule_after(kind, now, Duration::ZERO);
                }
                continue;
            }
            if let Some(error) = reply.error() {
                warn!(
                    target: "wordwise_editor::session",
                    kind = kind.as_str(),
                    request_id = %entry.request_id(),
                    error = error,
                    "check failed; keeping previous findings"
                );
                report.failed.push(kind);
                continue;
            }

            match reply {
                Reply::Findings(reply) => {
                    let ids = self.store.replace(kind, reply.value);
                    debug!(
                        target: "wordwise_editor::session",
                        kind = kind.as_str(),
                        request_id = %reply.request_id,
                        generation = entry.generation.0,
                        applied = ids.len(),
                        "findings applied"
                    );
                }
                Reply::Words(reply) => {
                    debug!(
                        target: "wordwise_editor::session",
                        kind = kind.as_str(),
                        request_id = %reply.request_id,
                        generation = entry.generation.0,
                        applied = reply.value.len(),
                        "profanity words applied"
                    );
                    self.store.set_profanity(reply.value);
                }
            }
            report.applied.push(kind);
        }
    }

    fn dispatch_due(&mut self, now: Instant, report: &mut TickReport) {
        let Some(doc) = self.doc.as_ref() else {
            return;
        };
        let due = self.scheduler.due(now);
        if due.is_empty() {
            return;
        }
        let text = extract_text(doc);
        let revision = doc.revision();

        for (kind, generation) in due {
            let pending = match kind {
                CheckKind::Spelling => PendingValue::Findings(self.client.check_spelling(&text)),
                CheckKind::Grammar => PendingValue::Findings(
                    self.client.check_grammar(&text, &self.options.language),
                ),
                CheckKind::Profanity => PendingValue::Words(self.client.check_profanity(&text)),
            };
            let entry = InFlight {
                generation,
                revision,
                pending,
            };
            debug!(
                target: "wordwise_editor::session",
                kind = kind.as_str(),
                request_id = %entry.request_id(),
                generation = generation.0,
                text_len = text.len(),
                "check dispatched"
            );
            if self.in_flight[kind.index()].replace(entry).is_some() {
                report.discarded += 1;
            }
            report.dispatched.push((kind, generation));
        }
    }

    fn reconcile_changed(&mut self, report: &mut TickReport) {
        let Some(doc) = self.doc.as_mut() else {
            return;
        };
        for kind in CheckKind::ALL {
            let revision = self.store.revision(kind);
            if self.rendered[kind.index()] == Some(revision) {
                continue;
            }
            let rendered = reconcile(doc, &mut self.store, kind);
            self.rendered[kind.index()] = Some(revision);
            report.rendered.push((kind, rendered));
        }
    }

    /// Replace a finding's span with `replacement` as one document edit.
    ///
    /// # Returns
    /// `None`, with nothing changed, when the document is torn down, the id
    /// is unknown, or the finding's span no longer maps into the document.
    pub fn apply_suggestion(
        &mut self,
        id: FindingId,
        replacement: &str,
        now: Instant,
    ) -> Option<AppliedSuggestion> {
        let doc = self.doc.as_mut()?;
        let finding = self.store.get(id)?.clone();
        let range = TextCoords::new(doc).text_range_to_doc(finding.span())?;
        doc.validate_range(&range).ok()?;

        let replacement = normalize_replacement(replacement);
        doc.remove_marks_in(finding.kind, range.clone());
        doc.replace_range(range.clone(), &replacement).ok()?;

        self.store.remove(id);
        self.store
            .apply_edit(finding.span(), replacement.chars().count());
        self.rendered = [None; 3];
        self.scheduler
            .schedule_after(finding.kind, now, self.options.revalidate_delay);

        info!(
            target: "wordwise_editor::session",
            kind = finding.kind.as_str(),
            finding_id = %id,
            from = range.start,
            to = range.end,
            "suggestion applied"
        );
        Some(AppliedSuggestion {
            finding,
            range,
            replacement,
        })
    }

    /// Finding under document position `pos`, as last rendered and moved
    /// across later edits.
    pub fn finding_at(&self, pos: usize) -> Option<(FindingId, &Finding)> {
        let id = self.store.finding_at(pos)?;
        self.store.get(id).map(|finding| (id, finding))
    }

    pub fn spelling_findings(&self) -> Vec<(FindingId, Finding)> {
        self.owned_findings(CheckKind::Spelling)
    }

    pub fn grammar_findings(&self) -> Vec<(FindingId, Finding)> {
        self.owned_findings(CheckKind::Grammar)
    }

    fn owned_findings(&self, kind: CheckKind) -> Vec<(FindingId, Finding)> {
        self.store
            .findings(kind)
            .into_iter()
            .map(|(id, finding)| (id, finding.clone()))
            .collect()
    }

    pub fn profanity_words(&self) -> &[String] {
        self.store.profanity_words()
    }

    pub fn export_status(&self) -> ExportStatus {
        export_readiness(
            self.store.count(CheckKind::Spelling),
            self.store.count(CheckKind::Grammar),
            self.store.profanity_words(),
        )
    }

    /// Write the document as paginated markdown.
    ///
    /// # Returns
    /// The number of pages written.
    ///
    /// # Errors
    /// Returns [`ExportError::Blocked`] while issues remain,
    /// [`ExportError::NoDocument`] after teardown, or [`ExportError::Io`].
    pub fn export_to(&self, path: &Path) -> Result<usize, ExportError> {
        let status = self.export_status();
        if !status.is_ready() {
            return Err(ExportError::Blocked(status));
        }
        let doc = self.doc.as_ref().ok_or(ExportError::NoDocument)?;
        let pages = paginate(&doc.to_markdown(), self.options.lines_per_page);
        write_export(path, &pages)?;
        info!(
            target: "wordwise_editor::session",
            pages = pages.len(),
            path = %path.display(),
            "document exported"
        );
        Ok(pages.len())
    }

    /// No timers armed, no checks in flight, and no open document waiting
    /// on the dictionary to load.
    pub fn is_idle(&self) -> bool {
        let awaiting_dictionary = self.doc.is_some() && !self.client.is_spelling_settled();
        self.scheduler.is_idle() && self.in_flight.iter().all(Option::is_none) && !awaiting_dictionary
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Tick with the wall clock until idle or `timeout` passes.
    ///
    /// # Returns
    /// `true` when the session settled.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            self.tick(now);
            if self.is_idle() {
                return true;
            }
            if now >= deadline {
                return false;
            }
            let wake = self
                .next_deadline()
                .unwrap_or(now + Duration::from_millis(10))
                .min(now + Duration::from_millis(10))
                .min(deadline);
            std::thread::sleep(wake.saturating_duration_since(now));
        }
    }

    /// Drop the document and stop the checker workers.
    pub fn teardown(&mut self) {
        if self.doc.take().is_some() {
            info!(target: "wordwise_editor::session", "document torn down");
        }
        self.in_flight = [None, None, None];
        self.scheduler.cancel_all();
        self.store.clear();
        self.client.shutdown();
    }
}
