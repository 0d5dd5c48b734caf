//! Owner-thread client for the checker workers.
//!
//! Each dispatched check registers a [`PendingRequest`] keyed by its
//! [`RequestId`]. [`CheckerClient::pump`] drains worker events and fires the
//! matching resolver; shutdown fires every remaining resolver with an empty
//! result so no caller waits forever.

use super::protocol::{CheckCmd, CheckEvent, RequestId};
use super::worker::{spawn_checker, CheckerHandle, CheckerServices};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use wordwise_core::{CheckKind, Finding};

const WORKER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Error attached to results resolved because the client shut down.
pub const SHUT_DOWN: &str = "checker shut down";
/// Error attached to spelling results requested before the dictionary loaded.
pub const NOT_READY: &str = "spell checker not ready";
/// Error attached to results when no worker is running.
pub const UNAVAILABLE: &str = "checker unavailable";

/// Value delivered to a [`PendingCheck`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReply<T> {
    pub request_id: RequestId,
    pub value: T,
    /// Set when `value` is an empty stand-in for a failed check.
    pub error: Option<String>,
}

impl<T> CheckReply<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One-shot receiver for a dispatched check.
#[derive(Debug)]
pub struct PendingCheck<T> {
    id: RequestId,
    rx: Receiver<CheckReply<T>>,
}

impl<T> PendingCheck<T> {
    fn channel(id: RequestId) -> (Sender<CheckReply<T>>, Self) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (tx, Self { id, rx })
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Take the reply if it has been resolved.
    pub fn try_take(&self) -> Option<CheckReply<T>> {
        match self.rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block up to `timeout` for the reply. Someone else must be pumping the client.
    pub fn wait(&self, timeout: Duration) -> Option<CheckReply<T>> {
        self.rx.recv_timeout(timeout).ok()
    }
}

enum Resolver {
    Findings(Sender<CheckReply<Vec<Finding>>>),
    Words(Sender<CheckReply<Vec<String>>>),
}

/// A dispatched check awaiting its reply.
struct PendingRequest {
    kind: CheckKind,
    resolver: Resolver,
}

impl PendingRequest {
    fn resolve_empty(self, id: RequestId, error: &str) {
        match self.resolver {
            Resolver::Findings(tx) => {
                let _ = tx.try_send(CheckReply {
                    request_id: id,
                    value: Vec::new(),
                    error: Some(error.to_string()),
                });
            }
            Resolver::Words(tx) => {
                let _ = tx.try_send(CheckReply {
                    request_id: id,
                    value: Vec::new(),
                    error: Some(error.to_string()),
                });
            }
        }
    }
}

/// Async-style facade over the checker workers, owned by one thread.
pub struct CheckerClient {
    handle: Option<CheckerHandle>,
    next_id: u64,
    pending: HashMap<RequestId, PendingRequest>,
    spelling_ready: bool,
    spelling_failure: Option<String>,
}

impl CheckerClient {
    /// Spawn the workers. Falls back to a disconnected client when spawning fails.
    pub fn spawn(services: CheckerServices) -> Self {
        match spawn_checker(services) {
            Ok(handle) => Self::with_handle(Some(handle)),
            Err(err) => {
                warn!(
                    target: "wordwise_editor::checker",
                    error = %err,
                    "failed to spawn checker workers; checks disabled"
                );
                Self::with_handle(None)
            }
        }
    }

    /// A client with no workers. Every check resolves immediately with empty.
    pub fn disconnected() -> Self {
        Self::with_handle(None)
    }

    fn with_handle(handle: Option<CheckerHandle>) -> Self {
        Self {
            handle,
            next_id: 0,
            pending: HashMap::new(),
            spelling_ready: false,
            spelling_failure: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_spelling_ready(&self) -> bool {
        self.spelling_ready
    }

    /// Dictionary load failure reported by the worker, if any.
    pub fn spelling_failure(&self) -> Option<&str> {
        self.spelling_failure.as_deref()
    }

    /// The spelling worker has reported ready or failed, or there are no workers.
    pub fn is_spelling_settled(&self) -> bool {
        self.spelling_ready || self.spelling_failure.is_some() || self.handle.is_none()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn allocate_id(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId::new(self.next_id)
    }

    /// Spell-check `text`.
    ///
    /// Resolves immediately with an empty result while the dictionary is not ready.
    pub fn check_spelling(&mut self, text: &str) -> PendingCheck<Vec<Finding>> {
        let id = self.allocate_id();
        let (tx, pending) = PendingCheck::channel(id);
        if self.handle.is_some() && !self.spelling_ready {
            let request = PendingRequest {
                kind: CheckKind::Spelling,
                resolver: Resolver::Findings(tx),
            };
            request.resolve_empty(id, NOT_READY);
            return pending;
        }
        self.dispatch(
            CheckCmd::Spelling {
                id,
                text: text.to_string(),
            },
            Resolver::Findings(tx),
        );
        pending
    }

    /// Grammar-check `text` in `language`.
    pub fn check_grammar(&mut self, text: &str, language: &str) -> PendingCheck<Vec<Finding>> {
        let id = self.allocate_id();
        let (tx, pending) = PendingCheck::channel(id);
        self.dispatch(
            CheckCmd::Grammar {
                id,
                text: text.to_string(),
                language: language.to_string(),
            },
            Resolver::Findings(tx),
        );
        pending
    }

    /// Collect profane words in `text`.
    pub fn check_profanity(&mut self, text: &str) -> PendingCheck<Vec<String>> {
        let id = self.allocate_id();
        let (tx, pending) = PendingCheck::channel(id);
        self.dispatch(
            CheckCmd::Profanity {
                id,
                text: text.to_string(),
            },
            Resolver::Words(tx),
        );
        pending
    }

    fn dispatch(&mut self, cmd: CheckCmd, resolver: Resolver) {
        let id = cmd.id();
        let request = PendingRequest {
            kind: cmd.kind(),
            resolver,
        };
        let Some(handle) = &self.handle else {
            request.resolve_empty(id, UNAVAILABLE);
            return;
        };
        debug!(
            target: "wordwise_editor::checker",
            kind = request.kind.as_str(),
            request_id = %id,
            "dispatching check"
        );
        match handle.send(cmd) {
            Ok(()) => {
                self.pending.insert(id, request);
            }
            Err(_) => {
                warn!(
                    target: "wordwise_editor::checker",
                    kind = request.kind.as_str(),
                    request_id = %id,
                    "checker worker is gone; resolving empty"
                );
                request.resolve_empty(id, UNAVAILABLE);
            }
        }
    }

    /// Drain worker events and fire matching resolvers.
    ///
    /// # Returns
    /// The number of events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let Some(handle) = &self.handle else {
                return handled;
            };
            match handle.evt_rx.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => return handled,
                Err(TryRecvError::Disconnected) => {
                    self.on_workers_gone();
                    return handled;
                }
            }
        }
    }

    /// Pump until `pending` resolves or `timeout` passes.
    ///
    /// # Returns
    /// The reply, or `None` on timeout.
    pub fn wait_for<T>(&mut self, pending: &PendingCheck<T>, timeout: Duration) -> Option<CheckReply<T>> {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if let Some(reply) = pending.try_take() {
                return Some(reply);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let Some(handle) = &self.handle else {
                return pending.try_take();
            };
            match handle.evt_rx.recv_timeout(remaining.min(Duration::from_millis(25))) {
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => self.on_workers_gone(),
            }
        }
    }

    /// Pump until the spelling worker reports ready or failed, or `timeout` passes.
    pub fn wait_until_spelling_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if self.is_spelling_settled() {
                return self.spelling_ready;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn handle_event(&mut self, event: CheckEvent) {
        match event {
            CheckEvent::SpellcheckerReady => {
                debug!(target: "wordwise_editor::checker", "spell checker ready");
                self.spelling_ready = true;
                self.spelling_failure = None;
            }
            CheckEvent::SpellcheckerFailed { message } => {
                warn!(
                    target: "wordwise_editor::checker",
                    error = message.as_str(),
                    "spell checker failed to load; spelling disabled"
                );
                self.spelling_ready = false;
                self.spelling_failure = Some(message);
            }
            CheckEvent::Spelling {
                id,
                findings,
                error,
            }
            | CheckEvent::Grammar {
                id,
                findings,
                error,
            } => {
                let Some(request) = self.take_pending(id) else {
                    return;
                };
                if let Resolver::Findings(tx) = request.resolver {
                    let _ = tx.try_send(CheckReply {
                        request_id: id,
                        value: findings,
                        error,
                    });
                }
            }
            CheckEvent::Profanity { id, words, error } => {
                let Some(request) = self.take_pending(id) else {
                    return;
                };
                if let Resolver::Words(tx) = request.resolver {
                    let _ = tx.try_send(CheckReply {
                        request_id: id,
                        value: words,
                        error,
                    });
                }
            }
        }
    }

    fn take_pending(&mut self, id: RequestId) -> Option<PendingRequest> {
        let request = self.pending.remove(&id);
        if request.is_none() {
            trace!(
                target: "wordwise_editor::checker",
                request_id = %id,
                "reply for unknown request ignored"
            );
        }
        request
    }

    fn on_workers_gone(&mut self) {
        warn!(
            target: "wordwise_editor::checker",
            pending = self.pending.len(),
            "checker workers disconnected"
        );
        self.resolve_all(UNAVAILABLE);
        self.handle = None;
        self.spelling_ready = false;
    }

    fn resolve_all(&mut self, error: &str) {
        for (id, request) in self.pending.drain() {
            request.resolve_empty(id, error);
        }
    }

    /// Resolve every pending request with empty and stop the workers.
    ///
    /// # Returns
    /// `false` when a worker did not exit before the join timeout.
    pub fn shutdown(&mut self) -> bool {
        self.resolve_all(SHUT_DOWN);
        self.spelling_ready = false;
        match self.handle.take() {
            Some(handle) => handle.shutdown_and_join(WORKER_SHUTDOWN_TIMEOUT),
            None => true,
        }
    }
}

impl Drop for CheckerClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}
