//! Per-kind debounce timers and generation counters.

use std::time::{Duration, Instant};
use tracing::debug;
use wordwise_core::CheckKind;

/// Restartable one-shot timer. Every `schedule` pushes the deadline out.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the timer with the configured delay.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Restart the timer with a one-off delay.
    pub fn schedule_after(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Fire at most once per schedule.
    ///
    /// # Returns
    /// `true` when the deadline has passed; the timer is then disarmed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Counter value attached to a dispatched check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

/// One debouncer and one generation counter per check kind.
#[derive(Debug, Clone)]
pub struct CheckScheduler {
    timers: [Debouncer; 3],
    generations: [u64; 3],
}

impl CheckScheduler {
    pub fn new(spelling: Duration, grammar: Duration, profanity: Duration) -> Self {
        let mut timers = [
            Debouncer::new(Duration::ZERO),
            Debouncer::new(Duration::ZERO),
            Debouncer::new(Duration::ZERO),
        ];
        timers[CheckKind::Spelling.index()] = Debouncer::new(spelling);
        timers[CheckKind::Grammar.index()] = Debouncer::new(grammar);
        timers[CheckKind::Profanity.index()] = Debouncer::new(profanity);
        Self {
            timers,
            generations: [0; 3],
        }
    }

    pub fn timer(&self, kind: CheckKind) -> &Debouncer {
        &self.timers[kind.index()]
    }

    /// Restart every timer; the snapshot taken when they fire wins.
    pub fn on_edit(&mut self, now: Instant) {
        for timer in &mut self.timers {
            timer.schedule(now);
        }
    }

    pub fn schedule(&mut self, kind: CheckKind, now: Instant) {
        self.timers[kind.index()].schedule(now);
    }

    pub fn schedule_after(&mut self, kind: CheckKind, now: Instant, delay: Duration) {
        debug!(
            target: "wordwise_editor::scheduler",
            kind = kind.as_str(),
            delay_ms = delay.as_millis() as u64,
            "revalidation scheduled"
        );
        self.timers[kind.index()].schedule_after(now, delay);
    }

    pub fn cancel_all(&mut self) {
        for timer in &mut self.timers {
            timer.cancel();
        }
    }

    /// Kinds whose timers fired, each with a freshly incremented generation.
    pub fn due(&mut self, now: Instant) -> Vec<(CheckKind, Generation)> {
        let mut fired = Vec::new();
        for kind in CheckKind::ALL {
            if self.timers[kind.index()].poll(now) {
                let slot = &mut self.generations[kind.index()];
                *slot += 1;
                let generation = Generation(*slot);
                debug!(
                    target: "wordwise_editor::scheduler",
                    kind = kind.as_str(),
                    generation = generation.0,
                    "check due"
                );
                fired.push((kind, generation));
            }
        }
        fired
    }

    pub fn current(&self, kind: CheckKind) -> Generation {
        Generation(self.generations[kind.index()])
    }

    /// Whether a response tagged `generation` may still be applied.
    pub fn is_current(&self, kind: CheckKind, generation: Generation) -> bool {
        self.current(kind) == generation
    }

    /// Earliest armed deadline across kinds.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().filter_map(Debouncer::deadline).min()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.iter().all(|timer| !timer.is_armed())
    }
}
