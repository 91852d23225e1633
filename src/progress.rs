//! Periodic status reporting for long-running reshapes.
//!
//! The aggregator calls [`Progress::observe`] after every row it parses or
//! writes. [`IntervalProgress`] turns those calls into at most one report per
//! interval, measured on an injectable [`Clock`], and hands each report to a
//! sink (by default a `tracing` info event).

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The process clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward.
    ///
    /// # Panics
    /// Panics if the inner mutex is poisoned.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

/// Which half of the reshape a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parsing,
    Writing,
}

impl Phase {
    const fn label(self) -> &'static str {
        match self {
            Self::Parsing => "rows parsed",
            Self::Writing => "rows written to file",
        }
    }
}

/// One status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub phase: Phase,
    pub rows: u64,
    pub elapsed: Duration,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}s: {} {}",
            self.elapsed.as_secs(),
            self.rows,
            self.phase.label()
        )
    }
}

/// Receives row counts from the aggregator.
pub trait Progress {
    fn observe(&mut self, phase: Phase, rows: u64);
}

/// Reports nothing. Used when output goes to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn observe(&mut self, _phase: Phase, _rows: u64) {}
}

impl<P: Progress + ?Sized> Progress for Box<P> {
    fn observe(&mut self, phase: Phase, rows: u64) {
        (**self).observe(phase, rows);
    }
}

impl<P: Progress + ?Sized> Progress for &mut P {
    fn observe(&mut self, phase: Phase, rows: u64) {
        (**self).observe(phase, rows);
    }
}

type Sink = Box<dyn FnMut(&ProgressUpdate) + Send>;

/// Emits a report whenever `interval` has passed since the previous one.
pub struct IntervalProgress<C: Clock = SystemClock> {
    clock: C,
    interval: Duration,
    start: Instant,
    last: Instant,
    sink: Sink,
}

impl IntervalProgress<SystemClock> {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(SystemClock, interval)
    }
}

impl<C: Clock> IntervalProgress<C> {
    /// Start measuring now on `clock`; reports go to the log.
    pub fn with_clock(clock: C, interval: Duration) -> Self {
        let start = clock.now();
        Self {
            clock,
            interval,
            start,
            last: start,
            sink: Box::new(log_update),
        }
    }

    /// Replace the log sink with a callback.
    #[must_use]
    pub fn with_sink(mut self, sink: impl FnMut(&ProgressUpdate) + Send + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }
}

impl<C: Clock> Progress for IntervalProgress<C> {
    fn observe(&mut self, phase: Phase, rows: u64) {
        let now = self.clock.now();
        if now.duration_since(self.last) < self.interval {
            return;
        }
        let update = ProgressUpdate {
            phase,
            rows,
            elapsed: now.duration_since(self.start),
        };
        (self.sink)(&update);
        self.last = now;
    }
}

impl<C: Clock> fmt::Debug for IntervalProgress<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalProgress")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

fn log_update(update: &ProgressUpdate) {
    info!("{update}");
}
