//! Time sources for the widgets.
//!
//! Elapsed and remaining time are always computed from clock readings, never
//! from the number of ticks received, so the tick cadence only affects how
//! often the display refreshes. [`SystemClock`] is the default;
//! [`ManualClock`] lets tests and demos move time by hand.

use chrono::{DateTime, Local};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A source of monotonic and wall-clock time.
pub trait Clock: Debug + Send + Sync {
    /// Monotonic reading used for elapsed and remaining time.
    fn now(&self) -> Instant;

    /// Local wall-clock time, used by the clock face.
    fn local_time(&self) -> DateTime<Local>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

pub(crate) fn system() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// A clock that only moves when [`advance`](ManualClock::advance) is called.
///
/// Clones share the same offset, so a test can keep one handle and give
/// another to a widget.
///
/// ```rust
/// use clockface_widgets::clock::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// let t0 = clock.now();
/// handle.advance(Duration::from_millis(250));
/// assert_eq!(clock.now() - t0, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    wall_base: DateTime<Local>,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// A clock starting at the current wall time.
    pub fn new() -> Self {
        Self::at(Local::now())
    }

    /// Starts the wall clock at `wall_base`.
    pub fn at(wall_base: DateTime<Local>) -> Self {
        Self {
            base: Instant::now(),
            wall_base,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward by `by`.
    ///
    /// The offset stops growing once `base + offset` would leave the range of
    /// [`Instant`].
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        let next = offset.saturating_add(by);
        if self.base.checked_add(next).is_some() {
            *offset = next;
        } else {
            tracing::warn!(by_ms = crate::format::millis(by), "manual clock advance out of range");
        }
    }

    /// Total time advanced so far.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base.checked_add(self.elapsed()).unwrap_or(self.base)
    }

    fn local_time(&self) -> DateTime<Local> {
        let offset = chrono::Duration::from_std(self.elapsed()).unwrap_or(chrono::Duration::zero());
        self.wall_base + offset
    }
}
