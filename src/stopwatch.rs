//! Stopwatch component.
//!
//! Accumulates elapsed time across start/pause cycles. The running segment is
//! measured from the instant of the last resume and only folded into the
//! accumulated total on pause, so continuous running never adds up small
//! per-tick increments.
//!
//! # Basic Usage
//!
//! ```rust
//! use clockface_widgets::clock::ManualClock;
//! use clockface_widgets::stopwatch;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut sw = stopwatch::new().with_clock(Arc::new(clock.clone()));
//!
//! let _tick = sw.toggle_start_pause(); // start, returns the first tick command
//! clock.advance(Duration::from_millis(1_250));
//! sw.tick();
//! assert_eq!(sw.view(), "00:00:01:250");
//!
//! sw.toggle_start_pause(); // pause
//! clock.advance(Duration::from_secs(10));
//! assert_eq!(sw.elapsed(), Duration::from_millis(1_250));
//! ```

use crate::clock::{self, Clock};
use crate::format::{components_of, millis, TimeComponents};
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Refresh cadence that keeps the millisecond digits visibly moving.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Flips the stopwatch between running and paused.
#[derive(Debug, Clone)]
pub struct StartStopMsg {
    /// The stopwatch this message is for.
    pub id: i64,
}

/// Periodic refresh for a running stopwatch.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// The stopwatch this tick belongs to.
    pub id: i64,
    tag: i64,
}

/// Clears the stopwatch back to zero.
#[derive(Debug, Clone)]
pub struct ResetMsg {
    /// The stopwatch this message is for.
    pub id: i64,
}

/// A stopwatch: elapsed time across start/pause cycles.
#[derive(Debug, Clone)]
pub struct Model {
    /// How often a running stopwatch asks to be ticked.
    pub interval: Duration,

    clock: Arc<dyn Clock>,
    anchor: Option<Instant>,
    accumulated: Duration,
    display: TimeComponents,
    id: i64,
    tag: i64,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            clock: clock::system(),
            anchor: None,
            accumulated: Duration::ZERO,
            display: TimeComponents::zero(),
            id: next_id(),
            tag: 0,
        }
    }
}

/// Creates a stopped stopwatch at zero.
pub fn new() -> Model {
    Model::new()
}

impl Model {
    /// Creates a stopped stopwatch at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how often a running stopwatch asks to be ticked.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replaces the time source. Meant to be called before the first start.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Unique id carried by this stopwatch's messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether the stopwatch is counting.
    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Accumulated time plus the current running segment.
    pub fn elapsed(&self) -> Duration {
        let current = self
            .anchor
            .map(|anchor| self.clock.now().saturating_duration_since(anchor))
            .unwrap_or(Duration::ZERO);
        self.accumulated.saturating_add(current)
    }

    /// The last rendered reading. Refreshed by [`tick`](Model::tick) and by
    /// pause and clear.
    pub fn display(&self) -> &TimeComponents {
        &self.display
    }

    /// Starts or pauses, returning the first tick command when starting.
    pub fn toggle_start_pause(&mut self) -> Option<Cmd> {
        if self.is_running() {
            self.pause();
            None
        } else {
            self.start()
        }
    }

    /// Resumes counting. Does nothing if already running.
    pub fn start(&mut self) -> Option<Cmd> {
        if self.is_running() {
            return None;
        }
        self.anchor = Some(self.clock.now());
        self.tag += 1;
        tracing::debug!(id = self.id, accumulated_ms = millis(self.accumulated), "stopwatch started");
        Some(self.tick_cmd())
    }

    /// Freezes the count and cancels the pending tick.
    pub fn pause(&mut self) {
        let Some(anchor) = self.anchor.take() else {
            return;
        };
        self.accumulated = self
            .accumulated
            .saturating_add(self.clock.now().saturating_duration_since(anchor));
        self.tag += 1;
        self.display = components_of(self.accumulated);
        tracing::debug!(id = self.id, accumulated_ms = millis(self.accumulated), "stopwatch paused");
    }

    /// Re-derives the display from the clock. Does nothing while paused.
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }
        self.display = components_of(self.elapsed());
    }

    /// Stops and resets to `00:00:00:000`.
    pub fn clear(&mut self) {
        if self.is_running() {
            self.tag += 1;
        }
        self.anchor = None;
        self.accumulated = Duration::ZERO;
        self.display = TimeComponents::zero();
        tracing::debug!(id = self.id, "stopwatch cleared");
    }

    /// A command that toggles this stopwatch through [`StartStopMsg`].
    pub fn start_stop_cmd(&self) -> Cmd {
        let id = self.id;
        bubbletea_tick(Duration::from_nanos(1), move |_| {
            Box::new(StartStopMsg { id }) as Msg
        })
    }

    /// A command that clears this stopwatch through [`ResetMsg`].
    pub fn reset_cmd(&self) -> Cmd {
        let id = self.id;
        bubbletea_tick(Duration::from_nanos(1), move |_| Box::new(ResetMsg { id }) as Msg)
    }

    fn tick_cmd(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.interval, move |_| Box::new(TickMsg { id, tag }) as Msg)
    }

    /// Handles [`StartStopMsg`], [`ResetMsg`] and [`TickMsg`].
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(start_stop) = msg.downcast_ref::<StartStopMsg>() {
            if start_stop.id != self.id {
                return None;
            }
            return self.toggle_start_pause();
        }

        if let Some(reset) = msg.downcast_ref::<ResetMsg>() {
            if reset.id != self.id {
                return None;
            }
            self.clear();
            return None;
        }

        if let Some(tick) = msg.downcast_ref::<TickMsg>() {
            // Ticks from another stopwatch, or scheduled before the last
            // pause, are dropped so only one tick chain stays alive.
            if tick.id != self.id || tick.tag != self.tag || !self.is_running() {
                tracing::trace!(id = self.id, tag = tick.tag, "dropping stale stopwatch tick");
                return None;
            }
            self.tick();
            return Some(self.tick_cmd());
        }

        None
    }

    /// The last rendered reading as `HH:MM:SS:mmm`.
    pub fn view(&self) -> String {
        self.display.time_string.clone()
    }
}

impl crate::Engine for Model {
    fn mount(&mut self) -> Option<Cmd> {
        None
    }

    fn unmount(&mut self) {
        self.pause();
    }

    fn is_running(&self) -> bool {
        self.is_running()
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        (Self::new(), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn with_manual_clock() -> (Model, ManualClock) {
        let clock = ManualClock::new();
        let sw = new().with_clock(Arc::new(clock.clone()));
        (sw, clock)
    }

    #[test]
    fn test_new_stopwatch() {
        let sw = new();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(), Duration::ZERO);
        assert_eq!(sw.view(), "00:00:00:000");
        assert_eq!(sw.interval, DEFAULT_INTERVAL);
        assert!(sw.id() > 0);
    }

    #[test]
    fn test_unique_ids() {
        assert_ne!(new().id(), new().id());
    }

    #[test]
    fn test_toggle_returns_tick_only_on_start() {
        let (mut sw, _clock) = with_manual_clock();
        assert!(sw.toggle_start_pause().is_some());
        assert!(sw.is_running());
        assert!(sw.toggle_start_pause().is_none());
        assert!(!sw.is_running());
    }

    #[test]
    fn test_tick_tracks_wall_clock() {
        let (mut sw, clock) = with_manual_clock();
        sw.start();
        clock.advance(Duration::from_millis(61_007));
        sw.tick();
        assert_eq!(sw.view(), "00:01:01:007");
    }

    #[test]
    fn test_two_runs_accumulate_without_paused_time() {
        let (mut sw, clock) = with_manual_clock();

        sw.toggle_start_pause();
        clock.advance(Duration::from_millis(1_500));
        sw.toggle_start_pause();

        // Paused time must not be counted.
        clock.advance(Duration::from_secs(30));
        assert_eq!(sw.elapsed(), Duration::from_millis(1_500));
        assert_eq!(sw.view(), "00:00:01:500");

        sw.toggle_start_pause();
        clock.advance(Duration::from_millis(2_250));
        sw.toggle_start_pause();

        assert_eq!(sw.elapsed(), Duration::from_millis(3_750));
        assert_eq!(sw.view(), "00:00:03:750");
    }

    #[test]
    fn test_very_long_run_pauses_and_restarts() {
        let (mut sw, clock) = with_manual_clock();
        sw.start();
        clock.advance(Duration::from_secs(u64::MAX / 4));
        sw.tick();
        sw.pause();
        assert_eq!(sw.elapsed(), clock.elapsed());

        // Logging the accumulated total on restart must not wrap.
        sw.start();
        assert!(sw.is_running());
        assert_eq!(sw.view().len(), "00:00:00:000".len());
    }

    #[test]
    fn test_tick_while_paused_is_noop() {
        let (mut sw, clock) = with_manual_clock();
        sw.start();
        clock.advance(Duration::from_millis(100));
        sw.pause();
        clock.advance(Duration::from_millis(900));
        sw.tick();
        assert_eq!(sw.view(), "00:00:00:100");
    }

    #[test]
    fn test_start_and_pause_are_idempotent() {
        let (mut sw, clock) = with_manual_clock();
        assert!(sw.start().is_some());
        clock.advance(Duration::from_millis(400));
        // A second start must not move the anchor.
        assert!(sw.start().is_none());
        clock.advance(Duration::from_millis(100));
        sw.pause();
        sw.pause();
        assert_eq!(sw.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn test_clear() {
        let (mut sw, clock) = with_manual_clock();
        sw.start();
        clock.advance(Duration::from_secs(5));
        sw.tick();
        sw.clear();

        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(), Duration::ZERO);
        assert_eq!(sw.view(), "00:00:00:000");
    }

    #[test]
    fn test_update_tick_msg() {
        let (mut sw, clock) = with_manual_clock();
        sw.start();
        clock.advance(Duration::from_millis(20));

        let tick = TickMsg { id: sw.id(), tag: sw.tag };
        assert!(sw.update(Box::new(tick)).is_some());
        assert_eq!(sw.view(), "00:00:00:020");
    }

    #[test]
    fn test_stale_tick_after_pause_is_rejected() {
        let (mut sw, clock) = with_manual_clock();
        sw.start();
        let stale = TickMsg { id: sw.id(), tag: sw.tag };
        sw.pause();
        sw.start();
        clock.advance(Duration::from_millis(50));

        // The tick scheduled by the first run must not double up with the new chain.
        assert!(sw.update(Box::new(stale)).is_none());
        assert_eq!(sw.view(), "00:00:00:000");
    }

    #[test]
    fn test_tick_for_other_stopwatch_is_rejected() {
        let (mut sw, _clock) = with_manual_clock();
        sw.start();
        let foreign = TickMsg {
            id: sw.id() + 999,
            tag: sw.tag,
        };
        assert!(sw.update(Box::new(foreign)).is_none());
    }

    #[test]
    fn test_tick_after_clear_is_rejected() {
        let (mut sw, _clock) = with_manual_clock();
        sw.start();
        let pending = TickMsg { id: sw.id(), tag: sw.tag };
        sw.clear();
        assert!(sw.update(Box::new(pending)).is_none());
    }

    #[test]
    fn test_update_start_stop_and_reset_msgs() {
        let (mut sw, clock) = with_manual_clock();
        let id = sw.id();

        assert!(sw.update(Box::new(StartStopMsg { id })).is_some());
        assert!(sw.is_running());
        clock.advance(Duration::from_millis(10));
        assert!(sw.update(Box::new(StartStopMsg { id })).is_none());
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(), Duration::from_millis(10));

        assert!(sw.update(Box::new(ResetMsg { id })).is_none());
        assert_eq!(sw.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_update_ignores_other_ids() {
        let (mut sw, _clock) = with_manual_clock();
        let other = sw.id() + 1;
        assert!(sw.update(Box::new(StartStopMsg { id: other })).is_none());
        assert!(!sw.is_running());
    }

    #[test]
    fn test_commands_are_built() {
        let sw = new();
        let _toggle = sw.start_stop_cmd();
        let _reset = sw.reset_cmd();
    }
}
