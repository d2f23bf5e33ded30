//! Wall-clock component.
//!
//! Shows the local time of day and refreshes once a second for as long as it
//! is mounted.
//!
//! ```rust
//! use chrono::{Local, TimeZone};
//! use clockface_widgets::clock::ManualClock;
//! use clockface_widgets::{clockface, Engine};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let wall = Local.with_ymd_and_hms(2024, 1, 1, 15, 4, 5).single().unwrap();
//! let clock = ManualClock::at(wall);
//! let mut face = clockface::new().with_clock(Arc::new(clock.clone()));
//!
//! let _tick = face.mount();
//! assert_eq!(face.view(), "3:04:05 PM");
//!
//! clock.advance(Duration::from_secs(1));
//! face.tick();
//! assert_eq!(face.view(), "3:04:06 PM");
//! ```

use crate::clock::{self, Clock};
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 12-hour time with seconds, e.g. `3:04:05 PM`.
pub const DEFAULT_FORMAT: &str = "%-I:%M:%S %p";

/// How often a mounted clock refreshes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Periodic refresh for a mounted clock face.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// The clock face this tick belongs to.
    pub id: i64,
    tag: i64,
}

/// The clock face: local time, refreshed while mounted.
#[derive(Debug, Clone)]
pub struct Model {
    /// A `chrono` strftime format string.
    pub format: String,
    /// How often a mounted clock asks to be ticked.
    pub interval: Duration,

    clock: Arc<dyn Clock>,
    now: DateTime<Local>,
    mounted: bool,
    id: i64,
    tag: i64,
}

/// Creates an unmounted clock face using [`DEFAULT_FORMAT`].
pub fn new() -> Model {
    Model::new()
}

impl Default for Model {
    fn default() -> Self {
        let clock = clock::system();
        Self {
            format: DEFAULT_FORMAT.to_string(),
            interval: DEFAULT_INTERVAL,
            now: clock.local_time(),
            clock,
            mounted: false,
            id: next_id(),
            tag: 0,
        }
    }
}

impl Model {
    /// Creates an unmounted clock face using [`DEFAULT_FORMAT`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strftime format. A format chrono cannot render is logged
    /// and the current format is kept.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        let format = format.into();
        if is_valid_format(&format) {
            self.format = format;
        } else {
            tracing::warn!(id = self.id, %format, "invalid clock format, keeping {}", self.format);
        }
        self
    }

    /// Replaces the time source and samples it.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.now = clock.local_time();
        self.clock = clock;
        self
    }

    /// Unique id carried by this clock face's tick messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The time shown by the last tick.
    pub fn time(&self) -> DateTime<Local> {
        self.now
    }

    /// Samples the current local time.
    pub fn tick(&mut self) {
        self.now = self.clock.local_time();
    }

    fn tick_cmd(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.interval, move |_| Box::new(TickMsg { id, tag }) as Msg)
    }

    /// Handles a [`TickMsg`], returning the next tick command.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let tick = msg.downcast_ref::<TickMsg>()?;
        if !self.mounted || tick.id != self.id || tick.tag != self.tag {
            return None;
        }
        self.tick();
        Some(self.tick_cmd())
    }

    /// The sampled time rendered with [`format`](Model::format).
    pub fn view(&self) -> String {
        // `format` is public, so it may have been set without validation.
        let mut out = String::new();
        if write!(out, "{}", self.now.format(&self.format)).is_err() {
            tracing::warn!(id = self.id, format = %self.format, "invalid clock format, using default");
            out.clear();
            let _ = write!(out, "{}", self.now.format(DEFAULT_FORMAT));
        }
        out
    }
}

fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

impl crate::Engine for Model {
    /// Samples the time and starts the once-a-second refresh.
    fn mount(&mut self) -> Option<Cmd> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        self.tag += 1;
        self.tick();
        tracing::debug!(id = self.id, "clock face mounted");
        Some(self.tick_cmd())
    }

    fn unmount(&mut self) {
        if self.mounted {
            self.mounted = false;
            self.tag += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.mounted
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        let mut model = Self::new();
        let cmd = crate::Engine::mount(&mut model);
        (model, cmd)
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
    use crate::Engine;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> (Model, ManualClock) {
        let wall = Local.with_ymd_and_hms(2024, 1, 1, h, m, s).single().unwrap();
        let clock = ManualClock::at(wall);
        let face = new().with_clock(Arc::new(clock.clone()));
        (face, clock)
    }

    #[test]
    fn test_default_format() {
        let (face, _clock) = at(9, 5, 7);
        assert_eq!(face.view(), "9:05:07 AM");
        assert_eq!(face.interval, Duration::from_secs(1));
    }

    #[test]
    fn test_custom_format() {
        let (face, _clock) = at(21, 30, 0);
        let face = face.with_format("%H:%M");
        assert_eq!(face.view(), "21:30");
    }

    #[test]
    fn test_invalid_format_is_rejected() {
        let (face, _clock) = at(21, 30, 0);
        let face = face.with_format("%Q");
        assert_eq!(face.format, DEFAULT_FORMAT);
        assert_eq!(face.view(), "9:30:00 PM");
    }

    #[test]
    fn test_invalid_format_field_falls_back_in_view() {
        let (mut face, _clock) = at(21, 30, 0);
        face.format = "%Q".to_string();
        assert_eq!(face.view(), "9:30:00 PM");
    }

    #[test]
    fn test_mount_starts_ticking_once() {
        let (mut face, _clock) = at(12, 0, 0);
        assert!(!face.is_running());
        assert!(face.mount().is_some());
        assert!(face.is_running());
        assert!(face.mount().is_none());
    }

    #[test]
    fn test_tick_msg_refreshes_time() {
        let (mut face, clock) = at(12, 0, 0);
        face.mount();
        clock.advance(Duration::from_secs(61));

        let msg = TickMsg {
            id: face.id(),
            tag: face.tag,
        };
        assert!(face.update(Box::new(msg)).is_some());
        assert_eq!(face.view(), "12:01:01 PM");
    }

    #[test]
    fn test_unmount_cancels_ticks() {
        let (mut face, clock) = at(12, 0, 0);
        face.mount();
        let pending = TickMsg {
            id: face.id(),
            tag: face.tag,
        };
        face.unmount();
        clock.advance(Duration::from_secs(5));

        assert!(face.update(Box::new(pending)).is_none());
        assert_eq!(face.view(), "12:00:00 PM");
    }

    #[test]
    fn test_rejects_ticks_before_mount() {
        let (mut face, _clock) = at(12, 0, 0);
        let msg = TickMsg {
            id: face.id(),
            tag: face.tag,
        };
        assert!(face.update(Box::new(msg)).is_none());
    }
}
