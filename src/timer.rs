//! Countdown timer component.
//!
//! The timer counts down from a configured duration to a deadline measured on
//! the [`Clock`]. When the deadline passes it shows `CLEARED!`, stops ticking
//! and emits a single [`TimeoutMsg`].
//!
//! A fresh duration is typed in digit by digit. Clearing an idle timer puts it
//! into input mode, where [`Model::input_digit`] shifts digits into an
//! `HH:MM:SS` field the way a microwave keypad does, and [`Model::commit`]
//! turns the entered digits into the new duration.
//!
//! # Basic Usage
//!
//! ```rust
//! use clockface_widgets::clock::ManualClock;
//! use clockface_widgets::timer::{self, State};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut timer = timer::new(Duration::from_secs(5)).with_clock(Arc::new(clock.clone()));
//!
//! let _tick = timer.toggle_start_pause();
//! clock.advance(Duration::from_millis(1_500));
//! assert!(!timer.tick());
//! assert_eq!(timer.view(), "00:00:03:500");
//!
//! clock.advance(Duration::from_millis(3_501));
//! assert!(timer.tick()); // deadline passed
//! assert_eq!(timer.state(), State::Expired);
//! assert_eq!(timer.view(), "CLEARED!");
//! ```
//!
//! # Entering a Duration
//!
//! ```rust
//! use clockface_widgets::timer;
//! use std::time::Duration;
//!
//! let mut timer = timer::new(Duration::from_secs(60));
//! timer.clear(); // idle, so this switches to input mode
//! assert!(timer.in_input_mode());
//!
//! for d in [1, 3, 0] {
//!     timer.input_digit(d).unwrap();
//! }
//! assert_eq!(timer.view(), "00:01:30:000");
//!
//! timer.commit().unwrap();
//! assert_eq!(timer.duration(), Duration::from_secs(90));
//! ```

use crate::clock::{self, Clock};
use crate::error::{FormatError, TimerError};
use crate::format::{components_of, millis, parse_time_string, to_time_components, TimeComponents};
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 55 minutes.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3_300_000);

/// Refresh cadence that keeps the millisecond digits visibly moving.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

/// Deadline used when the configured duration reaches past the range of
/// [`Instant`]. About a century.
pub const MAX_COUNTDOWN: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Shown once the countdown has run out.
pub const EXPIRED_TEXT: &str = "CLEARED!";

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Starts or pauses the timer.
#[derive(Debug, Clone)]
pub struct StartStopMsg {
    /// The timer this message is for.
    pub id: i64,
}

/// Periodic refresh for a running timer.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// The timer this tick belongs to.
    pub id: i64,
    tag: i64,
}

/// Clears the timer. See [`Model::clear`].
#[derive(Debug, Clone)]
pub struct ClearMsg {
    /// The timer this message is for.
    pub id: i64,
}

/// Types one digit while in input mode.
#[derive(Debug, Clone)]
pub struct DigitMsg {
    /// The timer this message is for.
    pub id: i64,
    /// The digit, 0-9.
    pub digit: u8,
}

/// Commits the typed digits as the new duration.
#[derive(Debug, Clone)]
pub struct SetMsg {
    /// The timer this message is for.
    pub id: i64,
}

/// Sent once when a countdown reaches its deadline.
#[derive(Debug, Clone)]
pub struct TimeoutMsg {
    /// The timer that ran out.
    pub id: i64,
}

/// Where the timer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Idle, showing the configured duration.
    Configured,
    /// Counting down.
    Running,
    /// Stopped mid-countdown. Resuming continues from the remaining time.
    Paused,
    /// Accepting digits for a new duration.
    Input,
    /// Ran out. Shows [`EXPIRED_TEXT`].
    Expired,
}

/// The six digits typed in input mode, oldest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitBuffer {
    digits: [u8; 6],
}

impl DigitBuffer {
    /// An all-zero buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shifts every digit one place left, dropping the leading one, and puts
    /// `digit` in the last place.
    ///
    /// # Errors
    ///
    /// [`TimerError::InvalidDigit`] if `digit` is greater than 9.
    pub fn push(&mut self, digit: u8) -> Result<(), TimerError> {
        if digit > 9 {
            return Err(TimerError::InvalidDigit(digit));
        }
        self.digits.rotate_left(1);
        self.digits[5] = digit;
        Ok(())
    }

    /// The digits as an `HHMMSS` string.
    pub fn as_time_string(&self) -> String {
        self.digits.iter().map(|d| char::from(b'0' + d)).collect()
    }

    /// The digits in the `HH:MM:SS:000` display template.
    pub fn render(&self) -> String {
        let s = self.as_time_string();
        format!("{}:{}:{}:000", &s[0..2], &s[2..4], &s[4..6])
    }

    /// Parses the digits as a duration.
    pub fn to_duration(&self) -> Result<Duration, FormatError> {
        parse_time_string(&self.as_time_string()).map(Duration::from_millis)
    }
}

impl fmt::Display for DigitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Readout {
    Time(TimeComponents),
    Entry,
    Expired,
}

/// A countdown timer with keypad-style duration entry.
#[derive(Debug, Clone)]
pub struct Model {
    /// How often a running timer asks to be ticked.
    pub interval: Duration,

    clock: Arc<dyn Clock>,
    duration: Duration,
    // Zero means "no countdown in progress, start from `duration`".
    remaining: Duration,
    end: Option<Instant>,
    input: bool,
    buffer: DigitBuffer,
    readout: Readout,
    id: i64,
    tag: i64,
}

/// Creates an idle timer set to `duration`, ticking every 10ms while running.
pub fn new(duration: Duration) -> Model {
    new_with_interval(duration, DEFAULT_INTERVAL)
}

/// Creates an idle timer set to `duration`, ticking every `interval` while running.
pub fn new_with_interval(duration: Duration, interval: Duration) -> Model {
    Model {
        interval,
        clock: clock::system(),
        duration,
        remaining: Duration::ZERO,
        end: None,
        input: false,
        buffer: DigitBuffer::new(),
        readout: Readout::Time(components_of(duration)),
        id: next_id(),
        tag: 0,
    }
}

impl Default for Model {
    fn default() -> Self {
        new(DEFAULT_DURATION)
    }
}

impl Model {
    /// Replaces the time source. Meant to be called before the first start.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Unique id carried by this timer's messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The configured countdown length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left as of the last tick. Zero when no countdown is in progress.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Whether a countdown is in progress and ticking.
    pub fn running(&self) -> bool {
        self.end.is_some()
    }

    /// Whether digits are being entered.
    pub fn in_input_mode(&self) -> bool {
        self.input
    }

    /// Whether the last countdown ran out and nothing has been started since.
    pub fn expired(&self) -> bool {
        self.readout == Readout::Expired
    }

    /// The current lifecycle state.
    pub fn state(&self) -> State {
        if self.input {
            State::Input
        } else if self.running() {
            State::Running
        } else if self.expired() {
            State::Expired
        } else if self.remaining > Duration::ZERO {
            State::Paused
        } else {
            State::Configured
        }
    }

    /// The time currently shown.
    ///
    /// `None` after expiry and whenever the typed digits are on screen: in
    /// input mode, and after [`commit`](Model::commit) until the next start
    /// or clear.
    pub fn display(&self) -> Option<&TimeComponents> {
        match &self.readout {
            Readout::Time(t) => Some(t),
            Readout::Entry | Readout::Expired => None,
        }
    }

    /// The digits entered in input mode.
    pub fn digits(&self) -> &DigitBuffer {
        &self.buffer
    }

    /// Starts or resumes the countdown, or pauses it if running.
    ///
    /// Returns the first tick command when starting. Ignored in input mode.
    pub fn toggle_start_pause(&mut self) -> Option<Cmd> {
        if self.input {
            tracing::debug!(id = self.id, "ignoring start while entering digits");
            return None;
        }

        if self.running() {
            self.end = None;
            self.tag += 1;
            tracing::debug!(id = self.id, remaining_ms = millis(self.remaining), "timer paused");
            return None;
        }

        let left = if self.remaining.is_zero() {
            self.duration
        } else {
            self.remaining
        };
        let now = self.clock.now();
        let Some(end) = now
            .checked_add(left)
            .or_else(|| now.checked_add(MAX_COUNTDOWN))
        else {
            tracing::warn!(id = self.id, left_ms = millis(left), "countdown deadline out of range");
            return None;
        };
        self.end = Some(end);
        self.readout = Readout::Time(components_of(left));
        self.tag += 1;
        tracing::debug!(id = self.id, left_ms = millis(left), "timer started");
        Some(self.tick_cmd())
    }

    /// Recomputes the remaining time. Returns `true` if the countdown ran out
    /// on this tick.
    ///
    /// Does nothing unless running, so a tick that arrives after expiry
    /// cannot fire the expiry again.
    pub fn tick(&mut self) -> bool {
        let Some(end) = self.end else {
            return false;
        };

        if self.remaining.is_zero() {
            self.remaining = self.duration;
        }

        let now = self.clock.now();
        let left_ms = match end.checked_duration_since(now) {
            Some(left) => millis(left),
            None => -(millis(now.duration_since(end)).max(1)),
        };

        match to_time_components(left_ms) {
            Ok(components) => {
                self.remaining = Duration::from_millis(left_ms.unsigned_abs());
                self.readout = Readout::Time(components);
                false
            }
            Err(FormatError::InvalidInput { .. }) => {
                self.expire();
                true
            }
            Err(err) => {
                // to_time_components only rejects negative input.
                tracing::warn!(id = self.id, %err, "unexpected formatter error");
                false
            }
        }
    }

    fn expire(&mut self) {
        self.end = None;
        self.tag += 1;
        self.remaining = Duration::ZERO;
        self.readout = Readout::Expired;
        tracing::debug!(id = self.id, "timer expired");
    }

    /// Stops the timer.
    ///
    /// With a countdown in progress this cancels it and shows the configured
    /// duration again. Otherwise it wipes the duration and enters input mode
    /// with an empty `00:00:00:000` template.
    pub fn clear(&mut self) {
        if self.end.take().is_some() {
            self.tag += 1;
        }

        if self.remaining.is_zero() {
            self.duration = Duration::ZERO;
            self.buffer = DigitBuffer::new();
            self.readout = Readout::Entry;
            self.input = true;
            tracing::debug!(id = self.id, "timer cleared, entering digit input");
        } else {
            self.remaining = Duration::ZERO;
            self.readout = Readout::Time(components_of(self.duration));
            tracing::debug!(id = self.id, duration_ms = millis(self.duration), "countdown cancelled");
        }
    }

    /// Types one digit into the duration being entered.
    ///
    /// # Errors
    ///
    /// [`TimerError::NotInInputMode`] outside input mode and
    /// [`TimerError::InvalidDigit`] for anything other than 0-9.
    pub fn input_digit(&mut self, digit: u8) -> Result<(), TimerError> {
        if !self.input {
            return Err(TimerError::NotInInputMode);
        }
        self.buffer.push(digit)
    }

    /// Makes the entered digits the new duration and leaves input mode.
    ///
    /// The entered digits stay on screen until the next start or clear.
    pub fn commit(&mut self) -> Result<(), TimerError> {
        if !self.input {
            return Err(TimerError::NotInInputMode);
        }
        self.duration = self.buffer.to_duration()?;
        self.remaining = Duration::ZERO;
        self.input = false;
        tracing::debug!(id = self.id, duration_ms = millis(self.duration), "timer duration set");
        Ok(())
    }

    /// A command that toggles this timer through [`StartStopMsg`].
    pub fn start_stop_cmd(&self) -> Cmd {
        let id = self.id;
        bubbletea_tick(Duration::from_nanos(1), move |_| {
            Box::new(StartStopMsg { id }) as Msg
        })
    }

    fn tick_cmd(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.interval, move |_| Box::new(TickMsg { id, tag }) as Msg)
    }

    fn timeout_cmd(&self) -> Cmd {
        let id = self.id;
        bubbletea_tick(Duration::from_nanos(1), move |_| Box::new(TimeoutMsg { id }) as Msg)
    }

    /// Handles the timer's messages. Returns the next tick, or a [`TimeoutMsg`] command on expiry.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(tick) = msg.downcast_ref::<TickMsg>() {
            if tick.id != self.id || tick.tag != self.tag || !self.running() {
                tracing::trace!(id = self.id, tag = tick.tag, "dropping stale timer tick");
                return None;
            }
            if self.tick() {
                return Some(self.timeout_cmd());
            }
            return Some(self.tick_cmd());
        }

        if let Some(start_stop) = msg.downcast_ref::<StartStopMsg>() {
            if start_stop.id != self.id {
                return None;
            }
            return self.toggle_start_pause();
        }

        if let Some(clear) = msg.downcast_ref::<ClearMsg>() {
            if clear.id == self.id {
                self.clear();
            }
            return None;
        }

        if let Some(digit) = msg.downcast_ref::<DigitMsg>() {
            if digit.id == self.id {
                if let Err(err) = self.input_digit(digit.digit) {
                    tracing::warn!(id = self.id, %err, "digit rejected");
                }
            }
            return None;
        }

        if let Some(set) = msg.downcast_ref::<SetMsg>() {
            if set.id == self.id {
                if let Err(err) = self.commit() {
                    tracing::warn!(id = self.id, %err, "could not set timer");
                }
            }
            return None;
        }

        None
    }

    /// The current reading: `HH:MM:SS:mmm`, the entry template, or `CLEARED!`.
    pub fn view(&self) -> String {
        match &self.readout {
            Readout::Time(t) => t.time_string.clone(),
            Readout::Entry => self.buffer.render(),
            Readout::Expired => EXPIRED_TEXT.to_string(),
        }
    }
}

impl crate::Engine for Model {
    fn mount(&mut self) -> Option<Cmd> {
        None
    }

    fn unmount(&mut self) {
        if self.end.take().is_some() {
            self.tag += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running()
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        (Self::default(), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}
