#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/clockface-widgets/")]

//! # clockface-widgets
//!
//! Clock, stopwatch and countdown timer components for
//! [bubbletea-rs](https://github.com/joshka/bubbletea-rs) applications.
//!
//! ## Overview
//!
//! Each component follows the Elm Architecture with `init()`, `update()` and
//! `view()`. The components never draw anything themselves: `view()` returns
//! the fixed-shape `HH:MM:SS:mmm` reading (or `CLEARED!` once a timer runs
//! out, or the local time for the clock) and the host decides how to show it.
//!
//! Time is always measured against a [`clock::Clock`], never counted in ticks.
//! Ticks only decide how often the reading is refreshed, so a late or dropped
//! tick costs a frame, not accuracy.
//!
//! ## Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Stopwatch`] | Elapsed time across start/pause cycles |
//! | [`Timer`] | Countdown with keypad-style duration entry |
//! | [`ClockFace`] | Local time of day, refreshed every second |
//! | [`Faces`] | Shows one of the above and switches between them |
//!
//! The [`format`] module holds the two conversion helpers the components are
//! built on.
//!
//! ## Ticking
//!
//! Starting a component returns a `Cmd` that delivers its next tick message.
//! Each tick carries the component's id and a generation tag; pausing,
//! clearing or unmounting bumps the tag, so ticks scheduled before the stop
//! are dropped when they arrive. Only one tick chain per component is ever
//! live.
//!
//! ```rust
//! use clockface_widgets::prelude::*;
//! use bubbletea_rs::{Cmd, Model, Msg};
//!
//! struct App {
//!     faces: Faces,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let (faces, cmd) = <Faces as Model>::init();
//!         (Self { faces }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.faces.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.faces.view()
//!     }
//! }
//! ```

/// Time sources.
pub mod clock;
/// Wall-clock component.
pub mod clockface;
/// Error types.
pub mod error;
/// Face selector.
pub mod faces;
/// Millisecond and time string conversion.
pub mod format;
/// Stopwatch component.
pub mod stopwatch;
/// Countdown timer component.
pub mod timer;

use bubbletea_rs::Cmd;

/// Lifecycle shared by every component.
///
/// A host mounts a component when it becomes visible and unmounts it before
/// discarding it. Unmounting cancels any pending tick before it returns, so
/// nothing scheduled by the component can change its state afterwards.
///
/// # Examples
///
/// ```rust
/// use clockface_widgets::prelude::*;
///
/// fn swap(old: &mut dyn Engine, new: &mut dyn Engine) -> Option<bubbletea_rs::Cmd> {
///     old.unmount();
///     new.mount()
/// }
///
/// let mut clock = ClockFace::new();
/// let mut stopwatch = Stopwatch::new();
/// let _cmd = swap(&mut stopwatch, &mut clock);
/// assert!(clock.is_running());
/// ```
pub trait Engine {
    /// Called when the component becomes visible. Returns a tick command if
    /// the component refreshes on its own (the clock does, the stopwatch and
    /// timer wait for a start).
    fn mount(&mut self) -> Option<Cmd>;

    /// Stops the component and cancels its pending tick.
    fn unmount(&mut self);

    /// Whether the component currently expects ticks.
    fn is_running(&self) -> bool;

    /// The current reading.
    fn view(&self) -> String;
}

pub use clock::{Clock, ManualClock, SystemClock};
pub use clockface::Model as ClockFace;
pub use error::{FormatError, TimerError};
pub use faces::{Face, Model as Faces};
pub use format::{parse_time_string, parse_time_value, to_time_components, TimeComponents};
pub use stopwatch::Model as Stopwatch;
pub use timer::{
    new as timer_new, new_with_interval as timer_new_with_interval, DigitBuffer, Model as Timer,
    State as TimerState, TimeoutMsg as TimerTimeoutMsg,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use clockface_widgets::prelude::*;
/// use std::time::Duration;
///
/// let timer: Timer = timer_new(Duration::from_secs(30));
/// assert_eq!(timer.state(), TimerState::Configured);
/// ```
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::clockface::Model as ClockFace;
    pub use crate::error::{FormatError, TimerError};
    pub use crate::faces::{Face, Model as Faces, SelectMsg as FaceSelectMsg};
    pub use crate::format::{parse_time_string, to_time_components, TimeComponents};
    pub use crate::stopwatch::Model as Stopwatch;
    pub use crate::timer::{
        new as timer_new, new_with_interval as timer_new_with_interval, DigitBuffer,
        Model as Timer, State as TimerState, TimeoutMsg as TimerTimeoutMsg,
    };
    pub use crate::Engine;
}
