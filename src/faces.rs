//! Switches between the clock, stopwatch and timer.
//!
//! Exactly one widget is mounted at a time. Selecting another face unmounts
//! the current widget and throws its state away, so coming back to the
//! stopwatch starts from zero again.
//!
//! ```rust
//! use clockface_widgets::faces::{self, Face};
//!
//! let mut faces = faces::new();
//! assert_eq!(faces.active(), Face::Timer);
//! assert_eq!(faces.others(), vec![Face::Clock, Face::Stopwatch]);
//!
//! let _cmd = faces.select(Face::Stopwatch);
//! assert_eq!(faces.view(), "00:00:00:000");
//! ```

use crate::clock::{self, Clock};
use crate::{clockface, stopwatch, timer, Engine};
use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
use std::fmt;
use std::sync::Arc;

/// The widgets a [`Model`] can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Local time of day.
    Clock,
    /// Elapsed time.
    Stopwatch,
    /// Countdown.
    Timer,
}

impl Face {
    /// Every face, in display order.
    pub const ALL: [Face; 3] = [Face::Clock, Face::Stopwatch, Face::Timer];
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Face::Clock => "Clock",
                Face::Stopwatch => "Stopwatch",
                Face::Timer => "Timer",
            }
        )
    }
}

/// Switches the selector to `face`.
#[derive(Debug, Clone)]
pub struct SelectMsg {
    /// The face to mount.
    pub face: Face,
}

/// The mounted widget.
#[derive(Debug, Clone)]
pub enum Mounted {
    /// The clock face.
    Clock(clockface::Model),
    /// The stopwatch.
    Stopwatch(stopwatch::Model),
    /// The countdown timer.
    Timer(timer::Model),
}

impl Mounted {
    fn engine(&mut self) -> &mut dyn Engine {
        match self {
            Mounted::Clock(m) => m,
            Mounted::Stopwatch(m) => m,
            Mounted::Timer(m) => m,
        }
    }

    fn face(&self) -> Face {
        match self {
            Mounted::Clock(_) => Face::Clock,
            Mounted::Stopwatch(_) => Face::Stopwatch,
            Mounted::Timer(_) => Face::Timer,
        }
    }
}

/// The face selector. Holds exactly one mounted widget.
#[derive(Debug, Clone)]
pub struct Model {
    clock: Arc<dyn Clock>,
    mounted: Mounted,
}

/// Creates a selector showing the timer.
pub fn new() -> Model {
    Model::new()
}

impl Default for Model {
    fn default() -> Self {
        Self::with_clock(clock::system())
    }
}

impl Model {
    /// Starts on the timer face.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every widget this selector mounts reads time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let mounted = Mounted::Timer(timer::Model::default().with_clock(Arc::clone(&clock)));
        Self { clock, mounted }
    }

    /// The face currently mounted.
    pub fn active(&self) -> Face {
        self.mounted.face()
    }

    /// Faces a host should offer to switch to.
    pub fn others(&self) -> Vec<Face> {
        let active = self.active();
        Face::ALL.into_iter().filter(|f| *f != active).collect()
    }

    /// The mounted widget.
    pub fn mounted(&self) -> &Mounted {
        &self.mounted
    }

    /// The mounted widget, for direct calls such as `start` or `clear`.
    pub fn mounted_mut(&mut self) -> &mut Mounted {
        &mut self.mounted
    }

    /// Mounts a fresh widget for `face`. Does nothing if it is already active.
    pub fn select(&mut self, face: Face) -> Option<Cmd> {
        if face == self.active() {
            return None;
        }

        self.mounted.engine().unmount();
        let clock = Arc::clone(&self.clock);
        self.mounted = match face {
            Face::Clock => Mounted::Clock(clockface::new().with_clock(clock)),
            Face::Stopwatch => Mounted::Stopwatch(stopwatch::new().with_clock(clock)),
            Face::Timer => Mounted::Timer(timer::Model::default().with_clock(clock)),
        };
        tracing::debug!(%face, "face selected");
        self.mounted.engine().mount()
    }

    /// Handles [`SelectMsg`] and forwards everything else to the mounted widget.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(select) = msg.downcast_ref::<SelectMsg>() {
            return self.select(select.face);
        }

        match &mut self.mounted {
            Mounted::Clock(m) => m.update(msg),
            Mounted::Stopwatch(m) => m.update(msg),
            Mounted::Timer(m) => m.update(msg),
        }
    }

    /// The mounted widget's reading.
    pub fn view(&self) -> String {
        match &self.mounted {
            Mounted::Clock(m) => m.view(),
            Mounted::Stopwatch(m) => m.view(),
            Mounted::Timer(m) => m.view(),
        }
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        let mut model = Self::new();
        let cmd = model.mounted.engine().mount();
        (model, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}
