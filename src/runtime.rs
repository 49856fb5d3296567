//! Event loop plumbing for the terminal front-end.
//!
//! Terminal input arrives on a background thread and is handed to the loop
//! through a channel. When nothing arrives within the frame interval the loop
//! still wakes with [`GameEvent::Frame`], so the session clock keeps moving and
//! a mismatched pair flips back even while no key is pressed. Every wake-up
//! reports how much wall-clock time has passed, which is what
//! [`crate::session::Session::advance`] consumes.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// What woke the game loop
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// No input within the frame interval; redraw with the clock moved on
    Frame,
}

/// Where the loop's input comes from: the terminal, or a channel in tests
pub trait GameEventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Reads the terminal on its own thread so the loop can wait with a deadline
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                // key releases show up on some platforms; only presses count as clicks
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => GameEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => GameEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for driving the loop from tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// How long the loop waits for input before drawing a frame anyway
pub trait FrameRate: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedFrameRate {
    interval: Duration,
}

impl FixedFrameRate {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl FrameRate for FixedFrameRate {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Waits for the next event and measures the time between wake-ups
pub struct Runner<E: GameEventSource, F: FrameRate> {
    event_source: E,
    frame_rate: F,
    last_wake: Instant,
}

impl<E: GameEventSource, F: FrameRate> Runner<E, F> {
    pub fn new(event_source: E, frame_rate: F) -> Self {
        Self {
            event_source,
            frame_rate,
            last_wake: Instant::now(),
        }
    }

    /// Next event, or `Frame` once the interval passes without input.
    /// A closed source also yields `Frame` so the clock keeps running.
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.frame_rate.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Frame,
        }
    }

    /// Wall-clock time since the previous call
    pub fn elapsed(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last_wake);
        self.last_wake = now;
        dt
    }

    /// One loop iteration: the event that woke us and the time to feed the session.
    pub fn wait(&mut self) -> (GameEvent, Duration) {
        let event = self.step();
        (event, self.elapsed())
    }
}
