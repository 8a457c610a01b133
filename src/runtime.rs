use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEventKind};

use crate::input::{command_for_key, Command};

/// What the game loop reacts to. Raw keys are already resolved to commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(Command),
    Resize,
    /// Nothing arrived before the wait ran out; time to look at due timers.
    Tick,
}

/// Resolve a terminal event. Key releases, unbound keys and mouse or focus
/// events yield nothing.
pub fn translate(event: CtEvent) -> Option<GameEvent> {
    match event {
        // Windows reports releases too
        CtEvent::Key(key) if key.kind == KeyEventKind::Release => None,
        CtEvent::Key(key) => command_for_key(key).map(GameEvent::Command),
        CtEvent::Resize(_, _) => Some(GameEvent::Resize),
        _ => None,
    }
}

pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Reads the terminal on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(raw) => match translate(raw) {
                    Some(evt) => evt,
                    None => continue,
                },
                Err(_) => break,
            };
            if tx.send(evt).is_err() {
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

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Scripted events for headless runs
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Waits for the next event, but never past the next game timer or one frame.
pub struct Runner<E: EventSource> {
    event_source: E,
    frame: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, frame: Duration) -> Self {
        Self {
            event_source,
            frame,
        }
    }

    pub fn wait_for(&self, until_timer: Option<Duration>) -> Duration {
        until_timer.map_or(self.frame, |d| d.min(self.frame))
    }

    /// Next event, or `Tick` once the wait is over or the source is gone.
    pub fn step(&self, until_timer: Option<Duration>) -> GameEvent {
        match self.event_source.recv_timeout(self.wait_for(until_timer)) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}
