use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event consumed by the app loop.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One countdown interval elapsed while the session clock was running.
    Tick,
    /// The terminal event stream ended; the app should shut down.
    Quit,
}

/// Source of terminal events (keyboard, resize).
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event. `Err(Timeout)` means
    /// the span passed quietly.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Block until an event arrives. `None` means the source is gone.
    fn recv(&self) -> Option<AppEvent> {
        loop {
            match self.recv_timeout(Duration::from_secs(60)) {
                Ok(ev) => return Some(ev),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

/// Production event source backed by crossterm's blocking reader.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
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
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Scripted event source for tests.
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Event pump with a cancellable countdown timer.
///
/// Ticks only exist while the caller reports the session clock running: each
/// quiet `tick_interval` then becomes one [`AppEvent::Tick`]. With the clock
/// stopped the pump blocks for real terminal input and synthesizes nothing,
/// so an idle, completed, or discarded session never hears from a timer.
pub struct EventPump<S: EventSource> {
    source: S,
    tick_interval: Duration,
}

impl<S: EventSource> EventPump<S> {
    pub fn new(source: S, tick_interval: Duration) -> Self {
        Self {
            source,
            tick_interval,
        }
    }

    /// Next event for the app loop. `clock_running` arms the tick timer.
    pub fn next_event(&self, clock_running: bool) -> AppEvent {
        if clock_running {
            match self.source.recv_timeout(self.tick_interval) {
                Ok(ev) => ev,
                Err(RecvTimeoutError::Timeout) => AppEvent::Tick,
                Err(RecvTimeoutError::Disconnected) => AppEvent::Quit,
            }
        } else {
            self.source.recv().unwrap_or(AppEvent::Quit)
        }
    }
}
