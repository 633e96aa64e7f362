//! Event handling for the TUI.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Terminal events.
#[derive(Debug, Clone)]
pub enum Event {
    /// Poll tick; the app reads the radio on every one
    Tick,
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Reading terminal input failed
    Error(String),
}

/// Event handler that polls for terminal events on a background thread.
///
/// The thread exits on its next send once the handler is dropped.
pub struct EventHandler {
    receiver: mpsc::Receiver<Event>,
}

impl EventHandler {
    /// Create a new event handler emitting a tick every `tick_rate`.
    ///
    /// The first tick is sent immediately.
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let error_sender = sender.clone();

        if let Err(e) = thread::Builder::new()
            .name("tui-events".into())
            .spawn(move || event_loop(sender, tick_rate))
        {
            let _ = error_sender.send(Event::Error(format!("event thread failed: {e}")));
        }

        Self { receiver }
    }

    /// Get the next event, blocking until one is available.
    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.receiver.recv()
    }
}

fn event_loop(sender: mpsc::Sender<Event>, tick_rate: Duration) {
    if sender.send(Event::Tick).is_err() {
        return;
    }
    let mut last_tick = Instant::now();
    loop {
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout).unwrap_or(false) {
            let forwarded = match event::read() {
                Ok(CrosstermEvent::Key(key)) => sender.send(Event::Key(key)),
                Ok(CrosstermEvent::Resize(width, height)) => {
                    sender.send(Event::Resize(width, height))
                }
                Ok(_) => Ok(()),
                Err(e) => sender.send(Event::Error(e.to_string())),
            };
            if forwarded.is_err() {
                break;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if sender.send(Event::Tick).is_err() {
                break;
            }
            last_tick = Instant::now();
        }
    }
}
