//! Where key events come from.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event};
use thiserror::Error;
use tracing::trace;

use crate::keyboard::KeyEvent;

/// Errors raised while reading input.
#[derive(Debug, Error)]
pub enum InputError {
    /// Reading from the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for input operations.
pub type InputResult<T> = std::result::Result<T, InputError>;

/// A non-blocking source of key events.
pub trait InputSource {
    /// Returns whether an event can be read without blocking.
    fn has_event(&mut self) -> InputResult<bool>;

    /// Reads the next event.
    ///
    /// Returns `None` when the event read was not a key event. Only call this
    /// after [`has_event`](Self::has_event) returned `true`, otherwise it may
    /// block.
    fn next_event(&mut self) -> InputResult<Option<KeyEvent>>;
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn has_event(&mut self) -> InputResult<bool> {
        (**self).has_event()
    }

    fn next_event(&mut self) -> InputResult<Option<KeyEvent>> {
        (**self).next_event()
    }
}

/// Reads key events from the terminal through crossterm.
///
/// The terminal should be in raw mode, see `TerminalSession` in
/// `fastterm-terminal`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermInput;

impl CrosstermInput {
    /// Creates a terminal input source.
    pub fn new() -> Self {
        Self
    }
}

impl InputSource for CrosstermInput {
    fn has_event(&mut self) -> InputResult<bool> {
        Ok(event::poll(Duration::ZERO)?)
    }

    fn next_event(&mut self) -> InputResult<Option<KeyEvent>> {
        match event::read()? {
            Event::Key(key) => Ok(Some(key.into())),
            other => {
                trace!(event = ?other, "ignoring non-key event");
                Ok(None)
            }
        }
    }
}

/// Replays a fixed queue of key events.
///
/// Useful for tests and scripted demos.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    events: VecDeque<KeyEvent>,
}

impl ScriptedInput {
    /// Creates a source that yields `events` in order.
    pub fn new(events: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Appends an event to the queue.
    pub fn push(&mut self, event: KeyEvent) {
        self.events.push_back(event);
    }

    /// Returns how many events are left.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputSource for ScriptedInput {
    fn has_event(&mut self) -> InputResult<bool> {
        Ok(!self.events.is_empty())
    }

    fn next_event(&mut self) -> InputResult<Option<KeyEvent>> {
        Ok(self.events.pop_front())
    }
}
