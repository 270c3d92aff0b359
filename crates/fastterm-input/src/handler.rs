//! Dispatching key events to callbacks.

use tracing::debug;

use crate::keyboard::KeyEvent;
use crate::source::{InputResult, InputSource};

type KeyCallback = Box<dyn FnMut(&KeyEvent) + Send>;

/// Drains an [`InputSource`] and hands every key event to registered callbacks.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use fastterm_input::{InputHandler, KeyEvent, ScriptedInput};
///
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&seen);
///
/// let mut input = InputHandler::new(ScriptedInput::new([KeyEvent::char('a'), KeyEvent::char('b')]));
/// input.on_key(move |_| {
///     counter.fetch_add(1, Ordering::Relaxed);
/// });
///
/// assert_eq!(input.process_events().unwrap(), 2);
/// assert_eq!(seen.load(Ordering::Relaxed), 2);
/// ```
pub struct InputHandler<S: InputSource> {
    source: S,
    callbacks: Vec<KeyCallback>,
}

impl<S: InputSource> InputHandler<S> {
    /// Creates a handler reading from `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            callbacks: Vec::new(),
        }
    }

    /// Registers a callback invoked for every key event, in registration order.
    pub fn on_key<F>(&mut self, callback: F)
    where
        F: FnMut(&KeyEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Removes every callback.
    pub fn clear_callbacks(&mut self) {
        self.callbacks.clear();
    }

    /// Dispatches every event available without blocking.
    ///
    /// Returns how many key events were dispatched. Non-key events are
    /// consumed and skipped.
    pub fn process_events(&mut self) -> InputResult<usize> {
        let mut dispatched = 0;
        while self.source.has_event()? {
            let Some(event) = self.source.next_event()? else {
                continue;
            };
            debug!(key = %event, "key event");
            for callback in &mut self.callbacks {
                callback(&event);
            }
            dispatched += 1;
        }
        Ok(dispatched)
    }

    /// Returns the source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the source mutably.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consumes the handler and returns the source.
    pub fn into_source(self) -> S {
        self.source
    }
}
