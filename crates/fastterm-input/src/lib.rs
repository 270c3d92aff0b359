//! Keyboard input for `fastterm`.
//!
//! - [`keyboard`]: the key event model and crossterm conversions
//! - [`source`]: the [`InputSource`] trait, the terminal-backed [`CrosstermInput`]
//!   and the replaying [`ScriptedInput`]
//! - [`handler`]: [`InputHandler`], which drains a source and dispatches key
//!   events to callbacks
//!
//! Input is polled, never awaited: call [`InputHandler::process_events`] once
//! per frame tick.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]

pub mod handler;
pub mod keyboard;
pub mod source;

pub use handler::InputHandler;
pub use keyboard::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
pub use source::{CrosstermInput, InputError, InputResult, InputSource, ScriptedInput};
