//! Cells and frame buffers for fastterm.
//!
//! - [`Cell`]: a character with translucent foreground and background colors
//! - [`FrameBuffer`]: a resizable row-major grid of cells
//! - [`ExecutionMode`]: whether whole-buffer work runs on one thread or many
//!
//! Drawing composes new cells *beneath* what is already there: the first
//! thing drawn at a position ends up on top, and once a cell's background is
//! opaque nothing drawn later can change it.
//!
//! # Examples
//!
//! ```
//! use fastterm_buffer::{Cell, ExecutionMode, FrameBuffer};
//! use fastterm_core::{Color, Rect, Size};
//!
//! let mut frame = FrameBuffer::new(Size::new(10, 3));
//!
//! // A label, then a translucent panel beneath it.
//! frame.draw_cells(Rect::new(1, 1, 2, 1), ExecutionMode::Sequential, |p| {
//!     Cell::new(['o', 'k'][p.x as usize])
//! });
//! frame.draw_cells(frame.bounds(), ExecutionMode::Parallel, |_| {
//!     Cell::filled(Color::argb(160, 0, 0, 128))
//! });
//!
//! assert_eq!(frame.row_text(1).as_deref(), Some(" ok       "));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::missing_panics_doc)]

mod cell;
mod frame_buffer;
pub mod parallel;

pub use cell::Cell;
pub use frame_buffer::{FrameBuffer, SizeChange};
pub use parallel::ExecutionMode;
