//! fastterm: a triple-buffered terminal renderer that repaints only what changed.
//!
//! The workspace is split into:
//!
//! - [`fastterm_core`]: colors, geometry, alignment and the shared error type
//! - [`fastterm_buffer`]: cells and frame buffers
//! - [`fastterm_terminal`]: the escape-sequence writer, frame diff and
//!   [`DrawContext`](fastterm_terminal::DrawContext)
//! - [`fastterm_input`]: keyboard sources and dispatch
//!
//! Most applications only need the [`prelude`].
//!
//! # Examples
//!
//! ```
//! use fastterm::prelude::*;
//!
//! let capture = CaptureOutput::new();
//! let writer = Writer::new(capture.clone()).shared();
//! let mut ctx = DrawContext::new(Size::new(12, 1));
//!
//! ctx.push_rectangle(Rect::new(0, 0, 12, 1), Alignment::TopLeft);
//! ctx.push_rectangle(Rect::new(0, 0, 5, 1), Alignment::Center);
//! ctx.draw_cells(ExecutionMode::Sequential, |p| {
//!     Cell::styled("hello".chars().nth(p.x as usize).unwrap_or(' '), Color::WHITE, Color::BLACK)
//! });
//!
//! // Without a Tokio runtime the frame is written on the calling thread.
//! assert!(ctx.publish(&writer));
//! assert!(capture.text().contains("hello"));
//! ```

#![warn(missing_docs)]

pub use fastterm_buffer;
pub use fastterm_core;
pub use fastterm_input;
pub use fastterm_terminal;

/// The types needed to draw and publish frames.
pub mod prelude {
    pub use fastterm_buffer::{Cell, ExecutionMode, FrameBuffer, SizeChange};
    pub use fastterm_core::{Alignment, Color, Error, Point, Rect, Result, Size};
    pub use fastterm_input::{CrosstermInput, InputHandler, InputSource, KeyCode, KeyEvent, KeyModifiers};
    pub use fastterm_terminal::{
        CaptureOutput, CommandWriter, ConsoleOutput, DrawContext, FramePacer, FrameStats, RawOutput,
        RenderConfig, SharedWriter, TerminalSession, Writer,
    };
}
