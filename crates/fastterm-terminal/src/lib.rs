//! Terminal output for `fastterm`.
//!
//! This crate turns frame buffers into bytes on a terminal:
//!
//! - [`output`]: raw output backends ([`StdoutOutput`], [`FdOutput`], [`CaptureOutput`])
//! - [`writer`]: the batched escape-sequence [`Writer`]
//! - [`diff`]: the frame diff that decides which commands a frame needs
//! - [`draw_context`]: the triple-buffered [`DrawContext`] and its publish pipeline
//! - [`session`]: raw mode and alternate screen handling via crossterm
//! - [`pacer`] and [`config`]: frame pacing and render settings
//!
//! # Examples
//!
//! ```
//! use fastterm_buffer::{Cell, ExecutionMode};
//! use fastterm_core::{Color, Size};
//! use fastterm_terminal::{CaptureOutput, DrawContext, Writer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> fastterm_core::Result<()> {
//! let capture = CaptureOutput::new();
//! let writer = Writer::new(capture.clone()).shared();
//! let mut ctx = DrawContext::new(Size::new(4, 1));
//!
//! ctx.draw_cells(ExecutionMode::Sequential, |_| Cell::styled('=', Color::GREEN, Color::BLACK));
//! assert!(ctx.publish(&writer));
//! ctx.wait_flush().await;
//! assert!(capture.take_text().ends_with("===="));
//!
//! // Nothing changed, nothing is written.
//! ctx.draw_cells(ExecutionMode::Sequential, |_| Cell::styled('=', Color::GREEN, Color::BLACK));
//! assert!(ctx.publish(&writer));
//! ctx.close().await?;
//! assert!(capture.text().is_empty());
//! # Ok(())
//! # }
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
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod diff;
pub mod draw_context;
pub mod output;
pub mod pacer;
pub mod session;
pub mod writer;

pub use config::RenderConfig;
pub use diff::{FrameStats, write_frame};
pub use draw_context::DrawContext;
#[cfg(unix)]
pub use output::FdOutput;
pub use output::{CaptureOutput, ConsoleOutput, RawOutput, StdoutOutput};
pub use pacer::FramePacer;
pub use session::{TerminalSession, terminal_size};
pub use writer::{CommandWriter, SharedWriter, Writer};
