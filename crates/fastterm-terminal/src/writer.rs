//! Batched escape-sequence writer.
//!
//! Commands are appended to an in-memory staging buffer and only reach the
//! raw output on a flush, so a whole frame of small escape sequences becomes
//! one write.

use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fastterm_core::{Color, Error, Point, Result};
use tokio_util::sync::CancellationToken;

use crate::output::{ConsoleOutput, RawOutput};

/// Clears the screen and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";
/// Moves the cursor to the top-left cell.
pub const RESET_CURSOR: &str = "\x1b[1;1H";
/// Makes the cursor visible.
pub const SHOW_CURSOR: &str = "\x1b[?25h";
/// Hides the cursor.
pub const HIDE_CURSOR: &str = "\x1b[?25l";

/// A writer shared between the drawing thread and the background flush.
pub type SharedWriter<O> = Arc<tokio::sync::Mutex<Writer<O>>>;

/// The synchronous command set.
///
/// Every method stages its command and, when `flush` is set, pushes all
/// staged bytes to the output. Only [`write_str`](Self::write_str),
/// [`write_fmt_args`](Self::write_fmt_args) and
/// [`flush_commands`](Self::flush_commands) need implementing.
pub trait CommandWriter {
    /// Stages raw text.
    fn write_str(&mut self, text: &str, flush: bool) -> Result<()>;

    /// Stages formatted text without an intermediate allocation.
    fn write_fmt_args(&mut self, args: fmt::Arguments<'_>, flush: bool) -> Result<()>;

    /// Sends every staged byte to the output, flushes it and empties the stage.
    fn flush_commands(&mut self) -> Result<()>;

    /// Stages a single character.
    fn write_char(&mut self, character: char, flush: bool) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write_str(character.encode_utf8(&mut buf), flush)
    }

    /// Sets the 24-bit foreground color. Alpha is ignored.
    fn write_foreground_color(&mut self, color: Color, flush: bool) -> Result<()> {
        self.write_fmt_args(
            format_args!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b),
            flush,
        )
    }

    /// Sets the 24-bit background color. Alpha is ignored.
    fn write_background_color(&mut self, color: Color, flush: bool) -> Result<()> {
        self.write_fmt_args(
            format_args!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b),
            flush,
        )
    }

    /// Clears the screen and homes the cursor.
    fn write_clear(&mut self, flush: bool) -> Result<()> {
        self.write_str(CLEAR_SCREEN, flush)
    }

    /// Moves the cursor to the top-left cell.
    fn write_reset_cursor(&mut self, flush: bool) -> Result<()> {
        self.write_str(RESET_CURSOR, flush)
    }

    /// Moves the cursor to the zero-based cell `position`.
    fn write_cursor_position(&mut self, position: Point, flush: bool) -> Result<()> {
        self.write_fmt_args(
            format_args!("\x1b[{};{}H", position.y + 1, position.x + 1),
            flush,
        )
    }

    /// Shows the cursor.
    fn write_show_cursor(&mut self, flush: bool) -> Result<()> {
        self.write_str(SHOW_CURSOR, flush)
    }

    /// Hides the cursor.
    fn write_hide_cursor(&mut self, flush: bool) -> Result<()> {
        self.write_str(HIDE_CURSOR, flush)
    }
}

fn lock<O>(output: &Mutex<O>) -> MutexGuard<'_, O> {
    output.lock().unwrap_or_else(PoisonError::into_inner)
}

fn write_out<O: RawOutput>(output: &mut O, bytes: &[u8]) -> std::io::Result<()> {
    if !bytes.is_empty() {
        output.write_all(bytes)?;
    }
    output.flush()
}

/// Stages terminal commands and flushes them to a [`RawOutput`].
///
/// # Examples
///
/// ```
/// use fastterm_core::{Color, Point};
/// use fastterm_terminal::{CaptureOutput, CommandWriter, Writer};
///
/// let capture = CaptureOutput::new();
/// let mut writer = Writer::new(capture.clone());
/// writer.write_cursor_position(Point::new(4, 1), false).unwrap();
/// writer.write_foreground_color(Color::RED, false).unwrap();
/// writer.write_str("hi", true).unwrap();
///
/// assert_eq!(capture.text(), "\x1b[2;5H\x1b[38;2;255;0;0mhi");
/// assert_eq!(capture.write_count(), 1);
/// ```
pub struct Writer<O: RawOutput> {
    staging: String,
    output: Arc<Mutex<O>>,
}

impl<O: RawOutput> Writer<O> {
    /// Default staging capacity, enough for a full repaint of a large screen.
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// Creates a writer over `output`.
    pub fn new(output: O) -> Self {
        Self::with_capacity(output, Self::DEFAULT_CAPACITY)
    }

    /// Creates a writer with a staging buffer of the given capacity.
    pub fn with_capacity(output: O, capacity: usize) -> Self {
        Self {
            staging: String::with_capacity(capacity),
            output: Arc::new(Mutex::new(output)),
        }
    }

    /// Wraps the writer for use with [`DrawContext::publish`](crate::DrawContext::publish).
    pub fn shared(self) -> SharedWriter<O> {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// Returns the staged, not yet flushed text.
    #[inline]
    pub fn pending(&self) -> &str {
        &self.staging
    }

    /// Returns whether nothing is staged.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.staging.is_empty()
    }

    /// Drops staged commands without writing them.
    pub fn discard(&mut self) {
        self.staging.clear();
    }

    // ========================================================================
    // Asynchronous variants
    // ========================================================================

    /// Sends staged bytes to the output from the blocking pool.
    ///
    /// Cancellation is checked once, before the output is touched. A cancelled
    /// flush keeps the staged bytes. Once started, the write always completes.
    pub async fn flush_commands_async(&mut self, cancel: &CancellationToken) -> Result<()> {
        Self::check_cancelled(cancel)?;

        let staged = std::mem::take(&mut self.staging);
        let output = Arc::clone(&self.output);
        let (result, mut staged) = tokio::task::spawn_blocking(move || {
            let result = write_out(&mut *lock(&output), staged.as_bytes());
            (result, staged)
        })
        .await
        .map_err(|e| Error::FlushTask(e.to_string()))?;

        // Keep the allocation for the next frame.
        staged.clear();
        self.staging = staged;
        result.map_err(Error::Io)
    }

    fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn finish_async(&mut self, flush: bool, cancel: &CancellationToken) -> Result<()> {
        if flush {
            self.flush_commands_async(cancel).await
        } else {
            Ok(())
        }
    }

    /// Asynchronous [`CommandWriter::write_str`].
    pub async fn write_str_async(
        &mut self,
        text: &str,
        flush: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        Self::check_cancelled(cancel)?;
        self.write_str(text, false)?;
        self.finish_async(flush, cancel).await
    }

    /// Asynchronous [`CommandWriter::write_foreground_color`].
    pub async fn write_foreground_color_async(
        &mut self,
        color: Color,
        flush: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        Self::check_cancelled(cancel)?;
        self.write_foreground_color(color, false)?;
        self.finish_async(flush, cancel).await
    }

    /// Asynchronous [`CommandWriter::write_background_color`].
    pub async fn write_background_color_async(
        &mut self,
        color: Color,
        flush: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        Self::check_cancelled(cancel)?;
        self.write_background_color(color, false)?;
        self.finish_async(flush, cancel).await
    }

    /// Asynchronous [`CommandWriter::write_clear`].
    pub async fn write_clear_async(&mut self, flush: bool, cancel: &CancellationToken) -> Result<()> {
        Self::check_cancelled(cancel)?;
        self.write_clear(false)?;
        self.finish_async(flush, cancel).await
    }

    /// Asynchronous [`CommandWriter::write_reset_cursor`].
    pub async fn write_reset_cursor_async(
        &mut self,
        flush: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        Self::check_cancelled(cancel)?;
        self.write_reset_cursor(false)?;
        self.finish_async(flush, cancel).await
    }

    /// Asynchronous [`CommandWriter::write_cursor_position`].
    pub async fn write_cursor_position_async(
        &mut self,
        position: Point,
        flush: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        Self::check_cancelled(cancel)?;
        self.write_cursor_position(position, false)?;
        self.finish_async(flush, cancel).await
    }

    /// Asynchronous [`CommandWriter::write_show_cursor`].
    pub async fn write_show_cursor_async(
        &mut self,
        flush: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        Self::check_cancelled(cancel)?;
        self.write_show_cursor(false)?;
        self.finish_async(flush, cancel).await
    }

    /// Asynchronous [`CommandWriter::write_hide_cursor`].
    pub async fn write_hide_cursor_async(
        &mut self,
        flush: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        Self::check_cancelled(cancel)?;
        self.write_hide_cursor(false)?;
        self.finish_async(flush, cancel).await
    }

    /// Flushes outstanding commands and the output, then releases the writer.
    pub async fn close(mut self) -> Result<()> {
        self.flush_commands_async(&CancellationToken::new()).await
    }
}

impl Writer<ConsoleOutput> {
    /// Creates a writer over the platform's standard output.
    pub fn console() -> Self {
        Self::new(ConsoleOutput::detect())
    }
}

impl<O: RawOutput> CommandWriter for Writer<O> {
    fn write_str(&mut self, text: &str, flush: bool) -> Result<()> {
        self.staging.push_str(text);
        if flush {
            self.flush_commands()?;
        }
        Ok(())
    }

    fn write_fmt_args(&mut self, args: fmt::Arguments<'_>, flush: bool) -> Result<()> {
        self.staging
            .write_fmt(args)
            .map_err(|_| Error::Io(std::io::Error::other("formatting a command failed")))?;
        if flush {
            self.flush_commands()?;
        }
        Ok(())
    }

    fn write_char(&mut self, character: char, flush: bool) -> Result<()> {
        self.staging.push(character);
        if flush {
            self.flush_commands()?;
        }
        Ok(())
    }

    fn flush_commands(&mut self) -> Result<()> {
        let result = write_out(&mut *lock(&self.output), self.staging.as_bytes());
        self.staging.clear();
        result.map_err(Error::Io)
    }
}

impl<O: RawOutput> fmt::Debug for Writer<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("pending", &self.staging.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CaptureOutput;

    fn capture_writer() -> (CaptureOutput, Writer<CaptureOutput>) {
        let capture = CaptureOutput::new();
        let writer = Writer::new(capture.clone());
        (capture, writer)
    }

    mod encoding_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_escape_sequences_are_exact() {
            let (capture, mut writer) = capture_writer();
            writer.write_clear(false).unwrap();
            writer.write_reset_cursor(false).unwrap();
            writer.write_show_cursor(false).unwrap();
            writer.write_hide_cursor(false).unwrap();
            writer.write_cursor_position(Point::new(0, 0), false).unwrap();
            writer.write_cursor_position(Point::new(79, 23), false).unwrap();
            writer.write_foreground_color(Color::argb(10, 1, 22, 255), false).unwrap();
            writer.write_background_color(Color::rgb(0, 128, 64), false).unwrap();
            writer.flush_commands().unwrap();

            assert_eq!(
                capture.text(),
                concat!(
                    "\x1b[2J\x1b[1;1H",
                    "\x1b[1;1H",
                    "\x1b[?25h",
                    "\x1b[?25l",
                    "\x1b[1;1H",
                    "\x1b[24;80H",
                    "\x1b[38;2;1;22;255m",
                    "\x1b[48;2;0;128;64m",
                )
            );
        }

        #[test]
        fn test_text_is_utf8() {
            let (capture, mut writer) = capture_writer();
            writer.write_str("é", false).unwrap();
            writer.write_char('█', true).unwrap();
            assert_eq!(capture.bytes(), "é█".as_bytes());
        }
    }

    mod flush_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_commands_batch_until_flush() {
            let (capture, mut writer) = capture_writer();
            writer.write_str("a", false).unwrap();
            writer.write_hide_cursor(false).unwrap();
            assert_eq!(capture.write_count(), 0);
            assert_eq!(writer.pending(), "a\x1b[?25l");

            writer.write_str("b", true).unwrap();
            assert_eq!(capture.write_count(), 1);
            assert_eq!(capture.flush_count(), 1);
            assert_eq!(capture.text(), "a\x1b[?25lb");
            assert!(writer.is_idle());
        }

        #[test]
        fn test_discard() {
            let (capture, mut writer) = capture_writer();
            writer.write_str("gone", false).unwrap();
            writer.discard();
            writer.flush_commands().unwrap();
            assert_eq!(capture.text(), "");
            assert_eq!(capture.write_count(), 0);
        }

        #[tokio::test]
        async fn test_async_flush() {
            let (capture, mut writer) = capture_writer();
            let cancel = CancellationToken::new();
            writer
                .write_cursor_position_async(Point::new(2, 3), false, &cancel)
                .await
                .unwrap();
            writer.write_str_async("x", true, &cancel).await.unwrap();
            assert_eq!(capture.text(), "\x1b[4;3Hx");
            assert!(writer.is_idle());
        }

        #[tokio::test]
        async fn test_cancelled_flush_keeps_staged_bytes() {
            let (capture, mut writer) = capture_writer();
            let cancel = CancellationToken::new();
            writer.write_str("keep", false).unwrap();
            cancel.cancel();

            let err = writer.flush_commands_async(&cancel).await.unwrap_err();
            assert!(err.is_cancelled());
            assert_eq!(writer.pending(), "keep");
            assert_eq!(capture.write_count(), 0);

            let err = writer.write_hide_cursor_async(true, &cancel).await.unwrap_err();
            assert!(err.is_cancelled());
            assert_eq!(writer.pending(), "keep");

            writer.close().await.unwrap();
            assert_eq!(capture.text(), "keep");
        }
    }
}
