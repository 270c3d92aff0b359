//! Raw output channels.
//!
//! A [`RawOutput`] accepts already-encoded bytes and may be flushed. The
//! [`Writer`](crate::Writer) batches escape sequences and hands each frame to
//! its output in a single call.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A byte sink the writer flushes its staged commands into.
pub trait RawOutput: Send + 'static {
    /// Writes every byte of `bytes`, or fails.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flushes anything the channel itself buffers.
    fn flush(&mut self) -> io::Result<()>;
}

impl RawOutput for Box<dyn RawOutput> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

// ============================================================================
// Standard output
// ============================================================================

/// Portable output through [`std::io::Stdout`].
#[derive(Debug)]
pub struct StdoutOutput {
    stdout: Stdout,
}

impl StdoutOutput {
    /// Creates an output writing to the process's standard output.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl RawOutput for StdoutOutput {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stdout.lock().write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.lock().flush()
    }
}

// ============================================================================
// File descriptor
// ============================================================================

/// Unbuffered output straight to a file descriptor with `write(2)`.
///
/// Bypasses the standard library's line buffering, so a frame reaches the
/// terminal in as few syscalls as possible.
#[cfg(unix)]
#[derive(Debug)]
pub struct FdOutput {
    fd: std::os::fd::RawFd,
}

#[cfg(unix)]
impl FdOutput {
    /// Largest slice handed to a single `write(2)` call.
    pub const WRITE_CHUNK: usize = 64 * 1024;

    /// Writes to descriptor 1.
    pub fn stdout() -> Self {
        Self {
            fd: libc::STDOUT_FILENO,
        }
    }

    /// Writes to an arbitrary descriptor. The descriptor is not closed on drop.
    pub fn from_raw_fd(fd: std::os::fd::RawFd) -> Self {
        Self { fd }
    }

    /// Returns whether the descriptor refers to a terminal.
    pub fn is_terminal(&self) -> bool {
        // SAFETY: isatty only inspects the descriptor number.
        unsafe { libc::isatty(self.fd) == 1 }
    }
}

#[cfg(unix)]
impl RawOutput for FdOutput {
    fn write_all(&mut self, mut bytes: &[u8]) -> io::Result<()> {
        while !bytes.is_empty() {
            let chunk = &bytes[..bytes.len().min(Self::WRITE_CHUNK)];
            // SAFETY: `chunk` is a live, readable slice of exactly `chunk.len()` bytes.
            let written = unsafe { libc::write(self.fd, chunk.as_ptr().cast(), chunk.len()) };
            if written < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if written == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "raw output accepted no bytes",
                ));
            }
            bytes = &bytes[written as usize..];
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Platform selection
// ============================================================================

/// The output chosen for the current platform at startup.
#[derive(Debug)]
pub enum ConsoleOutput {
    /// Direct descriptor writes, used when stdout is a terminal on unix.
    #[cfg(unix)]
    Fd(FdOutput),
    /// Buffered standard output everywhere else.
    Stdout(StdoutOutput),
}

impl ConsoleOutput {
    /// Picks the fastest output available for standard output.
    pub fn detect() -> Self {
        #[cfg(unix)]
        {
            let fd = FdOutput::stdout();
            if fd.is_terminal() {
                return Self::Fd(fd);
            }
        }
        Self::Stdout(StdoutOutput::new())
    }
}

impl RawOutput for ConsoleOutput {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Fd(output) => output.write_all(bytes),
            Self::Stdout(output) => output.write_all(bytes),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Fd(output) => output.flush(),
            Self::Stdout(output) => output.flush(),
        }
    }
}

// ============================================================================
// In-memory capture
// ============================================================================

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    writes: usize,
    flushes: usize,
}

/// Records every byte written, for tests and frame recording.
///
/// Clones share the same recording, so keep one handle and give the other
/// to the writer.
#[derive(Debug, Clone, Default)]
pub struct CaptureOutput {
    inner: Arc<Mutex<Captured>>,
}

impl CaptureOutput {
    /// Creates an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Captured> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of everything written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.lock().bytes.clone()
    }

    /// Returns everything written so far as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.lock().bytes).into_owned()
    }

    /// Removes and returns the recorded bytes as text.
    pub fn take_text(&self) -> String {
        let bytes = std::mem::take(&mut self.lock().bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Returns how many `write_all` calls carried data.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Returns how many times the output was flushed.
    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }
}

impl RawOutput for CaptureOutput {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut captured = self.lock();
        captured.bytes.extend_from_slice(bytes);
        captured.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flushes += 1;
        Ok(())
    }
}
