//! Terminal mode management.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
    },
};
use fastterm_core::{Error, Result, Size};
use tracing::debug;

/// Puts the terminal into full-screen rendering mode and restores it.
///
/// [`enter`](Self::enter) enables raw mode, switches to the alternate screen
/// and hides the cursor. [`leave`](Self::leave), or dropping the session,
/// undoes whatever was done, so a panic never leaves the shell in raw mode.
pub struct TerminalSession {
    stdout: Stdout,
    in_raw_mode: bool,
    in_alternate_screen: bool,
    cursor_hidden: bool,
}

impl TerminalSession {
    /// Creates a session without touching the terminal.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            in_raw_mode: false,
            in_alternate_screen: false,
            cursor_hidden: false,
        }
    }

    /// Creates a session and enters rendering mode.
    pub fn start() -> Result<Self> {
        let mut session = Self::new();
        session.enter()?;
        Ok(session)
    }

    /// Enables raw mode, the alternate screen and hides the cursor.
    pub fn enter(&mut self) -> Result<()> {
        if !self.in_raw_mode {
            enable_raw_mode().map_err(Error::Io)?;
            self.in_raw_mode = true;
        }
        if !self.in_alternate_screen {
            execute!(self.stdout, EnterAlternateScreen).map_err(Error::Io)?;
            self.in_alternate_screen = true;
        }
        if !self.cursor_hidden {
            execute!(self.stdout, Hide).map_err(Error::Io)?;
            self.cursor_hidden = true;
        }
        debug!("terminal session entered");
        Ok(())
    }

    /// Restores the cursor, the main screen and cooked mode.
    pub fn leave(&mut self) -> Result<()> {
        if self.cursor_hidden {
            execute!(self.stdout, Show).map_err(Error::Io)?;
            self.cursor_hidden = false;
        }
        if self.in_alternate_screen {
            execute!(self.stdout, LeaveAlternateScreen).map_err(Error::Io)?;
            self.in_alternate_screen = false;
        }
        if self.in_raw_mode {
            disable_raw_mode().map_err(Error::Io)?;
            self.in_raw_mode = false;
        }
        self.stdout.flush().map_err(Error::Io)?;
        debug!("terminal session left");
        Ok(())
    }

    /// Returns whether the session currently owns the terminal.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.in_raw_mode || self.in_alternate_screen || self.cursor_hidden
    }

    /// Returns the terminal size in cells.
    pub fn size(&self) -> Result<Size> {
        terminal_size()
    }
}

impl Default for TerminalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        // Best-effort cleanup on drop
        let _ = self.leave();
    }
}

/// Returns the current terminal size in cells.
pub fn terminal_size() -> Result<Size> {
    let (width, height) = size().map_err(Error::Io)?;
    Ok(Size::new(width, height))
}
