//! Key events.

use bitflags::bitflags;
use std::fmt;

/// Whether a key went down, repeated or came up.
///
/// Most terminals only report presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed.
    #[default]
    Press,
    /// Key is held and repeating.
    Repeat,
    /// Key was released.
    Release,
}

impl From<crossterm::event::KeyEventKind> for KeyEventKind {
    fn from(kind: crossterm::event::KeyEventKind) -> Self {
        match kind {
            crossterm::event::KeyEventKind::Press => Self::Press,
            crossterm::event::KeyEventKind::Repeat => Self::Repeat,
            crossterm::event::KeyEventKind::Release => Self::Release,
        }
    }
}

/// A key on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Backspace.
    Backspace,
    /// Enter / Return.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab.
    Tab,
    /// Shift+Tab.
    BackTab,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Function key F1-F24.
    F(u8),
    /// A printable character.
    Char(char),
    /// Escape.
    Esc,
    /// Anything else the terminal reports.
    Other,
}

impl KeyCode {
    /// Returns the lowercase name of the key.
    pub fn name(&self) -> String {
        match self {
            Self::Backspace => "backspace".to_string(),
            Self::Enter => "enter".to_string(),
            Self::Left => "left".to_string(),
            Self::Right => "right".to_string(),
            Self::Up => "up".to_string(),
            Self::Down => "down".to_string(),
            Self::Home => "home".to_string(),
            Self::End => "end".to_string(),
            Self::PageUp => "pageup".to_string(),
            Self::PageDown => "pagedown".to_string(),
            Self::Tab => "tab".to_string(),
            Self::BackTab => "backtab".to_string(),
            Self::Delete => "delete".to_string(),
            Self::Insert => "insert".to_string(),
            Self::F(n) => format!("f{n}"),
            Self::Char(c) => c.to_string(),
            Self::Esc => "escape".to_string(),
            Self::Other => "other".to_string(),
        }
    }

    /// Returns whether this is an arrow key.
    pub fn is_arrow_key(&self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Up | Self::Down)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<crossterm::event::KeyCode> for KeyCode {
    fn from(code: crossterm::event::KeyCode) -> Self {
        use crossterm::event::KeyCode as CT;
        match code {
            CT::Backspace => Self::Backspace,
            CT::Enter => Self::Enter,
            CT::Left => Self::Left,
            CT::Right => Self::Right,
            CT::Up => Self::Up,
            CT::Down => Self::Down,
            CT::Home => Self::Home,
            CT::End => Self::End,
            CT::PageUp => Self::PageUp,
            CT::PageDown => Self::PageDown,
            CT::Tab => Self::Tab,
            CT::BackTab => Self::BackTab,
            CT::Delete => Self::Delete,
            CT::Insert => Self::Insert,
            CT::F(n) => Self::F(n),
            CT::Char(c) => Self::Char(c),
            CT::Esc => Self::Esc,
            _ => Self::Other,
        }
    }
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        /// No modifiers.
        const NONE = 0;
        /// Shift.
        const SHIFT = 1;
        /// Control.
        const CONTROL = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Super / Windows / Command.
        const SUPER = 1 << 3;
    }
}

impl fmt::Display for KeyModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::CONTROL, "Ctrl"),
            (Self::ALT, "Alt"),
            (Self::SHIFT, "Shift"),
            (Self::SUPER, "Super"),
        ];
        let parts: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if parts.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&parts.join("+"))
        }
    }
}

impl From<crossterm::event::KeyModifiers> for KeyModifiers {
    fn from(mods: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers as CT;
        let mut result = Self::NONE;
        for (theirs, ours) in [
            (CT::SHIFT, Self::SHIFT),
            (CT::CONTROL, Self::CONTROL),
            (CT::ALT, Self::ALT),
            (CT::SUPER, Self::SUPER),
        ] {
            if mods.contains(theirs) {
                result |= ours;
            }
        }
        result
    }
}

/// A single keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key.
    pub code: KeyCode,
    /// Modifiers held at the time.
    pub modifiers: KeyModifiers,
    /// Press, repeat or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Creates a key press.
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    /// Creates a press of a character key without modifiers.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    /// Returns whether Control is held.
    #[inline]
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(KeyModifiers::CONTROL)
    }

    /// Returns whether this is a press.
    #[inline]
    pub fn is_press(&self) -> bool {
        self.kind == KeyEventKind::Press
    }

    /// Returns whether this is a press of `c`, ignoring Shift.
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c) && (self.modifiers - KeyModifiers::SHIFT).is_empty()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}+{}", self.modifiers, self.code)
        }
    }
}

impl From<crossterm::event::KeyEvent> for KeyEvent {
    fn from(event: crossterm::event::KeyEvent) -> Self {
        Self {
            code: event.code.into(),
            modifiers: event.modifiers.into(),
            kind: event.kind.into(),
        }
    }
}
