//! Error types for fastterm operations.

use thiserror::Error;

/// Core error type shared by every fastterm crate.
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error occurred while talking to the raw output channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An asynchronous operation was cancelled before it reached the output.
    #[error("operation cancelled")]
    Cancelled,

    /// The background flush task panicked or was aborted.
    #[error("flush task failed: {0}")]
    FlushTask(String),

    /// An alignment name did not match any known alignment.
    #[error("unknown alignment: {0}")]
    UnknownAlignment(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    ColorParse(#[from] ColorParseError),

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Returns whether this error is a cancellation rather than a failure.
    #[inline]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias using the core Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for color parsing operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Input string was empty.
    #[error("empty input")]
    EmptyInput,

    /// Hex string had an invalid length.
    #[error("invalid hex length: {0} (expected 3, 4, 6, or 8)")]
    InvalidLength(usize),

    /// Invalid hexadecimal character.
    #[error("invalid hex character")]
    InvalidHexChar,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("pipe closed"));
    }

    #[test]
    fn test_color_parse_error_converts() {
        let err: Error = ColorParseError::InvalidLength(5).into();
        assert_eq!(
            err.to_string(),
            "invalid color: invalid hex length: 5 (expected 3, 4, 6, or 8)"
        );
    }

    #[test]
    fn test_is_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::FlushTask("boom".into()).is_cancelled());
    }
}
