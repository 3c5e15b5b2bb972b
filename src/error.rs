//! Error types for logtint.

use std::fmt;
use std::io;

/// Result type alias for logtint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for logtint operations.
///
/// Most failure paths inside the engine degrade to unstyled text and are
/// logged rather than returned; this type covers the explicit-failure API
/// surface (document I/O and color parsing).
#[derive(Debug)]
pub enum Error {
    /// I/O error while reading a grammar or theme document.
    Io(io::Error),
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// Grammar document could not be parsed.
    Grammar(String),
    /// Theme document could not be parsed.
    Theme(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::Grammar(s) => write!(f, "invalid grammar document: {s}"),
            Self::Theme(s) => write!(f, "invalid theme document: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
