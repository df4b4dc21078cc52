//! Parse errors.

use std::fmt;
use std::io;

use aedt_lines::Cursor;

/// What went wrong structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input ended while `block` was still open.
    UnexpectedEof {
        /// Innermost open block.
        block: String,
    },
    /// `$end` named a different block than the one open.
    MismatchedEnd {
        /// Name of the open block.
        expected: String,
        /// Name on the `$end` line.
        found: String,
    },
    /// `$end` with no block open.
    UnmatchedEnd {
        /// Name on the `$end` line.
        name: String,
    },
}

/// A structural error with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Line the error was detected on. For an unexpected end of input this
    /// is one past the last line.
    pub at: Cursor,
    /// `$begin` line of the block involved, when there is one.
    pub opened_at: Option<Cursor>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, at: Cursor, opened_at: Option<Cursor>) -> Self {
        Self {
            kind,
            at,
            opened_at,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnexpectedEof { block } => {
                write!(f, "unexpected end of input while parsing block `{block}`")?;
                if let Some(opened) = self.opened_at {
                    write!(f, " (opened at line {})", opened.line_number())?;
                }
                Ok(())
            }
            ParseErrorKind::MismatchedEnd { expected, found } => write!(
                f,
                "`$end '{found}'` does not close block `{expected}` at line {}",
                self.at.line_number()
            ),
            ParseErrorKind::UnmatchedEnd { name } => write!(
                f,
                "`$end '{name}'` without a matching `$begin` at line {}",
                self.at.line_number()
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Error from the file-based entry points.
#[derive(Debug)]
pub enum Error {
    /// The file could not be opened or read.
    Io(io::Error),
    /// The content is structurally broken.
    Parse(ParseError),
}

impl Error {
    /// The structural error, if this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Io(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}
