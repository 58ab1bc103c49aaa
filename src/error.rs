//! Error types
//!
//! Only `ParseError` and `LedgerError` ever leave the public API. `SchemaError`
//! and `FormatError` describe single bad entries; the ledger logs them and
//! moves on to the next one.

use std::path::PathBuf;

/// What went wrong while parsing JSON text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    #[error("invalid escape sequence \\{0}")]
    InvalidEscape(char),

    #[error("invalid \\u escape")]
    InvalidUnicodeEscape,

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("invalid literal {0:?}")]
    InvalidLiteral(String),

    #[error("expected ':' after object key")]
    ExpectedColon,

    #[error("trailing characters after value")]
    TrailingCharacters,

    #[error("nesting too deep")]
    TooDeep,
}

/// Malformed or truncated JSON, with the byte offset where it was detected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at byte {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Failure of a ledger load or persist
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger file is not valid JSON: {0}")]
    Parse(#[from] ParseError),
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A decoded ledger document that does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("top-level value is not an object")]
    NotAnObject,

    #[error("missing \"anchors\" key")]
    MissingAnchors,

    #[error("\"anchors\" is not an object")]
    AnchorsNotAnObject,

    #[error("anchor key {0:?} is not an unsigned 32-bit id")]
    InvalidId(String),

    #[error("anchor {0} is not an {{x, y, z}} object")]
    InvalidEntry(u32),
}

/// A save tree field that cannot be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("flightID {0:?} is not an unsigned 32-bit integer")]
    InvalidFlightId(String),

    #[error("pos {0:?} is not three comma-separated numbers")]
    InvalidPosition(String),
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
