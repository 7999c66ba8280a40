//! Library-wide error and result types.

use std::fmt;
use std::io;

/// Result alias used throughout jpakit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Error messages are kept intentionally terse; callers that need richer
/// context (a file path, a block tag, a byte offset) should wrap `Error` in
/// their own type, as the `jpakit` CLI does.
#[derive(Debug)]
pub enum Error {
    /// A read would have run past the end of the buffer.
    Truncated,
    /// A container or block magic/signature did not match the expected
    /// value.
    InvalidMagic,
    /// A block tag is not present in the block registry.
    UnknownTag([u8; 4]),
    /// An integer value does not fit in its column's bit mask.
    ValueOutOfRange,
    /// A required block is missing while assembling a resource for
    /// serialization.
    MissingBlock(&'static str),
    /// A name reference did not resolve against its expected table.
    DanglingReference(String),
    /// A uniqueness constraint was violated.
    DuplicateKey(String),
    /// Reserved for future integrity fields; unused today.
    ChecksumMismatch,
    /// A BCSV row referenced a column absent from the schema it was built
    /// with.
    UnknownColumn(String),
    /// A structural constraint was violated (message describes which one).
    Parse(&'static str),
    /// An underlying I/O operation failed.
    Io(io::Error),
    /// A JSON document could not be parsed or did not match the expected
    /// shape.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Truncated => write!(f, "unexpected end of buffer"),
            Error::InvalidMagic => write!(f, "bad magic value"),
            Error::UnknownTag(tag) => {
                write!(f, "unknown block tag {:?}", String::from_utf8_lossy(tag))
            }
            Error::ValueOutOfRange => write!(f, "value does not fit in column mask"),
            Error::MissingBlock(name) => write!(f, "missing required block: {name}"),
            Error::DanglingReference(name) => write!(f, "dangling reference: {name}"),
            Error::DuplicateKey(name) => write!(f, "duplicate key: {name}"),
            Error::ChecksumMismatch => write!(f, "checksum mismatch"),
            Error::UnknownColumn(name) => write!(f, "unknown column: {name}"),
            Error::Parse(s) => write!(f, "parse error: {s}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
