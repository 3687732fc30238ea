use thiserror::Error;
use std::io; // Import std::io

/// Errors raised while decoding an External Term Format byte stream.
///
/// Decoding is all-or-nothing: any of these aborts the whole call and no
/// partial term is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The leading byte was not the format version marker (131).
    #[error("Invalid version byte: expected 131, found {0}")]
    InvalidVersion(u8),

    /// The buffer ended in the middle of a field.
    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// The tag byte does not name any supported term kind.
    #[error("Unknown term tag: {0}")]
    UnknownTag(u8),

    /// A record field held a term of the wrong kind (e.g. a pid whose node is not an atom).
    #[error("Unexpected term tag {tag} where {expected} was expected")]
    UnexpectedTag { expected: &'static str, tag: u8 },

    /// Atom text was not valid for its tag, or too long.
    #[error("Malformed atom: {0}")]
    MalformedAtom(String),

    /// A legacy ASCII float failed to parse.
    #[error("Malformed float: {0:?}")]
    MalformedFloat(String),

    /// Nesting went deeper than the configured limit.
    #[error("Recursion limit of {0} exceeded")]
    RecursionLimitExceeded(usize),

    /// A fun's declared size disagrees with the bytes its fields occupied.
    #[error("Function size mismatch: declared {declared} bytes, decoded {actual}")]
    InvalidFunctionSize { declared: u32, actual: usize },

    /// Bytes were left over after the single top-level term.
    #[error("{0} trailing bytes after term")]
    TrailingBytes(usize),

    /// A streamed term needs more buffered bytes than the stream allows.
    #[error("Streamed term needs at least {needed} buffered bytes, the limit is {limit}")]
    FrameTooLarge { needed: usize, limit: usize },
}

/// Errors raised while encoding a term.
///
/// Every well-formed term is encodable; these only fire when a length does
/// not fit the width of its wire field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A length, arity or count overflowed its field.
    #[error("{kind} length {length} does not fit its wire field")]
    LengthOverflow { kind: &'static str, length: usize },

    /// Atom text longer than 255 characters.
    #[error("Atom has {0} characters, the maximum is 255")]
    AtomTooLong(usize),

    /// The term nests deeper than the encoder follows.
    #[error("Recursion limit of {0} exceeded")]
    RecursionLimitExceeded(usize),
}

/// Unified error type for the beamterm library.
#[derive(Error, Debug)]
pub enum Error {
    /// Error while decoding.
    #[error("Decode Error: {0}")]
    Decode(#[from] DecodeError),

    /// Error while encoding.
    #[error("Encode Error: {0}")]
    Encode(#[from] EncodeError),

    /// Error reading or writing raw bytes outside the codec.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Input that could not be turned into bytes (bad hex, conflicting sources).
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
}

/// A specialized `Result` type for beamterm operations.
pub type Result<T> = std::result::Result<T, Error>;
