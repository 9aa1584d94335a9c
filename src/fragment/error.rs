//! Error types emitted by the BBQr codec.
//!
//! Join failures keep their structure (how many parts are held, how many
//! the series expects) so callers never need to parse message text.

use thiserror::Error;

use super::Encoding;

/// Header fields that can be malformed or disagree across a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderField {
    /// Encoding character.
    Encoding,
    /// File-type character.
    FileType,
    /// Series total digits.
    Total,
    /// Part index digits.
    Index,
}

impl std::fmt::Display for HeaderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Encoding => "encoding",
            Self::FileType => "file type",
            Self::Total => "part total",
            Self::Index => "part index",
        };
        f.write_str(name)
    }
}

/// Errors raised while parsing a part header.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// Text is shorter than the fixed header.
    #[error("fragment too short for header: {len} bytes")]
    TooShort { len: usize },
    /// Text does not open with `B$`.
    #[error("fragment does not start with B$")]
    MissingMagic,
    /// Header characters fall outside ASCII.
    #[error("header contains non-ASCII characters")]
    NonAscii,
    /// Encoding character is not recognised.
    #[error("unknown encoding {0:?}")]
    UnknownEncoding(char),
    /// File-type character is not recognised.
    #[error("unknown file type {0:?}")]
    UnknownFileType(char),
    /// Digits are not base36.
    #[error("invalid base36 {field} digits {digits:?}")]
    InvalidDigits { field: HeaderField, digits: String },
    /// Series total is zero.
    #[error("series total must be at least one")]
    ZeroTotal,
    /// Part index does not fit inside the series.
    #[error("part index {index} out of range for {total} parts")]
    IndexOutOfRange { index: u16, total: u16 },
}

/// Errors produced while splitting a payload into parts.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    /// Nothing to split.
    #[error("cannot split an empty payload")]
    EmptyPayload,
    /// Split count bounds are inverted or outside `1..=1295`.
    #[error("invalid split range {min}..={max}")]
    InvalidSplitRange { min: u16, max: u16 },
    /// QR version bounds are inverted or outside `1..=40`.
    #[error("invalid QR version range {min}..={max}")]
    InvalidVersionRange { min: u8, max: u8 },
    /// The DEFLATE compressor failed.
    #[error("compression failed: {reason}")]
    Compression { reason: String },
    /// No version in range yields a part count within bounds.
    #[error("{encoded_len} encoded characters do not fit the configured version and split ranges")]
    NoFit { encoded_len: usize },
}

/// Errors produced while joining parts back into a payload.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    /// No parts were supplied.
    #[error("no parts to join")]
    Empty,
    /// A part header could not be parsed.
    #[error("part {position} has a malformed header: {source}")]
    Header {
        position: usize,
        #[source]
        source: HeaderError,
    },
    /// A part disagrees with the first part on a series-level field.
    #[error("part {position} disagrees with the series on {field}")]
    Inconsistent { position: usize, field: HeaderField },
    /// A part body cannot be decoded on its own.
    #[error("part {position} (index {index}) has a corrupt body: {reason}")]
    Body {
        position: usize,
        index: u16,
        reason: String,
    },
    /// Two different bodies claim the same index. `existing` is the
    /// position of the part that claimed it first.
    #[error("conflicting content for part index {index}")]
    Conflict {
        index: u16,
        position: usize,
        existing: usize,
    },
    /// Parts are missing.
    #[error("incomplete series: have {have} of {expected} parts")]
    Incomplete { have: usize, expected: usize },
    /// The concatenated body could not be decoded.
    #[error("failed to decode {encoding} payload: {reason}")]
    Decode { encoding: Encoding, reason: String },
}

impl JoinError {
    /// Whether the failure only means more parts are needed.
    #[must_use]
    pub const fn is_incomplete(&self) -> bool { matches!(self, Self::Incomplete { .. }) }

    /// Total part count the failure reveals, if any.
    #[must_use]
    pub const fn expected_total(&self) -> Option<usize> {
        match self {
            Self::Incomplete { expected, .. } => Some(*expected),
            _ => None,
        }
    }
}
