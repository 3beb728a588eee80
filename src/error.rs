//! Errors the codec can report.

use std::fmt;

/// Something that went wrong decoding an incoming message.
///
/// Parsing never surfaces this outward: [`crate::IncomingMessage::parse`]
/// catches it internally, logs a warning, and marks the message invalid.
/// It exists so the unit tests can assert on *why* decoding stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ran out before a field or length-prefixed value could be
    /// read in full.
    Io,

    /// A name's compression pointer did not jump strictly backwards,
    /// which would loop forever if followed.
    Circular {
        /// The offset the pointer tried to jump to.
        offset: u16,
    },

    /// A label's length byte had an unrecognised top-bit pattern (neither
    /// a literal label nor a compression pointer).
    BadLabel {
        /// The offset of the offending length byte.
        offset: u16,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "unexpected end of buffer"),
            Self::Circular { offset } => write!(f, "circular name pointer at offset {offset}"),
            Self::BadLabel { offset } => write!(f, "malformed label at offset {offset}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<std::io::Error> for DecodeError {
    fn from(_: std::io::Error) -> Self {
        Self::Io
    }
}

/// Something that went wrong while assembling an outgoing message.
///
/// Unlike [`DecodeError`], this is a programmer error in the records handed
/// to the builder (a label or character-string too long to represent on
/// the wire) and is not expected in ordinary operation; it propagates to
/// the caller rather than being swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A label exceeded 63 bytes, or a character-string exceeded 255
    /// bytes, and so cannot be length-prefixed on the wire.
    NamePartTooLong(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamePartTooLong(part) => write!(f, "name part too long to encode: {part:?}"),
        }
    }
}

impl std::error::Error for BuildError {}
