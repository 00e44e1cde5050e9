use std::fmt;

use crate::serialization::Version;
use crate::token::TokenKind;
use crate::Location;

/// What the parser found where it wanted something else.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Found {
    Token(TokenKind),
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Token(kind) => write!(f, "{kind}"),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// Failure to tokenize or parse a JSON document. No partial tree is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("source is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidEncoding { valid_up_to: usize },
    #[error("unexpected byte 0x{byte:02x} at offset {offset}")]
    UnexpectedByte { offset: usize, byte: u8 },
    #[error("expected a value, found {found} at offset {}", .location.start_offset)]
    UnexpectedToken { found: Found, location: Location },
    #[error("expected a string key followed by `:`, found {found} at offset {}", .location.start_offset)]
    ExpectedObjectKey { found: Found, location: Location },
    #[error("expected `,` or `}}`, found {found} at offset {}", .location.start_offset)]
    ExpectedCommaOrBrace { found: Found, location: Location },
    #[error("expected `,` or `]`, found {found} at offset {}", .location.start_offset)]
    ExpectedCommaOrBracket { found: Found, location: Location },
    #[error("trailing {found} after the document value at offset {}", .location.start_offset)]
    TrailingTokens { found: Found, location: Location },
    #[error("nesting exceeds the limit of {limit} at offset {}", .location.start_offset)]
    NestingTooDeep { limit: usize, location: Location },
}

impl ParseError {
    /// The source range to point at when reporting this error. Byte-level errors get a one byte
    /// wide location.
    pub fn location(&self) -> Location {
        match self {
            ParseError::InvalidEncoding { valid_up_to } => Location::new(*valid_up_to, valid_up_to + 1),
            ParseError::UnexpectedByte { offset, .. } => Location::new(*offset, offset + 1),
            ParseError::UnexpectedToken { location, .. }
            | ParseError::ExpectedObjectKey { location, .. }
            | ParseError::ExpectedCommaOrBrace { location, .. }
            | ParseError::ExpectedCommaOrBracket { location, .. }
            | ParseError::TrailingTokens { location, .. }
            | ParseError::NestingTooDeep { location, .. } => *location,
        }
    }

    /// Byte offset of the offending input.
    pub fn offset(&self) -> usize {
        self.location().start_offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DumpError {
    #[error("source reaching offset {len} does not fit the 32-bit offsets of the dump format")]
    SourceTooLarge { len: usize },
}

/// Why a dumped stream could not be turned back into a tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Malformed {
    Truncated,
    UnknownTag(u8),
    /// A root record showed up somewhere other than the top of the stream.
    MisplacedRoot,
    /// The stream's first record is not a root record.
    MissingRoot,
    StackUnderflow,
    /// An object declared an odd number of key and value nodes.
    OddObjectCount(u32),
    /// A child count larger than the remaining stream could hold.
    CountTooLarge(u32),
    NonStringKey,
    InvertedLocation { start: u32, end: u32 },
    /// A location reaching past the source, or not on a character boundary.
    LocationOutOfSource { start: u32, end: u32 },
    TrailingBytes,
    /// The command stack ran dry with other than exactly one root left over.
    UnbalancedValues(usize),
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::Truncated => f.write_str("stream ends in the middle of a record"),
            Malformed::UnknownTag(tag) => write!(f, "unknown tag byte 0x{tag:02x}"),
            Malformed::MisplacedRoot => f.write_str("root record nested inside the tree"),
            Malformed::MissingRoot => f.write_str("stream does not start with a root record"),
            Malformed::StackUnderflow => f.write_str("not enough decoded values to assemble"),
            Malformed::OddObjectCount(count) => {
                write!(f, "object declares {count} nodes, which is not key/value pairs")
            }
            Malformed::CountTooLarge(count) => {
                write!(f, "child count {count} exceeds the remaining stream")
            }
            Malformed::NonStringKey => f.write_str("object key is not a string record"),
            Malformed::InvertedLocation { start, end } => {
                write!(f, "location {start}..{end} ends before it starts")
            }
            Malformed::LocationOutOfSource { start, end } => {
                write!(f, "location {start}..{end} does not slice the source")
            }
            Malformed::TrailingBytes => f.write_str("bytes left over after the root record"),
            Malformed::UnbalancedValues(count) => {
                write!(f, "expected a single root after decoding, found {count} values")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(
        "dump header {} {version} does not match this library ({} {})",
        String::from_utf8_lossy(.magic),
        String::from_utf8_lossy(&crate::serialization::MAGIC),
        Version::CURRENT
    )]
    VersionMismatch { magic: [u8; 4], version: Version },
    #[error("malformed dump at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: Malformed },
}

#[cfg(test)]
mod tests {
    use super::{Found, ParseError};
    use crate::token::TokenKind;
    use crate::Location;

    #[test]
    fn byte_errors_point_at_one_byte() {
        let err = ParseError::UnexpectedByte {
            offset: 4,
            byte: b'x',
        };
        assert_eq!(err.location(), Location::new(4, 5));
        assert_eq!(err.to_string(), "unexpected byte 0x78 at offset 4");
    }

    #[test]
    fn token_errors_name_what_was_found() {
        let err = ParseError::UnexpectedToken {
            found: Found::Token(TokenKind::RightBracket),
            location: Location::new(3, 4),
        };
        assert_eq!(err.offset(), 3);
        assert_eq!(err.to_string(), "expected a value, found `]` at offset 3");

        let err = ParseError::ExpectedCommaOrBrace {
            found: Found::EndOfInput,
            location: Location::empty(6),
        };
        assert_eq!(
            err.to_string(),
            "expected `,` or `}`, found end of input at offset 6"
        );
    }
}
