//! A compact binary encoding of a tree that leaves out string and number text.
//!
//! ```text
//! Header:  [4 bytes magic "STJN"] [u32 major] [u32 minor] [u32 patch]
//! Record:  [1 byte tag] [u32 start_offset] [u32 end_offset] [body]
//!   body(Array)  = [u32 child_count] Record * child_count
//!   body(Object) = [u32 node_count]  (Record key, Record value) * (node_count / 2)
//!   body(Root)   = Record value
//!   body(scalar) = <empty>
//! ```
//!
//! All integers are little-endian. String and number records carry only their location: the
//! text is sliced back out of the source when loading, so [`load`] must be handed exactly the
//! source that was parsed before [`dump`]. Locations that fall outside the source are rejected,
//! but a different source that happens to fit silently produces a different tree.

use std::fmt;

mod decode;
mod encode;

pub use decode::load;
pub use encode::{dump, Dump};

/// Leads every dump so foreign bytes are rejected early.
pub const MAGIC: [u8; 4] = *b"STJN";

pub(crate) const HEADER_LEN: usize = 16;
/// Tag plus two offsets; the smallest record there is.
pub(crate) const RECORD_LEN: usize = 9;

/// Version of the library that wrote a dump. Loading only accepts an exact match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const CURRENT: Version = Version {
        major: parse_component(env!("CARGO_PKG_VERSION_MAJOR")),
        minor: parse_component(env!("CARGO_PKG_VERSION_MINOR")),
        patch: parse_component(env!("CARGO_PKG_VERSION_PATCH")),
    };
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

const fn parse_component(digits: &str) -> u32 {
    let digits = digits.as_bytes();
    let mut value = 0;
    let mut i = 0;
    while i < digits.len() {
        value = value * 10 + (digits[i] - b'0') as u32;
        i += 1;
    }
    value
}

/// The tag byte that opens each record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Root = b'R',
    Object = b'O',
    Array = b'A',
    String = b'S',
    Number = b'#',
    True = b'T',
    False = b'F',
    Null = b'N',
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            b'R' => Tag::Root,
            b'O' => Tag::Object,
            b'A' => Tag::Array,
            b'S' => Tag::String,
            b'#' => Tag::Number,
            b'T' => Tag::True,
            b'F' => Tag::False,
            b'N' => Tag::Null,
            other => return Err(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Tag, Version};

    #[test]
    fn current_version_follows_the_crate() {
        assert_eq!(Version::CURRENT.to_string(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn tags_are_distinct_bytes() {
        let tags = [
            Tag::Root,
            Tag::Object,
            Tag::Array,
            Tag::String,
            Tag::Number,
            Tag::True,
            Tag::False,
            Tag::Null,
        ];
        for (i, a) in tags.iter().enumerate() {
            assert_eq!(Tag::try_from(*a as u8), Ok(*a));
            for b in &tags[i + 1..] {
                assert_ne!(*a as u8, *b as u8);
            }
        }
        assert_eq!(Tag::try_from(b'x'), Err(b'x'));
    }
}
