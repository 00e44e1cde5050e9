//! Rebuilding a tree from a dump and the source it was dumped from.
//!
//! Decoding never recurses: pending work lives on an explicit command stack and finished nodes
//! on a value stack, so arbitrarily deep (or adversarially deep) dumps cannot exhaust the native
//! stack.

use tracing::*;

use super::{Tag, Version, HEADER_LEN, MAGIC, RECORD_LEN};
use crate::ast::{Array, False, Node, Null, Number, Object, Root, Str, True};
use crate::error::Malformed;
use crate::{Location, LoadError};

/// Rebuild the tree that was dumped into `dumped`. `source` must be exactly the text that was
/// parsed before dumping: string and number text is sliced out of it by location.
pub fn load(source: &str, dumped: &[u8]) -> Result<Root, LoadError> {
    let mut reader = Reader {
        bytes: dumped,
        offset: 0,
    };
    reader.header()?;

    let mut commands = vec![Command::DecodeRoot];
    let mut values: Vec<Node> = Vec::new();
    let mut root = None;

    while let Some(command) = commands.pop() {
        match command {
            Command::DecodeRoot => {
                let (tag, location) = reader.record(source)?;
                if tag != Tag::Root {
                    return Err(reader.malformed_at_record(Malformed::MissingRoot));
                }
                commands.push(Command::AssembleRoot(location));
                commands.push(Command::DecodeValue);
            }
            Command::DecodeValue => {
                let (tag, location) = reader.record(source)?;
                let node = match tag {
                    Tag::Root => return Err(reader.malformed_at_record(Malformed::MisplacedRoot)),
                    Tag::Object | Tag::Array => {
                        let count = reader.count()?;
                        if tag == Tag::Object && count % 2 != 0 {
                            return Err(reader.malformed(Malformed::OddObjectCount(count)));
                        }
                        let count = count as usize;
                        commands.push(if tag == Tag::Object {
                            Command::AssembleObject { count, location }
                        } else {
                            Command::AssembleArray { count, location }
                        });
                        commands.extend(std::iter::repeat(Command::DecodeValue).take(count));
                        continue;
                    }
                    Tag::String => Node::String(Str {
                        value: slice(source, location).to_string(),
                        location,
                    }),
                    Tag::Number => Node::Number(Number {
                        value: slice(source, location).to_string(),
                        location,
                    }),
                    Tag::True => Node::True(True { location }),
                    Tag::False => Node::False(False { location }),
                    Tag::Null => Node::Null(Null { location }),
                };
                values.push(node);
            }
            Command::AssembleArray { count, location } => {
                let children = pop_values(&mut values, count, &reader)?;
                values.push(Node::Array(Array {
                    values: children,
                    location,
                }));
            }
            Command::AssembleObject { count, location } => {
                let children = pop_values(&mut values, count, &reader)?;
                let mut members = Vec::with_capacity(count / 2);
                let mut children = children.into_iter();
                while let (Some(key), Some(value)) = (children.next(), children.next()) {
                    let Node::String(key) = key else {
                        return Err(reader.malformed(Malformed::NonStringKey));
                    };
                    members.push((key, value));
                }
                values.push(Node::Object(Object {
                    values: members,
                    location,
                }));
            }
            Command::AssembleRoot(location) => {
                let value = values
                    .pop()
                    .ok_or_else(|| reader.malformed(Malformed::StackUnderflow))?;
                root = Some(Root { value, location });
            }
        }
    }

    if reader.offset != dumped.len() {
        return Err(reader.malformed(Malformed::TrailingBytes));
    }
    let Some(root) = root else {
        return Err(reader.malformed(Malformed::UnbalancedValues(values.len())));
    };
    if !values.is_empty() {
        return Err(reader.malformed(Malformed::UnbalancedValues(values.len() + 1)));
    }

    debug!(bytes = dumped.len(), "loaded tree");
    Ok(root)
}

#[derive(Debug, Copy, Clone)]
enum Command {
    DecodeRoot,
    DecodeValue,
    AssembleRoot(Location),
    AssembleArray { count: usize, location: Location },
    AssembleObject { count: usize, location: Location },
}

/// The record's location has been checked against the source by [`Reader::record`].
fn slice(source: &str, location: Location) -> &str {
    &source[location.to_range()]
}

/// Take the last `count` decoded values, keeping their order.
fn pop_values(
    values: &mut Vec<Node>,
    count: usize,
    reader: &Reader<'_>,
) -> Result<Vec<Node>, LoadError> {
    let Some(at) = values.len().checked_sub(count) else {
        return Err(reader.malformed(Malformed::StackUnderflow));
    };
    Ok(values.split_off(at))
}

struct Reader<'d> {
    bytes: &'d [u8],
    offset: usize,
}

impl<'d> Reader<'d> {
    fn malformed(&self, reason: Malformed) -> LoadError {
        LoadError::Malformed {
            offset: self.offset,
            reason,
        }
    }

    /// Report at the start of the record that was just read.
    fn malformed_at_record(&self, reason: Malformed) -> LoadError {
        LoadError::Malformed {
            offset: self.offset - RECORD_LEN,
            reason,
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], LoadError> {
        let bytes = self
            .bytes
            .get(self.offset..self.offset + N)
            .ok_or_else(|| self.malformed(Malformed::Truncated))?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.offset += N;
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32, LoadError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn header(&mut self) -> Result<(), LoadError> {
        if self.bytes.len() < HEADER_LEN {
            let seen = self.bytes.len().min(MAGIC.len());
            if self.bytes[..seen] == MAGIC[..seen] {
                return Err(self.malformed(Malformed::Truncated));
            }
            let mut magic = [0u8; 4];
            magic[..seen].copy_from_slice(&self.bytes[..seen]);
            debug!(?magic, "rejecting short foreign stream");
            return Err(LoadError::VersionMismatch {
                magic,
                version: Version {
                    major: 0,
                    minor: 0,
                    patch: 0,
                },
            });
        }
        let header: [u8; HEADER_LEN] = self.take()?;

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[..4]);
        let component = |at: usize| {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&header[at..at + 4]);
            u32::from_le_bytes(bytes)
        };
        let version = Version {
            major: component(4),
            minor: component(8),
            patch: component(12),
        };

        if magic != MAGIC || version != Version::CURRENT {
            debug!(?magic, %version, "rejecting dump header");
            return Err(LoadError::VersionMismatch { magic, version });
        }
        Ok(())
    }

    /// Read a tag and a location, checking that the location slices `source`.
    fn record(&mut self, source: &str) -> Result<(Tag, Location), LoadError> {
        let [tag] = self.take::<1>()?;
        let tag = Tag::try_from(tag).map_err(|tag| LoadError::Malformed {
            offset: self.offset - 1,
            reason: Malformed::UnknownTag(tag),
        })?;
        let start = self.read_u32()?;
        let end = self.read_u32()?;

        if start > end {
            return Err(self.malformed_at_record(Malformed::InvertedLocation { start, end }));
        }
        let location = Location::new(start as usize, end as usize);
        let fits = match tag {
            Tag::String | Tag::Number => source.get(location.to_range()).is_some(),
            _ => location.end_offset <= source.len(),
        };
        if !fits {
            return Err(self.malformed_at_record(Malformed::LocationOutOfSource { start, end }));
        }
        Ok((tag, location))
    }

    /// Read a child count, rejecting counts the rest of the stream cannot possibly hold.
    fn count(&mut self) -> Result<u32, LoadError> {
        let count = self.read_u32()?;
        let remaining = self.bytes.len() - self.offset;
        if count as usize > remaining / RECORD_LEN {
            return Err(LoadError::Malformed {
                offset: self.offset - 4,
                reason: Malformed::CountTooLarge(count),
            });
        }
        Ok(count)
    }
}
