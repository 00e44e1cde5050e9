use tracing::*;

use super::{Tag, Version, MAGIC};
use crate::ast::{Array, False, Null, Number, Object, Root, Str, True};
use crate::visitor::{walk_root, Visitor};
use crate::{DumpError, Location};

/// Serialize `root` into the binary dump format.
pub fn dump(root: &Root) -> Result<Vec<u8>, DumpError> {
    let mut dump = Dump::new();
    root.accept(&mut dump);
    let dumped = dump.finish()?;
    debug!(bytes = dumped.len(), "dumped tree");
    Ok(dumped)
}

/// The visitor behind [`dump`]. Writes the header on construction and one record per visited
/// node. An offset that does not fit in a `u32` is remembered and reported by [`Dump::finish`].
pub struct Dump {
    output: Vec<u8>,
    too_large: Option<usize>,
}

impl Dump {
    pub fn new() -> Self {
        let mut output = Vec::with_capacity(64);
        output.extend_from_slice(&MAGIC);
        let Version {
            major,
            minor,
            patch,
        } = Version::CURRENT;
        for component in [major, minor, patch] {
            output.extend_from_slice(&component.to_le_bytes());
        }
        Self {
            output,
            too_large: None,
        }
    }

    pub fn finish(self) -> Result<Vec<u8>, DumpError> {
        match self.too_large {
            Some(len) => Err(DumpError::SourceTooLarge { len }),
            None => Ok(self.output),
        }
    }

    fn write_u32(&mut self, value: usize) {
        let value = match u32::try_from(value) {
            Ok(value) => value,
            Err(_) => {
                self.too_large = self.too_large.or(Some(value));
                u32::MAX
            }
        };
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    fn record(&mut self, tag: Tag, location: Location) {
        self.output.push(tag as u8);
        self.write_u32(location.start_offset);
        self.write_u32(location.end_offset);
    }
}

impl Default for Dump {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for Dump {
    fn visit_root(&mut self, node: &Root) {
        self.record(Tag::Root, node.location);
        walk_root(self, node);
    }

    fn visit_object(&mut self, node: &Object) {
        self.record(Tag::Object, node.location);
        self.write_u32(node.values.len() * 2);
        for (key, value) in &node.values {
            self.visit_string(key);
            value.accept(self);
        }
    }

    fn visit_array(&mut self, node: &Array) {
        self.record(Tag::Array, node.location);
        self.write_u32(node.values.len());
        for value in &node.values {
            value.accept(self);
        }
    }

    fn visit_string(&mut self, node: &Str) {
        self.record(Tag::String, node.location);
    }

    fn visit_number(&mut self, node: &Number) {
        self.record(Tag::Number, node.location);
    }

    fn visit_true(&mut self, node: &True) {
        self.record(Tag::True, node.location);
    }

    fn visit_false(&mut self, node: &False) {
        self.record(Tag::False, node.location);
    }

    fn visit_null(&mut self, node: &Null) {
        self.record(Tag::Null, node.location);
    }
}
