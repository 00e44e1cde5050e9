//! A structural outline of a tree, one node per line as nested s-expressions:
//!
//! ```text
//! (root 0..8
//!   (object 0..8
//!     (string 1..4 "a")
//!     (number 6..7 1)))
//! ```

use std::fmt::Write;

use crate::ast::{Array, False, Null, Number, Object, Root, Str, True};
use crate::visitor::{walk_array, walk_object, walk_root, Visitor};
use crate::Location;

/// Render the outline of `root`.
pub fn inspect(root: &Root) -> String {
    let mut inspect = Inspect::default();
    root.accept(&mut inspect);
    inspect.finish()
}

#[derive(Debug, Default)]
pub struct Inspect {
    output: String,
    depth: usize,
}

impl Inspect {
    pub fn finish(self) -> String {
        self.output
    }

    fn open(&mut self, label: &str, location: Location) {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        for _ in 0..self.depth {
            self.output.push_str("  ");
        }
        // Writing into a String cannot fail.
        let _ = write!(
            self.output,
            "({label} {}..{}",
            location.start_offset, location.end_offset
        );
    }

    fn leaf(&mut self, label: &str, location: Location, text: Option<&str>) {
        self.open(label, location);
        if let Some(text) = text {
            self.output.push(' ');
            self.output.push_str(text);
        }
        self.output.push(')');
    }

    fn branch(&mut self, label: &str, location: Location, walk: impl FnOnce(&mut Self)) {
        self.open(label, location);
        self.depth += 1;
        walk(self);
        self.depth -= 1;
        self.output.push(')');
    }
}

impl Visitor for Inspect {
    fn visit_root(&mut self, node: &Root) {
        self.branch("root", node.location, |this| walk_root(this, node));
    }

    fn visit_object(&mut self, node: &Object) {
        self.branch("object", node.location, |this| walk_object(this, node));
    }

    fn visit_array(&mut self, node: &Array) {
        self.branch("array", node.location, |this| walk_array(this, node));
    }

    fn visit_string(&mut self, node: &Str) {
        self.leaf("string", node.location, Some(&node.value));
    }

    fn visit_number(&mut self, node: &Number) {
        self.leaf("number", node.location, Some(&node.value));
    }

    fn visit_true(&mut self, node: &True) {
        self.leaf("true", node.location, None);
    }

    fn visit_false(&mut self, node: &False) {
        self.leaf("false", node.location, None);
    }

    fn visit_null(&mut self, node: &Null) {
        self.leaf("null", node.location, None);
    }
}
