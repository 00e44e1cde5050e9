//! The syntax tree. Every node knows the source range it was parsed from.

use std::fmt;

use crate::visitor::Visitor;
use crate::Location;

/// The top of every tree. Its location always covers the whole source, including any
/// whitespace around the document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub value: Node,
    pub location: Location,
}

/// A JSON value. Unlike a typical JSON library we keep the raw source text of strings and
/// numbers and the location of everything, so this is closer to a compiler AST than to a
/// deserialized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Object(Object),
    Array(Array),
    String(Str),
    Number(Number),
    True(True),
    False(False),
    Null(Null),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Members in source order. This is not a map: duplicate keys are kept so downstream users
    /// can decide what to make of them.
    pub values: Vec<(Str, Node)>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array {
    pub values: Vec<Node>,
    pub location: Location,
}

/// A string literal. `value` is the exact source text, quotes and escapes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str {
    pub value: String,
    pub location: Location,
}

/// A number literal. `value` is the exact source text, so `1.0` and `1` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    pub value: String,
    pub location: Location,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct True {
    pub location: Location,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct False {
    pub location: Location,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Null {
    pub location: Location,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Object,
    Array,
    String,
    Number,
    True,
    False,
    Null,
}

impl NodeKind {
    pub fn describe(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::True => "true",
            NodeKind::False => "false",
            NodeKind::Null => "null",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl Root {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_root(self);
    }
}

impl Node {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Node::Object(node) => visitor.visit_object(node),
            Node::Array(node) => visitor.visit_array(node),
            Node::String(node) => visitor.visit_string(node),
            Node::Number(node) => visitor.visit_number(node),
            Node::True(node) => visitor.visit_true(node),
            Node::False(node) => visitor.visit_false(node),
            Node::Null(node) => visitor.visit_null(node),
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Node::Object(Object { location, .. })
            | Node::Array(Array { location, .. })
            | Node::String(Str { location, .. })
            | Node::Number(Number { location, .. })
            | Node::True(True { location })
            | Node::False(False { location })
            | Node::Null(Null { location }) => *location,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Object(_) => NodeKind::Object,
            Node::Array(_) => NodeKind::Array,
            Node::String(_) => NodeKind::String,
            Node::Number(_) => NodeKind::Number,
            Node::True(_) => NodeKind::True,
            Node::False(_) => NodeKind::False,
            Node::Null(_) => NodeKind::Null,
        }
    }
}

impl Root {
    /// How many containers nest inside each other at the deepest point; a scalar document has
    /// depth 0. This walks with an explicit stack, so it is safe on trees of any depth.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(&self.value, 0)];
        while let Some((node, depth)) = pending.pop() {
            match node {
                Node::Array(array) => {
                    deepest = deepest.max(depth + 1);
                    pending.extend(array.values.iter().map(|value| (value, depth + 1)));
                }
                Node::Object(object) => {
                    deepest = deepest.max(depth + 1);
                    pending.extend(object.values.iter().map(|(_, value)| (value, depth + 1)));
                }
                _ => {}
            }
        }
        deepest
    }
}

// Trees rebuilt by `load` have no depth limit, so containers free their children from a flat
// work list instead of through the recursive drop glue.
impl Drop for Array {
    fn drop(&mut self) {
        if !self.values.is_empty() {
            drop_flat(std::mem::take(&mut self.values));
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        if !self.values.is_empty() {
            drop_flat(self.values.drain(..).map(|(_, value)| value).collect());
        }
    }
}

fn drop_flat(mut pending: Vec<Node>) {
    while let Some(node) = pending.pop() {
        match node {
            Node::Array(mut array) => pending.append(&mut array.values),
            Node::Object(mut object) => {
                pending.extend(object.values.drain(..).map(|(_, value)| value));
            }
            _ => {}
        }
    }
}

impl Str {
    /// Decode the literal into the string it denotes. Escape handling is delegated to
    /// `serde_json` rather than re-implemented here.
    ///
    /// Lone surrogate escapes such as `"\ud800"` are accepted by the tokenizer but fail here.
    pub fn unescaped(&self) -> Result<String, serde_json::Error> {
        serde_json::from_str(&self.value)
    }
}

impl From<Object> for Node {
    fn from(node: Object) -> Self {
        Node::Object(node)
    }
}

impl From<Array> for Node {
    fn from(node: Array) -> Self {
        Node::Array(node)
    }
}

impl From<Str> for Node {
    fn from(node: Str) -> Self {
        Node::String(node)
    }
}

impl From<Number> for Node {
    fn from(node: Number) -> Self {
        Node::Number(node)
    }
}
