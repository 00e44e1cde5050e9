//! Location-aware JSON syntax trees.
//!
//! This is a hand-rolled tokenizer and recursive-descent parser that produces a syntax tree
//! rather than a deserialized value: every node remembers the byte range it came from, string
//! and number literals keep their exact source text, and duplicate object keys are preserved. We
//! treat JSON more like a "programming language" than a data format, so that tools built on top
//! can point at precisely the bytes they are talking about.
//!
//! Trees are consumed through the [`Visitor`] trait. Two visitors ship with the crate:
//! [`serialization::Dump`], which writes a compact binary form of a tree that
//! [`serialization::load`] can turn back into a tree given the original source, and
//! [`inspect::Inspect`], which renders a structural outline.

mod error;
mod location;

pub mod ast;
pub mod inspect;
pub mod parser;
pub mod serialization;
pub mod token;
pub mod visitor;

pub use ast::{Node, NodeKind, Root};
pub use error::{DumpError, Found, LoadError, Malformed, ParseError};
pub use location::Location;
pub use parser::{parse, parse_bytes, parse_with, ParseOptions, DEFAULT_MAX_DEPTH};
pub use serialization::{dump, load};
pub use visitor::Visitor;
