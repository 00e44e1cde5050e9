//! Recursive-descent parser over the token sequence.
//!
//! The grammar is exactly one JSON value followed by end of input. Every node gets the location
//! of the tokens it was built from; containers span from their opening to their closing
//! delimiter.

use tracing::*;

use crate::ast::{Array, False, Node, Null, Number, Object, Root, Str, True};
use crate::error::Found;
use crate::token::{self, Token, TokenKind};
use crate::{Location, ParseError};

/// How many containers may nest inside each other before parsing gives up. The parser recurses
/// once per level, so this bounds its stack usage.
pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse `source` into a tree with the default options.
pub fn parse(source: &str) -> Result<Root, ParseError> {
    parse_with(source, &ParseOptions::default())
}

/// Parse raw bytes, which must be valid UTF-8.
pub fn parse_bytes(source: &[u8]) -> Result<Root, ParseError> {
    parse(token::decode_utf8(source)?)
}

pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Root, ParseError> {
    let tokens = token::tokenize(source)?;
    let mut parser = Parser {
        tokens: &tokens,
        cursor: 0,
        depth: 0,
        eoi: Location::empty(source.len()),
        options,
    };

    let value = parser.parse_value()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::TrailingTokens {
            found: Found::Token(token.kind),
            location: token.location,
        });
    }

    debug!(tokens = tokens.len(), "parsed document");
    Ok(Root {
        value,
        location: Location::new(0, source.len()),
    })
}

struct Parser<'t, 'src> {
    tokens: &'t [Token<'src>],
    cursor: usize,
    depth: usize,
    eoi: Location,
    options: &'t ParseOptions,
}

impl<'t, 'src> Parser<'t, 'src> {
    fn peek(&self) -> Option<&'t Token<'src>> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<&'t Token<'src>> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token)
    }

    /// What is at the cursor, for error reporting.
    fn found(&self) -> (Found, Location) {
        match self.peek() {
            Some(token) => (Found::Token(token.kind), token.location),
            None => (Found::EndOfInput, self.eoi),
        }
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'t Token<'src>> {
        match self.peek() {
            Some(token) if token.kind == kind => self.next(),
            _ => None,
        }
    }

    fn parse_value(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.next() else {
            return Err(ParseError::UnexpectedToken {
                found: Found::EndOfInput,
                location: self.eoi,
            });
        };
        let location = token.location;

        Ok(match token.kind {
            TokenKind::LeftBrace => Node::Object(self.nested(|p| p.parse_object(location))?),
            TokenKind::LeftBracket => Node::Array(self.nested(|p| p.parse_array(location))?),
            TokenKind::String => Node::String(Str {
                value: token.text.to_string(),
                location,
            }),
            TokenKind::Number => Node::Number(Number {
                value: token.text.to_string(),
                location,
            }),
            TokenKind::True => Node::True(True { location }),
            TokenKind::False => Node::False(False { location }),
            TokenKind::Null => Node::Null(Null { location }),
            kind => {
                return Err(ParseError::UnexpectedToken {
                    found: Found::Token(kind),
                    location,
                })
            }
        })
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.options.max_depth {
            let location = self.tokens[self.cursor - 1].location;
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
                location,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse the rest of an object whose `{` is at `open`.
    fn parse_object(&mut self, open: Location) -> Result<Object, ParseError> {
        let mut values = Vec::new();

        if let Some(close) = self.eat(TokenKind::RightBrace) {
            return Ok(Object {
                values,
                location: open.to(close.location),
            });
        }

        loop {
            let key = match self.peek() {
                Some(key)
                    if key.kind == TokenKind::String
                        && self.tokens.get(self.cursor + 1).map(|t| t.kind)
                            == Some(TokenKind::Colon) =>
                {
                    self.cursor += 2;
                    Str {
                        value: key.text.to_string(),
                        location: key.location,
                    }
                }
                _ => {
                    // Point past the key when it is the colon that is missing.
                    if self.peek().map(|t| t.kind) == Some(TokenKind::String) {
                        self.cursor += 1;
                    }
                    let (found, location) = self.found();
                    return Err(ParseError::ExpectedObjectKey { found, location });
                }
            };

            let value = self.parse_value()?;
            values.push((key, value));

            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            if let Some(close) = self.eat(TokenKind::RightBrace) {
                return Ok(Object {
                    values,
                    location: open.to(close.location),
                });
            }
            let (found, location) = self.found();
            return Err(ParseError::ExpectedCommaOrBrace { found, location });
        }
    }

    /// Parse the rest of an array whose `[` is at `open`.
    fn parse_array(&mut self, open: Location) -> Result<Array, ParseError> {
        let mut values = Vec::new();

        if let Some(close) = self.eat(TokenKind::RightBracket) {
            return Ok(Array {
                values,
                location: open.to(close.location),
            });
        }

        loop {
            values.push(self.parse_value()?);

            if self.eat(TokenKind::Comma).is_some() {
                continue;
            }
            if let Some(close) = self.eat(TokenKind::RightBracket) {
                return Ok(Array {
                    values,
                    location: open.to(close.location),
                });
            }
            let (found, location) = self.found();
            return Err(ParseError::ExpectedCommaOrBracket { found, location });
        }
    }
}
