//! Scanning raw source into a flat sequence of located tokens.

use std::fmt;

use tracing::*;

use crate::{Location, ParseError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Number,
    String,
    True,
    False,
    Null,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::LeftBrace => "`{`",
            TokenKind::RightBrace => "`}`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
        })
    }
}

/// A single token. `text` is the exact source slice at `location`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub location: Location,
    pub text: &'src str,
}

/// Whitespace between tokens. Form feed and vertical tab are accepted on top of the four JSON
/// whitespace characters.
fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0B' | b'\x0C')
}

/// Validate `source` as UTF-8 and tokenize it.
pub fn tokenize_bytes(source: &[u8]) -> Result<Vec<Token<'_>>, ParseError> {
    tokenize(decode_utf8(source)?)
}

pub(crate) fn decode_utf8(source: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(source).map_err(|e| ParseError::InvalidEncoding {
        valid_up_to: e.valid_up_to(),
    })
}

/// Tokenize `source`, failing on the first byte that starts no known lexical form.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut offset = skip_whitespace(bytes, 0);

    while offset < bytes.len() {
        let byte = bytes[offset];
        let (kind, len) = match byte {
            b'{' => (TokenKind::LeftBrace, 1),
            b'}' => (TokenKind::RightBrace, 1),
            b'[' => (TokenKind::LeftBracket, 1),
            b']' => (TokenKind::RightBracket, 1),
            b',' => (TokenKind::Comma, 1),
            b':' => (TokenKind::Colon, 1),
            b'-' | b'0'..=b'9' => match scan_number(&bytes[offset..]) {
                Some(len) => (TokenKind::Number, len),
                None => return Err(ParseError::UnexpectedByte { offset, byte }),
            },
            b'"' => match scan_string(&bytes[offset..]) {
                Some(len) => (TokenKind::String, len),
                None => return Err(ParseError::UnexpectedByte { offset, byte }),
            },
            _ => match scan_keyword(&bytes[offset..]) {
                Some(found) => found,
                None => return Err(ParseError::UnexpectedByte { offset, byte }),
            },
        };

        let location = Location::new(offset, offset + len);
        trace!(?kind, ?location);
        tokens.push(Token {
            kind,
            location,
            text: &source[location.to_range()],
        });

        offset = skip_whitespace(bytes, offset + len);
    }

    debug!(tokens = tokens.len(), bytes = bytes.len(), "tokenized source");
    Ok(tokens)
}

fn skip_whitespace(bytes: &[u8], mut offset: usize) -> usize {
    while offset < bytes.len() && is_whitespace(bytes[offset]) {
        offset += 1;
    }
    offset
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Longest match of `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][-+]?[0-9]+)?`. Fraction and exponent are
/// left off when they are incomplete, so `1.` scans as `1` and leaves the `.` behind.
fn scan_number(bytes: &[u8]) -> Option<usize> {
    let mut len = usize::from(bytes.first() == Some(&b'-'));

    match bytes.get(len) {
        Some(b'0') => len += 1,
        Some(b'1'..=b'9') => len += count_digits(&bytes[len..]),
        _ => return None,
    }

    if bytes.get(len) == Some(&b'.') {
        let digits = count_digits(&bytes[len + 1..]);
        if digits > 0 {
            len += 1 + digits;
        }
    }

    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(len + 1), Some(b'+' | b'-')));
        let digits = count_digits(&bytes[len + 1 + sign..]);
        if digits > 0 {
            len += 1 + sign + digits;
        }
    }

    Some(len)
}

/// Match a string literal starting at the opening quote, returning its length including both
/// quotes. Multi-byte characters are passed through byte by byte; only ASCII is inspected.
fn scan_string(bytes: &[u8]) -> Option<usize> {
    let mut len = 1;
    loop {
        match *bytes.get(len)? {
            b'"' => return Some(len + 1),
            b'\\' => {
                len += match *bytes.get(len + 1)? {
                    b'b' | b'f' | b'n' | b'r' | b't' | b'/' | b'\\' | b'"' => 2,
                    b'u' => {
                        let hex = bytes.get(len + 2..len + 6)?;
                        if !hex.iter().all(u8::is_ascii_hexdigit) {
                            return None;
                        }
                        6
                    }
                    _ => return None,
                };
            }
            0x00..=0x1F => return None,
            _ => len += 1,
        }
    }
}

fn scan_keyword(bytes: &[u8]) -> Option<(TokenKind, usize)> {
    [
        (TokenKind::True, "true"),
        (TokenKind::False, "false"),
        (TokenKind::Null, "null"),
    ]
    .into_iter()
    .find(|(_, keyword)| bytes.starts_with(keyword.as_bytes()))
    .map(|(kind, keyword)| (kind, keyword.len()))
}

#[cfg(test)]
mod tests {
    use super::{tokenize, tokenize_bytes, TokenKind};
    use crate::{Location, ParseError};

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn structural_tokens_and_keywords() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"{ "a" : [ true , false , null ] }"#),
            vec![
                LeftBrace,
                String,
                Colon,
                LeftBracket,
                True,
                Comma,
                False,
                Comma,
                Null,
                RightBracket,
                RightBrace
            ]
        );
    }

    #[test]
    fn token_locations_exclude_whitespace() {
        let tokens = tokenize("  [ 12 ]\n").unwrap();
        let locations: Vec<_> = tokens.iter().map(|t| t.location).collect();
        assert_eq!(
            locations,
            vec![Location::new(2, 3), Location::new(4, 6), Location::new(7, 8)]
        );
        assert_eq!(tokens[1].text, "12");
        assert_eq!(tokens[0].text, "[");
    }

    #[test]
    fn every_token_carries_its_source_slice() {
        let source = r#" {"k" : [true, -1.5e3, null, "é"] , "" :false} "#;
        for token in tokenize(source).unwrap() {
            assert_eq!(token.text, &source[token.location.to_range()], "{token:?}");
        }
    }

    #[test]
    fn numbers_keep_their_source_text() {
        for source in ["0", "-0", "1.50", "-12.5e+10", "3E7", "10"] {
            let tokens = tokenize(source).unwrap();
            assert_eq!(tokens.len(), 1, "{source}");
            assert_eq!(tokens[0].text, source);
        }
    }

    #[test]
    fn leading_zero_splits_into_two_numbers() {
        assert_eq!(kinds("01"), vec![TokenKind::Number, TokenKind::Number]);
    }

    #[test]
    fn incomplete_fraction_leaves_the_dot_behind() {
        assert_eq!(
            tokenize("1."),
            Err(ParseError::UnexpectedByte {
                offset: 1,
                byte: b'.'
            })
        );
    }

    #[test]
    fn strings_accept_escapes_and_unicode() {
        let source = r#""a\"b\\c\/\b\f\n\r\té ünï""#;
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, source);
        assert_eq!(tokens[0].location, Location::new(0, source.len()));
    }

    #[test]
    fn bad_strings_fail_at_the_opening_quote() {
        for source in [r#"["abc"#, r#"["\x"]"#, r#"["\u12"]"#, "[\"a\tb\"]"] {
            assert_eq!(
                tokenize(source),
                Err(ParseError::UnexpectedByte {
                    offset: 1,
                    byte: b'"'
                }),
                "{source:?}"
            );
        }
    }

    #[test]
    fn unknown_bytes_are_reported() {
        assert_eq!(
            tokenize("[nul]"),
            Err(ParseError::UnexpectedByte {
                offset: 1,
                byte: b'n'
            })
        );
        assert_eq!(
            tokenize(" 'a'"),
            Err(ParseError::UnexpectedByte {
                offset: 1,
                byte: b'\''
            })
        );
    }

    #[test]
    fn form_feed_counts_as_whitespace() {
        assert_eq!(kinds("\x0C[\x0B]\x0C"), vec![TokenKind::LeftBracket, TokenKind::RightBracket]);
    }

    #[test]
    fn invalid_utf8_is_rejected_before_tokenizing() {
        assert_eq!(
            tokenize_bytes(b"[\"\xff\"]"),
            Err(ParseError::InvalidEncoding { valid_up_to: 2 })
        );
    }
}
