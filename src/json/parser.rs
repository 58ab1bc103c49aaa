//! Recursive-descent JSON parser
//!
//! Reads the text one character at a time with a single-character peek.
//! Commas inside objects and arrays are skipped rather than enforced, so
//! hand-edited files with stray or trailing commas still load. Every loop
//! checks for end of input: truncated documents fail with
//! `ParseErrorKind::UnexpectedEnd` instead of producing a partial value.

use super::value::{JsonValue, Map, Number};
use crate::error::{ParseError, ParseErrorKind};

/// Maximum nesting of objects and arrays
pub const MAX_DEPTH: usize = 128;

const WORD_BREAK: &str = "{}[],:\"";
const REPLACEMENT: char = '\u{FFFD}';

type Result<T> = std::result::Result<T, ParseError>;

/// Parse a complete JSON document
pub fn parse(text: &str) -> Result<JsonValue> {
    Parser::new(text).parse_document()
}

#[inline]
fn is_word_break(c: char) -> bool {
    c.is_ascii_whitespace() || WORD_BREAK.contains(c)
}

struct Parser<'a> {
    text: &'a str,
    /// Byte offset of the next unread character
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            depth: 0,
        }
    }

    fn parse_document(mut self) -> Result<JsonValue> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(self.error(ParseErrorKind::TrailingCharacters));
        }
        Ok(value)
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consume characters up to the next word break
    fn next_word(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_word_break(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.text[start..self.pos]
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(ParseErrorKind::TooDeep));
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<JsonValue> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => self.parse_string().map(JsonValue::String),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if is_word_break(c) => Err(self.error(ParseErrorKind::UnexpectedChar(c))),
            Some(_) => self.parse_literal(),
        }
    }

    fn parse_object(&mut self) -> Result<JsonValue> {
        self.enter()?;
        self.pos += 1; // '{'
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(',') => self.pos += 1,
                Some('"') => {
                    let key = self.parse_string()?;
                    self.skip_whitespace();
                    match self.peek() {
                        Some(':') => self.pos += 1,
                        None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
                        Some(_) => return Err(self.error(ParseErrorKind::ExpectedColon)),
                    }
                    let value = self.parse_value()?;
                    map.insert(key, value);
                }
                Some(c) => return Err(self.error(ParseErrorKind::UnexpectedChar(c))),
            }
        }

        self.depth -= 1;
        Ok(JsonValue::Object(map))
    }

    fn parse_array(&mut self) -> Result<JsonValue> {
        self.enter()?;
        self.pos += 1; // '['
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(',') => self.pos += 1,
                Some(_) => items.push(self.parse_value()?),
            }
        }

        self.depth -= 1;
        Ok(JsonValue::Array(items))
    }

    fn parse_string(&mut self) -> Result<String> {
        self.pos += 1; // opening quote
        let mut out = String::new();

        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd))?;
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let escape_at = self.pos;
                    let e = self
                        .bump()
                        .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd))?;
                    match e {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        '/' => out.push('/'),
                        'b' => out.push('\u{0008}'),
                        'f' => out.push('\u{000C}'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'u' => {
                            let c = self.parse_unicode_escape()?;
                            out.push(c);
                        }
                        other => {
                            return Err(ParseError::new(
                                ParseErrorKind::InvalidEscape(other),
                                escape_at,
                            ));
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    /// Decode the code unit after `\u`, pairing a high surrogate with an
    /// immediately following `\u` low surrogate.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let unit = self.parse_hex4()?;
        let c = match unit {
            0xD800..=0xDBFF => {
                if !self.text[self.pos..].starts_with("\\u") {
                    return Ok(REPLACEMENT);
                }
                let resume = self.pos;
                self.pos += 2;
                let low = self.parse_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    // Not a pair; let the string loop read that escape on its own
                    self.pos = resume;
                    return Ok(REPLACEMENT);
                }
                let scalar = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                char::from_u32(scalar).unwrap_or(REPLACEMENT)
            }
            0xDC00..=0xDFFF => REPLACEMENT,
            _ => char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT),
        };
        Ok(c)
    }

    fn parse_hex4(&mut self) -> Result<u16> {
        let start = self.pos;
        let mut unit: u16 = 0;
        for _ in 0..4 {
            let c = self
                .bump()
                .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd))?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidUnicodeEscape, start))?;
            unit = unit * 16 + digit as u16;
        }
        Ok(unit)
    }

    fn parse_number(&mut self) -> Result<JsonValue> {
        let start = self.pos;
        let word = self.next_word();
        let invalid = || ParseError::new(ParseErrorKind::InvalidNumber(word.to_owned()), start);

        let is_float = classify_number(word).ok_or_else(invalid)?;
        let number = if is_float {
            Number::Float(word.parse().map_err(|_| invalid())?)
        } else {
            match word.parse::<i64>() {
                Ok(i) => Number::Int(i),
                // Out of i64 range: keep the magnitude as a float
                Err(_) => Number::Float(word.parse().map_err(|_| invalid())?),
            }
        };
        Ok(JsonValue::Number(number))
    }

    fn parse_literal(&mut self) -> Result<JsonValue> {
        let start = self.pos;
        match self.next_word() {
            "true" => Ok(JsonValue::Bool(true)),
            "false" => Ok(JsonValue::Bool(false)),
            "null" => Ok(JsonValue::Null),
            word => Err(ParseError::new(
                ParseErrorKind::InvalidLiteral(word.to_owned()),
                start,
            )),
        }
    }
}

/// Check `-? digit+ (. digit+)? ([eE] [+-]? digit+)?`.
///
/// Returns `Some(true)` for a float literal, `Some(false)` for an integer and
/// `None` when the word is not a number at all.
fn classify_number(word: &str) -> Option<bool> {
    let bytes = word.as_bytes();
    let mut i = 0;

    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i > start
    };

    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    if !digits(&mut i) {
        return None;
    }

    let mut is_float = false;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if !digits(&mut i) {
            return None;
        }
        is_float = true;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !digits(&mut i) {
            return None;
        }
        is_float = true;
    }

    (i == bytes.len()).then_some(is_float)
}
