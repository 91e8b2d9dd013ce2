// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON decoder.
//!
//! Single forward scan with an explicit container stack, so nesting depth
//! is bounded by [`DecoderConfig::max_depth`] rather than the call stack.
//! Every error carries the byte offset where scanning stopped.

use crate::config::DecoderConfig;
use crate::value::{Number, Value, ValueMap};
use crate::{Error, Result};
use std::io::Read;

/// Parses JSON text into values.
///
/// Numbers without `.`, `e` or `E` decode as [`Number::Int`], all others as
/// [`Number::Float`]. Object keys keep their document order unless
/// [`DecoderConfig::sorted`] is set. A duplicate key keeps the position of its
/// first occurrence and the value of its last.
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    config: DecoderConfig,
}

impl JsonDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Reads `reader` to the end and decodes one value.
    pub fn decode<R: Read>(&self, mut reader: R) -> Result<Value> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::parse(e.valid_up_to(), "invalid UTF-8"))?;
        self.decode_str(text)
    }

    pub fn decode_str(&self, text: &str) -> Result<Value> {
        Scanner::new(text).document(&self.config)
    }
}

enum Frame {
    List(Vec<Value>),
    Map(ValueMap, String),
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            offset: 0,
        }
    }

    fn document(&mut self, config: &DecoderConfig) -> Result<Value> {
        let max_depth = config.max_depth;
        let mut stack: Vec<Frame> = Vec::new();

        'values: loop {
            self.skip_whitespace();
            let mut value = match self.peek() {
                Some(b'{') => {
                    self.open(stack.len(), max_depth)?;
                    if self.eat(b'}') {
                        Value::Map(ValueMap::new())
                    } else {
                        let key = self.key()?;
                        stack.push(Frame::Map(ValueMap::new(), key));
                        continue 'values;
                    }
                }
                Some(b'[') => {
                    self.open(stack.len(), max_depth)?;
                    if self.eat(b']') {
                        Value::List(Vec::new())
                    } else {
                        stack.push(Frame::List(Vec::new()));
                        continue 'values;
                    }
                }
                Some(b'"') => Value::String(self.string()?),
                Some(b't') => self.literal("true", Value::Bool(true))?,
                Some(b'f') => self.literal("false", Value::Bool(false))?,
                Some(b'n') => self.literal("null", Value::Null)?,
                Some(b'-' | b'0'..=b'9') => Value::Number(self.number()?),
                Some(_) => return Err(self.unexpected("a value")),
                None => return Err(Error::parse(self.offset, "unexpected end of input")),
            };

            // Attach the finished value to its parent, closing containers
            // whose last element it was.
            loop {
                let Some(frame) = stack.pop() else {
                    self.skip_whitespace();
                    if self.offset < self.bytes.len() {
                        return Err(Error::parse(self.offset, "trailing characters"));
                    }
                    return Ok(value);
                };
                match frame {
                    Frame::List(mut items) => {
                        items.push(value);
                        self.skip_whitespace();
                        if self.eat(b',') {
                            stack.push(Frame::List(items));
                            continue 'values;
                        }
                        if !self.eat(b']') {
                            return Err(self.unexpected("`,` or `]`"));
                        }
                        value = Value::List(items);
                    }
                    Frame::Map(mut entries, key) => {
                        entries.insert(key, value);
                        self.skip_whitespace();
                        if self.eat(b',') {
                            let key = self.key()?;
                            stack.push(Frame::Map(entries, key));
                            continue 'values;
                        }
                        if !self.eat(b'}') {
                            return Err(self.unexpected("`,` or `}`"));
                        }
                        if config.sorted {
                            entries.sort_keys();
                        }
                        value = Value::Map(entries);
                    }
                }
            }
        }
    }

    fn open(&mut self, depth: usize, max_depth: usize) -> Result<()> {
        if depth >= max_depth {
            return Err(Error::parse(
                self.offset,
                format!("nesting deeper than {}", max_depth),
            ));
        }
        self.offset += 1;
        self.skip_whitespace();
        Ok(())
    }

    /// Object key followed by its `:` separator.
    fn key(&mut self) -> Result<String> {
        self.skip_whitespace();
        if self.peek() != Some(b'"') {
            return Err(self.unexpected("a string key"));
        }
        let key = self.string()?;
        self.skip_whitespace();
        if !self.eat(b':') {
            return Err(self.unexpected("`:`"));
        }
        Ok(key)
    }

    fn string(&mut self) -> Result<String> {
        let start = self.offset;
        self.offset += 1;
        let mut out = String::new();
        let mut run = self.offset;

        loop {
            match self.peek() {
                None => return Err(Error::parse(start, "unterminated string")),
                Some(b'"') => {
                    out.push_str(&self.text[run..self.offset]);
                    self.offset += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.text[run..self.offset]);
                    self.escape(&mut out)?;
                    run = self.offset;
                }
                Some(c) if c < 0x20 => {
                    return Err(Error::parse(self.offset, "control character in string"))
                }
                Some(_) => self.offset += 1,
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<()> {
        let at = self.offset;
        self.offset += 1;
        let Some(c) = self.peek() else {
            return Err(Error::parse(at, "unterminated string"));
        };
        self.offset += 1;
        match c {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let unit = self.hex4(at)?;
                let code = match unit {
                    0xD800..=0xDBFF => {
                        if !self.text[self.offset..].starts_with("\\u") {
                            return Err(Error::parse(at, "unpaired surrogate"));
                        }
                        self.offset += 2;
                        let low = self.hex4(at)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(Error::parse(at, "unpaired surrogate"));
                        }
                        0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
                    }
                    0xDC00..=0xDFFF => return Err(Error::parse(at, "unpaired surrogate")),
                    _ => u32::from(unit),
                };
                let c = char::from_u32(code)
                    .ok_or_else(|| Error::parse(at, "invalid unicode escape"))?;
                out.push(c);
            }
            _ => return Err(Error::parse(at, "invalid escape")),
        }
        Ok(())
    }

    fn hex4(&mut self, at: usize) -> Result<u16> {
        let digits = self
            .text
            .get(self.offset..self.offset + 4)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| Error::parse(at, "invalid unicode escape"))?;
        let unit =
            u16::from_str_radix(digits, 16).map_err(|e| Error::parse(at, e.to_string()))?;
        self.offset += 4;
        Ok(unit)
    }

    fn number(&mut self) -> Result<Number> {
        let start = self.offset;
        let mut integral = true;

        self.eat(b'-');
        match self.peek() {
            Some(b'0') => self.offset += 1,
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.unexpected("a digit")),
        }
        if self.eat(b'.') {
            integral = false;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.unexpected("a digit"));
            }
            self.digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            integral = false;
            self.offset += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.offset += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.unexpected("a digit"));
            }
            self.digits();
        }

        let literal = &self.text[start..self.offset];
        if integral {
            literal
                .parse::<i64>()
                .map(Number::Int)
                .map_err(|_| Error::parse(start, format!("integer {} out of range", literal)))
        } else {
            match literal.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Number::Float(f)),
                _ => Err(Error::parse(start, format!("number {} out of range", literal))),
            }
        }
    }

    fn digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.offset += 1;
        }
    }

    fn literal(&mut self, word: &str, value: Value) -> Result<Value> {
        if self.text[self.offset..].starts_with(word) {
            self.offset += word.len();
            Ok(value)
        } else {
            Err(self.unexpected("a value"))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.offset += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.text[self.offset..].chars().next() {
            Some(c) => Error::parse(self.offset, format!("expected {}, found `{}`", expected, c)),
            None => Error::parse(self.offset, format!("expected {}, found end of input", expected)),
        }
    }
}
