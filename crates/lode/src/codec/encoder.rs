// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON encoder.

use crate::config::EncoderConfig;
use crate::value::{Number, Value};
use crate::{Error, Result};
use std::borrow::Borrow;
use std::io::{BufWriter, Write};

/// Writes values as JSON text.
///
/// Lists are traversed exactly once, front to back, so single-pass views
/// (cursors, pipe consumers) stream through in constant memory.
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Encoder emitting no insignificant whitespace.
    pub fn compact() -> Self {
        Self::new(EncoderConfig::compact())
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Writes `value` to `writer`.
    ///
    /// On failure the sink holds partial output, which the caller must
    /// discard.
    pub fn encode<W: Write>(&self, value: &Value, writer: W) -> Result<()> {
        let mut out = BufWriter::new(writer);
        Emitter::new(&mut out, &self.config).value(value)?;
        out.flush()?;
        Ok(())
    }

    pub fn encode_to_string(&self, value: &Value) -> Result<String> {
        let mut buf = Vec::new();
        self.encode(value, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Writes the items of a fallible iterator as a JSON array.
    ///
    /// The first item error aborts encoding and is returned.
    pub fn encode_sequence<I, W>(&self, items: I, writer: W) -> Result<()>
    where
        I: IntoIterator<Item = Result<Value>>,
        W: Write,
    {
        let mut out = BufWriter::new(writer);
        Emitter::new(&mut out, &self.config).list(items.into_iter())?;
        out.flush()?;
        Ok(())
    }
}

// ============================================================================
// Emitter
// ============================================================================

struct Emitter<'a, W: Write> {
    out: W,
    config: &'a EncoderConfig,
    depth: usize,
}

impl<'a, W: Write> Emitter<'a, W> {
    fn new(out: W, config: &'a EncoderConfig) -> Self {
        Self {
            out,
            config,
            depth: 0,
        }
    }

    fn value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.raw("null"),
            Value::Bool(b) => self.raw(if *b { "true" } else { "false" }),
            Value::Number(n) => self.number(*n),
            Value::String(s) => self.string(s),
            Value::Temporal(t) => self.string(&t.to_string()),
            Value::List(items) => self.list(items.iter().map(Ok::<_, Error>)),
            Value::ListView(view) => self.list(view.elements()?),
            Value::Map(entries) => self.map(entries.iter().map(|(k, v)| Ok((k.as_str(), v)))),
            Value::MapView(view) => {
                let keys = view.keys()?;
                self.map(keys.into_iter().filter_map(|key| match view.get(&key) {
                    Ok(Some(value)) => Some(Ok((key, value))),
                    Ok(None) => None,
                    Err(e) => Some(Err(e)),
                }))
            }
        }
    }

    fn list<V, I>(&mut self, items: I) -> Result<()>
    where
        V: Borrow<Value>,
        I: Iterator<Item = Result<V>>,
    {
        self.raw("[")?;
        self.depth += 1;
        let mut empty = true;
        for item in items {
            let item = item?;
            if !empty {
                self.raw(",")?;
            }
            self.newline()?;
            self.value(item.borrow())?;
            empty = false;
        }
        self.depth -= 1;
        if !empty {
            self.newline()?;
        }
        self.raw("]")
    }

    fn map<K, V, I>(&mut self, entries: I) -> Result<()>
    where
        K: AsRef<str>,
        V: Borrow<Value>,
        I: Iterator<Item = Result<(K, V)>>,
    {
        self.raw("{")?;
        self.depth += 1;
        let mut empty = true;
        for entry in entries {
            let (key, value) = entry?;
            if !empty {
                self.raw(",")?;
            }
            self.newline()?;
            self.string(key.as_ref())?;
            self.raw(if self.config.compact { ":" } else { ": " })?;
            self.value(value.borrow())?;
            empty = false;
        }
        self.depth -= 1;
        if !empty {
            self.newline()?;
        }
        self.raw("}")
    }

    fn number(&mut self, number: Number) -> Result<()> {
        if let Number::Float(f) = number {
            if !f.is_finite() {
                return Err(Error::mismatch(format!("f64 {}", f), "JSON number"));
            }
        }
        write!(self.out, "{}", number)?;
        Ok(())
    }

    fn string(&mut self, text: &str) -> Result<()> {
        self.raw("\"")?;
        let mut start = 0;
        for (i, c) in text.char_indices() {
            let escape = match c {
                '"' => "\\\"",
                '\\' => "\\\\",
                '\n' => "\\n",
                '\r' => "\\r",
                '\t' => "\\t",
                '\u{8}' => "\\b",
                '\u{c}' => "\\f",
                c if c < ' ' || (self.config.escape_unicode && !c.is_ascii()) => "",
                _ => continue,
            };
            self.raw(&text[start..i])?;
            if escape.is_empty() {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(self.out, "\\u{:04x}", unit)?;
                }
            } else {
                self.raw(escape)?;
            }
            start = i + c.len_utf8();
        }
        self.raw(&text[start..])?;
        self.raw("\"")
    }

    fn newline(&mut self) -> Result<()> {
        if self.config.compact {
            return Ok(());
        }
        self.out.write_all(b"\n")?;
        for _ in 0..self.depth * self.config.indent {
            self.out.write_all(b" ")?;
        }
        Ok(())
    }

    fn raw(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }
}
