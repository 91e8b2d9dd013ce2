// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CSV encoding of lists of maps, and lazy decoding back into maps.

use crate::adapters::ResourceTable;
use crate::value::{Temporal, Value, ValueMap};
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::sync::Arc;

// ============================================================================
// Encoder
// ============================================================================

type Format = Box<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Writes a list of maps as CSV, one row per map.
///
/// Columns are the configured keys, in order. Strings are always quoted
/// (embedded quotes doubled), numbers and booleans are written bare, null
/// or absent values leave the field empty. Instants are written as epoch
/// milliseconds, other temporal values as quoted ISO-8601 text. Rows end
/// with CRLF.
pub struct CsvEncoder {
    keys: Vec<String>,
    delimiter: char,
    labels: Option<Arc<dyn ResourceTable>>,
    formats: HashMap<String, Format>,
}

impl CsvEncoder {
    pub fn new<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            delimiter: ',',
            labels: None,
            formats: HashMap::new(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Header text per key; keys missing from `labels` are written as-is.
    pub fn with_labels(mut self, labels: impl ResourceTable + 'static) -> Self {
        self.labels = Some(Arc::new(labels));
        self
    }

    /// Rewrites non-null values of `key` before they are written.
    pub fn with_format<F>(mut self, key: impl Into<String>, format: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.formats.insert(key.into(), Box::new(format));
        self
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Writes the header row, then one row per element of `rows`.
    ///
    /// `rows` is traversed once, so single-pass lists stream through.
    pub fn encode<W: Write>(&self, rows: &Value, writer: W) -> Result<()> {
        let mut out = BufWriter::new(writer);

        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(out, "{}", self.delimiter)?;
            }
            let label = self.labels.as_ref().and_then(|labels| labels.lookup(key));
            write_quoted(&mut out, label.as_deref().unwrap_or(key))?;
        }
        out.write_all(b"\r\n")?;

        for row in rows.elements()? {
            let row = row?;
            if !row.is_map() {
                return Err(Error::mismatch(row.kind(), "CSV row"));
            }
            for (i, key) in self.keys.iter().enumerate() {
                if i > 0 {
                    write!(out, "{}", self.delimiter)?;
                }
                let mut value = row.get(key)?.unwrap_or(Value::Null);
                if let (false, Some(format)) = (value.is_null(), self.formats.get(key)) {
                    value = format(&value)?;
                }
                self.field(&mut out, &value)?;
            }
            out.write_all(b"\r\n")?;
        }

        out.flush()?;
        Ok(())
    }

    pub fn encode_to_string(&self, rows: &Value) -> Result<String> {
        let mut buf = Vec::new();
        self.encode(rows, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    fn field<W: Write>(&self, out: &mut W, value: &Value) -> Result<()> {
        match value {
            Value::Null => {}
            Value::Bool(b) => write!(out, "{}", b)?,
            Value::Number(n) => write!(out, "{}", n)?,
            Value::String(s) => write_quoted(out, s)?,
            Value::Temporal(Temporal::Instant(i)) => write!(out, "{}", i.timestamp_millis())?,
            Value::Temporal(t) => write_quoted(out, &t.to_string())?,
            other => return Err(Error::mismatch(other.kind(), "CSV field")),
        }
        Ok(())
    }
}

fn write_quoted<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(b"\"")?;
    out.write_all(text.replace('"', "\"\"").as_bytes())?;
    out.write_all(b"\"")?;
    Ok(())
}

impl std::fmt::Debug for CsvEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvEncoder")
            .field("keys", &self.keys)
            .field("delimiter", &self.delimiter)
            .field("labels", &self.labels.is_some())
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Reads CSV records as maps.
///
/// The first record is the header and supplies the keys. Every later record
/// becomes a map from key to string field. Empty keys and empty fields are
/// left out, and fields past the last key are ignored. Quoted fields may
/// hold delimiters, line breaks and doubled quotes. Records end with LF or
/// CRLF; a blank line ends the input.
#[derive(Debug, Clone)]
pub struct CsvDecoder {
    delimiter: char,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvDecoder {
    pub fn new() -> Self {
        Self { delimiter: ',' }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Reads the header, then returns a forward-only cursor over the records.
    ///
    /// Fails with [`Error::Parse`] when there is no header row.
    pub fn rows<R: Read>(&self, reader: R) -> Result<CsvRows<R>> {
        let mut scanner = Scanner {
            reader: BufReader::new(reader),
            delimiter: self.delimiter,
            offset: 0,
        };
        let keys = scanner.record()?;
        if keys.is_empty() {
            return Err(Error::parse(0, "missing header row"));
        }
        log::debug!("[csv] header with {} columns", keys.len());

        Ok(CsvRows {
            scanner,
            keys,
            pending: None,
            done: false,
        })
    }

    /// Single-pass list over the records of `reader`.
    ///
    /// Records are read as the list is traversed; a second traversal fails
    /// with [`Error::Unsupported`].
    pub fn iterate<R: Read + Send + 'static>(&self, reader: R) -> Result<Value> {
        Ok(Value::try_sequence(self.rows(reader)?))
    }

    /// Reads every record into an owned list.
    pub fn decode<R: Read>(&self, reader: R) -> Result<Value> {
        self.rows(reader)?.collect::<Result<Vec<_>>>().map(Value::List)
    }

    pub fn decode_str(&self, text: &str) -> Result<Value> {
        self.decode(text.as_bytes())
    }
}

/// Cursor over the records following a CSV header.
///
/// Yields one [`Value::Map`] per record. After an error the cursor is
/// exhausted.
pub struct CsvRows<R> {
    scanner: Scanner<R>,
    keys: Vec<String>,
    pending: Option<Vec<String>>,
    done: bool,
}

impl<R: Read> CsvRows<R> {
    /// Header keys, including empty ones.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Reads ahead one record if none is pending. Repeated calls do not
    /// advance the input.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.pending.is_none() && !self.done {
            match self.scanner.record() {
                Ok(values) if values.is_empty() => self.done = true,
                Ok(values) => self.pending = Some(values),
                Err(err) => {
                    self.done = true;
                    return Err(err);
                }
            }
        }
        Ok(self.pending.is_some())
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(err) => return Some(Err(err)),
        }
        let values = self.pending.take()?;
        let row: ValueMap = self
            .keys
            .iter()
            .zip(values)
            .filter(|(key, value)| !key.is_empty() && !value.is_empty())
            .map(|(key, value)| (key.clone(), Value::String(value)))
            .collect();
        Some(Ok(Value::Map(row)))
    }
}

impl<R> std::fmt::Debug for CsvRows<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRows")
            .field("keys", &self.keys)
            .field("offset", &self.scanner.offset)
            .field("done", &self.done)
            .finish()
    }
}

struct Scanner<R> {
    reader: BufReader<R>,
    delimiter: char,
    offset: usize,
}

impl<R: Read> Scanner<R> {
    /// One record's fields; empty at end of input or on a blank line.
    fn record(&mut self) -> Result<Vec<String>> {
        let mut values = Vec::new();
        let mut c = self.next_char()?;

        while let Some(first) = c.filter(|ch| *ch != '\r' && *ch != '\n') {
            let start = self.offset - first.len_utf8();
            let mut field = String::new();
            let mut quoted = first == '"';
            if quoted {
                c = self.next_char()?;
            }

            while let Some(ch) = c {
                if quoted && ch == '"' {
                    c = self.next_char()?;
                    if c == Some('"') {
                        field.push('"');
                        c = self.next_char()?;
                    } else {
                        quoted = false;
                    }
                    continue;
                }
                if !quoted && (ch == self.delimiter || ch == '\r' || ch == '\n') {
                    break;
                }
                field.push(ch);
                c = self.next_char()?;
            }

            if quoted {
                return Err(Error::parse(start, "unterminated quoted value"));
            }
            values.push(field);

            if c == Some(self.delimiter) {
                c = self.next_char()?;
            }
        }

        if c == Some('\r') {
            let at = self.offset;
            if self.next_char()? != Some('\n') {
                return Err(Error::parse(at, "improperly terminated record"));
            }
        }
        Ok(values)
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        let start = self.offset;
        let invalid = || Error::parse(start, "invalid UTF-8");

        let Some(lead) = self.next_byte()? else {
            return Ok(None);
        };
        let width = match lead {
            0x00..=0x7f => return Ok(Some(char::from(lead))),
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Err(invalid()),
        };

        let mut buf = [lead, 0, 0, 0];
        for slot in &mut buf[1..width] {
            *slot = self.next_byte()?.ok_or_else(invalid)?;
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(invalid)
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        let Some(byte) = self.reader.fill_buf()?.first().copied() else {
            return Ok(None);
        };
        self.reader.consume(1);
        self.offset += 1;
        Ok(Some(byte))
    }
}
