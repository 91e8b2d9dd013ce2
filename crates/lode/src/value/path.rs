// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Navigation paths through nested values.

use super::Value;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Map key.
    Key(String),
    /// Zero-based list index.
    Index(usize),
}

/// Ordered sequence of keys and indices.
///
/// Built with [`Path::key`]/[`Path::index`] or parsed from `a.b[1].c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parses dotted key syntax with optional `[index]` selectors.
    ///
    /// Keys may contain any character except `.`, `[` and `]`.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidPath(input.to_owned());
        if input.is_empty() {
            return Err(invalid());
        }

        let bytes = input.as_bytes();
        let mut idx = 0_usize;
        let mut segments = Vec::new();

        while idx < bytes.len() {
            let start = idx;
            while idx < bytes.len() && !matches!(bytes[idx], b'.' | b'[' | b']') {
                idx += 1;
            }
            if idx > start {
                segments.push(Segment::Key(input[start..idx].to_owned()));
            } else if bytes[idx] != b'[' || !segments.is_empty() {
                // Only a leading `[n]` may stand without a key.
                return Err(invalid());
            }

            while idx < bytes.len() && bytes[idx] == b'[' {
                idx += 1;
                let n_start = idx;
                while idx < bytes.len() && bytes[idx].is_ascii_digit() {
                    idx += 1;
                }
                if idx == n_start || idx >= bytes.len() || bytes[idx] != b']' {
                    return Err(invalid());
                }
                let number = input[n_start..idx].parse::<usize>().map_err(|_| invalid())?;
                segments.push(Segment::Index(number));
                idx += 1;
            }

            if idx < bytes.len() {
                if bytes[idx] != b'.' {
                    return Err(invalid());
                }
                idx += 1;
                if idx >= bytes.len() {
                    return Err(invalid());
                }
            }
        }

        Ok(Self { segments })
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(k) if i == 0 => f.write_str(k)?,
                Segment::Key(k) => write!(f, ".{}", k)?,
                Segment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl Value {
    /// Follows `path` from this value.
    ///
    /// - a missing map key yields `Ok(None)`
    /// - an out-of-range list index is [`Error::IndexOutOfBounds`]
    /// - stepping past a scalar yields `Ok(None)`
    /// - an index applied to a map looks up its decimal key
    pub fn value_at(&self, path: &Path) -> Result<Option<Value>> {
        let mut current = self.clone();
        for segment in path.segments() {
            let next = match (segment, &current) {
                (_, Value::Null) => None,
                (Segment::Key(key), v) if v.is_map() => v.get(key)?,
                (Segment::Index(index), v) if v.is_list() => v.at(*index)?,
                (Segment::Index(index), v) if v.is_map() => v.get(&index.to_string())?,
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}
