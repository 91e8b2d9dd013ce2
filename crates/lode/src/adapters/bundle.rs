// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Locale resource tables.
//!
//! A [`PropertiesBundle`] holds `key=value` entries loaded from
//! `.properties` text and falls back to its parent for missing keys.
//! [`PropertiesBundle::load`] builds the usual locale chain, most specific
//! first:
//!
//! ```text
//! messages_fr_CA.properties -> messages_fr.properties -> messages.properties
//! ```
//!
//! [`BundleAdapter`] exposes any [`ResourceTable`] as a read-only map.
//! Missing keys read as absent, never as an error.

use crate::value::{MapView, Value};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

const EXTENSION: &str = "properties";

/// Flat string lookup.
pub trait ResourceTable: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;

    /// Every key visible through this table, including inherited ones.
    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }
}

/// Resource table parsed from `.properties` text.
#[derive(Debug, Clone, Default)]
pub struct PropertiesBundle {
    entries: BTreeMap<String, String>,
    parent: Option<Arc<PropertiesBundle>>,
}

impl PropertiesBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `.properties` text.
    ///
    /// Supports `=`, `:` or whitespace separators, `#`/`!` comment lines,
    /// trailing-backslash continuations, and `\t \n \r \f \uXXXX` escapes.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut pending = String::new();
        let mut offset = 0usize;
        let mut start = 0usize;

        for line in text.split_inclusive('\n') {
            let line_offset = offset;
            offset += line.len();
            let content = line.trim_end_matches(['\n', '\r']);
            let trimmed = content.trim_start();

            if pending.is_empty() {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                start = line_offset + (content.len() - trimmed.len());
            }

            if ends_with_continuation(trimmed) {
                pending.push_str(&trimmed[..trimmed.len() - 1]);
                continue;
            }
            pending.push_str(trimmed);

            let (key, value) = split_entry(&pending);
            let key = unescape(key, start)?;
            let value = unescape(value, start)?;
            entries.insert(key, value);
            pending.clear();
        }

        if !pending.is_empty() {
            let (key, value) = split_entry(&pending);
            entries.insert(unescape(key, start)?, unescape(value, start)?);
        }

        Ok(Self {
            entries,
            parent: None,
        })
    }

    /// Resolves `base_name` for `locale` (e.g. `fr_CA`, `fr-CA` or `fr`)
    /// under `dir`, chaining every candidate that exists.
    ///
    /// Fails with [`Error::Resource`] when no candidate exists at all.
    pub fn load(dir: impl AsRef<Path>, base_name: &str, locale: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let mut chain: Option<Arc<PropertiesBundle>> = None;

        for candidate in candidates(base_name, locale).into_iter().rev() {
            let path = dir.join(format!("{}.{}", candidate, EXTENSION));
            if !path.is_file() {
                log::debug!("[bundle] {} not found", path.display());
                continue;
            }
            let text = std::fs::read_to_string(&path)?;
            let mut bundle = Self::parse(&text)?;
            bundle.parent = chain.take();
            log::debug!(
                "[bundle] loaded {} ({} entries)",
                path.display(),
                bundle.entries.len()
            );
            chain = Some(Arc::new(bundle));
        }

        let bundle = chain.ok_or_else(|| {
            Error::Resource(format!(
                "no bundle `{}` for locale `{}` in {}",
                base_name,
                locale,
                dir.display()
            ))
        })?;
        Ok(Arc::try_unwrap(bundle).unwrap_or_else(|shared| (*shared).clone()))
    }

    pub fn with_parent(mut self, parent: PropertiesBundle) -> Self {
        self.parent = Some(Arc::new(parent));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn parent(&self) -> Option<&PropertiesBundle> {
        self.parent.as_deref()
    }

    /// Entries defined by this bundle alone.
    pub fn local_len(&self) -> usize {
        self.entries.len()
    }
}

impl ResourceTable for PropertiesBundle {
    fn lookup(&self, key: &str) -> Option<String> {
        let mut bundle = Some(self);
        while let Some(current) = bundle {
            if let Some(value) = current.entries.get(key) {
                return Some(value.clone());
            }
            bundle = current.parent.as_deref();
        }
        None
    }

    fn keys(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        let mut bundle = Some(self);
        while let Some(current) = bundle {
            keys.extend(current.entries.keys().cloned());
            bundle = current.parent.as_deref();
        }
        keys.into_iter().collect()
    }
}

/// Bundle names from most to least specific.
fn candidates(base_name: &str, locale: &str) -> Vec<String> {
    let parts: Vec<&str> = locale
        .split(['_', '-'])
        .filter(|p| !p.is_empty())
        .collect();
    let mut names = Vec::with_capacity(parts.len() + 1);
    for n in (1..=parts.len()).rev() {
        names.push(format!("{}_{}", base_name, parts[..n].join("_")));
    }
    names.push(base_name.to_string());
    names
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits at the first unescaped `=`, `:` or whitespace.
fn split_entry(entry: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in entry.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (entry[..i].trim_end(), entry[i + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = entry[i..].trim_start();
                let rest = rest
                    .strip_prefix(['=', ':'])
                    .map_or(rest, str::trim_start);
                return (&entry[..i], rest);
            }
            _ => {}
        }
    }
    (entry, "")
}

fn unescape(text: &str, offset: usize) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| Error::parse(offset, format!("invalid escape \\u{}", hex)))?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Read-only map view over a [`ResourceTable`].
#[derive(Clone)]
pub struct BundleAdapter {
    table: Arc<dyn ResourceTable>,
}

impl BundleAdapter {
    pub fn new(table: impl ResourceTable + 'static) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn shared(table: Arc<dyn ResourceTable>) -> Self {
        Self { table }
    }

    pub fn into_value(self) -> Value {
        Value::MapView(Arc::new(self))
    }
}

impl MapView for BundleAdapter {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.table.keys())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.table.lookup(key).map(Value::String))
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.table.contains(key))
    }
}

impl std::fmt::Debug for BundleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleAdapter")
            .field("keys", &self.table.keys().len())
            .finish()
    }
}
