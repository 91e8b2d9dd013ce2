// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic value model.
//!
//! Every structure that crosses a lode boundary is presented as a [`Value`]:
//! a scalar, an ordered list, or an insertion-ordered map. Lists and maps are either
//! owned (`List`, `Map`) or *views* computed on demand from a backing
//! resource (`ListView`, `MapView`). Views re-derive their entries on every
//! access, so reads observe later mutations of the backing resource.
//!
//! # Example
//!
//! ```
//! use lode::value::{Path, Value};
//!
//! let v: Value = [("a", Value::from(vec![Value::from(1), Value::from(2)]))]
//!     .into_iter()
//!     .collect();
//!
//! let second = v.value_at(&Path::parse("a[1]").unwrap()).unwrap();
//! assert_eq!(second, Some(Value::from(2)));
//! ```

mod path;
mod shared;
pub mod temporal;

pub use path::{Path, Segment};
pub use shared::{Sequence, SharedMap};
pub use temporal::Temporal;

use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Owned map storage. Keeps insertion order; equality ignores order.
pub type ValueMap = IndexMap<String, Value>;

/// Boxed fallible element iterator returned by list traversal.
pub type Elements<'a> = Box<dyn Iterator<Item = Result<Value>> + 'a>;

/// A list whose elements are computed from a backing resource.
///
/// Forward-only backings fail `len` and `get` with [`Error::Unsupported`]
/// and allow `elements` to be called once.
pub trait ListView: Send + Sync {
    fn len(&self) -> Result<usize>;

    fn get(&self, index: usize) -> Result<Value>;

    fn elements(&self) -> Result<Elements<'_>>;
}

/// A map whose entries are computed from a backing resource.
pub trait MapView: Send + Sync {
    fn keys(&self) -> Result<Vec<String>>;

    /// `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }
}

/// Numeric scalar; integral and floating values are distinct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Truncating conversion.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Self::Int(v) => v,
            Self::Float(v) => v as i64,
        }
    }

    /// Widening conversion.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            // Debug keeps a decimal point or exponent (`2.0`, `1e300`).
            Self::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// Loosely-typed value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Temporal(Temporal),
    List(Vec<Value>),
    Map(ValueMap),
    ListView(Arc<dyn ListView>),
    MapView(Arc<dyn MapView>),
}

impl Value {
    /// Wraps a single-pass iterator as a list view.
    pub fn sequence<I>(iter: I) -> Self
    where
        I: Iterator<Item = Value> + Send + 'static,
    {
        Self::ListView(Arc::new(Sequence::new(iter.map(Ok::<_, Error>))))
    }

    /// Like [`Value::sequence`] for fallible producers.
    pub fn try_sequence<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Value>> + Send + 'static,
    {
        Self::ListView(Arc::new(Sequence::new(iter)))
    }

    pub fn list_view(view: impl ListView + 'static) -> Self {
        Self::ListView(Arc::new(view))
    }

    pub fn map_view(view: impl MapView + 'static) -> Self {
        Self::MapView(Arc::new(view))
    }

    /// Shape name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(Number::Int(_)) => "integer",
            Self::Number(Number::Float(_)) => "float",
            Self::String(_) => "string",
            Self::Temporal(t) => t.kind(),
            Self::List(_) | Self::ListView(_) => "list",
            Self::Map(_) | Self::MapView(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_) | Self::ListView(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_) | Self::MapView(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integral numbers only.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(Number::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Any number, widened.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Self::Temporal(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Map lookup. Absent keys and non-map values yield `None`.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        match self {
            Self::Map(entries) => Ok(entries.get(key).cloned()),
            Self::MapView(view) => view.get(key),
            _ => Ok(None),
        }
    }

    /// List lookup. Out-of-range indices fail; non-list values yield `None`.
    pub fn at(&self, index: usize) -> Result<Option<Value>> {
        match self {
            Self::List(items) => items
                .get(index)
                .cloned()
                .map(Some)
                .ok_or(Error::IndexOutOfBounds {
                    index,
                    len: items.len(),
                }),
            Self::ListView(view) => view.get(index).map(Some),
            _ => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        match self {
            Self::Map(entries) => Ok(entries.contains_key(key)),
            Self::MapView(view) => view.contains_key(key),
            _ => Ok(false),
        }
    }

    /// Entry count of a list or map.
    pub fn len(&self) -> Result<usize> {
        match self {
            Self::List(items) => Ok(items.len()),
            Self::Map(entries) => Ok(entries.len()),
            Self::ListView(view) => view.len(),
            Self::MapView(view) => view.len(),
            other => Err(Error::unsupported(
                "len",
                format!("{} is not a container", other.kind()),
            )),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Iterates list elements. Single-pass views allow one traversal.
    pub fn elements(&self) -> Result<Elements<'_>> {
        match self {
            Self::List(items) => Ok(Box::new(items.iter().cloned().map(Ok::<_, Error>))),
            Self::ListView(view) => view.elements(),
            other => Err(Error::unsupported(
                "elements",
                format!("{} is not a list", other.kind()),
            )),
        }
    }

    /// Snapshot of map entries in key order.
    pub fn entries(&self) -> Result<Vec<(String, Value)>> {
        match self {
            Self::Map(entries) => Ok(entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Self::MapView(view) => {
                let mut out = Vec::new();
                for key in view.keys()? {
                    if let Some(value) = view.get(&key)? {
                        out.push((key, value));
                    }
                }
                Ok(out)
            }
            other => Err(Error::unsupported(
                "entries",
                format!("{} is not a map", other.kind()),
            )),
        }
    }

    /// Copies every view reachable from this value into owned lists and maps.
    ///
    /// Consumes single-pass views.
    pub fn materialize(&self) -> Result<Value> {
        match self {
            Self::List(_) | Self::ListView(_) => {
                let mut items = Vec::new();
                for item in self.elements()? {
                    items.push(item?.materialize()?);
                }
                Ok(Self::List(items))
            }
            Self::Map(_) | Self::MapView(_) => {
                let mut entries = ValueMap::new();
                for (key, value) in self.entries()? {
                    entries.insert(key, value.materialize()?);
                }
                Ok(Self::Map(entries))
            }
            scalar => Ok(scalar.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Temporal(a), Self::Temporal(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            // Views have identity, not structural, equality.
            (Self::ListView(a), Self::ListView(b)) => Arc::ptr_eq(a, b),
            (Self::MapView(a), Self::MapView(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Temporal(t) => f.debug_tuple("Temporal").field(t).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::ListView(_) => f.write_str("ListView(..)"),
            Self::MapView(_) => f.write_str("MapView(..)"),
        }
    }
}

// Conversion traits
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(Number::Int(i64::from(v)))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Number(Number::Int(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(Number::Float(v))
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Temporal> for Value {
    fn from(v: Temporal) -> Self {
        Self::Temporal(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<ValueMap> for Value {
    fn from(v: ValueMap) -> Self {
        Self::Map(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Self::Map(v.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests;
