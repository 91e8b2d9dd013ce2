// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in views: a mutable shared map and a single-pass sequence.

use super::{Elements, ListView, MapView, Value, ValueMap};
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Thread-safe mutable map, presented to readers as a live [`MapView`].
///
/// Clones share the same storage: inserting through one handle is visible
/// through every view built from another.
#[derive(Clone, Default)]
pub struct SharedMap {
    inner: Arc<RwLock<ValueMap>>,
}

impl SharedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().shift_remove(key)
    }

    /// Owned copy of the current entries.
    pub fn snapshot(&self) -> ValueMap {
        self.inner.read().clone()
    }

    /// Live view sharing this map's storage.
    pub fn to_value(&self) -> Value {
        Value::MapView(Arc::new(self.clone()))
    }
}

impl From<ValueMap> for SharedMap {
    fn from(entries: ValueMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(entries)),
        }
    }
}

impl MapView for SharedMap {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.inner.read().keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.inner.read().contains_key(key))
    }

    fn len(&self) -> Result<usize> {
        Ok(self.inner.read().len())
    }
}

type BoxedIter = Box<dyn Iterator<Item = Result<Value>> + Send>;

/// List view over an open iterator; elements can be traversed exactly once.
pub struct Sequence {
    source: Mutex<Option<BoxedIter>>,
}

impl Sequence {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Value>> + Send + 'static,
    {
        Self {
            source: Mutex::new(Some(Box::new(iter))),
        }
    }
}

impl ListView for Sequence {
    fn len(&self) -> Result<usize> {
        Err(Error::unsupported("len", "sequence is single-pass"))
    }

    fn get(&self, _index: usize) -> Result<Value> {
        Err(Error::unsupported("get", "sequence is single-pass"))
    }

    fn elements(&self) -> Result<Elements<'_>> {
        match self.source.lock().take() {
            Some(iter) => {
                let iter: Elements<'_> = iter;
                Ok(iter)
            }
            None => Err(Error::unsupported(
                "elements",
                "sequence was already traversed",
            )),
        }
    }
}
