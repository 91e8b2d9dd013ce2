// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Forward-only row cursor presented as a list of maps.
//!
//! # Row validity
//!
//! A row map reads the cursor's *current* position rather than a copy of
//! the row. It is valid until the cursor advances again; reading it after
//! that fails with [`Error::Unsupported`]. [`ResultSetAdapter::next_row`]
//! hands out a [`Row`] borrowing the adapter, so the borrow checker rules
//! out stale reads at compile time; the [`ListView`] traversal used by the
//! encoder checks the position at run time.
//!
//! # Release order
//!
//! Closing releases the cursor, then the owning statement, then the owning
//! connection. Every release is attempted; the first failure is returned as
//! [`Error::ResourceClosure`] and later failures are logged.

use crate::value::{Elements, ListView, MapView, Value, ValueMap};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Forward-only source of rows with named columns.
pub trait RowCursor: Send {
    /// Moves to the next row. Returns `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Column labels, in column order.
    fn columns(&self) -> &[String];

    /// Value of column `index` in the current row.
    fn value(&self, index: usize) -> Result<Value>;

    fn close(&mut self) -> Result<()>;
}

/// A resource owning a cursor (statement, connection) that must be released.
pub trait Release: Send {
    fn close(&mut self) -> Result<()>;
}

type Transform = Box<dyn Fn(Value) -> Result<Value> + Send + Sync>;

struct CursorState {
    cursor: Box<dyn RowCursor>,
    statement: Option<Box<dyn Release>>,
    connection: Option<Box<dyn Release>>,
    transforms: HashMap<String, Transform>,
    /// Cached result of the last advance, until a row consumes it.
    pending: Option<bool>,
    /// Number of rows handed out; identifies the current row.
    position: u64,
    traversed: bool,
    closed: bool,
}

impl CursorState {
    fn has_next(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        if let Some(pending) = self.pending {
            return Ok(pending);
        }
        let pending = self.cursor.advance()?;
        if !pending {
            log::debug!("[cursor] exhausted after {} rows", self.position);
        }
        self.pending = Some(pending);
        Ok(pending)
    }

    /// Consumes the pending row and returns its position.
    fn next_position(&mut self) -> Result<Option<u64>> {
        if !self.has_next()? {
            return Ok(None);
        }
        self.pending = None;
        self.position += 1;
        Ok(Some(self.position))
    }

    fn check(&self, position: u64) -> Result<()> {
        if self.closed {
            return Err(Error::unsupported("get", "result set is closed"));
        }
        if position != self.position || self.pending.is_some() {
            return Err(Error::unsupported(
                "get",
                format!("row {} is no longer current", position),
            ));
        }
        Ok(())
    }

    fn read(&self, position: u64, key: &str) -> Result<Option<Value>> {
        self.check(position)?;
        let Some(index) = self.cursor.columns().iter().position(|c| c == key) else {
            return Ok(None);
        };
        let value = self.cursor.value(index)?;
        match self.transforms.get(key) {
            Some(transform) if !value.is_null() => transform(value).map(Some),
            _ => Ok(Some(value)),
        }
    }

    fn snapshot(&self, position: u64) -> Result<Value> {
        self.check(position)?;
        let mut row = ValueMap::new();
        for key in self.cursor.columns() {
            if let Some(value) = self.read(position, key)? {
                row.insert(key.clone(), value);
            }
        }
        Ok(Value::Map(row))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut first: Option<Error> = None;
        let mut record = |resource: &'static str, result: Result<()>| {
            if let Err(err) = result {
                if first.is_none() {
                    first = Some(Error::ResourceClosure {
                        resource,
                        source: Box::new(err),
                    });
                } else {
                    log::warn!("[cursor] failed to close {}: {}", resource, err);
                }
            }
        };

        record("cursor", self.cursor.close());
        if let Some(mut statement) = self.statement.take() {
            record("statement", statement.close());
        }
        if let Some(mut connection) = self.connection.take() {
            record("connection", connection.close());
        }

        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Cursor-backed list of row maps.
///
/// `len` and `get` are unsupported; rows are read once, in order.
pub struct ResultSetAdapter {
    state: Arc<Mutex<CursorState>>,
}

impl ResultSetAdapter {
    pub fn new(cursor: impl RowCursor + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(CursorState {
                cursor: Box::new(cursor),
                statement: None,
                connection: None,
                transforms: HashMap::new(),
                pending: None,
                position: 0,
                traversed: false,
                closed: false,
            })),
        }
    }

    /// Statement to release after the cursor.
    pub fn with_statement(self, statement: impl Release + 'static) -> Self {
        self.state.lock().statement = Some(Box::new(statement));
        self
    }

    /// Connection to release after the statement.
    pub fn with_connection(self, connection: impl Release + 'static) -> Self {
        self.state.lock().connection = Some(Box::new(connection));
        self
    }

    /// Applies `transform` to every non-null value read from `column`.
    pub fn map_column<F>(&mut self, column: impl Into<String>, transform: F)
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.state
            .lock()
            .transforms
            .insert(column.into(), Box::new(transform));
    }

    pub fn columns(&self) -> Vec<String> {
        self.state.lock().cursor.columns().to_vec()
    }

    /// Whether another row is available. Advances the cursor at most once
    /// per row.
    pub fn has_next(&mut self) -> Result<bool> {
        self.state.lock().has_next()
    }

    /// Advances to the next row and lends it out.
    pub fn next_row(&mut self) -> Result<Option<Row<'_>>> {
        let position = self.state.lock().next_position()?;
        Ok(position.map(|position| Row {
            adapter: self,
            position,
        }))
    }

    /// Releases the cursor, statement and connection. Idempotent.
    pub fn close(&self) -> Result<()> {
        self.state.lock().close()
    }

    /// Wraps the adapter as a single-pass list value.
    pub fn into_value(self) -> Value {
        Value::ListView(Arc::new(self))
    }
}

impl ListView for ResultSetAdapter {
    fn len(&self) -> Result<usize> {
        Err(Error::unsupported("len", "result set is forward-only"))
    }

    fn get(&self, _index: usize) -> Result<Value> {
        Err(Error::unsupported("get", "result set is forward-only"))
    }

    fn elements(&self) -> Result<Elements<'_>> {
        let mut state = self.state.lock();
        if state.traversed {
            return Err(Error::unsupported(
                "elements",
                "result set was already traversed",
            ));
        }
        state.traversed = true;
        Ok(Box::new(Rows {
            state: Arc::clone(&self.state),
            done: false,
        }))
    }
}

impl Drop for ResultSetAdapter {
    fn drop(&mut self) {
        if let Err(err) = self.state.lock().close() {
            log::warn!("[cursor] close on drop failed: {}", err);
        }
    }
}

/// The current row, borrowed from its adapter.
pub struct Row<'a> {
    adapter: &'a ResultSetAdapter,
    position: u64,
}

impl Row<'_> {
    /// One-based row number.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Owned copy of the row.
    pub fn to_value(&self) -> Result<Value> {
        self.adapter.state.lock().snapshot(self.position)
    }
}

impl MapView for Row<'_> {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.adapter.columns())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.adapter.state.lock().read(self.position, key)
    }
}

/// Row map handed out by the list traversal.
struct RowView {
    state: Arc<Mutex<CursorState>>,
    position: u64,
}

impl MapView for RowView {
    fn keys(&self) -> Result<Vec<String>> {
        let state = self.state.lock();
        state.check(self.position)?;
        Ok(state.cursor.columns().to_vec())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.state.lock().read(self.position, key)
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        let state = self.state.lock();
        state.check(self.position)?;
        Ok(state.cursor.columns().iter().any(|c| c == key))
    }
}

struct Rows {
    state: Arc<Mutex<CursorState>>,
    done: bool,
}

impl Iterator for Rows {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.state.lock().next_position();
        match next {
            Ok(Some(position)) => Some(Ok(Value::MapView(Arc::new(RowView {
                state: Arc::clone(&self.state),
                position,
            })))),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
