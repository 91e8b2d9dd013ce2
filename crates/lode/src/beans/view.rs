// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed views over generic maps.
//!
//! `#[view]` on a trait generates a `<Trait>View` struct wrapping a
//! [`TypedView`]. Each trait method forwards to [`TypedView::call`], which
//! looks the method up in the trait's accessor table, reads the backing map
//! and coerces the raw value to the method's return type. Coercion happens
//! at call time, so the view stays live against its backing map and a bad
//! value only fails the method that reads it.

use super::{FromValue, Registry};
use crate::value::Value;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Method-to-property binding of a typed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    /// Trait method name.
    pub method: &'static str,
    /// Key read from the backing map.
    pub key: &'static str,
    /// Null or absent values fail with [`Error::MissingValue`].
    pub required: bool,
}

impl Accessor {
    pub const fn new(method: &'static str, key: &'static str) -> Self {
        Self {
            method,
            key,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Accessor table of one view type, keyed by method name.
#[derive(Debug, Clone)]
pub struct ViewType {
    name: &'static str,
    accessors: HashMap<&'static str, Accessor>,
}

impl ViewType {
    pub fn new(name: &'static str, accessors: Vec<Accessor>) -> Self {
        Self {
            name,
            accessors: accessors.into_iter().map(|a| (a.method, a)).collect(),
        }
    }

    /// Name of the trait the view implements.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn accessor(&self, method: &str) -> Option<&Accessor> {
        self.accessors.get(method)
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

/// Implemented by types generated with `#[view]`.
pub trait ViewSpec: 'static {
    fn view_type() -> ViewType;
}

/// Backing map plus the accessor table of the view type.
#[derive(Clone)]
pub struct TypedView {
    source: Value,
    table: Arc<ViewType>,
}

impl TypedView {
    pub fn new<V: ViewSpec>(source: Value) -> Self {
        Self::with_registry::<V>(source, Registry::global())
    }

    pub fn with_registry<V: ViewSpec>(source: Value, registry: &Registry) -> Self {
        Self {
            source,
            table: registry.view_type::<V>(),
        }
    }

    /// Checks that `source` is a map before wrapping it.
    pub fn wrap<V: ViewSpec>(source: &Value) -> Result<Self> {
        if !source.is_map() {
            return Err(Error::mismatch(
                super::coerce::describe(source),
                std::any::type_name::<V>(),
            ));
        }
        Ok(Self::new::<V>(source.clone()))
    }

    /// Backing map.
    pub fn source(&self) -> &Value {
        &self.source
    }

    pub fn view_type(&self) -> &ViewType {
        &self.table
    }

    /// Reads the property bound to `method` and coerces it to `T`.
    pub fn call<T: FromValue>(&self, method: &str) -> Result<T> {
        let accessor = self.table.accessor(method).ok_or_else(|| {
            Error::unsupported(
                "call",
                format!("`{}` has no accessor `{}`", self.table.name, method),
            )
        })?;

        let raw = self.source.get(accessor.key)?.unwrap_or(Value::Null);
        if accessor.required && raw.is_null() {
            return Err(Error::MissingValue {
                property: accessor.key.to_string(),
            });
        }
        T::from_value(&raw)
    }
}

impl fmt::Debug for TypedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView")
            .field("view", &self.table.name)
            .field("source", &self.source)
            .finish()
    }
}
