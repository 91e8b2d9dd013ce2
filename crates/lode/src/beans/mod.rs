// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed-object adapter.
//!
//! Maps typed domain objects to and from the generic value model.
//!
//! # Features
//!
//! - **Bean**: property table generated by `#[derive(Bean)]` (getter, optional setter, declared type)
//! - **BeanAdapter**: live map view over a shared bean; reads re-invoke getters
//! - **Registry**: process-lifetime cache of property and accessor tables, keyed by type
//! - **TypedView**: call-time coercing view over a generic map, generated by `#[view]`
//!
//! # Example
//!
//! ```
//! use lode::{Bean, BeanAdapter, FromValue, RwLock, Value};
//! use std::sync::Arc;
//!
//! #[derive(Bean, Default)]
//! struct Sensor {
//!     sensor_id: u32,
//!     reading: f64,
//! }
//!
//! let sensor = Arc::new(RwLock::new(Sensor { sensor_id: 7, reading: 1.5 }));
//! let view = Value::map_view(BeanAdapter::shared(Arc::clone(&sensor)));
//! assert_eq!(view.get("sensorId").unwrap(), Some(Value::from(7)));
//!
//! sensor.write().reading = 3.0;
//! assert_eq!(view.get("reading").unwrap(), Some(Value::from(3.0)));
//!
//! let copy = Sensor::from_value(&view).unwrap();
//! assert_eq!(copy.sensor_id, 7);
//! ```

mod coerce;
mod registry;
mod view;

pub use coerce::{FromValue, ToValue};
pub use registry::Registry;
pub use view::{Accessor, TypedView, ViewSpec, ViewType};

use crate::value::{MapView, Value};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// Getter stored in a [`Property`].
pub type Getter<T> = fn(&T) -> Value;

/// Assignment of an already-coerced value, produced by a [`Setter`].
pub type Assign<T> = Box<dyn FnOnce(&mut T)>;

/// Setter stored in a [`Property`].
///
/// Coercion runs without access to the bean; the returned [`Assign`] only
/// moves the coerced value into place.
pub type Setter<T> = fn(&Value) -> Result<Assign<T>>;

/// A type whose properties can be discovered.
///
/// Implemented by `#[derive(Bean)]`. The table is built once per type and
/// cached in the [`Registry`]; call [`Registry::bean_type`] rather than
/// [`Bean::bean_type`] directly.
pub trait Bean: Sized + Send + Sync + 'static {
    fn bean_type() -> BeanType<Self>;
}

/// One logical property of a bean.
pub struct Property<T> {
    name: &'static str,
    type_name: &'static str,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
    required: bool,
}

impl<T> Property<T> {
    pub fn new(name: &'static str, type_name: &'static str, getter: Getter<T>) -> Self {
        Self {
            name,
            type_name,
            getter,
            setter: None,
            required: false,
        }
    }

    pub fn with_setter(mut self, setter: Setter<T>) -> Self {
        self.setter = Some(setter);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared Rust type, as written in the source.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Reads the property. A required property that reads as null fails.
    pub fn get(&self, bean: &T) -> Result<Value> {
        let value = (self.getter)(bean);
        if self.required && value.is_null() {
            return Err(Error::MissingValue {
                property: self.name.to_string(),
            });
        }
        Ok(value)
    }

    /// Coerces `value` to the declared type, returning the assignment.
    pub fn prepare(&self, value: &Value) -> Result<Assign<T>> {
        let setter = self.setter.ok_or_else(|| {
            Error::unsupported("set", format!("property `{}` is read-only", self.name))
        })?;
        if self.required && value.is_null() {
            return Err(Error::MissingValue {
                property: self.name.to_string(),
            });
        }
        setter(value)
    }

    /// Coerces `value` to the declared type and assigns it.
    pub fn set(&self, bean: &mut T, value: &Value) -> Result<()> {
        let assign = self.prepare(value)?;
        assign(bean);
        Ok(())
    }
}

/// Property table of a bean type, ordered by property name.
pub struct BeanType<T> {
    name: &'static str,
    properties: Vec<Property<T>>,
}

impl<T> BeanType<T> {
    pub fn new(name: &'static str, mut properties: Vec<Property<T>>) -> Self {
        properties.sort_by(|a, b| a.name.cmp(b.name));
        properties.dedup_by(|a, b| a.name == b.name);
        Self { name, properties }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property<T>> {
        self.properties
            .binary_search_by(|p| p.name.cmp(name))
            .ok()
            .map(|i| &self.properties[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().map(|p| p.name)
    }
}

/// Live map view over a shared bean.
///
/// Keys are the bean's property names. `get` re-invokes the getter on every
/// call, so mutations of the bean are visible without re-adapting.
pub struct BeanAdapter<T: Bean> {
    bean: Arc<RwLock<T>>,
    table: Arc<BeanType<T>>,
}

impl<T: Bean> BeanAdapter<T> {
    pub fn new(bean: T) -> Self {
        Self::shared(Arc::new(RwLock::new(bean)))
    }

    pub fn shared(bean: Arc<RwLock<T>>) -> Self {
        Self::with_registry(bean, Registry::global())
    }

    pub fn with_registry(bean: Arc<RwLock<T>>, registry: &Registry) -> Self {
        Self {
            bean,
            table: registry.bean_type::<T>(),
        }
    }

    pub fn bean(&self) -> &Arc<RwLock<T>> {
        &self.bean
    }

    pub fn bean_type(&self) -> &BeanType<T> {
        &self.table
    }

    /// Coerces `value` and invokes the property's setter.
    ///
    /// The write lock is only taken once coercion has finished, so `value`
    /// may be a live view over this same bean.
    pub fn put(&self, key: &str, value: &Value) -> Result<()> {
        let property = self.table.property(key).ok_or_else(|| {
            Error::unsupported(
                "put",
                format!("`{}` has no property `{}`", self.table.name, key),
            )
        })?;
        let assign = property.prepare(value)?;
        assign(&mut self.bean.write());
        Ok(())
    }
}

impl<T: Bean> MapView for BeanAdapter<T> {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.table.names().map(str::to_string).collect())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.table.property(key) {
            Some(property) => property.get(&self.bean.read()).map(Some),
            None => Ok(None),
        }
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.table.property(key).is_some())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.table.properties.len())
    }
}

/// Owned map of every property, read through the getters.
///
/// This is a copy taken at call time, and nested beans and lists of beans are
/// copied with it. Later changes to `bean` are not visible through the
/// result; wrap the bean in `Arc<RwLock<T>>` and use [`BeanAdapter::shared`]
/// for a live view. Used by the `ToValue` impl generated by
/// `#[derive(Bean)]`.
pub fn bean_to_value<T: Bean>(bean: &T) -> Value {
    let table = Registry::global().bean_type::<T>();
    Value::Map(
        table
            .properties()
            .iter()
            .map(|p| (p.name.to_string(), (p.getter)(bean)))
            .collect(),
    )
}

/// Builds a bean from a generic map.
///
/// Starts from `T::default()`, then invokes the setter of every writable
/// property whose name is present in `value`. Unknown keys are ignored; a
/// required property that is absent or null fails.
pub fn bean_from_value<T: Bean + Default>(value: &Value) -> Result<T> {
    if !value.is_map() {
        return Err(Error::mismatch(
            coerce::describe(value),
            std::any::type_name::<T>(),
        ));
    }

    let table = Registry::global().bean_type::<T>();
    let mut bean = T::default();
    for property in table.properties().iter().filter(|p| p.is_writable()) {
        match value.get(property.name)? {
            Some(raw) => property.set(&mut bean, &raw)?,
            None if property.required => {
                return Err(Error::MissingValue {
                    property: property.name.to_string(),
                })
            }
            None => {}
        }
    }
    Ok(bean)
}

/// Converts any [`ToValue`] into the generic model.
///
/// For a plain `#[derive(Bean)]` value this copies every property (see
/// [`bean_to_value`]). Pass an `Arc<RwLock<T>>` instead, or build a
/// [`BeanAdapter::shared`], to get a view that re-reads the bean.
pub fn adapt<T: ToValue + ?Sized>(value: &T) -> Value {
    value.to_value()
}

/// Coerces a generic value into `T`.
pub fn coerce<T: FromValue>(value: &Value) -> Result<T> {
    T::from_value(value)
}
