// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversions between Rust types and [`Value`].
//!
//! Coercion rules for [`FromValue`]:
//!
//! - `Null` fails for non-optional targets and becomes `None` for `Option<T>`
//! - numbers convert between integral and floating forms with `as` semantics
//!   (truncating toward zero, wrapping on integer narrowing)
//! - strings parse into numeric, boolean and temporal targets
//! - `Instant`/`Duration` targets also accept epoch milliseconds
//! - anything else is [`Error::TypeMismatch`] naming both types

use super::{Bean, BeanAdapter};
use crate::value::{temporal, Number, Temporal, Value, ValueMap};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Converts a typed value into the generic model.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Coerces a generic value into a typed value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

/// Describes `value` for a mismatch error, e.g. `string "abc"`.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) if s.len() <= 32 => format!("string {:?}", s),
        Value::Number(n) => format!("{} {}", value.kind(), n),
        Value::Temporal(t) => format!("{} {}", t.kind(), t),
        other => other.kind().to_string(),
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::mismatch(describe(value), std::any::type_name::<T>())
}

// ============================================================================
// Value and scalars
// ============================================================================

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl ToValue for Number {
    fn to_value(&self) -> Value {
        Value::Number(*self)
    }
}

impl FromValue for Number {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(*n),
            Value::String(s) => parse_number(s).ok_or_else(|| mismatch::<Self>(value)),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(Number::Int(v));
    }
    text.parse::<f64>().ok().map(Number::Float)
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(n.as_f64() != 0.0),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {$(
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                match i64::try_from(*self) {
                    Ok(v) => Value::Number(Number::Int(v)),
                    Err(_) => Value::Number(Number::Float(*self as f64)),
                }
            }
        }

        impl FromValue for $t {
            fn from_value(value: &Value) -> Result<Self> {
                let number = match value {
                    Value::Number(n) => *n,
                    Value::String(s) => parse_number(s).ok_or_else(|| mismatch::<Self>(value))?,
                    other => return Err(mismatch::<Self>(other)),
                };
                Ok(match number {
                    Number::Int(v) => v as $t,
                    Number::Float(v) => v as $t,
                })
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($t:ty),* $(,)?) => {$(
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Number(Number::Float(f64::from(*self)))
            }
        }

        impl FromValue for $t {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Number(n) => Ok(n.as_f64() as $t),
                    Value::String(s) => s
                        .trim()
                        .parse::<$t>()
                        .map_err(|_| mismatch::<Self>(value)),
                    other => Err(mismatch::<Self>(other)),
                }
            }
        }
    )*};
}

impl_float!(f32, f64);

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Result<Self> {
        let mut chars = value.as_str().unwrap_or_default().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

/// Scalars render as their text; containers and `Null` do not convert.
impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Temporal(t) => Ok(t.to_string()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

// ============================================================================
// Temporal
// ============================================================================

impl ToValue for Temporal {
    fn to_value(&self) -> Value {
        Value::Temporal(*self)
    }
}

impl FromValue for Temporal {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Temporal(t) => Ok(*t),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

macro_rules! impl_temporal {
    ($t:ty, $variant:ident, $parse:path) => {
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Temporal(Temporal::$variant(*self))
            }
        }

        impl FromValue for $t {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Temporal(Temporal::$variant(v)) => Ok(*v),
                    Value::String(s) => $parse(s),
                    other => from_millis::<Self>(other),
                }
            }
        }
    };
}

impl_temporal!(NaiveDate, Date, temporal::parse_date);
impl_temporal!(NaiveTime, Time, temporal::parse_time);
impl_temporal!(NaiveDateTime, DateTime, temporal::parse_date_time);
impl_temporal!(DateTime<Utc>, Instant, temporal::parse_instant);
impl_temporal!(TimeDelta, Duration, temporal::parse_duration);

/// Epoch-millisecond fallback for instants and durations.
fn from_millis<T: FromMillis>(value: &Value) -> Result<T> {
    match value {
        Value::Number(n) => T::from_millis(n.as_i64()),
        other => Err(mismatch::<T>(other)),
    }
}

trait FromMillis: Sized {
    fn from_millis(millis: i64) -> Result<Self>;
}

impl FromMillis for DateTime<Utc> {
    fn from_millis(millis: i64) -> Result<Self> {
        temporal::instant_from_millis(millis)
    }
}

impl FromMillis for TimeDelta {
    fn from_millis(millis: i64) -> Result<Self> {
        temporal::duration_from_millis(millis)
    }
}

macro_rules! impl_no_millis {
    ($($t:ty),*) => {$(
        impl FromMillis for $t {
            fn from_millis(millis: i64) -> Result<Self> {
                Err(Error::mismatch(
                    format!("integer {}", millis),
                    std::any::type_name::<Self>(),
                ))
            }
        }
    )*};
}

impl_no_millis!(NaiveDate, NaiveTime, NaiveDateTime);

// ============================================================================
// Containers
// ============================================================================

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

/// Accepts owned lists and list views; single-pass views are consumed.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if !value.is_list() {
            return Err(mismatch::<Self>(value));
        }
        value
            .elements()?
            .map(|item| item.and_then(|v| T::from_value(&v)))
            .collect()
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<Self> {
        if !value.is_map() {
            return Err(mismatch::<Self>(value));
        }
        value
            .entries()?
            .into_iter()
            .map(|(k, v)| T::from_value(&v).map(|v| (k, v)))
            .collect()
    }
}

// Hash order is arbitrary; sort so output is stable.
impl<T: ToValue, S> ToValue for HashMap<String, T, S> {
    fn to_value(&self) -> Value {
        let mut entries: ValueMap = self
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect();
        entries.sort_keys();
        Value::Map(entries)
    }
}

impl<T: ToValue, S> ToValue for IndexMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<T: FromValue, S: std::hash::BuildHasher + Default> FromValue for IndexMap<String, T, S> {
    fn from_value(value: &Value) -> Result<Self> {
        if !value.is_map() {
            return Err(mismatch::<Self>(value));
        }
        value
            .entries()?
            .into_iter()
            .map(|(k, v)| T::from_value(&v).map(|v| (k, v)))
            .collect()
    }
}

impl<T: FromValue, S: std::hash::BuildHasher + Default> FromValue for HashMap<String, T, S> {
    fn from_value(value: &Value) -> Result<Self> {
        if !value.is_map() {
            return Err(mismatch::<Self>(value));
        }
        value
            .entries()?
            .into_iter()
            .map(|(k, v)| T::from_value(&v).map(|v| (k, v)))
            .collect()
    }
}

// ============================================================================
// Shared beans
// ============================================================================

/// A shared bean adapts to a live view: reads re-invoke its getters.
impl<T: Bean> ToValue for Arc<RwLock<T>> {
    fn to_value(&self) -> Value {
        Value::MapView(Arc::new(BeanAdapter::shared(Arc::clone(self))))
    }
}

impl<T: FromValue> FromValue for Arc<RwLock<T>> {
    fn from_value(value: &Value) -> Result<Self> {
        T::from_value(value).map(|v| Arc::new(RwLock::new(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_widening_and_truncation() {
        assert_eq!(f64::from_value(&Value::from(5)).expect("f64"), 5.0);
        assert_eq!(i64::from_value(&Value::from(5)).expect("i64"), 5);
        assert_eq!(i32::from_value(&Value::from(2.0)).expect("i32"), 2);
        assert_eq!(i32::from_value(&Value::from(2.9)).expect("i32"), 2);
        assert_eq!(i32::from_value(&Value::from(-2.9)).expect("i32"), -2);
        assert_eq!(u8::from_value(&Value::from(300)).expect("u8"), 44);
        assert_eq!(f32::from_value(&Value::from(1.5)).expect("f32"), 1.5);
    }

    #[test]
    fn test_null_into_primitive_fails() {
        let err = i32::from_value(&Value::Null).expect_err("null");
        assert!(matches!(err, Error::TypeMismatch { ref from, ref to } if from == "null" && to == "i32"));
        assert_eq!(Option::<i32>::from_value(&Value::Null).expect("option"), None);
        assert_eq!(Option::<i32>::from_value(&Value::from(3)).expect("option"), Some(3));
    }

    #[test]
    fn test_strings_parse_into_targets() {
        assert_eq!(i32::from_value(&Value::from(" 42 ")).expect("i32"), 42);
        assert_eq!(f64::from_value(&Value::from("1.25")).expect("f64"), 1.25);
        assert!(bool::from_value(&Value::from("TRUE")).expect("bool"));
        assert!(i32::from_value(&Value::from("abc")).is_err());

        let date = NaiveDate::from_value(&Value::from("2018-06-28")).expect("date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2018, 6, 28).expect("ymd"));
        assert!(NaiveDate::from_value(&Value::from("28/06/2018")).is_err());
    }

    #[test]
    fn test_epoch_millis_into_instant_and_duration() {
        let instant = DateTime::<Utc>::from_value(&Value::from(1)).expect("instant");
        assert_eq!(instant.timestamp_millis(), 1);
        let duration = TimeDelta::from_value(&Value::from(1500)).expect("duration");
        assert_eq!(duration.num_milliseconds(), 1500);
        assert!(NaiveDate::from_value(&Value::from(1)).is_err());
    }

    #[test]
    fn test_numbers_into_bool() {
        assert!(bool::from_value(&Value::from(2)).expect("bool"));
        assert!(!bool::from_value(&Value::from(0.0)).expect("bool"));
    }

    #[test]
    fn test_containers() {
        let list = vec![1i32, 2, 3].to_value();
        assert_eq!(Vec::<i64>::from_value(&list).expect("vec"), vec![1, 2, 3]);

        let seq = Value::sequence((0..3).map(Value::from));
        assert_eq!(Vec::<f64>::from_value(&seq).expect("vec"), vec![0.0, 1.0, 2.0]);

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u16);
        let value = map.to_value();
        let back: HashMap<String, u16> = HashMap::from_value(&value).expect("map");
        assert_eq!(back.get("a"), Some(&1));

        assert!(Vec::<i32>::from_value(&Value::from(1)).is_err());
    }

    #[test]
    fn test_large_unsigned_widens_to_float() {
        assert_eq!(u64::MAX.to_value(), Value::from(u64::MAX as f64));
    }
}
