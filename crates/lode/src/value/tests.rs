// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;

fn nested() -> Value {
    let c: Value = vec![Value::from(1), Value::from(2), Value::from(3)].into();
    let b: Value = [("c", c)].into_iter().collect();
    let a: Value = [("b", b)].into_iter().collect();
    [("a", a)].into_iter().collect()
}

#[test]
fn test_path_navigation() {
    let root = nested();

    let hit = root
        .value_at(&Path::new().key("a").key("b").key("c").index(1))
        .expect("navigate");
    assert_eq!(hit, Some(Value::from(2)));

    let missing = root
        .value_at(&Path::new().key("a").key("b").key("d").index(1))
        .expect("navigate");
    assert_eq!(missing, None);

    let err = root
        .value_at(&Path::new().key("a").key("b").key("c").index(4))
        .expect_err("out of range");
    assert!(matches!(err, Error::IndexOutOfBounds { index: 4, len: 3 }));
}

#[test]
fn test_path_through_scalar_is_absent() {
    let root = nested();
    let path = Path::parse("a.b.c[0].deeper").expect("parse");
    assert_eq!(root.value_at(&path).expect("navigate"), None);

    let empty = Path::new();
    assert_eq!(root.value_at(&empty).expect("navigate"), Some(root.clone()));
}

#[test]
fn test_index_on_map_uses_decimal_key() {
    let root: Value = [("7", Value::from("seven"))].into_iter().collect();
    let hit = root.value_at(&Path::new().index(7)).expect("navigate");
    assert_eq!(hit, Some(Value::from("seven")));
}

#[test]
fn test_number_distinction() {
    assert_ne!(Value::from(2), Value::from(2.0));
    assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
    assert_eq!(Value::from(7).as_f64(), Some(7.0));
    assert_eq!(Value::from(7.9).as_i64(), None);
    assert_eq!(Number::Float(7.9).as_i64(), 7);
    assert_eq!(Number::Float(2.0).to_string(), "2.0");
    assert_eq!(Number::Int(2).to_string(), "2");
}

#[test]
fn test_shared_map_is_live() {
    let backing = SharedMap::new();
    backing.insert("p", 1);
    let view = backing.to_value();

    assert_eq!(view.get("p").expect("get"), Some(Value::from(1)));
    backing.insert("p", 2);
    assert_eq!(view.get("p").expect("get"), Some(Value::from(2)));
    assert!(!view.contains_key("q").expect("contains"));
    assert_eq!(view.len().expect("len"), 1);
}

#[test]
fn test_sequence_is_single_pass() {
    let seq = Value::sequence((1..=3).map(Value::from));

    assert!(matches!(seq.len(), Err(Error::Unsupported { .. })));
    assert!(matches!(seq.at(0), Err(Error::Unsupported { .. })));

    let items: Vec<Value> = seq
        .elements()
        .expect("first pass")
        .collect::<Result<_>>()
        .expect("items");
    assert_eq!(items, vec![Value::from(1), Value::from(2), Value::from(3)]);

    assert!(matches!(seq.elements(), Err(Error::Unsupported { .. })));
}

#[test]
fn test_materialize_copies_views() {
    let backing = SharedMap::new();
    backing.insert("xs", Value::sequence((0..2).map(Value::from)));
    let view = backing.to_value();

    let owned = view.materialize().expect("materialize");
    let expected: Value = [("xs", Value::from(vec![Value::from(0), Value::from(1)]))]
        .into_iter()
        .collect();
    assert_eq!(owned, expected);
}

#[test]
fn test_view_equality_is_identity() {
    let backing = SharedMap::new();
    let a = backing.to_value();
    let b = a.clone();
    let c = backing.to_value();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_scalar_len_unsupported() {
    assert!(Value::from(true).len().is_err());
    assert!(Value::Null.elements().is_err());
    assert_eq!(Value::from("x").get("k").expect("get"), None);
}
