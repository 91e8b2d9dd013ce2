// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML element adapter: key conventions, namespace modes, and the
//! agreement between `contains_key` and `get`.

use lode::adapters::{ElementAdapter, XmlElement};
use lode::codec::JsonEncoder;
use lode::{Error, MapView, Value};

const CATALOG: &str = r#"<?xml version="1.0"?>
<catalog xmlns="urn:example:catalog" xmlns:dc="http://purl.org/dc/elements/1.1/" region="eu">
  <book isbn="111" dc:lang="en">
    <dc:title>Dune</dc:title>
    <price currency="EUR">9.50</price>
  </book>
  <book isbn="222">
    <dc:title>Solaris</dc:title>
    <price currency="PLN">31.00</price>
  </book>
  <magazine>
    <dc:title>Wired</dc:title>
  </magazine>
</catalog>"#;

fn catalog(namespace_aware: bool) -> ElementAdapter {
    let root = XmlElement::parse(CATALOG).expect("parse");
    if namespace_aware {
        ElementAdapter::namespace_aware(root)
    } else {
        ElementAdapter::new(root)
    }
}

fn text_of(value: Option<Value>) -> String {
    match value {
        Some(element @ Value::MapView(_)) => JsonEncoder::compact()
            .encode_to_string(&element)
            .expect("encode"),
        other => panic!("expected an element, got {:?}", other),
    }
}

#[test]
fn test_attribute_prefix() {
    let adapter = catalog(false);
    assert_eq!(adapter.get("@region").expect("get"), Some(Value::from("eu")));
    assert_eq!(adapter.get("@missing").expect("get"), None);
    assert!(adapter.contains_key("@region").expect("contains"));
    assert!(!adapter.contains_key("@missing").expect("contains"));
    assert_eq!(adapter.keys().expect("keys"), vec!["@region"]);
}

#[test]
fn test_plain_key_is_first_descendant() {
    let adapter = catalog(false);
    let book = adapter.get("book").expect("get").expect("present");
    assert_eq!(book.get("@isbn").expect("isbn"), Some(Value::from("111")));

    // Matches at any depth, in document order.
    let price = adapter.get("price").expect("get").expect("present");
    assert_eq!(price.get("@currency").expect("currency"), Some(Value::from("EUR")));

    assert_eq!(adapter.get("journal").expect("get"), None);
    assert!(!adapter.contains_key("journal").expect("contains"));
}

#[test]
fn test_list_suffix_returns_every_match() {
    let adapter = catalog(false);
    let books = adapter.get("book*").expect("get").expect("present");
    assert_eq!(books.len().expect("len"), 2);
    let second = books.at(1).expect("at").expect("present");
    assert_eq!(second.get("@isbn").expect("isbn"), Some(Value::from("222")));
    assert!(matches!(
        books.at(2),
        Err(Error::IndexOutOfBounds { index: 2, len: 2 })
    ));

    let none = adapter.get("journal*").expect("get").expect("present");
    assert_eq!(none.len().expect("len"), 0);
    assert!(adapter.contains_key("journal*").expect("always present"));
}

#[test]
fn test_qualified_names_without_namespace_awareness() {
    let adapter = catalog(false);
    let titles = adapter.get("dc:title*").expect("get").expect("present");
    assert_eq!(titles.len().expect("len"), 3);
    assert_eq!(adapter.get("title").expect("local name only"), None);

    let book = adapter.get("book").expect("get").expect("present");
    assert_eq!(book.get("@dc:lang").expect("lang"), Some(Value::from("en")));
    assert_eq!(book.get("@lang").expect("lang"), None);

    assert_eq!(adapter.get(":").expect("namespace"), None);
    assert!(!adapter.contains_key(":").expect("contains"));
}

#[test]
fn test_namespace_aware_matches_local_names() {
    let adapter = catalog(true);
    assert_eq!(
        adapter.get(":").expect("namespace"),
        Some(Value::from("urn:example:catalog"))
    );
    assert!(adapter.contains_key(":").expect("contains"));

    let titles = adapter.get("title*").expect("get").expect("present");
    assert_eq!(titles.len().expect("len"), 3);
    let title = titles.at(0).expect("at").expect("present");
    assert_eq!(
        title.get(":").expect("namespace"),
        Some(Value::from("http://purl.org/dc/elements/1.1/"))
    );

    let book = adapter.get("book").expect("get").expect("present");
    assert_eq!(book.get("@lang").expect("lang"), Some(Value::from("en")));
}

#[test]
fn test_wildcard_and_text_content() {
    let adapter = catalog(true);
    let all = adapter.get("*").expect("get").expect("present");
    assert_eq!(all.get("@isbn").expect("isbn"), Some(Value::from("111")));

    let everything = adapter.get("**").expect("get").expect("present");
    assert_eq!(everything.len().expect("len"), 8);

    let magazine = XmlElement::parse(CATALOG)
        .expect("parse")
        .children()
        .find(|e| e.local_name() == "magazine")
        .map(|e| ElementAdapter::new(e.clone()))
        .expect("magazine");
    assert_eq!(magazine.text().trim(), "Wired");
}

#[test]
fn test_contains_agrees_with_get() {
    for namespace_aware in [false, true] {
        let adapter = catalog(namespace_aware);
        for key in [
            ":", "@region", "@nope", "book", "book*", "dc:title", "title", "price*", "nope",
            "nope*", "*",
        ] {
            let present = adapter.get(key).expect("get").is_some();
            assert_eq!(
                adapter.contains_key(key).expect("contains"),
                present,
                "key {:?}, namespace_aware {}",
                key,
                namespace_aware
            );
        }
    }
}

#[test]
fn test_element_encodes_as_its_attributes() {
    let adapter = catalog(false);
    assert_eq!(text_of(adapter.get("price").expect("get")), r#"{"@currency":"EUR"}"#);
}

#[test]
fn test_malformed_document() {
    let err = XmlElement::parse("<a><b></a>").expect_err("mismatched tags");
    assert!(matches!(err, Error::Parse { .. }));
}
