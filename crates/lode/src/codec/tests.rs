// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::adapters::PropertiesBundle;
use crate::config::{DecoderConfig, EncoderConfig};
use crate::value::{temporal, Number, Temporal, Value};
use crate::Error;
use chrono::NaiveDate;

fn sample() -> Value {
    [
        ("a", Value::from(1)),
        ("b", Value::from(vec![Value::from(2), Value::from(3)])),
    ]
    .into_iter()
    .collect()
}

fn decode(text: &str) -> crate::Result<Value> {
    JsonDecoder::default().decode_str(text)
}

fn parse_offset(err: Error) -> usize {
    match err {
        Error::Parse { offset, .. } => offset,
        other => panic!("expected a parse error, got {:?}", other),
    }
}

// ============================================================================
// Encoder
// ============================================================================

#[test]
fn test_compact_encoding() {
    let text = JsonEncoder::compact().encode_to_string(&sample()).expect("encode");
    assert_eq!(text, r#"{"a":1,"b":[2,3]}"#);
}

#[test]
fn test_pretty_encoding_has_same_tokens() {
    let text = JsonEncoder::default().encode_to_string(&sample()).expect("encode");
    assert_eq!(text, "{\n  \"a\": 1,\n  \"b\": [\n    2,\n    3\n  ]\n}");

    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    assert_eq!(stripped, r#"{"a":1,"b":[2,3]}"#);
}

#[test]
fn test_custom_indent_and_empty_containers() {
    let value: Value = [
        ("list", Value::List(Vec::new())),
        ("map", Value::Map(Default::default())),
    ]
    .into_iter()
    .collect();
    let encoder = JsonEncoder::new(EncoderConfig::default().with_indent(4));
    let text = encoder.encode_to_string(&value).expect("encode");
    assert_eq!(text, "{\n    \"list\": [],\n    \"map\": {}\n}");
}

#[test]
fn test_numbers_keep_their_kind() {
    let encoder = JsonEncoder::compact();
    let cases = [
        (Value::from(2), "2"),
        (Value::from(2.0), "2.0"),
        (Value::from(-0.5), "-0.5"),
        (Value::from(1e300), "1e300"),
        (Value::from(i64::MIN), "-9223372036854775808"),
    ];
    for (value, expected) in cases {
        assert_eq!(encoder.encode_to_string(&value).expect("encode"), expected);
    }
}

#[test]
fn test_non_finite_float_is_rejected() {
    let err = JsonEncoder::compact()
        .encode_to_string(&Value::from(f64::NAN))
        .expect_err("NaN");
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_string_escapes() {
    let value = Value::from("q\"b\\s/\n\r\t\u{8}\u{c}\u{1}é😀");
    let text = JsonEncoder::compact().encode_to_string(&value).expect("encode");
    assert_eq!(text, "\"q\\\"b\\\\s/\\n\\r\\t\\b\\f\\u0001é😀\"");

    let ascii = JsonEncoder::new(EncoderConfig::compact().with_escape_unicode(true));
    let text = ascii.encode_to_string(&value).expect("encode");
    assert_eq!(
        text,
        "\"q\\\"b\\\\s/\\n\\r\\t\\b\\f\\u0001\\u00e9\\ud83d\\ude00\""
    );
    assert_eq!(decode(&text).expect("decode"), value);
}

#[test]
fn test_temporal_encodes_as_text() {
    let date = NaiveDate::from_ymd_opt(2018, 6, 28).expect("date");
    let value: Value = [
        ("date", Value::from(Temporal::from(date))),
        (
            "instant",
            Value::from(Temporal::from(temporal::instant_from_millis(1).expect("ms"))),
        ),
    ]
    .into_iter()
    .collect();
    let text = JsonEncoder::compact().encode_to_string(&value).expect("encode");
    assert_eq!(
        text,
        r#"{"date":"2018-06-28","instant":"1970-01-01T00:00:00.001Z"}"#
    );
}

#[test]
fn test_single_pass_sequence_streams_once() {
    let list = Value::sequence((1..=3i64).map(Value::from));
    let text = JsonEncoder::compact().encode_to_string(&list).expect("encode");
    assert_eq!(text, "[1,2,3]");

    let err = JsonEncoder::compact().encode_to_string(&list).expect_err("consumed");
    assert!(matches!(err, Error::Unsupported { .. }));
}

#[test]
fn test_sequence_error_aborts_encoding() {
    let items = vec![
        Ok(Value::from(1)),
        Err(Error::Resource("cursor lost".into())),
        Ok(Value::from(3)),
    ];
    let mut out = Vec::new();
    let err = JsonEncoder::compact()
        .encode_sequence(items, &mut out)
        .expect_err("item error");
    assert!(matches!(err, Error::Resource(_)));
}

#[test]
fn test_encode_sequence() {
    let mut out = Vec::new();
    JsonEncoder::compact()
        .encode_sequence((0..3i64).map(|i| Ok(Value::from(i))), &mut out)
        .expect("encode");
    assert_eq!(out, b"[0,1,2]");
}

// ============================================================================
// Decoder
// ============================================================================

#[test]
fn test_decode_sample() {
    assert_eq!(decode(r#" { "a" : 1 , "b" : [ 2 , 3 ] } "#).expect("decode"), sample());
}

#[test]
fn test_decode_number_kinds() {
    assert_eq!(decode("2").expect("int"), Value::Number(Number::Int(2)));
    assert_eq!(decode("2.0").expect("float"), Value::Number(Number::Float(2.0)));
    assert_eq!(decode("2e0").expect("exp"), Value::Number(Number::Float(2.0)));
    assert_eq!(decode("-0").expect("neg zero"), Value::Number(Number::Int(0)));
    assert_ne!(decode("2").expect("int"), decode("2.0").expect("float"));
}

#[test]
fn test_decode_rejects_malformed_numbers() {
    for text in ["01", "1.", ".5", "-", "1e", "+1", "1e+"] {
        assert!(decode(text).is_err(), "{} should not parse", text);
    }
    let err = decode("9223372036854775808").expect_err("overflow");
    assert_eq!(parse_offset(err), 0);
    assert!(decode("1e400").is_err());
}

#[test]
fn test_decode_escapes_and_surrogates() {
    let value = decode(r#""a\/bé😀\n""#).expect("decode");
    assert_eq!(value, Value::from("a/bé😀\n"));

    assert!(decode(r#""\ud83d""#).is_err());
    assert!(decode(r#""\ude00""#).is_err());
    assert!(decode(r#""\u12""#).is_err());
}

#[test]
fn test_decode_error_offsets() {
    assert_eq!(parse_offset(decode(r#"{"a": tru}"#).expect_err("literal")), 6);
    assert_eq!(parse_offset(decode(r#"["x\q"]"#).expect_err("escape")), 3);
    assert_eq!(parse_offset(decode(r#"  "open"#).expect_err("unterminated")), 2);
    assert_eq!(parse_offset(decode("[1] x").expect_err("trailing")), 4);
    assert_eq!(parse_offset(decode("[1,]").expect_err("trailing comma")), 3);
    assert_eq!(parse_offset(decode(r#"{"a" 1}"#).expect_err("colon")), 5);
    assert_eq!(parse_offset(decode("").expect_err("empty")), 0);
    assert_eq!(parse_offset(decode("\"a\u{1}\"").expect_err("control")), 2);
}

#[test]
fn test_decode_depth_limit() {
    let decoder = JsonDecoder::new(DecoderConfig::default().with_max_depth(3));
    assert!(decoder.decode_str("[[[1]]]").is_ok());
    let err = decoder.decode_str("[[[[1]]]]").expect_err("too deep");
    assert_eq!(parse_offset(err), 3);

    let deep = "[".repeat(100_000);
    assert!(JsonDecoder::default().decode_str(&deep).is_err());
}

#[test]
fn test_decode_duplicate_keys_keep_last() {
    let value = decode(r#"{"k": 1, "j": 0, "k": 2}"#).expect("decode");
    assert_eq!(value.get("k").expect("get"), Some(Value::from(2)));
    assert_eq!(
        JsonEncoder::compact().encode_to_string(&value).expect("encode"),
        r#"{"k":2,"j":0}"#
    );
}

#[test]
fn test_decode_keeps_document_order() {
    let text = r#"{"zeta":1,"alpha":2,"mid":[3]}"#;
    let value = decode(text).expect("decode");
    let keys: Vec<_> = value.as_map().expect("map").keys().cloned().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(JsonEncoder::compact().encode_to_string(&value).expect("encode"), text);
}

#[test]
fn test_decode_sorted_mode() {
    let decoder = JsonDecoder::new(DecoderConfig::default().with_sorted(true));
    let value = decoder
        .decode_str(r#"{"zeta":{"y":1,"x":2},"alpha":2}"#)
        .expect("decode");
    assert_eq!(
        JsonEncoder::compact().encode_to_string(&value).expect("encode"),
        r#"{"alpha":2,"zeta":{"x":2,"y":1}}"#
    );
    // Order is not part of map equality.
    assert_eq!(value, decode(r#"{"alpha":2,"zeta":{"y":1,"x":2}}"#).expect("decode"));
}

#[test]
fn test_decode_from_reader_rejects_bad_utf8() {
    let err = JsonDecoder::default()
        .decode(&b"\"ab\xff\""[..])
        .expect_err("utf-8");
    assert_eq!(parse_offset(err), 3);
}

// ============================================================================
// CSV
// ============================================================================

#[test]
fn test_csv_quoting_labels_and_formats() {
    let rows = Value::from(vec![
        [
            ("a", Value::from("A,B,\"C\" ")),
            ("b", Value::from(1)),
            ("c", Value::from(2.0)),
            ("d", Value::from(true)),
            (
                "e",
                Value::from(Temporal::from(temporal::instant_from_millis(0).expect("ms"))),
            ),
            ("f", Value::from(0.12)),
        ]
        .into_iter()
        .collect::<Value>(),
        [
            ("a", Value::from(" D\r\nÉ\r\nF\r\n")),
            ("b", Value::from(2)),
            ("c", Value::from(4.0)),
            ("f", Value::Null),
        ]
        .into_iter()
        .collect::<Value>(),
    ]);

    let mut labels = PropertiesBundle::new();
    labels.insert("f", "F");
    let encoder = CsvEncoder::new(["a", "b", "c", "d", "e", "f"])
        .with_labels(labels)
        .with_format("f", |v| {
            let pct = v.as_f64().unwrap_or_default() * 100.0;
            Ok(Value::from(format!("{}%", pct.round())))
        });

    let text = encoder.encode_to_string(&rows).expect("encode");
    assert_eq!(
        text,
        "\"a\",\"b\",\"c\",\"d\",\"e\",\"F\"\r\n\
         \"A,B,\"\"C\"\" \",1,2.0,true,0,\"12%\"\r\n\
         \" D\r\nÉ\r\nF\r\n\",2,4.0,,,\r\n"
    );
}

fn csv_row(entries: &[(&str, &str)]) -> Value {
    entries
        .iter()
        .map(|(k, v)| (*k, Value::from(*v)))
        .collect()
}

#[test]
fn test_csv_decode_quoting_and_line_breaks() {
    let text = "\"a\",\"b\",\"c\",\"d\",\"e\",\r\n\
                \"A,B,\"\"C\"\" \",1,2.0,true,\r\n\
                \" D\rÉ\nF\r\n\",2,4.0,false\r\n\
                ,3,6.0\n";

    let rows = CsvDecoder::new().decode_str(text).expect("decode");
    assert_eq!(
        rows,
        Value::from(vec![
            csv_row(&[("a", "A,B,\"C\" "), ("b", "1"), ("c", "2.0"), ("d", "true")]),
            csv_row(&[("a", " D\rÉ\nF\r\n"), ("b", "2"), ("c", "4.0"), ("d", "false")]),
            csv_row(&[("b", "3"), ("c", "6.0")]),
        ])
    );
}

#[test]
fn test_csv_decode_missing_header() {
    for text in ["", "\n", "\n\n", "\r\n"] {
        let err = CsvDecoder::new().decode_str(text).expect_err("no header");
        assert!(matches!(err, Error::Parse { offset: 0, .. }), "{:?}", text);
    }
}

#[test]
fn test_csv_decode_header_only_and_blank_line() {
    let rows = CsvDecoder::new().decode_str("id,name\r\n").expect("decode");
    assert_eq!(rows.len().expect("len"), 0);

    // A blank line ends the records.
    let rows = CsvDecoder::new().decode_str("id\n1\n\n2\n").expect("decode");
    assert_eq!(rows, Value::from(vec![csv_row(&[("id", "1")])]));
}

#[test]
fn test_csv_decode_custom_delimiter() {
    let decoder = CsvDecoder::new().with_delimiter(';');
    let rows = decoder
        .decode_str("sku;label\nA-1;\"x;y\"\nB-2;plain,comma\n")
        .expect("decode");
    assert_eq!(
        rows,
        Value::from(vec![
            csv_row(&[("sku", "A-1"), ("label", "x;y")]),
            csv_row(&[("sku", "B-2"), ("label", "plain,comma")]),
        ])
    );
}

#[test]
fn test_csv_decode_malformed_records() {
    let err = CsvDecoder::new()
        .decode_str("a,b\n\"open,1\n")
        .expect_err("unterminated");
    assert_eq!(parse_offset(err), 4);

    let err = CsvDecoder::new()
        .decode_str("a,b\r1,2\r\n")
        .expect_err("bare CR");
    assert_eq!(parse_offset(err), 4);
}

#[test]
fn test_csv_rows_read_ahead_once() {
    let mut rows = CsvDecoder::new()
        .rows("k\n1\n2\n".as_bytes())
        .expect("header");
    assert_eq!(rows.keys(), ["k"]);

    assert!(rows.has_next().expect("has next"));
    assert!(rows.has_next().expect("has next"));
    let first = rows.next().expect("first").expect("row");
    assert_eq!(first.get("k").expect("get"), Some(Value::from("1")));
    let second = rows.next().expect("second").expect("row");
    assert_eq!(second.get("k").expect("get"), Some(Value::from("2")));
    assert!(!rows.has_next().expect("has next"));
    assert!(rows.next().is_none());
}

#[test]
fn test_csv_iterate_is_single_pass() {
    let list = CsvDecoder::new()
        .iterate(std::io::Cursor::new(b"n\n1\n2\n3\n".to_vec()))
        .expect("header");
    assert!(matches!(list.len(), Err(Error::Unsupported { .. })));

    let text = JsonEncoder::compact().encode_to_string(&list).expect("encode");
    assert_eq!(text, r#"[{"n":"1"},{"n":"2"},{"n":"3"}]"#);
    assert!(JsonEncoder::compact().encode_to_string(&list).is_err());
}

#[test]
fn test_csv_round_trip_through_encoder() {
    let rows = Value::from(vec![csv_row(&[("a", "x,\"y\""), ("b", "line\r\nbreak")])]);
    let text = CsvEncoder::new(["a", "b"]).encode_to_string(&rows).expect("encode");
    assert_eq!(CsvDecoder::new().decode_str(&text).expect("decode"), rows);
}

#[test]
fn test_csv_rejects_nested_fields() {
    let row: Value = [("a", Value::from(vec![Value::from(1)]))].into_iter().collect();
    let rows = Value::from(vec![row]);
    let err = CsvEncoder::new(["a"])
        .with_delimiter(';')
        .encode_to_string(&rows)
        .expect_err("nested");
    assert!(matches!(err, Error::TypeMismatch { .. }));
}
