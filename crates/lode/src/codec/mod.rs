// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Streaming codec.
//!
//! # Features
//!
//! - [`JsonEncoder`]: pretty (default) or compact JSON output, one pass over
//!   every list so producer-backed sequences stream in constant memory
//! - [`JsonDecoder`]: single-pass scanner, integral/floating distinction kept,
//!   byte offsets in parse errors
//! - [`CsvEncoder`]: list of maps as CSV rows
//! - [`CsvDecoder`]: CSV records as maps of strings, read lazily one record
//!   at a time
//!
//! # Wire format
//!
//! | Value            | Text                                      |
//! |------------------|-------------------------------------------|
//! | `Null`           | `null`                                    |
//! | `Number::Int`    | `42` (never a decimal point or exponent)  |
//! | `Number::Float`  | `42.0`, `1e300` (always one of the two)   |
//! | `Temporal`       | ISO-8601 string, e.g. `"2018-06-28"`      |
//! | list / map       | `[...]` / `{...}`                         |
//!
//! Temporal values encode as strings, so they decode as strings; project
//! them back with [`coerce`](crate::coerce).
//!
//! # Example
//!
//! ```
//! use lode::codec::{JsonDecoder, JsonEncoder};
//!
//! let value = JsonDecoder::default().decode_str(r#"{"a": 1, "b": [2, 3.5]}"#).unwrap();
//! let text = JsonEncoder::compact().encode_to_string(&value).unwrap();
//! assert_eq!(text, r#"{"a":1,"b":[2,3.5]}"#);
//! ```

mod csv;
mod decoder;
mod encoder;

pub use csv::{CsvDecoder, CsvEncoder, CsvRows};
pub use decoder::JsonDecoder;
pub use encoder::JsonEncoder;

#[cfg(test)]
mod tests;
