// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # lode - live data adapters and a streaming codec
//!
//! lode moves structured data between foreign resources, typed Rust values and
//! JSON text through one loosely-typed [`Value`] model. Adapters present their
//! source as a *view* rather than a copy, so reads go back to the source and
//! single-pass producers (database cursors, producer threads) stream straight
//! into the encoder.
//!
//! ## Quick Start
//!
//! ```rust
//! use lode::codec::JsonEncoder;
//! use lode::{adapt, Bean};
//!
//! #[derive(Bean, Default)]
//! struct Sensor {
//!     sensor_id: u32,
//!     reading: f64,
//! }
//!
//! let value = adapt(&Sensor { sensor_id: 7, reading: 21.5 });
//! let text = JsonEncoder::compact().encode_to_string(&value).unwrap();
//! assert_eq!(text, r#"{"reading":21.5,"sensorId":7}"#);
//! ```
//!
//! `adapt` on a plain bean takes a copy. For a live view, share the bean as
//! `Arc<RwLock<T>>` and wrap it in [`BeanAdapter::shared`].
//!
//! ## Architecture
//!
//! ```text
//! +-------------------+   +-------------------+   +------------------+
//! | adapters          |   | beans             |   | pipe             |
//! | cursor, XML,      |   | #[derive(Bean)],  |   | producer thread  |
//! | resource bundles  |   | #[view], coercion |   | -> single pass   |
//! +---------+---------+   +---------+---------+   +--------+---------+
//!           |                       |                      |
//!           +-----------> Value (lists, maps, views) <-----+
//!                                   |
//!                         +---------v---------+
//!                         | codec             |
//!                         | JSON in/out, CSV  |
//!                         +-------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Value`] | Null, bool, number, string, temporal, list, map, or a live view |
//! | [`BeanAdapter`] | Live map view over a `#[derive(Bean)]` struct |
//! | [`TypedView`] | Dispatch table behind `#[view]` trait implementations |
//! | [`ResultSetAdapter`] | Forward-only row cursor as a single-pass list |
//! | [`JsonEncoder`] / [`JsonDecoder`] | Streaming JSON codec |
//! | [`Pipe`] | Bounded producer/consumer channel |

// Allow the derive macros to refer to `::lode` inside this crate
extern crate self as lode;

/// Foreign-resource adapters (row cursors, XML elements, resource bundles).
pub mod adapters;
/// Typed-object adapter: property tables, coercion, typed views.
pub mod beans;
/// JSON and CSV encoding, JSON decoding.
pub mod codec;
/// Static defaults and runtime configuration.
pub mod config;
mod error;
/// Bounded single-producer, single-consumer pipe.
pub mod pipe;
/// Value model and path navigation.
pub mod value;

pub use error::{Error, Result};

pub use value::{ListView, MapView, Number, Path, Segment, SharedMap, Temporal, Value, ValueMap};

pub use beans::{
    adapt, coerce, Accessor, Bean, BeanAdapter, BeanType, FromValue, Property, Registry, ToValue,
    TypedView, ViewSpec, ViewType,
};
pub use lode_codegen::{view, Bean};

pub use adapters::{BundleAdapter, PropertiesBundle, ResourceTable, ResultSetAdapter};
#[cfg(feature = "xml")]
pub use adapters::{ElementAdapter, XmlElement};
pub use codec::{CsvDecoder, CsvEncoder, JsonDecoder, JsonEncoder};
pub use config::{DecoderConfig, EncoderConfig, PipeConfig};
pub use pipe::{Pipe, PipeConsumer, PipeProducer};

/// Lock type guarding shared beans (see [`BeanAdapter::shared`]).
pub use parking_lot::RwLock;

/// lode version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
