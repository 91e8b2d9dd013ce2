// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Foreign-resource adapters.
//!
//! Each adapter presents an external resource as a [`Value`](crate::Value)
//! list or map without copying it.
//!
//! # Adapters
//!
//! - [`ResultSetAdapter`]: forward-only row cursor as a single-pass list of
//!   row maps. Closing releases cursor, statement and connection in order.
//! - [`ElementAdapter`]: XML element as a map with `:`, `@attr` and `name*`
//!   key conventions (feature `xml`).
//! - [`BundleAdapter`]: locale resource table as a read-only map.
//!
//! # Example
//!
//! ```
//! use lode::adapters::{BundleAdapter, PropertiesBundle};
//!
//! let bundle = PropertiesBundle::parse("greeting = Hello\n").unwrap();
//! let messages = BundleAdapter::new(bundle).into_value();
//! assert_eq!(messages.get("greeting").unwrap(), Some("Hello".into()));
//! assert_eq!(messages.get("farewell").unwrap(), None);
//! ```

mod bundle;
mod cursor;
#[cfg(feature = "xml")]
mod element;

pub use bundle::{BundleAdapter, PropertiesBundle, ResourceTable};
pub use cursor::{Release, ResultSetAdapter, Row, RowCursor};
#[cfg(feature = "xml")]
pub use element::{ElementAdapter, XmlElement};
