// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-lifetime cache of property and accessor tables.
//!
//! # Architecture
//!
//! ```text
//! Registry
//! +-- beans: DashMap<TypeId, Arc<BeanType<T>>>   (type-erased)
//! +-- views: DashMap<TypeId, Arc<ViewType>>
//! ```
//!
//! Tables are built on first request and never invalidated; types do not
//! change for the lifetime of the process.
//!
//! # Thread Safety
//!
//! Population is compute-or-fetch: the table is built outside any shard
//! lock, then inserted only if no other thread won the race. Concurrent
//! first requests for one type therefore all observe the same table.

use super::{Bean, BeanType, ViewSpec, ViewType};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

type Erased = Arc<dyn Any + Send + Sync>;

/// Cache of [`BeanType`] and [`ViewType`] tables keyed by type identity.
#[derive(Default)]
pub struct Registry {
    beans: DashMap<TypeId, Erased>,
    views: DashMap<TypeId, Arc<ViewType>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared registry used by adapters built without an explicit one.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::new)
    }

    /// Property table for `T`, built on first use.
    pub fn bean_type<T: Bean>(&self) -> Arc<BeanType<T>> {
        let key = TypeId::of::<T>();
        if let Some(cached) = self.beans.get(&key).map(|entry| Arc::clone(entry.value())) {
            if let Ok(table) = cached.downcast::<BeanType<T>>() {
                return table;
            }
        }

        let built: Arc<BeanType<T>> = Arc::new(T::bean_type());
        let erased = Arc::clone(
            self.beans
                .entry(key)
                .or_insert_with(|| {
                    log::debug!(
                        "[registry] bean `{}`: {} properties",
                        built.name(),
                        built.properties().len()
                    );
                    let erased: Erased = built.clone();
                    erased
                })
                .value(),
        );
        erased.downcast::<BeanType<T>>().unwrap_or(built)
    }

    /// Accessor table for the view type `V`, built on first use.
    pub fn view_type<V: ViewSpec>(&self) -> Arc<ViewType> {
        let key = TypeId::of::<V>();
        if let Some(cached) = self.views.get(&key) {
            return Arc::clone(cached.value());
        }

        let built = Arc::new(V::view_type());
        Arc::clone(
            self.views
                .entry(key)
                .or_insert_with(|| {
                    log::debug!(
                        "[registry] view `{}`: {} accessors",
                        built.name(),
                        built.len()
                    );
                    built
                })
                .value(),
        )
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.beans.len() + self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
