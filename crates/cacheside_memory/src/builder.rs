// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.
//!
//! This module provides a builder API for `InMemoryStore` that abstracts
//! the underlying moka configuration.

use std::marker::PhantomData;
use std::time::Duration;

use crate::store::InMemoryStore;

/// Builder for configuring an `InMemoryStore`.
///
/// # Examples
///
/// ```
/// use cacheside_memory::InMemoryStore;
/// use std::time::Duration;
///
/// let store = InMemoryStore::<i32>::builder()
///     .max_capacity(1000)
///     .initial_capacity(100)
///     .time_to_idle(Duration::from_secs(60))
///     .name("users")
///     .build();
/// ```
#[derive(Debug)]
pub struct InMemoryStoreBuilder<V> {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) time_to_idle: Option<Duration>,
    pub(crate) name: Option<String>,
    _phantom: PhantomData<V>,
}

impl<V> Default for InMemoryStoreBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> InMemoryStoreBuilder<V> {
    /// Creates a new builder with default settings.
    ///
    /// The default configuration creates an unbounded store with `TinyLFU`
    /// eviction and expiry driven only by the TTL of each write.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_capacity: None,
            initial_capacity: None,
            time_to_idle: None,
            name: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the maximum number of entries, across all regions.
    ///
    /// Once reached, entries are evicted using the `TinyLFU` policy.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the initial capacity (pre-allocation hint).
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Expires entries that have not been read or written for `duration`.
    ///
    /// This applies on top of the TTL given with each write; whichever comes first wins.
    #[must_use]
    pub fn time_to_idle(mut self, duration: Duration) -> Self {
        self.time_to_idle = Some(duration);
        self
    }

    /// Sets a name for the store, surfaced in moka's debugging output.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured `InMemoryStore`.
    #[must_use]
    pub fn build(self) -> InMemoryStore<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        InMemoryStore::from_builder(&self)
    }
}
