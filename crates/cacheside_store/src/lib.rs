// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Store abstractions for cache-aside readers.
//!
//! This crate defines the [`CacheStore`] contract that every key/value backend must satisfy,
//! the [`Cached`] wrapper that distinguishes real values from the negative-cache marker,
//! the [`Ttl`] vocabulary of named durations, and the [`Error`] type for fallible operations.
//!
//! # Overview
//!
//! Stores are addressed by a *region* (a logical cache name) and a string key. Readers in the
//! `cacheside` crate derive those keys from call arguments and reconcile store hits against a
//! source operation; the store itself only has to get and put values.
//!
//! # Implementing a Store
//!
//! Only `read` and `write` are required. `read_batch` and `write_batch` fall back to looping
//! over the single-key operations:
//!
//! ```
//! use cacheside_store::{CacheStore, Result, Ttl};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//!
//! struct SimpleStore<V>(RwLock<HashMap<(String, String), V>>);
//!
//! impl<V> CacheStore<V> for SimpleStore<V>
//! where
//!     V: Clone + Send + Sync,
//! {
//!     fn read(&self, region: &str, key: &str) -> Result<Option<V>> {
//!         Ok(self.0.read().unwrap().get(&(region.to_string(), key.to_string())).cloned())
//!     }
//!
//!     fn write(&self, region: &str, key: &str, value: V, _ttl: Ttl) -> Result<()> {
//!         self.0.write().unwrap().insert((region.to_string(), key.to_string()), value);
//!         Ok(())
//!     }
//! }
//! ```

mod batch;
mod cached;
pub mod error;
pub(crate) mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
mod ttl;

#[doc(inline)]
pub use batch::BatchRead;
#[doc(inline)]
pub use cached::Cached;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use store::CacheStore;
#[doc(inline)]
pub use ttl::Ttl;
