// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-memory store backed by moka.
//!
//! This crate provides [`InMemoryStore`], a concurrent store implementing the
//! [`CacheStore`](cacheside_store::CacheStore) contract. Each write carries its own
//! time-to-live, so entries written by different call-sites expire independently.
//! Use [`InMemoryStoreBuilder`] to configure capacity without exposing moka types.
//!
//! # Quick Start
//!
//! ```
//! use cacheside_memory::InMemoryStore;
//! use cacheside_store::{CacheStore, Ttl};
//!
//! let store = InMemoryStore::<String>::builder().max_capacity(1000).build();
//!
//! store.write("users", "u:1", "alice".to_string(), Ttl::ONE_MINUTE)?;
//! assert_eq!(store.read("users", "u:1")?.as_deref(), Some("alice"));
//! # Ok::<(), cacheside_store::Error>(())
//! ```
//!
//! # Features
//!
//! - **Regions**: the same key in two regions addresses two entries
//! - **Per-write TTL**: `Ttl::FOREVER` never expires, `Ttl::NO_CACHE` is not retained
//! - **Capacity limits**: set a maximum entry count with automatic eviction
//! - **Thread-safe**: safe for concurrent access from many threads

pub mod builder;
pub mod store;

#[doc(inline)]
pub use builder::InMemoryStoreBuilder;
#[doc(inline)]
pub use store::InMemoryStore;
