// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Cache-aside reads for expensive source operations.
//!
//! A call-site is described once by a [`CallDescriptor`]: the store region, a key
//! prefix, a [`Ttl`], the argument positions that form the key and, for batch calls,
//! the position of the batch argument. Every call then goes through [`CacheSide`]:
//!
//! 1. keys are derived from the arguments,
//! 2. the store is consulted,
//! 3. the source is invoked for what is missing (for batches, with only the missing
//!    elements),
//! 4. fresh values are written back,
//! 5. the caller receives a [`Payload`] in the shape the source returns.
//!
//! # Batch calls
//!
//! A batch call that is partly cached costs one store round trip and one source call
//! for the remainder. Store hits are merged into the source's answer without
//! overwriting it. Each [`CallSite`] remembers the [`Shape`] its source returns so a
//! fully cached batch can be answered without calling the source at all.
//!
//! # Negative caching
//!
//! With [`CacheSideBuilder::prevent`] enabled, a key the source had nothing for is
//! stored as [`Cached::Prevented`]. Later reads of that key return `None` without
//! calling the source, and prevented keys never appear in a result.
//!
//! # Example
//!
//! ```
//! use cacheside::{CacheSide, CallDescriptor, CallSite, InMemoryStore, Payload, Shape};
//! use serde_json::{Value, json};
//!
//! let cache = CacheSide::builder(InMemoryStore::new()).prevent(true).build();
//! let site = CallSite::new(CallDescriptor::builder("user").prefix("u:").batch_arg(0).build()?);
//!
//! let find_users = |args: Vec<Payload>| -> Result<Option<Payload>, cacheside::Error> {
//!     let found = args[0]
//!         .values()
//!         .iter()
//!         .filter(|id| id.as_i64() != Some(3))
//!         .map(|id| (id.clone(), json!({ "id": id })));
//!     Ok(Some(Payload::map(found.collect::<Vec<(Value, Value)>>())))
//! };
//!
//! let users = cache.read(&site, vec![Payload::list([1, 2, 3])], find_users)?.unwrap();
//! assert_eq!(users.shape(), Shape::Map);
//! assert_eq!(users.len(), 2);
//!
//! // Served from the store, including the remembered absence of user 3.
//! let again = cache.read::<cacheside::Error, _>(&site, vec![Payload::list([1, 2, 3])], |_| {
//!     unreachable!("everything is cached")
//! })?;
//! assert_eq!(again.unwrap().len(), 2);
//! # Ok::<(), cacheside::Error>(())
//! ```
//!
//! # Features
//!
//! - `memory` (default): re-exports [`InMemoryStore`].
//! - `metrics`: records OpenTelemetry metrics through [`CacheSideBuilder::metrics`].
//! - `test-util`: re-exports the recording `MockStore`.

mod builder;
mod cache;
mod container;
mod descriptor;
mod keys;
mod memo;
mod payload;
mod reader;
mod source;
mod telemetry;

#[doc(inline)]
pub use builder::CacheSideBuilder;
#[doc(inline)]
pub use cache::CacheSide;
#[cfg(feature = "memory")]
#[doc(inline)]
pub use cacheside_memory::{InMemoryStore, InMemoryStoreBuilder};
#[doc(inline)]
pub use cacheside_store::{BatchRead, CacheStore, Cached, Error, Result, Ttl};
#[cfg(feature = "test-util")]
#[doc(inline)]
pub use cacheside_store::testing::{MockStore, StoreOp};
#[doc(inline)]
pub use descriptor::{CallDescriptor, CallDescriptorBuilder, CallSite};
#[doc(inline)]
pub use memo::ShapeMemo;
#[doc(inline)]
pub use payload::{Payload, Shape};
#[doc(inline)]
pub use reader::ReadMode;
#[doc(inline)]
pub use source::CachedSource;
#[doc(inline)]
pub use telemetry::{PatternStats, TelemetrySink};
