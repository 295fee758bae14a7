// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache-aside facade.

use std::fmt::Debug;
use std::sync::Arc;

use cacheside_store::{CacheStore, Cached, Error};

use crate::builder::CacheSideBuilder;
use crate::reader::{self, Context, ReadMode};
use crate::telemetry::CacheTelemetry;
use crate::{CallSite, Payload};

/// Reads call results through a cache store, calling the source only for what the
/// store does not have.
///
/// `CacheSide` is the entry point used by whatever layer intercepts calls. It owns the
/// store, the process-wide negative-caching switch and the telemetry configuration;
/// per-call-site state lives in [`CallSite`].
///
/// Calls with a batch argument go through the batch reader: cached elements are
/// answered from the store, the source is called once with only the missing elements,
/// and the two are merged into the shape the source returns. Other calls go through
/// the single-key reader.
///
/// No single-flight is performed: concurrent misses on the same key each call the
/// source and each write the result.
///
/// # Examples
///
/// ```
/// use cacheside::{CacheSide, CallDescriptor, CallSite, InMemoryStore, Payload};
/// use serde_json::json;
///
/// let cache = CacheSide::builder(InMemoryStore::new()).prevent(true).build();
/// let site = CallSite::new(CallDescriptor::builder("user").prefix("u:").key_arg(0).build()?);
///
/// let load = |args: Vec<Payload>| -> Result<Option<Payload>, cacheside::Error> {
///     Ok(Some(Payload::scalar(json!({"id": args[0].values()[0]}))))
/// };
///
/// let first = cache.read(&site, vec![Payload::scalar(1)], load)?;
/// let second = cache.read::<cacheside::Error, _>(&site, vec![Payload::scalar(1)], |_| unreachable!("served from the store"))?;
/// assert_eq!(first, second);
/// # Ok::<(), cacheside::Error>(())
/// ```
pub struct CacheSide {
    store: Arc<dyn CacheStore<Cached<Payload>>>,
    prevent: bool,
    telemetry: CacheTelemetry,
}

impl Debug for CacheSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSide")
            .field("prevent", &self.prevent)
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

impl CacheSide {
    /// Starts building a `CacheSide` on top of `store`.
    pub fn builder<S>(store: S) -> CacheSideBuilder
    where
        S: CacheStore<Cached<Payload>> + 'static,
    {
        CacheSideBuilder::new(Arc::new(store))
    }

    pub(crate) fn from_parts(store: Arc<dyn CacheStore<Cached<Payload>>>, prevent: bool, telemetry: CacheTelemetry) -> Self {
        Self {
            store,
            prevent,
            telemetry,
        }
    }

    /// Reads through the cache and writes fresh results back.
    ///
    /// `invoke` is the source operation. It receives the original arguments, or for a
    /// partially cached batch the arguments with the batch argument reduced to the
    /// missing elements. `Ok(None)` means the source has nothing.
    ///
    /// # Errors
    ///
    /// Source errors are returned unchanged. Store failures and misconfigured
    /// call-sites are converted into `E`.
    pub fn read<E, F>(&self, site: &CallSite, args: Vec<Payload>, invoke: F) -> Result<Option<Payload>, E>
    where
        E: From<Error>,
        F: FnMut(Vec<Payload>) -> Result<Option<Payload>, E>,
    {
        self.read_with_mode(site, ReadMode::Populate, args, invoke)
    }

    /// Reads through the cache without writing anything back.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn get<E, F>(&self, site: &CallSite, args: Vec<Payload>, invoke: F) -> Result<Option<Payload>, E>
    where
        E: From<Error>,
        F: FnMut(Vec<Payload>) -> Result<Option<Payload>, E>,
    {
        self.read_with_mode(site, ReadMode::NoPopulate, args, invoke)
    }

    /// Reads through the cache in the given mode.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_with_mode<E, F>(&self, site: &CallSite, mode: ReadMode, args: Vec<Payload>, invoke: F) -> Result<Option<Payload>, E>
    where
        E: From<Error>,
        F: FnMut(Vec<Payload>) -> Result<Option<Payload>, E>,
    {
        let cx = Context {
            store: self.store.as_ref(),
            telemetry: &self.telemetry,
            prevent: self.prevent,
            mode,
        };

        if site.descriptor().is_batch() {
            reader::batch::read(&cx, site, args, invoke)
        } else {
            reader::single::read(&cx, site, args, invoke)
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn CacheStore<Cached<Payload>> {
        self.store.as_ref()
    }

    /// Whether nil source results are remembered with a prevent sentinel.
    #[must_use]
    pub fn prevent_enabled(&self) -> bool {
        self.prevent
    }
}
