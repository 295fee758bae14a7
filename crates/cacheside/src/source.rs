// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::sync::Arc;

use cacheside_store::Error;

use crate::{CacheSide, CallDescriptor, CallSite, Payload, ReadMode};

/// A source operation wrapped so that every call reads through a [`CacheSide`].
///
/// This is the decorator form of interception: the wrapper owns the call-site and the
/// source, and [`call`](Self::call) is used exactly where the source would have been.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use cacheside::{CacheSide, CachedSource, CallDescriptor, InMemoryStore, Payload};
///
/// let cache = Arc::new(CacheSide::builder(InMemoryStore::new()).build());
/// let descriptor = CallDescriptor::builder("square").key_arg(0).build()?;
/// let square = CachedSource::new(cache, descriptor, |args: Vec<Payload>| {
///     let n = args[0].values()[0].as_i64().unwrap_or_default();
///     Ok::<_, cacheside::Error>(Some(Payload::scalar(n * n)))
/// });
///
/// assert_eq!(square.call(vec![Payload::scalar(7)])?, Some(Payload::scalar(49)));
/// # Ok::<(), cacheside::Error>(())
/// ```
pub struct CachedSource<F> {
    cache: Arc<CacheSide>,
    site: CallSite,
    mode: ReadMode,
    source: F,
}

impl<F> Debug for CachedSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSource")
            .field("site", &self.site)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<F> CachedSource<F> {
    /// Wraps `source` with a fresh call-site for `descriptor`.
    pub fn new(cache: Arc<CacheSide>, descriptor: CallDescriptor, source: F) -> Self {
        Self {
            cache,
            site: CallSite::new(descriptor),
            mode: ReadMode::Populate,
            source,
        }
    }

    /// Switches to [`ReadMode::NoPopulate`]: calls still use cached values but never write.
    #[must_use]
    pub fn without_populate(mut self) -> Self {
        self.mode = ReadMode::NoPopulate;
        self
    }

    /// The wrapped call-site.
    #[must_use]
    pub fn site(&self) -> &CallSite {
        &self.site
    }

    /// The read mode used by [`call`](Self::call).
    #[must_use]
    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    /// Calls the source through the cache.
    ///
    /// # Errors
    ///
    /// Returns the source's error unchanged, or a store or configuration error
    /// converted into `E`.
    pub fn call<E>(&self, args: Vec<Payload>) -> Result<Option<Payload>, E>
    where
        E: From<Error>,
        F: Fn(Vec<Payload>) -> Result<Option<Payload>, E>,
    {
        self.cache.read_with_mode(&self.site, self.mode, args, &self.source)
    }
}
