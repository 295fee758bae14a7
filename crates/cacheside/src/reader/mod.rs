// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The read-reconcile-write protocol for single-key and batch call-sites.

use cacheside_store::{CacheStore, Cached};

use crate::telemetry::CacheTelemetry;
use crate::{CallDescriptor, Payload};

pub(crate) mod batch;
pub(crate) mod single;

/// Whether a read writes fresh values back to the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReadMode {
    /// Write fresh values (and prevent sentinels, if enabled) back to the store.
    #[default]
    Populate,
    /// Look up and call the source on a miss, but never write to the store.
    NoPopulate,
}

impl ReadMode {
    /// Returns `true` for [`ReadMode::Populate`].
    #[must_use]
    pub fn writes_back(self) -> bool {
        matches!(self, Self::Populate)
    }
}

/// Everything a reader needs besides the call itself.
#[derive(Clone, Copy)]
pub(crate) struct Context<'a> {
    pub(crate) store: &'a dyn CacheStore<Cached<Payload>>,
    pub(crate) telemetry: &'a CacheTelemetry,
    pub(crate) prevent: bool,
    pub(crate) mode: ReadMode,
}

impl Context<'_> {
    /// Whether a nil source result leaves a prevent sentinel behind.
    pub(crate) fn writes_prevent(&self) -> bool {
        self.prevent && self.mode.writes_back()
    }

    /// Calls the source and records how long it took.
    pub(crate) fn invoke<E, F>(&self, descriptor: &CallDescriptor, invoke: &mut F, args: Vec<Payload>) -> Result<Option<Payload>, E>
    where
        F: FnMut(Vec<Payload>) -> Result<Option<Payload>, E>,
    {
        let clock = self.telemetry.clock();
        let started = clock.instant();
        let result = invoke(args);
        self.telemetry.record_invoke(descriptor, clock.instant().saturating_duration_since(started));
        result
    }
}
