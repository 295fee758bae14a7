// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory store implementation using moka.

use std::time::{Duration, Instant};

use cacheside_store::{CacheStore, Result, Ttl};
use moka::{Expiry, sync::Cache};

use crate::builder::InMemoryStoreBuilder;

type StoreKey = (String, String);

/// A stored value and the lifetime it was written with.
#[derive(Clone, Debug)]
struct Slot<V> {
    value: V,
    ttl: Option<Duration>,
}

/// Expires each slot according to the TTL of the write that produced it.
#[derive(Debug)]
struct PerWriteExpiry;

impl<V> Expiry<StoreKey, Slot<V>> for PerWriteExpiry {
    fn expire_after_create(&self, _key: &StoreKey, slot: &Slot<V>, _created_at: Instant) -> Option<Duration> {
        slot.ttl
    }

    fn expire_after_update(
        &self,
        _key: &StoreKey,
        slot: &Slot<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        slot.ttl
    }
}

/// An in-memory store backed by moka.
///
/// Keys are scoped by region. A write with [`Ttl::FOREVER`] never expires, a positive
/// TTL expires after that many seconds, and [`Ttl::NO_CACHE`] removes any existing
/// entry instead of storing the value. Clones share the same underlying storage.
///
/// # Examples
///
/// ```
/// use cacheside_memory::InMemoryStore;
/// use cacheside_store::{CacheStore, Ttl};
///
/// let store = InMemoryStore::<i32>::new();
///
/// store.write("users", "u:1", 42, Ttl::FOREVER)?;
/// assert_eq!(store.read("users", "u:1")?, Some(42));
/// assert_eq!(store.read("orders", "u:1")?, None);
/// # Ok::<(), cacheside_store::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<StoreKey, Slot<V>>,
}

impl<V> Default for InMemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> InMemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new unbounded in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new in-memory store holding at most `max_capacity` entries.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a new builder for configuring an in-memory store.
    #[must_use]
    pub fn builder() -> InMemoryStoreBuilder<V> {
        InMemoryStoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: &InMemoryStoreBuilder<V>) -> Self {
        let mut moka_builder = Cache::builder().expire_after(PerWriteExpiry);

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(tti) = builder.time_to_idle {
            moka_builder = moka_builder.time_to_idle(tti);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
        }
    }

    /// Removes the entry at `key`, if any.
    pub fn invalidate(&self, region: &str, key: &str) {
        self.inner.invalidate(&(region.to_string(), key.to_string()));
    }

    /// Removes every entry in every region.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl<V> CacheStore<V> for InMemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn read(&self, region: &str, key: &str) -> Result<Option<V>> {
        Ok(self
            .inner
            .get(&(region.to_string(), key.to_string()))
            .map(|slot| slot.value))
    }

    fn write(&self, region: &str, key: &str, value: V, ttl: Ttl) -> Result<()> {
        let key = (region.to_string(), key.to_string());
        if ttl.is_no_cache() {
            self.inner.invalidate(&key);
        } else {
            self.inner.insert(
                key,
                Slot {
                    value,
                    ttl: ttl.as_duration(),
                },
            );
        }
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        self.inner.run_pending_tasks();
        Some(self.inner.entry_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_uses_slot_ttl_on_create_and_update() {
        let key = ("r".to_string(), "k".to_string());
        let slot = Slot {
            value: 1,
            ttl: Some(Duration::from_secs(5)),
        };
        let now = Instant::now();

        assert_eq!(
            PerWriteExpiry.expire_after_create(&key, &slot, now),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            PerWriteExpiry.expire_after_update(&key, &slot, now, Some(Duration::from_secs(1))),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn forever_slot_never_expires() {
        let key = ("r".to_string(), "k".to_string());
        let slot = Slot { value: 1, ttl: None };
        assert_eq!(PerWriteExpiry.expire_after_create(&key, &slot, Instant::now()), None);
    }
}
