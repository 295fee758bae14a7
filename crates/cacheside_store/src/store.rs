// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The contract between cache-aside readers and key/value backends.
//!
//! [`CacheStore`] is deliberately small: readers only need single and batch gets and puts.
//! Eviction, persistence and coherence are the backend's business.

use std::collections::HashMap;

use crate::{BatchRead, Result, Ttl};

/// Trait for key/value backends consumed by cache-aside readers.
///
/// Keys are addressed within a *region*, a logical cache name that backends may map to a
/// separate namespace, database or key prefix. Implementations must be internally
/// thread-safe: readers call them concurrently without any locking of their own.
///
/// `read` and `write` are required. The batch operations default to looping over them;
/// backends with a native multi-get or pipelined writes should override them.
/// `len` defaults to `None` (not all stores track size) and `is_empty` delegates to it.
pub trait CacheStore<V>: Send + Sync {
    /// Reads the value stored at `key`, returning `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails. Readers do not treat failures as misses.
    fn read(&self, region: &str, key: &str) -> Result<Option<V>>;

    /// Writes `value` at `key` with the given time-to-live.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn write(&self, region: &str, key: &str, value: V, ttl: Ttl) -> Result<()>;

    /// Reads many keys at once, splitting them into hits and misses.
    ///
    /// `keys` holds distinct keys. Every key ends up in exactly one half of the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn read_batch(&self, region: &str, keys: &[String]) -> Result<BatchRead<V>> {
        let mut read = BatchRead::with_capacity(keys.len());
        for key in keys {
            match self.read(region, key)? {
                Some(value) => read.hit(key.clone(), value),
                None => read.miss(key.clone()),
            }
        }
        Ok(read)
    }

    /// Writes many entries at once, all with the same time-to-live.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails. Entries written before the failure may remain.
    fn write_batch(&self, region: &str, entries: HashMap<String, V>, ttl: Ttl) -> Result<()> {
        for (key, value) in entries {
            self.write(region, &key, value, ttl)?;
        }
        Ok(())
    }

    /// Returns the number of entries, if supported.
    ///
    /// Returns `None` for implementations that don't track size.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the store contains no entries.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}
