// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock store implementation for testing.
//!
//! This module provides `MockStore`, an in-memory store that records all operations
//! and supports failure injection for testing error paths.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{BatchRead, CacheStore, Error, Result, Ttl};

/// Recorded store operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp<V> {
    /// A single-key read.
    Read {
        /// The region read from.
        region: String,
        /// The key read.
        key: String,
    },
    /// A single-key write.
    Write {
        /// The region written to.
        region: String,
        /// The key written.
        key: String,
        /// The value written.
        value: V,
        /// The time-to-live passed with the write.
        ttl: Ttl,
    },
    /// A multi-key read, keys in the order they were requested.
    ReadBatch {
        /// The region read from.
        region: String,
        /// The keys requested.
        keys: Vec<String>,
    },
    /// A multi-key write.
    WriteBatch {
        /// The region written to.
        region: String,
        /// The entries written.
        entries: HashMap<String, V>,
        /// The time-to-live passed with the write.
        ttl: Ttl,
    },
}

type FailPredicate<V> = Box<dyn Fn(&StoreOp<V>) -> bool + Send + Sync>;

/// A configurable mock store for testing.
///
/// Values live in memory and never expire. Every operation is recorded for later
/// verification, and operations can be made to fail on demand. Clones share state.
///
/// # Examples
///
/// ```
/// use cacheside_store::{CacheStore, Ttl, testing::{MockStore, StoreOp}};
///
/// let store = MockStore::<i32>::new();
/// store.write("users", "u:1", 42, Ttl::ONE_MINUTE).unwrap();
/// assert_eq!(store.read("users", "u:1").unwrap(), Some(42));
///
/// assert_eq!(store.operations().len(), 2);
///
/// // Fail reads of one key only
/// store.fail_when(|op| matches!(op, StoreOp::Read { key, .. } if key == "u:2"));
/// assert!(store.read("users", "u:2").is_err());
/// assert!(store.read("users", "u:1").is_ok());
/// ```
pub struct MockStore<V> {
    data: Arc<Mutex<HashMap<(String, String), V>>>,
    operations: Arc<Mutex<Vec<StoreOp<V>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<V>>>>,
}

impl<V> std::fmt::Debug for MockStore<V>
where
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl<V> Clone for MockStore<V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl<V> Default for MockStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MockStore<V> {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Places a value in the store without recording an operation.
    ///
    /// Useful for simulating a store populated by someone else.
    pub fn seed(&self, region: &str, key: &str, value: V) {
        self.data.lock().insert((region.to_string(), key.to_string()), value);
    }

    /// Returns the number of entries in the store.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the store holds a value at the given key.
    #[must_use]
    pub fn contains_key(&self, region: &str, key: &str) -> bool {
        self.data.lock().contains_key(&(region.to_string(), key.to_string()))
    }
}

impl<V> MockStore<V>
where
    V: Clone,
{
    /// Returns the value at the given key without recording an operation.
    #[must_use]
    pub fn peek(&self, region: &str, key: &str) -> Option<V> {
        self.data.lock().get(&(region.to_string(), key.to_string())).cloned()
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// The predicate receives the operation and returns `true` if it should fail.
    /// Failed operations are still recorded but leave the data untouched.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp<V>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp<V>> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Records `op`, failing it if the predicate says so.
    fn admit(&self, op: StoreOp<V>, what: &'static str) -> Result<()> {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        if fail {
            return Err(Error::from_message(format!("mock: {what} failed")));
        }
        Ok(())
    }
}

impl<V> CacheStore<V> for MockStore<V>
where
    V: Clone + Send + Sync,
{
    fn read(&self, region: &str, key: &str) -> Result<Option<V>> {
        self.admit(
            StoreOp::Read {
                region: region.to_string(),
                key: key.to_string(),
            },
            "read",
        )?;
        Ok(self.peek(region, key))
    }

    fn write(&self, region: &str, key: &str, value: V, ttl: Ttl) -> Result<()> {
        self.admit(
            StoreOp::Write {
                region: region.to_string(),
                key: key.to_string(),
                value: value.clone(),
                ttl,
            },
            "write",
        )?;
        self.seed(region, key, value);
        Ok(())
    }

    fn read_batch(&self, region: &str, keys: &[String]) -> Result<BatchRead<V>> {
        self.admit(
            StoreOp::ReadBatch {
                region: region.to_string(),
                keys: keys.to_vec(),
            },
            "read_batch",
        )?;
        let data = self.data.lock();
        let mut read = BatchRead::with_capacity(keys.len());
        for key in keys {
            match data.get(&(region.to_string(), key.clone())) {
                Some(value) => read.hit(key.clone(), value.clone()),
                None => read.miss(key.clone()),
            }
        }
        Ok(read)
    }

    fn write_batch(&self, region: &str, entries: HashMap<String, V>, ttl: Ttl) -> Result<()> {
        self.admit(
            StoreOp::WriteBatch {
                region: region.to_string(),
                entries: entries.clone(),
                ttl,
            },
            "write_batch",
        )?;
        let mut data = self.data.lock();
        for (key, value) in entries {
            data.insert((region.to_string(), key), value);
        }
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.data.lock().len() as u64)
    }
}
