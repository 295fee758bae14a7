// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::{HashMap, HashSet};

/// The outcome of a multi-key store read.
///
/// Every requested key lands in exactly one of the two halves: `hits` maps the keys that
/// were found to their stored values, `misses` holds the rest.
///
/// # Examples
///
/// ```
/// use cacheside_store::BatchRead;
///
/// let mut read = BatchRead::new();
/// read.hit("u:1".to_string(), "alice");
/// read.miss("u:2".to_string());
///
/// assert_eq!(read.hit_count(), 1);
/// assert_eq!(read.request_count(), 2);
/// assert!(!read.is_full_hit());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchRead<V> {
    hits: HashMap<String, V>,
    misses: HashSet<String>,
}

impl<V> Default for BatchRead<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> BatchRead<V> {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hits: HashMap::new(),
            misses: HashSet::new(),
        }
    }

    /// Creates an empty result sized for `keys` requested keys.
    #[must_use]
    pub fn with_capacity(keys: usize) -> Self {
        Self {
            hits: HashMap::with_capacity(keys),
            misses: HashSet::with_capacity(keys),
        }
    }

    /// Records a key that was found.
    pub fn hit(&mut self, key: String, value: V) {
        self.misses.remove(&key);
        self.hits.insert(key, value);
    }

    /// Records a key that was not found.
    pub fn miss(&mut self, key: String) {
        if !self.hits.contains_key(&key) {
            self.misses.insert(key);
        }
    }

    /// Returns the keys that were found, with their values.
    #[must_use]
    pub fn hits(&self) -> &HashMap<String, V> {
        &self.hits
    }

    /// Returns the keys that were not found.
    #[must_use]
    pub fn misses(&self) -> &HashSet<String> {
        &self.misses
    }

    /// Number of keys found.
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    /// Number of keys requested.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.hits.len() + self.misses.len()
    }

    /// Returns `true` when nothing was missing, including the empty request.
    #[must_use]
    pub fn is_full_hit(&self) -> bool {
        self.misses.is_empty()
    }

    /// Splits the result into its hits and misses.
    #[must_use]
    pub fn into_parts(self) -> (HashMap<String, V>, HashSet<String>) {
        (self.hits, self.misses)
    }
}
