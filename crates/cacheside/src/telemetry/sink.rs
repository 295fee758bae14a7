// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;

use cacheside_store::Result;
use parking_lot::Mutex;

/// Receives hit and request counts grouped by call-site pattern.
///
/// A sink is owned by the host application and handed to
/// [`CacheSideBuilder::sink`](crate::CacheSideBuilder::sink). Counting is best-effort:
/// a failing sink is logged and otherwise ignored, it never changes what a read returns.
pub trait TelemetrySink: Send + Sync {
    /// Adds `count` cache hits for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the count could not be recorded.
    fn hit_incr(&self, pattern: &str, count: u64) -> Result<()>;

    /// Adds `count` cache requests for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the count could not be recorded.
    fn req_incr(&self, pattern: &str, count: u64) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Counts {
    hits: u64,
    requests: u64,
}

/// A [`TelemetrySink`] that keeps running totals in memory.
///
/// # Examples
///
/// ```
/// use cacheside::{PatternStats, TelemetrySink};
///
/// let stats = PatternStats::new();
/// stats.req_incr("user:u:*", 4)?;
/// stats.hit_incr("user:u:*", 3)?;
///
/// assert_eq!(stats.hit_rate("user:u:*"), Some(0.75));
/// # Ok::<(), cacheside::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct PatternStats {
    counts: Mutex<HashMap<String, Counts>>,
}

impl PatternStats {
    /// Creates an empty set of counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits recorded for `pattern`.
    #[must_use]
    pub fn hits(&self, pattern: &str) -> u64 {
        self.counts.lock().get(pattern).map_or(0, |counts| counts.hits)
    }

    /// Requests recorded for `pattern`.
    #[must_use]
    pub fn requests(&self, pattern: &str) -> u64 {
        self.counts.lock().get(pattern).map_or(0, |counts| counts.requests)
    }

    /// Hits divided by requests, or `None` before the first request.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "ratio of counters")]
    pub fn hit_rate(&self, pattern: &str) -> Option<f64> {
        let counts = self.counts.lock().get(pattern).copied()?;
        (counts.requests > 0).then(|| counts.hits as f64 / counts.requests as f64)
    }

    /// Every pattern seen so far, sorted.
    #[must_use]
    pub fn patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self.counts.lock().keys().cloned().collect();
        patterns.sort();
        patterns
    }

    /// Clears all counters.
    pub fn reset(&self) {
        self.counts.lock().clear();
    }
}

impl TelemetrySink for PatternStats {
    fn hit_incr(&self, pattern: &str, count: u64) -> Result<()> {
        self.counts.lock().entry(pattern.to_owned()).or_default().hits += count;
        Ok(())
    }

    fn req_incr(&self, pattern: &str, count: u64) -> Result<()> {
        self.counts.lock().entry(pattern.to_owned()).or_default().requests += count;
        Ok(())
    }
}
