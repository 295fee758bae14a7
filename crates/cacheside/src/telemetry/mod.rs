// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry: structured logs, optional OpenTelemetry metrics and an optional
//! pattern-grouped [`TelemetrySink`].
//!
//! Logs are emitted through `tracing` when enabled with
//! [`CacheSideBuilder::logs`](crate::CacheSideBuilder::logs). Metrics are recorded when
//! the `metrics` feature is enabled and a meter provider was supplied.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tick::Clock;
use tracing::Level;

use crate::{CallDescriptor, Shape};

pub(crate) mod attributes;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
pub(crate) mod sink;
#[cfg(test)]
pub(crate) mod testing;

pub use sink::{PatternStats, TelemetrySink};

#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheOperation {
    Read,
    ReadBatch,
    Invoke,
    Write,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "cache.read",
            Self::ReadBatch => "cache.read_batch",
            Self::Invoke => "cache.invoke",
            Self::Write => "cache.write",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    PartialHit,
    Ok,
    Prevented,
    ShapeLearned,
    ColdStart,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::PartialHit => "cache.partial_hit",
            Self::Ok => "cache.ok",
            Self::Prevented => "cache.prevented",
            Self::ShapeLearned => "cache.shape_learned",
            Self::ColdStart => "cache.cold_start",
        }
    }

    pub fn level(self) -> Level {
        match self {
            Self::Hit | Self::Miss | Self::PartialHit | Self::Ok => Level::DEBUG,
            Self::Prevented | Self::ShapeLearned | Self::ColdStart => Level::INFO,
        }
    }
}

/// Optional numeric fields of a logged cache event.
#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    hits: Option<usize>,
    requests: Option<usize>,
    duration: Option<Duration>,
}

/// Records reader activity to logs, metrics and the attached sink.
#[derive(Clone)]
pub(crate) struct CacheTelemetry {
    logging_enabled: bool,
    clock: Clock,
    sink: Option<Arc<dyn TelemetrySink>>,
    #[cfg(any(feature = "metrics", test))]
    metrics: Option<metrics::CacheMetrics>,
}

impl fmt::Debug for CacheTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("CacheTelemetry");
        debug.field("logging_enabled", &self.logging_enabled);
        debug.field("sink", &self.sink.is_some());
        #[cfg(any(feature = "metrics", test))]
        debug.field("metrics", &self.metrics.is_some());
        debug.finish()
    }
}

impl CacheTelemetry {
    pub(crate) fn new(logging_enabled: bool, sink: Option<Arc<dyn TelemetrySink>>, clock: Clock) -> Self {
        Self {
            logging_enabled,
            clock,
            sink,
            #[cfg(any(feature = "metrics", test))]
            metrics: None,
        }
    }

    /// The clock source calls are timed with.
    pub(crate) fn clock(&self) -> &Clock {
        &self.clock
    }

    #[cfg(any(feature = "metrics", test))]
    pub(crate) fn with_metrics(mut self, meter: &opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(metrics::CacheMetrics::new(meter));
        self
    }

    /// Records one single-key lookup. A prevented key counts as a hit.
    pub(crate) fn record_single(&self, descriptor: &CallDescriptor, hit: bool) {
        let hits = usize::from(hit);
        self.count(descriptor, hits, 1);

        if self.logging_enabled {
            let activity = if hit { CacheActivity::Hit } else { CacheActivity::Miss };
            emit(
                descriptor,
                CacheOperation::Read,
                activity,
                Counts {
                    hits: Some(hits),
                    requests: Some(1),
                    duration: None,
                },
            );
        }
    }

    /// Records one batch lookup along with the keys that missed.
    pub(crate) fn record_batch(&self, descriptor: &CallDescriptor, hits: usize, requests: usize, missed: &HashSet<String>) {
        self.count(descriptor, hits, requests);

        if self.logging_enabled {
            let activity = if hits == requests {
                CacheActivity::Hit
            } else if hits == 0 {
                CacheActivity::Miss
            } else {
                CacheActivity::PartialHit
            };
            emit(
                descriptor,
                CacheOperation::ReadBatch,
                activity,
                Counts {
                    hits: Some(hits),
                    requests: Some(requests),
                    duration: None,
                },
            );
            if !missed.is_empty() {
                let mut missed: Vec<&str> = missed.iter().map(String::as_str).collect();
                missed.sort_unstable();
                tracing::debug!(
                    cache.region = descriptor.region(),
                    cache.pattern = descriptor.pattern(),
                    cache.missed = ?missed,
                    "cache.hit_rate {hits}/{requests}"
                );
            }
        }
    }

    /// Records how long the source took on a miss.
    pub(crate) fn record_invoke(&self, descriptor: &CallDescriptor, duration: Duration) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(metrics) = &self.metrics {
            metrics.record_invoke(descriptor, duration.as_secs_f64());
        }

        if self.logging_enabled {
            emit(
                descriptor,
                CacheOperation::Invoke,
                CacheActivity::Ok,
                Counts {
                    duration: Some(duration),
                    ..Counts::default()
                },
            );
        }
    }

    /// Records prevent sentinels written for `count` keys.
    pub(crate) fn record_prevented(&self, descriptor: &CallDescriptor, count: usize) {
        if self.logging_enabled {
            emit(
                descriptor,
                CacheOperation::Write,
                CacheActivity::Prevented,
                Counts {
                    requests: Some(count),
                    ..Counts::default()
                },
            );
        }
    }

    /// Records that a call-site's result shape became known.
    pub(crate) fn record_shape(&self, descriptor: &CallDescriptor, shape: Shape) {
        if self.logging_enabled {
            tracing::info!(
                cache.region = descriptor.region(),
                cache.pattern = descriptor.pattern(),
                cache.activity = CacheActivity::ShapeLearned.as_str(),
                cache.shape = shape.as_str(),
                "cache.event"
            );
        }
    }

    /// Records a fully cached batch that had to call the source to learn its shape.
    pub(crate) fn record_cold_start(&self, descriptor: &CallDescriptor) {
        if self.logging_enabled {
            emit(descriptor, CacheOperation::Invoke, CacheActivity::ColdStart, Counts::default());
        }
    }

    fn count(&self, descriptor: &CallDescriptor, hits: usize, requests: usize) {
        let hits = u64::try_from(hits).unwrap_or(u64::MAX);
        let requests = u64::try_from(requests).unwrap_or(u64::MAX);

        #[cfg(any(feature = "metrics", test))]
        if let Some(metrics) = &self.metrics {
            metrics.record_lookup(descriptor, hits, requests);
        }

        let Some(sink) = &self.sink else {
            return;
        };
        let pattern = descriptor.pattern();
        // Sink failures are dropped after logging; they must not fail the read.
        if let Err(error) = sink.req_incr(pattern, requests) {
            tracing::warn!(cache.pattern = pattern, %error, "telemetry sink rejected request count");
        }
        if let Err(error) = sink.hit_incr(pattern, hits) {
            tracing::warn!(cache.pattern = pattern, %error, "telemetry sink rejected hit count");
        }
    }
}

fn emit(descriptor: &CallDescriptor, operation: CacheOperation, activity: CacheActivity, counts: Counts) {
    let region = descriptor.region();
    let pattern = descriptor.pattern();
    let op = operation.as_str();
    let ev = activity.as_str();
    let duration_ns = counts.duration.map(|d| d.as_nanos());

    // Tracing level must be constant, so we use a macro to select the appropriate level.
    // Field names must match constants in attributes.rs.
    macro_rules! emit_event {
        ($level:ident) => {
            tracing::$level!(
                cache.region = region,
                cache.pattern = pattern,
                cache.operation = op,
                cache.activity = ev,
                cache.hits = ?counts.hits,
                cache.requests = ?counts.requests,
                cache.duration_ns = ?duration_ns,
                "cache.event"
            )
        };
    }

    if activity.level() == Level::INFO {
        emit_event!(info);
    } else {
        emit_event!(debug);
    }
}
