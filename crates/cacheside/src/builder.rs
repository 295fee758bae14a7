// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::sync::Arc;

use cacheside_store::{CacheStore, Cached};
use tick::Clock;
use tick::runtime::InactiveClock;

use crate::telemetry::{CacheTelemetry, TelemetrySink};
use crate::{CacheSide, Payload};

/// Builder for [`CacheSide`].
///
/// Created by [`CacheSide::builder`]. Negative caching and logging are off and no
/// sink is attached until configured.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use cacheside::{CacheSide, InMemoryStore, PatternStats};
///
/// let stats = Arc::new(PatternStats::new());
/// let cache = CacheSide::builder(InMemoryStore::new())
///     .prevent(true)
///     .sink(stats)
///     .logs()
///     .build();
///
/// assert!(cache.prevent_enabled());
/// ```
#[must_use]
pub struct CacheSideBuilder {
    store: Arc<dyn CacheStore<Cached<Payload>>>,
    prevent: bool,
    logs: bool,
    sink: Option<Arc<dyn TelemetrySink>>,
    clock: Option<Clock>,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<opentelemetry::metrics::Meter>,
}

impl Debug for CacheSideBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSideBuilder")
            .field("prevent", &self.prevent)
            .field("logs", &self.logs)
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl CacheSideBuilder {
    pub(crate) fn new(store: Arc<dyn CacheStore<Cached<Payload>>>) -> Self {
        Self {
            store,
            prevent: false,
            logs: false,
            sink: None,
            clock: None,
            #[cfg(any(feature = "metrics", test))]
            meter: None,
        }
    }

    /// Turns negative caching on or off.
    ///
    /// When on, a key the source had nothing for is stored as a prevent sentinel, and
    /// later reads of it return `None` without calling the source until it expires.
    pub fn prevent(mut self, enabled: bool) -> Self {
        self.prevent = enabled;
        self
    }

    /// Attaches a sink that receives hit and request counts per call-site pattern.
    pub fn sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Times source calls with `clock` instead of the system clock.
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Emits `tracing` events for lookups, source calls and writes.
    pub fn logs(mut self) -> Self {
        self.logs = true;
        self
    }

    /// Records OpenTelemetry metrics through `meter_provider`.
    #[cfg(any(feature = "metrics", test))]
    pub fn metrics(mut self, meter_provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        self.meter = Some(crate::telemetry::metrics::create_meter(meter_provider));
        self
    }

    /// Builds the `CacheSide`.
    pub fn build(self) -> CacheSide {
        // Only `instant()` is read, so the timer driver is not needed.
        let clock = self.clock.unwrap_or_else(|| InactiveClock::default().activate().0);
        let telemetry = CacheTelemetry::new(self.logs, self.sink, clock);
        #[cfg(any(feature = "metrics", test))]
        let telemetry = match &self.meter {
            Some(meter) => telemetry.with_metrics(meter),
            None => telemetry,
        };
        CacheSide::from_parts(self.store, self.prevent, telemetry)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cacheside_store::testing::MockStore;
    use serde_json::json;
    use tick::ClockControl;

    use super::*;
    use crate::telemetry::metrics::{CACHE_HIT_COUNT_NAME, CACHE_INVOKE_DURATION_NAME, CACHE_REQUEST_COUNT_NAME};
    use crate::telemetry::testing::{LogCapture, MetricTester};
    use crate::{CallDescriptor, CallSite, Error};

    fn site() -> CallSite {
        CallSite::new(CallDescriptor::builder("user").prefix("u:").batch_arg(0).build().unwrap())
    }

    #[test]
    fn defaults_are_quiet() {
        let cache = CacheSide::builder(MockStore::new()).build();
        assert!(!cache.prevent_enabled());

        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        cache
            .read::<Error, _>(&site(), vec![Payload::list([1])], |_| Ok(Some(Payload::map([]))))
            .unwrap();
        assert!(capture.output().is_empty());
    }

    #[test]
    fn logs_cover_lookup_invoke_and_prevent() {
        let cache = CacheSide::builder(MockStore::new()).prevent(true).logs().build();
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        cache
            .read::<Error, _>(&site(), vec![Payload::list([1, 2])], |_| {
                Ok(Some(Payload::map([(json!(1), json!("one"))])))
            })
            .unwrap();

        capture.assert_contains("cache.read_batch");
        capture.assert_contains("cache.miss");
        capture.assert_contains("cache.invoke");
        capture.assert_contains("cache.shape_learned");
        capture.assert_contains("cache.prevented");
        capture.assert_contains("cache.hit_rate 0/2");
    }

    #[test]
    fn metrics_count_requests_and_hits() {
        let tester = MetricTester::new();
        let store = MockStore::new();
        store.seed("user", "u:1", Cached::Value(Payload::scalar("one")));
        let cache = CacheSide::builder(store).metrics(tester.meter_provider()).build();

        cache
            .read::<Error, _>(&site(), vec![Payload::list([1, 2])], |_| {
                Ok(Some(Payload::map([(json!(2), json!("two"))])))
            })
            .unwrap();

        assert_eq!(tester.sum_u64(CACHE_REQUEST_COUNT_NAME), 2);
        assert_eq!(tester.sum_u64(CACHE_HIT_COUNT_NAME), 1);
    }

    #[test]
    fn invoke_duration_comes_from_the_clock() {
        let control = ClockControl::new();
        let tester = MetricTester::new();
        let cache = CacheSide::builder(MockStore::new())
            .clock(control.to_clock())
            .metrics(tester.meter_provider())
            .logs()
            .build();
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        cache
            .read::<Error, _>(&site(), vec![Payload::list([1])], |_| {
                control.advance(Duration::from_millis(250));
                Ok(Some(Payload::map([(json!(1), json!("one"))])))
            })
            .unwrap();

        assert_eq!(tester.histogram_count(CACHE_INVOKE_DURATION_NAME), 1);
        assert!((tester.histogram_sum(CACHE_INVOKE_DURATION_NAME) - 0.25).abs() < 1e-9);
        capture.assert_contains("cache.duration_ns=Some(250000000)");
    }

    #[test]
    fn debug_does_not_expose_store() {
        let builder = CacheSide::builder(MockStore::new()).prevent(true);
        let text = format!("{builder:?}");
        assert!(text.contains("prevent: true"), "{text}");

        let cache = builder.build();
        assert!(format!("{cache:?}").contains("CacheSide"));
    }
}
