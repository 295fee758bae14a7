// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter, MeterProvider},
};

use crate::CallDescriptor;
use crate::telemetry::attributes;

const METER_NAME: &str = "cacheside";
const VERSION: &str = "v0.1.0";
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";
pub(crate) const CACHE_REQUEST_COUNT_NAME: &str = "cache.request.count";
pub(crate) const CACHE_HIT_COUNT_NAME: &str = "cache.hit.count";
pub(crate) const CACHE_INVOKE_DURATION_NAME: &str = "cache.invoke.duration";

pub(crate) fn create_meter(meter_provider: &dyn MeterProvider) -> Meter {
    meter_provider.meter_with_scope(
        InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

/// Instruments shared by every call-site of one `CacheSide`.
#[derive(Clone, Debug)]
pub(crate) struct CacheMetrics {
    requests: Counter<u64>,
    hits: Counter<u64>,
    invoke_duration: Histogram<f64>,
}

impl CacheMetrics {
    pub(crate) fn new(meter: &Meter) -> Self {
        Self {
            requests: meter
                .u64_counter(CACHE_REQUEST_COUNT_NAME)
                .with_description("Keys looked up in the cache")
                .with_unit("{key}")
                .build(),
            hits: meter
                .u64_counter(CACHE_HIT_COUNT_NAME)
                .with_description("Keys found in the cache, including prevented keys")
                .with_unit("{key}")
                .build(),
            invoke_duration: meter
                .f64_histogram(CACHE_INVOKE_DURATION_NAME)
                .with_description("Duration of source invocations on cache misses")
                .with_unit("s")
                .build(),
        }
    }

    pub(crate) fn record_lookup(&self, descriptor: &CallDescriptor, hits: u64, requests: u64) {
        let attrs = attributes_of(descriptor);
        self.requests.add(requests, &attrs);
        self.hits.add(hits, &attrs);
    }

    pub(crate) fn record_invoke(&self, descriptor: &CallDescriptor, seconds: f64) {
        self.invoke_duration.record(seconds, &attributes_of(descriptor));
    }
}

fn attributes_of(descriptor: &CallDescriptor) -> [KeyValue; 2] {
    [
        KeyValue::new(attributes::CACHE_REGION_NAME, descriptor.region().to_owned()),
        KeyValue::new(attributes::CACHE_PATTERN_NAME, descriptor.pattern().to_owned()),
    ]
}
