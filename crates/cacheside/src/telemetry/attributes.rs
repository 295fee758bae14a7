// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(any(feature = "metrics", test))]
pub(crate) const CACHE_REGION_NAME: &str = "cache.region";

#[cfg(any(feature = "metrics", test))]
pub(crate) const CACHE_PATTERN_NAME: &str = "cache.pattern";

#[cfg(test)]
pub(crate) const CACHE_EVENT_NAME: &str = "cache.event";

#[cfg(test)]
pub(crate) const CACHE_OPERATION_NAME: &str = "cache.operation";

#[cfg(test)]
pub(crate) const CACHE_ACTIVITY_NAME: &str = "cache.activity";

#[cfg(test)]
pub(crate) const CACHE_HITS_NAME: &str = "cache.hits";

#[cfg(test)]
pub(crate) const CACHE_REQUESTS_NAME: &str = "cache.requests";

#[cfg(test)]
pub(crate) const CACHE_DURATION_NAME: &str = "cache.duration_ns";
