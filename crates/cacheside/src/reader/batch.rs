// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Batch reads: one store round trip for every element of the batch argument, one
//! source call for whatever is missing, and a result rebuilt in the call-site's shape.

use std::collections::{HashMap, HashSet};

use cacheside_store::{Cached, Error};

use super::Context;
use crate::container::{Assembler, collection_of};
use crate::keys::{BatchKeys, multi_key};
use crate::{CallDescriptor, CallSite, Payload, Shape};

type Hits = HashMap<String, Cached<Payload>>;

/// Reads every element of the batch argument, calling the source for the misses only.
pub(crate) fn read<E, F>(cx: &Context<'_>, site: &CallSite, args: Vec<Payload>, mut invoke: F) -> Result<Option<Payload>, E>
where
    E: From<Error>,
    F: FnMut(Vec<Payload>) -> Result<Option<Payload>, E>,
{
    let descriptor = site.descriptor();
    let keys = multi_key(descriptor, &args)?;

    let batch = cx.store.read_batch(descriptor.region(), &keys.keys())?;
    cx.telemetry
        .record_batch(descriptor, batch.hit_count(), batch.request_count(), batch.misses());
    let (hits, misses) = batch.into_parts();

    if misses.is_empty() {
        return full_hit(cx, site, &keys, &hits, args, &mut invoke);
    }

    let known = site.memo().get();
    if cx.mode.writes_back() && descriptor.id_field().is_none() && !matches!(known, Shape::Unknown | Shape::Map) {
        // The write-back would fail; do not call the source first.
        return Err(uncorrelated(descriptor, known).into());
    }

    let mut reduced = args.clone();
    if let Some(slot) = reduced.get_mut(keys.position()) {
        *slot = collection_of(keys.shape(), keys.elements_for(&misses));
    }

    let Some(fresh) = cx.invoke(descriptor, &mut invoke, reduced)? else {
        // Nothing came back for the misses: answer from what the store had.
        return full_hit(cx, site, &keys, &hits, args, &mut invoke);
    };

    learn_shape(cx, site, fresh.shape());

    if cx.mode.writes_back() {
        write_back(cx, descriptor, &keys, &misses, &fresh)?;
    }

    let mut assembler = Assembler::seeded(fresh);
    push_hits(&mut assembler, &keys, &hits);
    Ok(assembler.finish())
}

/// Rebuilds the result from store hits alone.
///
/// Until the call-site's shape is known the source is called once with the original
/// arguments; only the shape of its answer is used.
fn full_hit<E, F>(
    cx: &Context<'_>,
    site: &CallSite,
    keys: &BatchKeys,
    hits: &Hits,
    args: Vec<Payload>,
    invoke: &mut F,
) -> Result<Option<Payload>, E>
where
    F: FnMut(Vec<Payload>) -> Result<Option<Payload>, E>,
{
    let mut shape = site.memo().get();
    if shape == Shape::Unknown {
        let descriptor = site.descriptor();
        cx.telemetry.record_cold_start(descriptor);
        match cx.invoke(descriptor, invoke, args)? {
            Some(payload) => {
                shape = payload.shape();
                learn_shape(cx, site, shape);
            }
            None => return Ok(None),
        }
    }

    let mut assembler = Assembler::new(shape);
    push_hits(&mut assembler, keys, hits);
    Ok(assembler.finish())
}

fn push_hits(assembler: &mut Assembler, keys: &BatchKeys, hits: &Hits) {
    for (element, key) in keys.entries() {
        if let Some(cached) = hits.get(key) {
            assembler.push(element, cached);
        }
    }
}

fn learn_shape(cx: &Context<'_>, site: &CallSite, shape: Shape) {
    let memo = site.memo();
    if memo.get() != shape {
        memo.observe(shape);
        cx.telemetry.record_shape(site.descriptor(), shape);
    }
}

fn uncorrelated(descriptor: &CallDescriptor, shape: Shape) -> Error {
    descriptor.misconfigured(format!("a {} result cannot be written back without an id field", shape.as_str()))
}

/// Writes fresh values for missing keys, plus prevent sentinels for keys the source
/// had nothing for.
fn write_back(
    cx: &Context<'_>,
    descriptor: &CallDescriptor,
    keys: &BatchKeys,
    misses: &HashSet<String>,
    fresh: &Payload,
) -> Result<(), Error> {
    let mut entries = HashMap::with_capacity(misses.len());
    let mut correlate = |identity: &serde_json::Value, id_field: Option<&str>, value: &serde_json::Value| {
        if let Some(key) = keys.key_of(identity, id_field) {
            if misses.contains(key) {
                entries.insert(key.to_owned(), Cached::Value(Payload::Scalar(value.clone())));
            }
        }
    };

    match fresh {
        Payload::Map(pairs) => {
            for (element, value) in pairs {
                correlate(element, descriptor.id_field(), value);
            }
        }
        other => {
            let Some(id_field) = descriptor.id_field() else {
                return Err(uncorrelated(descriptor, other.shape()));
            };
            for value in other.values() {
                correlate(value, Some(id_field), value);
            }
        }
    }

    let mut prevented = 0;
    if cx.prevent {
        for key in misses {
            if !entries.contains_key(key) {
                entries.insert(key.clone(), Cached::Prevented);
                prevented += 1;
            }
        }
    }

    if !entries.is_empty() {
        cx.store.write_batch(descriptor.region(), entries, descriptor.ttl())?;
    }
    if prevented > 0 {
        cx.telemetry.record_prevented(descriptor, prevented);
    }
    Ok(())
}
