// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use cacheside_store::{Cached, Error};

use super::Context;
use crate::keys::single_key;
use crate::{CallSite, Payload};

/// Reads one key, calling the source on a miss.
///
/// A prevented key counts as a hit and yields `None` without calling the source.
/// Source errors are returned unchanged and nothing is written for them.
pub(crate) fn read<E, F>(cx: &Context<'_>, site: &CallSite, args: Vec<Payload>, mut invoke: F) -> Result<Option<Payload>, E>
where
    E: From<Error>,
    F: FnMut(Vec<Payload>) -> Result<Option<Payload>, E>,
{
    let descriptor = site.descriptor();
    let key = single_key(descriptor, &args)?;

    match cx.store.read(descriptor.region(), &key)? {
        Some(Cached::Prevented) => {
            cx.telemetry.record_single(descriptor, true);
            return Ok(None);
        }
        Some(Cached::Value(payload)) => {
            cx.telemetry.record_single(descriptor, true);
            learn_shape(cx, site, &payload);
            return Ok(Some(payload));
        }
        None => cx.telemetry.record_single(descriptor, false),
    }

    match cx.invoke(descriptor, &mut invoke, args)? {
        Some(payload) => {
            learn_shape(cx, site, &payload);
            if cx.mode.writes_back() {
                cx.store
                    .write(descriptor.region(), &key, Cached::Value(payload.clone()), descriptor.ttl())?;
            }
            Ok(Some(payload))
        }
        None => {
            if cx.writes_prevent() {
                cx.store.write(descriptor.region(), &key, Cached::Prevented, descriptor.ttl())?;
                cx.telemetry.record_prevented(descriptor, 1);
            }
            Ok(None)
        }
    }
}

fn learn_shape(cx: &Context<'_>, site: &CallSite, payload: &Payload) {
    let shape = payload.shape();
    if site.memo().observe_if_unknown(shape) {
        cx.telemetry.record_shape(site.descriptor(), shape);
    }
}
