// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Rebuilding caller-visible results from cached and fresh values.

use std::collections::HashSet;

use cacheside_store::Cached;
use serde_json::Value;

use crate::payload::{Payload, Shape, canonical};

/// Accumulates values into a result of a fixed [`Shape`].
///
/// Maps and collections are mutually exclusive: a map assembler keys every value by
/// its batch element, a collection assembler only appends. Prevented entries are
/// skipped, so the sentinel never reaches the caller.
#[derive(Debug)]
pub(crate) struct Assembler {
    shape: Shape,
    values: Vec<Value>,
    entries: Vec<(Value, Value)>,
    seen: HashSet<String>,
}

impl Assembler {
    pub(crate) fn new(shape: Shape) -> Self {
        Self {
            shape,
            values: Vec::new(),
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Starts from the contents of `payload`, keeping its shape.
    pub(crate) fn seeded(payload: Payload) -> Self {
        let mut assembler = Self::new(payload.shape());
        match payload {
            Payload::Map(entries) => {
                for (key, value) in entries {
                    assembler.insert(key, value);
                }
            }
            Payload::Scalar(value) => assembler.append(value),
            Payload::List(values) | Payload::Set(values) | Payload::Array(values) => {
                for value in values {
                    assembler.append(value);
                }
            }
        }
        assembler
    }

    /// Adds the cached value for `element`, skipping the prevent sentinel.
    pub(crate) fn push(&mut self, element: &Value, cached: &Cached<Payload>) {
        let Cached::Value(payload) = cached else {
            return;
        };
        let value = payload.clone().into_value();
        if self.shape == Shape::Map {
            self.insert(element.clone(), value);
        } else {
            self.append(value);
        }
    }

    fn insert(&mut self, key: Value, value: Value) {
        // Entries already present win over later ones.
        if self.seen.insert(canonical(&key)) {
            self.entries.push((key, value));
        }
    }

    fn append(&mut self, value: Value) {
        if self.shape != Shape::Set || self.seen.insert(canonical(&value)) {
            self.values.push(value);
        }
    }

    /// Materializes the result. A scalar shape yields the first value, if any.
    pub(crate) fn finish(self) -> Option<Payload> {
        match self.shape {
            Shape::Unknown => None,
            Shape::Scalar => self.values.into_iter().next().map(Payload::Scalar),
            Shape::Map => Some(Payload::Map(self.entries)),
            collection => Some(collection_of(collection, self.values)),
        }
    }
}

/// Builds a collection payload of `shape` from `values`.
///
/// Anything other than `Set` or `Array` becomes a `List`.
pub(crate) fn collection_of(shape: Shape, values: Vec<Value>) -> Payload {
    match shape {
        Shape::Set => Payload::set(values),
        Shape::Array => Payload::Array(values),
        _ => Payload::List(values),
    }
}
