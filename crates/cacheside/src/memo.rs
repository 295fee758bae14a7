// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::Shape;

/// The learned result shape of one call-site.
///
/// Starts as [`Shape::Unknown`] and is set the first time the source returns a value.
/// Single and batch reads both record it; only the batch reader depends on it.
/// Concurrent writers race benignly: a call-site returns one shape, so every writer
/// stores the same value.
#[derive(Debug, Default)]
pub struct ShapeMemo(AtomicU8);

impl ShapeMemo {
    /// Creates an empty memo.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(Shape::Unknown as u8))
    }

    /// Returns the learned shape, or `Unknown`.
    #[must_use]
    pub fn get(&self) -> Shape {
        Shape::from_repr(self.0.load(Ordering::Acquire))
    }

    /// Records `shape`. `Unknown` is ignored so a learned shape never regresses.
    pub fn observe(&self, shape: Shape) {
        if shape != Shape::Unknown {
            self.0.store(shape as u8, Ordering::Release);
        }
    }

    /// Records `shape` only while nothing was learned yet. Returns `true` if it was stored.
    pub fn observe_if_unknown(&self, shape: Shape) -> bool {
        shape != Shape::Unknown
            && self
                .0
                .compare_exchange(Shape::Unknown as u8, shape as u8, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    /// Returns `true` once a shape has been learned.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.get() != Shape::Unknown
    }
}
