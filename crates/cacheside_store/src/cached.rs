// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// A value as it sits in a store: either a real value or the negative-cache marker.
///
/// `Prevented` records that the source was asked for this key and reported nothing.
/// Readers treat it as a hit (the source is not asked again until the entry expires)
/// but never hand it to callers. Being its own variant, it cannot collide with any
/// legitimate value, whatever `V` is.
///
/// # Examples
///
/// ```
/// use cacheside_store::Cached;
///
/// let hit = Cached::Value(42);
/// assert_eq!(hit.value(), Some(&42));
///
/// let absent: Cached<i32> = Cached::Prevented;
/// assert!(absent.is_prevented());
/// assert_eq!(absent.into_value(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cached<V> {
    /// A value produced by the source.
    Value(V),
    /// The source was consulted and had nothing for this key.
    Prevented,
}

impl<V> Cached<V> {
    /// Returns `true` for the negative-cache marker.
    #[must_use]
    pub fn is_prevented(&self) -> bool {
        matches!(self, Self::Prevented)
    }

    /// Returns a reference to the real value, or `None` for the marker.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Value(value) => Some(value),
            Self::Prevented => None,
        }
    }

    /// Consumes the entry and returns the real value, or `None` for the marker.
    #[must_use]
    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Value(value) => Some(value),
            Self::Prevented => None,
        }
    }
}

impl<V> From<V> for Cached<V> {
    fn from(value: V) -> Self {
        Self::Value(value)
    }
}
