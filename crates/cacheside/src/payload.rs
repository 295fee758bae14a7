// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Caller-visible values and the container shapes they come in.
//!
//! Cached call-sites can return a bare value or one of four container kinds. [`Payload`]
//! carries the value together with its kind so that a result rebuilt from cache entries
//! has the same shape as one produced by the source. Call arguments use the same type:
//! a batch argument is a `List`, `Set` or `Array` payload.

use std::collections::HashSet;

use serde_json::Value;

/// The container kind of a [`Payload`], or `Unknown` before anything was observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Shape {
    /// Not observed yet.
    #[default]
    Unknown = 0,
    /// A single value.
    Scalar = 1,
    /// An ordered sequence that may repeat values.
    List = 2,
    /// A collection of distinct values.
    Set = 3,
    /// A fixed sequence.
    Array = 4,
    /// Values keyed by batch element.
    Map = 5,
}

impl Shape {
    pub(crate) fn from_repr(repr: u8) -> Self {
        match repr {
            1 => Self::Scalar,
            2 => Self::List,
            3 => Self::Set,
            4 => Self::Array,
            5 => Self::Map,
            _ => Self::Unknown,
        }
    }

    /// Returns `true` for `List`, `Set` and `Array`.
    #[must_use]
    pub fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Set | Self::Array)
    }

    /// Returns a short lowercase name, as used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Scalar => "scalar",
            Self::List => "list",
            Self::Set => "set",
            Self::Array => "array",
            Self::Map => "map",
        }
    }
}

/// A value as the caller sees it, tagged with its container kind.
///
/// `Set` never holds two equal values and `Map` never holds two equal keys; the
/// [`set`](Self::set) and [`map`](Self::map) constructors enforce this (first occurrence wins).
/// Equality is structural and order-sensitive.
///
/// # Examples
///
/// ```
/// use cacheside::{Payload, Shape};
/// use serde_json::json;
///
/// let ids = Payload::set([1, 2, 2, 3]);
/// assert_eq!(ids.shape(), Shape::Set);
/// assert_eq!(ids.values(), &[json!(1), json!(2), json!(3)]);
///
/// let users = Payload::map([(json!(1), json!({"id": 1}))]);
/// assert_eq!(users.shape(), Shape::Map);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// A single value.
    Scalar(Value),
    /// An ordered sequence.
    List(Vec<Value>),
    /// Distinct values.
    Set(Vec<Value>),
    /// A fixed sequence.
    Array(Vec<Value>),
    /// Key/value entries with distinct keys.
    Map(Vec<(Value, Value)>),
}

impl Payload {
    /// Creates a scalar payload.
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::Scalar(value.into())
    }

    /// Creates a list payload.
    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Creates a set payload, dropping repeated values.
    pub fn set<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        let mut seen = HashSet::new();
        Self::Set(
            values
                .into_iter()
                .map(Into::into)
                .filter(|value| seen.insert(canonical(value)))
                .collect(),
        )
    }

    /// Creates an array payload.
    pub fn array<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }

    /// Creates a map payload, dropping entries whose key was already seen.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut seen = HashSet::new();
        Self::Map(entries.into_iter().filter(|(key, _)| seen.insert(canonical(key))).collect())
    }

    /// Returns the container kind of this payload.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Self::Scalar(_) => Shape::Scalar,
            Self::List(_) => Shape::List,
            Self::Set(_) => Shape::Set,
            Self::Array(_) => Shape::Array,
            Self::Map(_) => Shape::Map,
        }
    }

    /// Returns the elements of a collection, the single value of a scalar,
    /// or nothing for a map.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::List(values) | Self::Set(values) | Self::Array(values) => values,
            Self::Map(_) => &[],
        }
    }

    /// Returns the value stored under `key` in a map payload.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Returns the number of values (or entries) held.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Map(entries) => entries.len(),
            other => other.values().len(),
        }
    }

    /// Returns `true` for an empty container. A scalar is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens the payload into a single JSON value.
    ///
    /// Collections become arrays and maps become objects keyed by the rendered map key.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Scalar(value) => value,
            Self::List(values) | Self::Set(values) | Self::Array(values) => Value::Array(values),
            Self::Map(entries) => Value::Object(entries.into_iter().map(|(key, value)| (render(&key), value)).collect()),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

/// The identity text of a value: its compact JSON form.
pub(crate) fn canonical(value: &Value) -> String {
    value.to_string()
}

/// The key text of a value: strings bare, everything else as compact JSON.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn shape_round_trips_through_repr() {
        for shape in [
            Shape::Unknown,
            Shape::Scalar,
            Shape::List,
            Shape::Set,
            Shape::Array,
            Shape::Map,
        ] {
            assert_eq!(Shape::from_repr(shape as u8), shape);
        }
        assert_eq!(Shape::from_repr(200), Shape::Unknown);
    }

    #[test]
    fn set_drops_repeats_by_json_identity() {
        let set = Payload::set([json!(1), json!("1"), json!(1), json!({"a": 1})]);
        assert_eq!(set.values(), &[json!(1), json!("1"), json!({"a": 1})]);
    }

    #[test]
    fn map_keeps_first_entry_per_key() {
        let map = Payload::map([(json!(1), json!("a")), (json!(1), json!("b")), (json!(2), json!("c"))]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&json!(1)), Some(&json!("a")));
    }

    #[test]
    fn into_value_flattens_containers() {
        assert_eq!(Payload::list([1, 2]).into_value(), json!([1, 2]));
        assert_eq!(
            Payload::map([(json!(7), json!("x")), (json!("k"), json!(true))]).into_value(),
            json!({"7": "x", "k": true})
        );
    }

    #[test]
    fn render_leaves_strings_bare() {
        assert_eq!(render(&json!("abc")), "abc");
        assert_eq!(render(&json!(12)), "12");
        assert_eq!(render(&json!({"b": 1, "a": 2})), r#"{"a":2,"b":1}"#);
        assert_eq!(canonical(&json!("abc")), r#""abc""#);
    }

    #[test]
    fn scalar_values_view_is_single_element() {
        let scalar = Payload::scalar(5);
        assert_eq!(scalar.values(), &[json!(5)]);
        assert!(!scalar.is_empty());
        assert!(Payload::list(Vec::<Value>::new()).is_empty());
    }
}
