// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache key derivation.
//!
//! A key is the descriptor's prefix followed by the rendered key arguments joined
//! with `-`, in ascending position order. Strings render bare and every other value
//! renders as compact JSON. Batch keys substitute each element of the batch argument
//! (or its id field) for the argument itself.

use std::collections::{HashMap, HashSet};

use cacheside_store::Result;
use serde_json::Value;

use crate::CallDescriptor;
use crate::payload::{Payload, Shape, canonical, render};

/// Derives the key of a single-key call.
pub(crate) fn single_key(descriptor: &CallDescriptor, args: &[Payload]) -> Result<String> {
    let parts = descriptor
        .key_args()
        .map(|position| argument(descriptor, args, position).map(render_argument))
        .collect::<Result<Vec<_>>>()?;
    Ok(compose(descriptor.prefix(), parts))
}

/// Derives one key per distinct element of the batch argument.
pub(crate) fn multi_key(descriptor: &CallDescriptor, args: &[Payload]) -> Result<BatchKeys> {
    let Some(batch_position) = descriptor.batch_arg() else {
        return Err(descriptor.misconfigured("the call-site has no batch argument"));
    };

    let batch = argument(descriptor, args, batch_position)?;
    if !batch.shape().is_collection() {
        return Err(descriptor.misconfigured(format!(
            "batch argument {batch_position} is a {}, expected a list, set or array",
            batch.shape().as_str()
        )));
    }

    let mut fixed = Vec::new();
    for position in descriptor.key_args() {
        if position == batch_position {
            fixed.push(None);
        } else {
            fixed.push(Some(render_argument(argument(descriptor, args, position)?)));
        }
    }

    let id_field = descriptor.id_field();
    let mut keys = BatchKeys::new(batch.shape(), batch_position);
    for element in batch.values() {
        let identity = identity(element, id_field);
        let rendered = render(identity);
        let parts = fixed.iter().map(|part| part.clone().unwrap_or_else(|| rendered.clone()));
        let key = compose(descriptor.prefix(), parts);
        keys.add(element, canonical(identity), key);
    }

    Ok(keys)
}

fn argument<'a>(descriptor: &CallDescriptor, args: &'a [Payload], position: usize) -> Result<&'a Payload> {
    args.get(position).ok_or_else(|| {
        descriptor.misconfigured(format!(
            "key argument {position} is out of range for {} arguments",
            args.len()
        ))
    })
}

fn render_argument(argument: &Payload) -> String {
    match argument {
        Payload::Scalar(value) => render(value),
        other => other.clone().into_value().to_string(),
    }
}

fn compose(prefix: &str, parts: impl IntoIterator<Item = String>) -> String {
    let mut key = String::from(prefix);
    for (index, part) in parts.into_iter().enumerate() {
        if index > 0 {
            key.push('-');
        }
        key.push_str(&part);
    }
    key
}

/// The value that identifies a batch element or a returned value.
///
/// With an id field, an object carrying that field is identified by the field's value.
fn identity<'a>(value: &'a Value, id_field: Option<&str>) -> &'a Value {
    id_field.and_then(|field| value.get(field)).unwrap_or(value)
}

/// The mapping between batch elements and their keys for one batch call.
///
/// Entries keep request order and pair each key with the element it was derived
/// from. Elements that derive the same key collapse onto the first of them.
#[derive(Debug)]
pub(crate) struct BatchKeys {
    shape: Shape,
    position: usize,
    entries: Vec<(Value, String)>,
    element_to_key: HashMap<String, String>,
    known_keys: HashSet<String>,
}

impl BatchKeys {
    fn new(shape: Shape, position: usize) -> Self {
        Self {
            shape,
            position,
            entries: Vec::new(),
            element_to_key: HashMap::new(),
            known_keys: HashSet::new(),
        }
    }

    fn add(&mut self, element: &Value, identity: String, key: String) {
        if !self.known_keys.insert(key.clone()) {
            return;
        }
        self.element_to_key.insert(identity, key.clone());
        self.entries.push((element.clone(), key));
    }

    /// The container kind of the batch argument.
    pub(crate) fn shape(&self) -> Shape {
        self.shape
    }

    /// The position of the batch argument.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// `(element, key)` pairs in request order.
    pub(crate) fn entries(&self) -> &[(Value, String)] {
        &self.entries
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(_, key)| key.clone()).collect()
    }

    /// Looks up the key of a value by identity, honoring the id field.
    pub(crate) fn key_of(&self, value: &Value, id_field: Option<&str>) -> Option<&str> {
        self.element_to_key
            .get(&canonical(identity(value, id_field)))
            .map(String::as_str)
    }

    /// The elements whose keys are in `keys`, in request order.
    pub(crate) fn elements_for(&self, keys: &HashSet<String>) -> Vec<Value> {
        self.entries
            .iter()
            .filter(|(_, key)| keys.contains(key))
            .map(|(element, _)| element.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn descriptor() -> CallDescriptor {
        CallDescriptor::builder("user").prefix("u:").batch_arg(0).build().unwrap()
    }

    #[test]
    fn single_key_joins_positions_in_order() {
        let descriptor = CallDescriptor::builder("order")
            .prefix("o:")
            .key_arg(2)
            .key_arg(0)
            .build()
            .unwrap();
        let args = vec![Payload::scalar("eu"), Payload::scalar(true), Payload::scalar(42)];
        assert_eq!(single_key(&descriptor, &args).unwrap(), "o:eu-42");
    }

    #[test]
    fn single_key_renders_containers_as_json() {
        let descriptor = CallDescriptor::builder("r").key_arg(0).build().unwrap();
        let args = vec![Payload::list([1, 2])];
        assert_eq!(single_key(&descriptor, &args).unwrap(), "[1,2]");
    }

    #[test]
    fn single_key_without_key_args_is_the_prefix() {
        let descriptor = CallDescriptor::builder("config").prefix("all").build().unwrap();
        assert_eq!(single_key(&descriptor, &[]).unwrap(), "all");
    }

    #[test]
    fn out_of_range_position_is_misconfiguration() {
        let descriptor = CallDescriptor::builder("r").key_arg(3).build().unwrap();
        let err = single_key(&descriptor, &[Payload::scalar(1)]).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn multi_key_maps_each_element() {
        let keys = multi_key(&descriptor(), &[Payload::list([1, 2, 3])]).unwrap();
        assert_eq!(keys.keys(), vec!["u:1", "u:2", "u:3"]);
        assert_eq!(keys.shape(), Shape::List);
        assert_eq!(keys.position(), 0);
        assert_eq!(keys.entries()[1], (json!(2), "u:2".to_owned()));
        assert_eq!(keys.key_of(&json!(3), None), Some("u:3"));
    }

    #[test]
    fn multi_key_substitutes_element_among_other_args() {
        let descriptor = CallDescriptor::builder("user")
            .prefix("u:")
            .key_arg(0)
            .batch_arg(1)
            .build()
            .unwrap();
        let keys = multi_key(&descriptor, &[Payload::scalar("tenant"), Payload::array(["a", "b"])]).unwrap();
        assert_eq!(keys.keys(), vec!["u:tenant-a", "u:tenant-b"]);
        assert_eq!(keys.shape(), Shape::Array);
    }

    #[test]
    fn multi_key_uses_id_field_of_objects() {
        let descriptor = CallDescriptor::builder("user").prefix("u:").batch_arg(0).id_field("id").build().unwrap();
        let args = [Payload::list([json!({"id": 7, "name": "x"}), json!({"id": 8})])];
        let keys = multi_key(&descriptor, &args).unwrap();
        assert_eq!(keys.keys(), vec!["u:7", "u:8"]);
        assert_eq!(keys.key_of(&json!({"id": 7, "name": "other"}), Some("id")), Some("u:7"));
        assert_eq!(keys.entries()[0].0, json!({"id": 7, "name": "x"}));
    }

    #[test]
    fn duplicate_elements_collapse() {
        let keys = multi_key(&descriptor(), &[Payload::list([1, 2, 1])]).unwrap();
        assert_eq!(keys.entries().len(), 2);
        assert_eq!(keys.keys(), vec!["u:1", "u:2"]);
    }

    #[test]
    fn elements_for_keeps_request_order() {
        let keys = multi_key(&descriptor(), &[Payload::list([5, 4, 3, 2])]).unwrap();
        let missing = HashSet::from(["u:2".to_owned(), "u:4".to_owned()]);
        assert_eq!(keys.elements_for(&missing), vec![json!(4), json!(2)]);
    }

    #[test]
    fn non_container_batch_argument_fails_fast() {
        let err = multi_key(&descriptor(), &[Payload::scalar(1)]).unwrap_err();
        assert!(err.to_string().contains("expected a list, set or array"), "{err}");

        let err = multi_key(&descriptor(), &[Payload::map([(json!(1), json!(2))])]).unwrap_err();
        assert!(err.to_string().contains("map"), "{err}");
    }

    #[test]
    fn multi_key_requires_batch_descriptor() {
        let descriptor = CallDescriptor::builder("user").key_arg(0).build().unwrap();
        multi_key(&descriptor, &[Payload::list([1])]).unwrap_err();
    }
}
