// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-call-site cache metadata.

use std::collections::BTreeSet;

use cacheside_store::{Error, Ttl};

use crate::memo::ShapeMemo;

/// Immutable cache metadata for one call-site.
///
/// A descriptor names the cache region, the key prefix, the TTL used for writes and
/// which argument positions contribute to the key. Batch call-sites also name the
/// position of the batch argument and, optionally, the field that identifies each
/// element of a collection of objects.
///
/// Built once per call-site through [`CallDescriptor::builder`].
///
/// # Examples
///
/// ```
/// use cacheside::{CallDescriptor, Ttl};
///
/// let descriptor = CallDescriptor::builder("user")
///     .prefix("u:")
///     .ttl(Ttl::TEN_MINUTES)
///     .batch_arg(0)
///     .id_field("id")
///     .build()?;
///
/// assert!(descriptor.is_batch());
/// assert_eq!(descriptor.pattern(), "user:u:*");
/// # Ok::<(), cacheside::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallDescriptor {
    id: String,
    region: String,
    prefix: String,
    ttl: Ttl,
    key_args: BTreeSet<usize>,
    batch_arg: Option<usize>,
    id_field: Option<String>,
    pattern: String,
}

impl CallDescriptor {
    /// Starts building a descriptor for `region`.
    pub fn builder(region: impl Into<String>) -> CallDescriptorBuilder {
        CallDescriptorBuilder::new(region.into())
    }

    /// The identifier used in logs and error messages. Defaults to the region.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The store region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The TTL passed to every write.
    #[must_use]
    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    /// Argument positions that form the key, ascending.
    pub fn key_args(&self) -> impl Iterator<Item = usize> + '_ {
        self.key_args.iter().copied()
    }

    /// Position of the batch argument, if this is a batch call-site.
    #[must_use]
    pub fn batch_arg(&self) -> Option<usize> {
        self.batch_arg
    }

    /// Field that identifies an element of a collection of objects.
    #[must_use]
    pub fn id_field(&self) -> Option<&str> {
        self.id_field.as_deref()
    }

    /// Telemetry grouping string, independent of the concrete key.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns `true` when reads go through the batch reader.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.batch_arg.is_some()
    }

    pub(crate) fn misconfigured(&self, detail: impl std::fmt::Display) -> Error {
        Error::misconfigured(&self.id, detail)
    }
}

/// Builder for [`CallDescriptor`].
#[derive(Clone, Debug)]
#[must_use]
pub struct CallDescriptorBuilder {
    id: Option<String>,
    region: String,
    prefix: String,
    ttl: Ttl,
    key_args: BTreeSet<usize>,
    batch_arg: Option<usize>,
    id_field: Option<String>,
}

impl CallDescriptorBuilder {
    fn new(region: String) -> Self {
        Self {
            id: None,
            region,
            prefix: String::new(),
            ttl: Ttl::default(),
            key_args: BTreeSet::new(),
            batch_arg: None,
            id_field: None,
        }
    }

    /// Sets the key prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the write TTL. Defaults to [`Ttl::FOREVER`].
    pub fn ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = ttl;
        self
    }

    /// Adds an argument position to the key.
    pub fn key_arg(mut self, position: usize) -> Self {
        self.key_args.insert(position);
        self
    }

    /// Marks the argument at `position` as the batch argument.
    ///
    /// The position also becomes a key position.
    pub fn batch_arg(mut self, position: usize) -> Self {
        self.batch_arg = Some(position);
        self
    }

    /// Sets the field that identifies elements and returned values of a batch call.
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    /// Overrides the identifier used in logs and error messages.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validates the configuration and builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the region is empty or if an id field is set without a
    /// batch argument.
    pub fn build(self) -> Result<CallDescriptor, Error> {
        let id = self.id.unwrap_or_else(|| self.region.clone());

        if self.region.is_empty() {
            return Err(Error::misconfigured(&id, "region must not be empty"));
        }

        if self.id_field.is_some() && self.batch_arg.is_none() {
            return Err(Error::misconfigured(&id, "an id field requires a batch argument"));
        }

        let mut key_args = self.key_args;
        if let Some(position) = self.batch_arg {
            key_args.insert(position);
        }

        let pattern = pattern(&self.region, &self.prefix, key_args.len());

        Ok(CallDescriptor {
            id,
            region: self.region,
            prefix: self.prefix,
            ttl: self.ttl,
            key_args,
            batch_arg: self.batch_arg,
            id_field: self.id_field,
            pattern,
        })
    }
}

fn pattern(region: &str, prefix: &str, positions: usize) -> String {
    format!("{region}:{prefix}{}", vec!["*"; positions].join("-"))
}

/// A call-site: its descriptor plus the shape it was observed to return.
///
/// Created once by whatever layer intercepts the call and shared by every
/// invocation. All batch invocations through the same `CallSite` share one
/// [`ShapeMemo`].
#[derive(Debug)]
pub struct CallSite {
    descriptor: CallDescriptor,
    memo: ShapeMemo,
}

impl CallSite {
    /// Creates a call-site with an empty shape memo.
    #[must_use]
    pub fn new(descriptor: CallDescriptor) -> Self {
        Self {
            descriptor,
            memo: ShapeMemo::new(),
        }
    }

    /// The call-site's descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &CallDescriptor {
        &self.descriptor
    }

    /// The call-site's learned result shape.
    #[must_use]
    pub fn memo(&self) -> &ShapeMemo {
        &self.memo
    }
}

impl From<CallDescriptor> for CallSite {
    fn from(descriptor: CallDescriptor) -> Self {
        Self::new(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let descriptor = CallDescriptor::builder("user").build().unwrap();
        assert_eq!(descriptor.id(), "user");
        assert_eq!(descriptor.prefix(), "");
        assert_eq!(descriptor.ttl(), Ttl::FOREVER);
        assert!(!descriptor.is_batch());
        assert_eq!(descriptor.key_args().count(), 0);
        assert_eq!(descriptor.pattern(), "user:");
    }

    #[test]
    fn batch_arg_is_a_key_arg() {
        let descriptor = CallDescriptor::builder("user").key_arg(0).batch_arg(1).build().unwrap();
        assert_eq!(descriptor.key_args().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(descriptor.batch_arg(), Some(1));
        assert_eq!(descriptor.pattern(), "user:*-*");
    }

    #[test]
    fn pattern_includes_prefix() {
        let descriptor = CallDescriptor::builder("order").prefix("o:").key_arg(2).build().unwrap();
        assert_eq!(descriptor.pattern(), "order:o:*");
    }

    #[test]
    fn id_field_requires_batch_arg() {
        let err = CallDescriptor::builder("user").id("UserDao::find").id_field("id").build().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("UserDao::find"), "{message}");
        assert!(message.contains("id field"), "{message}");
    }

    #[test]
    fn empty_region_is_rejected() {
        CallDescriptor::builder("").build().unwrap_err();
    }

    #[test]
    fn call_site_starts_with_unknown_shape() {
        let site = CallSite::from(CallDescriptor::builder("user").build().unwrap());
        assert!(!site.memo().is_known());
        assert_eq!(site.descriptor().region(), "user");
    }
}
