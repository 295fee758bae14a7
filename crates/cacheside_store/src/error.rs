// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache operations.

use std::fmt::Display;

/// An error from a cache operation.
///
/// This is an opaque error type that can wrap any underlying error from a store
/// implementation, or describe a misconfigured call-site. Use
/// [`std::error::Error::source()`] to access the underlying cause if needed.
///
/// # Example
///
/// ```
/// use cacheside_store::Error;
///
/// let error = Error::from_message("connection reset");
/// ```
#[ohno::error]
pub struct Error {}

impl Error {
    /// Creates a new error from any type that can be converted to an error.
    ///
    /// This is the public API for store implementations to surface their failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use cacheside_store::Error;
    ///
    /// let error = Error::from_message("operation failed");
    /// ```
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(cause)
    }

    /// Creates an error describing a caller-configuration fault at a call-site.
    ///
    /// Misconfiguration is a programmer error: readers fail fast with it instead of
    /// degrading to some other behavior.
    ///
    /// # Examples
    ///
    /// ```
    /// use cacheside_store::Error;
    ///
    /// let error = Error::misconfigured("UserDao::find", "argument 3 is not a collection");
    /// assert!(error.to_string().contains("UserDao::find"));
    /// ```
    pub fn misconfigured(descriptor_id: &str, detail: impl Display) -> Self {
        Self::caused_by(format!("misconfigured cache call-site `{descriptor_id}`: {detail}"))
    }
}

/// A specialized [`Result`] type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_cause_message() {
        let error = Error::from_message("display test");
        let display_str = format!("{error}");
        assert!(
            display_str.contains("display test"),
            "display output should contain the cause message, got: {display_str}"
        );
    }

    #[test]
    fn misconfigured_names_call_site_and_detail() {
        let error = Error::misconfigured("orders.by_ids", "argument 0 is out of range");
        let display_str = format!("{error}");
        assert!(display_str.contains("orders.by_ids"), "got: {display_str}");
        assert!(display_str.contains("argument 0 is out of range"), "got: {display_str}");
    }

    #[test]
    fn result_type_alias_propagates_errors() {
        fn returns_err() -> Result<i32> {
            Err(Error::from_message("expected failure"))
        }

        let err = returns_err().expect_err("should return an error");
        assert!(format!("{err}").contains("expected failure"));
    }
}
