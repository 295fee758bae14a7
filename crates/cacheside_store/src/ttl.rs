// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{fmt, time::Duration};

/// Time-to-live for cached entries, in whole seconds.
///
/// Two values are special: [`Ttl::NO_CACHE`] (stores should not retain the entry) and
/// [`Ttl::FOREVER`] (no expiration). Everything else is a positive number of seconds.
/// Readers never interpret a TTL themselves; they pass the call-site's value through
/// to the store.
///
/// # Examples
///
/// ```
/// use cacheside_store::Ttl;
/// use std::time::Duration;
///
/// assert_eq!(Ttl::ONE_MINUTE.seconds(), 60);
/// assert_eq!(Ttl::ONE_MINUTE.as_duration(), Some(Duration::from_secs(60)));
/// assert_eq!(Ttl::FOREVER.as_duration(), None);
/// assert!(Ttl::NO_CACHE.is_no_cache());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ttl(i64);

impl Ttl {
    /// Do not cache.
    pub const NO_CACHE: Self = Self(-1);
    /// Never expire.
    pub const FOREVER: Self = Self(0);
    /// One second.
    pub const ONE_SECOND: Self = Self(1);
    /// Two seconds.
    pub const TWO_SECONDS: Self = Self(2);
    /// Five seconds.
    pub const FIVE_SECONDS: Self = Self(5);
    /// Ten seconds.
    pub const TEN_SECONDS: Self = Self(10);
    /// Half a minute.
    pub const HALF_MINUTE: Self = Self(30);
    /// One minute.
    pub const ONE_MINUTE: Self = Self(60);
    /// Two minutes.
    pub const TWO_MINUTES: Self = Self(2 * 60);
    /// Five minutes.
    pub const FIVE_MINUTES: Self = Self(5 * 60);
    /// Ten minutes.
    pub const TEN_MINUTES: Self = Self(10 * 60);
    /// Half an hour.
    pub const HALF_HOUR: Self = Self(30 * 60);
    /// One hour.
    pub const ONE_HOUR: Self = Self(60 * 60);
    /// Two hours.
    pub const TWO_HOURS: Self = Self(2 * 60 * 60);
    /// Six hours.
    pub const SIX_HOURS: Self = Self(6 * 60 * 60);
    /// Twelve hours.
    pub const TWELVE_HOURS: Self = Self(12 * 60 * 60);
    /// One day.
    pub const ONE_DAY: Self = Self(24 * 60 * 60);
    /// Two days.
    pub const TWO_DAYS: Self = Self(2 * 24 * 60 * 60);
    /// One week.
    pub const ONE_WEEK: Self = Self(7 * 24 * 60 * 60);

    /// Creates a TTL from a raw number of seconds.
    ///
    /// Any negative value means [`Ttl::NO_CACHE`], zero means [`Ttl::FOREVER`].
    #[must_use]
    pub const fn from_secs(seconds: i64) -> Self {
        if seconds < 0 { Self::NO_CACHE } else { Self(seconds) }
    }

    /// Returns the raw number of seconds (`-1` for no-cache, `0` for forever).
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Returns `true` if stores should not retain entries written with this TTL.
    #[must_use]
    pub const fn is_no_cache(self) -> bool {
        self.0 < 0
    }

    /// Returns `true` if entries written with this TTL never expire.
    #[must_use]
    pub const fn is_forever(self) -> bool {
        self.0 == 0
    }

    /// Returns the finite lifetime of an entry, or `None` for forever and no-cache.
    #[must_use]
    pub fn as_duration(self) -> Option<Duration> {
        u64::try_from(self.0).ok().filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self::FOREVER
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NO_CACHE => f.write_str("no-cache"),
            Self::FOREVER => f.write_str("forever"),
            Self(secs) => write!(f, "{secs}s"),
        }
    }
}
