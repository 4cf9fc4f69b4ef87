//! # Temporal Types: UTC Timestamps and the Clock Oracle
//!
//! `Timestamp` is a UTC-only instant truncated to seconds. Credential
//! expiry is defined in whole seconds since the Unix epoch, so sub-second
//! components are discarded at construction rather than compared later.
//!
//! The registry consumes "current time" through the [`Clock`] trait. It
//! reads the clock once at the start of each operation and uses that one
//! instant for every derived value in the operation.
//!
//! ## Clocks
//!
//! - [`SystemClock`]: the wall clock.
//! - [`FixedClock`]: a constant instant, for point-in-time validation.
//! - [`ManualClock`]: a shared, settable clock for tests and simulations.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// Serializes as ISO8601 with a `Z` suffix, e.g. `2026-01-15T12:00:00Z`.
/// Deserialization goes through [`Timestamp::parse`], so stored values
/// obey the same `Z`-only, whole-second rules as constructed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 timestamp, accepting only the `Z` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the string is not RFC 3339 or
    /// carries an explicit offset (including `+00:00`).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::Validation(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        Self::parse_lenient(s)
    }

    /// Parse an RFC 3339 timestamp with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, CoreError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            CoreError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| CoreError::Validation(format!("invalid Unix timestamp: {secs}")))?;
        Ok(Self(dt))
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Add `secs` seconds, returning `None` if the result is out of range.
    pub fn checked_add_secs(&self, secs: i64) -> Option<Self> {
        let delta = TimeDelta::try_seconds(secs)?;
        self.0.checked_add_signed(delta).map(Self)
    }

    /// Render as ISO8601 with Z suffix.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl TryFrom<String> for Timestamp {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_iso8601()
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ─── Clock oracle ────────────────────────────────────────────────────

/// Source of "current time" for registry operations.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// A settable clock. Clones share the same underlying instant, so a test
/// can hand one clone to a registry and move time with the other.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Create a clock starting at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump to an arbitrary instant (backwards is allowed).
    pub fn set(&self, to: Timestamp) {
        *self.current.lock() = to;
    }

    /// Move the clock forward by `secs` seconds and return the new instant.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the result would leave the
    /// representable range; the clock is left unchanged.
    pub fn advance(&self, secs: i64) -> Result<Timestamp, CoreError> {
        let mut current = self.current.lock();
        let next = current.checked_add_secs(secs).ok_or_else(|| {
            CoreError::Validation(format!("advancing {} by {secs}s overflows", *current))
        })?;
        *current = next;
        Ok(next)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock()
    }
}
