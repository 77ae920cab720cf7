//! # Temporal Types: Millisecond UTC Timestamps
//!
//! Defines `Timestamp`, the instant type used for the report and
//! identification times of an identification report.
//!
//! ## Invariant
//!
//! Every `Timestamp` is UTC and truncated to millisecond precision. The
//! truncation happens at construction, so two timestamps that render the
//! same on the wire always compare equal, and parse -> serialize -> parse
//! is lossless.
//!
//! ## Wire Format
//!
//! Serialized as RFC 3339 with a `Z` suffix. Sub-second digits are emitted
//! only when the millisecond part is non-zero:
//!
//! - `2020-06-25T10:20:39Z`
//! - `2020-06-25T10:20:39.120Z`
//!
//! Parsing accepts any RFC 3339 offset and converts to UTC.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// A UTC timestamp truncated to millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-millisecond digits.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3))
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidTimestamp`] if the string is not valid
    /// RFC 3339.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| ParseError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Create a timestamp from milliseconds since the Unix epoch.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, ParseError> {
        let dt = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            ParseError::InvalidTimestamp {
                value: millis.to_string(),
                reason: "out of range".to_string(),
            }
        })?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Render as RFC 3339 with `Z` suffix.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
