//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` is a UTC instant truncated to seconds precision. Fraud-proof
//! windows are compared in whole seconds, so sub-second components would
//! only introduce ambiguity at window boundaries.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// From a Unix epoch timestamp in seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("unix timestamp {secs} out of range")))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// `self + delta`, or `None` if the result is out of range.
    pub fn checked_add(&self, delta: Duration) -> Option<Self> {
        self.0.checked_add_signed(delta).map(Self::from_utc)
    }

    /// Time elapsed from `earlier` to `self`. Negative if `earlier` is later.
    pub fn since(&self, earlier: Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
