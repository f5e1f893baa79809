//! # Clocks
//!
//! The dispute protocol reads time only at call boundaries, through the
//! [`Clock`] trait. [`SystemClock`] reads wall-clock UTC; [`ManualClock`] is
//! a shared, explicitly advanced clock for tests and scenario replay.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::CoreError;
use crate::temporal::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall-clock UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A manually driven clock. Clones share the same instant.
///
/// Time never moves backwards: [`ManualClock::set`] rejects earlier instants.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_secs: Arc<AtomicI64>,
}

impl ManualClock {
    /// Start the clock at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            epoch_secs: Arc::new(AtomicI64::new(start.epoch_secs())),
        }
    }

    /// Start the clock at a Unix epoch second.
    pub fn at_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        Timestamp::from_epoch_secs(secs).map(Self::new)
    }

    /// Move the clock forward by `delta` (negative deltas are ignored).
    /// Saturates at the largest representable second.
    pub fn advance(&self, delta: Duration) {
        let secs = delta.num_seconds().max(0);
        let previous = self.epoch_secs.fetch_add(secs, Ordering::SeqCst);
        if previous.checked_add(secs).is_none() {
            self.epoch_secs.store(i64::MAX, Ordering::SeqCst);
        }
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX);
        self.advance(Duration::try_seconds(secs).unwrap_or(Duration::MAX));
    }

    /// Jump to `instant`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimestamp`] if `instant` is earlier than
    /// the current reading.
    pub fn set(&self, instant: Timestamp) -> Result<(), CoreError> {
        let target = instant.epoch_secs();
        let current = self.epoch_secs.load(Ordering::SeqCst);
        if target < current {
            return Err(CoreError::InvalidTimestamp(format!(
                "manual clock cannot move backwards from {current} to {target}"
            )));
        }
        self.epoch_secs.store(target, Ordering::SeqCst);
        Ok(())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let secs = self.epoch_secs.load(Ordering::SeqCst);
        // Clamp if advances pushed past chrono's range.
        Timestamp::from_epoch_secs(secs).unwrap_or_else(|_| Timestamp::from_utc(DateTime::<Utc>::MAX_UTC))
    }
}
