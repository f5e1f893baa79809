//! # Fraud-Proof Windows
//!
//! Every state-changing call measures `elapsed = now - last_action_time`
//! against the configured window `w`:
//!
//! | Phase         | Elapsed            | Allowed                         |
//! |---------------|--------------------|---------------------------------|
//! | `InWindow`    | `elapsed <= w`     | `bisect`, `resolve_final`       |
//! | `TimeoutOpen` | `w < elapsed <= 2w`| `resolve_on_timeout`            |
//! | `Expired`     | `elapsed > 2w`     | coordinator reaping only        |
//!
//! A clock reading earlier than the last action counts as in-window.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use eigenpay_core::{Clock, Timestamp};

/// Time source and response window consulted by a dispute.
pub trait DisputeTimer {
    /// Current time.
    fn now(&self) -> Timestamp;

    /// How long the turn-holder has to respond.
    fn fraud_proof_window(&self) -> Duration;
}

impl<T: DisputeTimer + ?Sized> DisputeTimer for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn fraud_proof_window(&self) -> Duration {
        (**self).fraud_proof_window()
    }
}

/// A [`Clock`] paired with a fixed window.
#[derive(Debug, Clone)]
pub struct FixedWindowTimer<C> {
    clock: C,
    window: Duration,
}

impl<C: Clock> FixedWindowTimer<C> {
    pub fn new(clock: C, window: Duration) -> Self {
        Self { clock, window }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> DisputeTimer for FixedWindowTimer<C> {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn fraud_proof_window(&self) -> Duration {
        self.window
    }
}

/// Where a call falls relative to the last action's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPhase {
    /// The turn-holder may still act.
    InWindow,
    /// The turn-holder's time has lapsed; anyone may resolve by timeout.
    TimeoutOpen,
    /// Both windows have passed without resolution.
    Expired,
}

impl WindowPhase {
    /// Classify `now` against a window opened at `last_action`.
    pub fn classify(last_action: Timestamp, now: Timestamp, window: Duration) -> Self {
        let elapsed = now.since(last_action);
        if elapsed <= window {
            return Self::InWindow;
        }
        match window.checked_add(&window) {
            Some(double) if elapsed > double => Self::Expired,
            _ => Self::TimeoutOpen,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InWindow => "IN_WINDOW",
            Self::TimeoutOpen => "TIMEOUT_OPEN",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for WindowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
