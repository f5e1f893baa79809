//! Coordinator errors.

use thiserror::Error;

use eigenpay_core::{AccountId, Amount, AmountSplit, Timestamp};
use eigenpay_dispute::{DisputeError, DisputeHandle, WindowPhase};

use crate::claims::ClaimStatus;
use crate::config::ConfigError;

/// Errors raised by the coordinator.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// No slot exists at the handle's index.
    #[error("unknown dispute handle {0}")]
    UnknownHandle(DisputeHandle),

    /// The slot has been recycled or released since the handle was issued.
    #[error("stale dispute handle {handle}: slot is at generation {current_generation}")]
    StaleHandle {
        handle: DisputeHandle,
        current_generation: u32,
    },

    /// The dispute is resolved and only its outcome remains.
    #[error("dispute {0} is already resolved")]
    AlreadyResolved(DisputeHandle),

    /// The dispute is still active.
    #[error("dispute {0} is not resolved yet")]
    NotResolved(DisputeHandle),

    /// Reaping requires an expired dispute.
    #[error("dispute {handle} is not expired ({phase})")]
    NotExpired {
        handle: DisputeHandle,
        phase: WindowPhase,
    },

    /// The operator already has an active dispute.
    #[error("operator {operator} already has active dispute {handle}")]
    ActiveDisputeExists {
        operator: AccountId,
        handle: DisputeHandle,
    },

    /// No claim is recorded for the operator.
    #[error("no payment claim recorded for operator {0}")]
    NoClaim(AccountId),

    /// The operator has a claim that is not yet settled.
    #[error("operator {operator} has an outstanding claim ({status})")]
    ClaimOutstanding {
        operator: AccountId,
        status: ClaimStatus,
    },

    /// The claim is in the wrong status for the operation.
    #[error("cannot {operation} claim of {operator} in status {status}")]
    ClaimStatus {
        operator: AccountId,
        operation: &'static str,
        status: ClaimStatus,
    },

    /// The claim's challenge window has closed.
    #[error("challenge window for {operator}'s claim closed at {deadline}")]
    ChallengeWindowClosed {
        operator: AccountId,
        deadline: Timestamp,
    },

    /// The claim's challenge window is still open.
    #[error("claim of {operator} cannot be redeemed before {deadline}")]
    ChallengeWindowOpen {
        operator: AccountId,
        deadline: Timestamp,
    },

    /// The challenger's split does not add up to the claimed amount.
    #[error("split {split} does not total the claimed amount {claimed}")]
    SplitTotalMismatch { claimed: Amount, split: AmountSplit },

    /// Every slot index is in use or retired.
    #[error("dispute arena is full")]
    ArenaFull,

    /// A deadline fell outside the representable time range.
    #[error("deadline overflow computing {0}")]
    Overflow(&'static str),

    /// A dispute transition was rejected.
    #[error(transparent)]
    Dispute(#[from] DisputeError),

    /// Parameters were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
