//! # Dispute Errors
//!
//! Every failure is a synchronous rejection that leaves the dispute exactly
//! as it was. [`DisputeError::kind`] maps each variant onto the protocol's
//! failure taxonomy.

use thiserror::Error;

use eigenpay_core::{AccountId, Amount, AmountSplit, ContentDigest, PeriodId, PeriodRange};
use eigenpay_oracle::OracleError;

use crate::state::{DisputeStatus, Party};
use crate::timer::WindowPhase;

/// Failure class of a rejected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The dispute is already resolved.
    Terminal,
    /// The caller does not hold the turn.
    Authorization,
    /// The operation does not apply to the current status.
    Phase,
    /// The call falls outside the window phase it requires.
    Timing,
    /// The supplied data does not reconcile with recorded or attested data.
    Consistency,
}

/// Errors raised by dispute transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisputeError {
    /// Attempted a transition on a resolved dispute.
    #[error("dispute is resolved; no further transitions are allowed")]
    AlreadyResolved,

    /// The operation is not available in the current status.
    #[error("{operation} is not available in status {status}")]
    WrongPhase {
        /// Operation attempted.
        operation: &'static str,
        /// Status at the time of the call.
        status: DisputeStatus,
    },

    /// The caller is not the turn-holder.
    #[error("caller {caller} is not the {expected} and does not hold the turn")]
    NotTurnHolder {
        /// Account that made the call.
        caller: AccountId,
        /// Party that holds the turn.
        expected: Party,
    },

    /// The call requires a different window phase.
    #[error("{operation} requires {required}, but {elapsed_secs}s have elapsed against a {window_secs}s window ({actual})")]
    OutsideWindow {
        /// Operation attempted.
        operation: &'static str,
        /// Phase the operation requires.
        required: WindowPhase,
        /// Phase at the time of the call.
        actual: WindowPhase,
        /// Seconds since the last action.
        elapsed_secs: i64,
        /// Configured window in seconds.
        window_secs: i64,
    },

    /// A new split does not reconcile with the contested amount.
    #[error("split {provided} does not reconcile with contested amount {expected} for {range}")]
    SplitMismatch {
        /// Recorded amount of the contested half.
        expected: Amount,
        /// Split supplied by the caller.
        provided: AmountSplit,
        /// The contested half.
        range: PeriodRange,
    },

    /// The dispute could not be set up.
    #[error("invalid dispute setup: {0}")]
    InvalidSetup(String),

    /// The attestation reference is not the on-record digest.
    #[error("attestation reference {provided} does not match on-record digest {on_record} for {period}")]
    AttestationMismatch {
        /// Disputed period.
        period: PeriodId,
        /// Reference supplied by the caller.
        provided: ContentDigest,
        /// Digest the oracle holds.
        on_record: ContentDigest,
    },

    /// The supplied attestation record does not hash to its reference.
    #[error("attestation record hashes to {computed}, not reference {reference}")]
    AttestationRecordMismatch {
        /// Reference supplied by the caller.
        reference: ContentDigest,
        /// Digest of the supplied record.
        computed: ContentDigest,
    },

    /// The attestation covers a different period.
    #[error("attestation is for {attested}, but the disputed period is {disputed}")]
    AttestationPeriodMismatch {
        /// Period named in the attestation.
        attested: PeriodId,
        /// Period under dispute.
        disputed: PeriodId,
    },

    /// The stake snapshot was not in effect at the reference block.
    #[error("stake snapshot {index} [{valid_from_block}, {valid_until_block}) does not bracket reference block {reference_block}")]
    SnapshotNotInEffect {
        /// Snapshot index supplied.
        index: u32,
        /// Snapshot start block.
        valid_from_block: u64,
        /// Snapshot end block, zero if current.
        valid_until_block: u64,
        /// Attested reference block.
        reference_block: u64,
    },

    /// The non-signer witness does not hold against the attested set.
    #[error("non-signer witness rejected: {0}")]
    NonSignerWitness(String),

    /// The attested signed stake cannot support the operator's share.
    #[error("operator stake {weighted_stake} exceeds total signed stake {total_stake_signed}")]
    StakeExceedsSigned {
        /// Operator's weighted stake.
        weighted_stake: Amount,
        /// Attested total signed stake.
        total_stake_signed: Amount,
    },

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),

    /// The attestation record could not be canonicalized.
    #[error("attestation canonicalization failed: {0}")]
    Canonicalization(String),

    /// The oracle could not answer.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
}

impl DisputeError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyResolved => ErrorKind::Terminal,
            Self::NotTurnHolder { .. } => ErrorKind::Authorization,
            Self::WrongPhase { .. } => ErrorKind::Phase,
            Self::OutsideWindow { .. } => ErrorKind::Timing,
            Self::SplitMismatch { .. }
            | Self::InvalidSetup(_)
            | Self::AttestationMismatch { .. }
            | Self::AttestationRecordMismatch { .. }
            | Self::AttestationPeriodMismatch { .. }
            | Self::SnapshotNotInEffect { .. }
            | Self::NonSignerWitness(_)
            | Self::StakeExceedsSigned { .. }
            | Self::Overflow(_)
            | Self::Canonicalization(_)
            | Self::Oracle(_) => ErrorKind::Consistency,
        }
    }
}
