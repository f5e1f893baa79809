//! # Oracle Trait
//!
//! The only view of stake and signature data the dispute protocol has.
//! Implementations must be pure reads: the same query against the same
//! backend state returns the same answer.

use thiserror::Error;

use eigenpay_core::{AccountId, Amount, ContentDigest, PeriodId};

use crate::stake::StakeSnapshot;

/// Errors reported by an oracle backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// No attestation has been recorded for the period.
    #[error("no attestation recorded for {0}")]
    UnknownPeriod(PeriodId),

    /// No fee has been recorded for the period.
    #[error("no fee recorded for {0}")]
    UnknownFee(PeriodId),

    /// The operator has no snapshot at the requested index.
    #[error("operator {operator} has no stake snapshot at index {index}")]
    UnknownSnapshot {
        /// Operator queried.
        operator: AccountId,
        /// Snapshot index queried.
        index: u32,
    },

    /// A registry update was rejected.
    #[error("invalid registry record: {0}")]
    InvalidRecord(String),
}

/// Read contract for historical stake and per-period signature data.
pub trait StakeAndSignatureOracle: Send + Sync {
    /// The on-record attestation digest for `period`.
    fn attestation_hash_for_period(&self, period: PeriodId) -> Result<ContentDigest, OracleError>;

    /// The operator's stake snapshot at `index` in its history.
    fn stake_snapshot_at(&self, operator: &AccountId, index: u32) -> Result<StakeSnapshot, OracleError>;

    /// The total fee accrued in `period`.
    fn fee_for_period(&self, period: PeriodId) -> Result<Amount, OracleError>;
}

impl<T: StakeAndSignatureOracle + ?Sized> StakeAndSignatureOracle for &T {
    fn attestation_hash_for_period(&self, period: PeriodId) -> Result<ContentDigest, OracleError> {
        (**self).attestation_hash_for_period(period)
    }

    fn stake_snapshot_at(&self, operator: &AccountId, index: u32) -> Result<StakeSnapshot, OracleError> {
        (**self).stake_snapshot_at(operator, index)
    }

    fn fee_for_period(&self, period: PeriodId) -> Result<Amount, OracleError> {
        (**self).fee_for_period(period)
    }
}
