//! # In-Memory Oracle
//!
//! Registry-backed [`StakeAndSignatureOracle`] for simulation and tests.
//! State is written only through the `record_*` methods, which enforce the
//! same invariants a chain-backed registry would: stake histories are
//! append-only, attestation non-signer sets are sorted, and each period is
//! attested at most once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use eigenpay_core::{AccountId, Amount, ContentDigest, PeriodId};

use crate::attestation::PeriodAttestation;
use crate::stake::{StakeHistory, StakeSnapshot};
use crate::traits::{OracleError, StakeAndSignatureOracle};

/// Serializable description of oracle state.
///
/// ```yaml
/// fees:
///   - { period: 5, amount: 1000 }
/// stakes:
///   - operator: "0x1111111111111111111111111111111111111111"
///     updates:
///       - { block: 10, stake: 500 }
/// attestations:
///   - { period: 5, reference_block: 120, total_stake_signed: 2000, non_signers: [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleFixture {
    /// Fee accrued per period.
    pub fees: Vec<FeeEntry>,
    /// Stake updates per operator, in block order.
    pub stakes: Vec<StakeEntry>,
    /// Period attestations.
    pub attestations: Vec<AttestationEntry>,
}

/// Fee accrued in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEntry {
    pub period: u32,
    pub amount: u64,
}

/// Stake updates for one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEntry {
    pub operator: AccountId,
    pub updates: Vec<StakeUpdate>,
}

/// A stake change effective at `block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeUpdate {
    pub block: u64,
    pub stake: u64,
}

/// One period's attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationEntry {
    pub period: u32,
    pub reference_block: u64,
    pub total_stake_signed: u64,
    #[serde(default)]
    pub non_signers: Vec<AccountId>,
}

#[derive(Debug, Clone)]
struct RecordedAttestation {
    record: PeriodAttestation,
    digest: ContentDigest,
}

/// Registry-backed oracle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOracle {
    stakes: BTreeMap<AccountId, StakeHistory>,
    attestations: BTreeMap<PeriodId, RecordedAttestation>,
    fees: BTreeMap<PeriodId, Amount>,
}

impl InMemoryOracle {
    /// An empty oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an oracle from a fixture.
    ///
    /// # Errors
    ///
    /// Returns the first registry error raised while replaying the fixture.
    pub fn from_fixture(fixture: &OracleFixture) -> Result<Self, OracleError> {
        let mut oracle = Self::new();
        for fee in &fixture.fees {
            oracle.record_fee(PeriodId(fee.period), Amount::from(fee.amount));
        }
        for entry in &fixture.stakes {
            for update in &entry.updates {
                oracle.record_stake(entry.operator, update.block, Amount::from(update.stake))?;
            }
        }
        for att in &fixture.attestations {
            oracle.record_attestation(PeriodAttestation::new(
                PeriodId(att.period),
                att.reference_block,
                Amount::from(att.total_stake_signed),
                att.non_signers.iter().copied(),
            ))?;
        }
        Ok(oracle)
    }

    /// Set the fee accrued in `period`, replacing any previous value.
    pub fn record_fee(&mut self, period: PeriodId, amount: Amount) {
        self.fees.insert(period, amount);
    }

    /// Append a stake change for `operator`, returning the snapshot index.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::InvalidRecord`] if `block` does not follow the
    /// operator's current snapshot.
    pub fn record_stake(&mut self, operator: AccountId, block: u64, weighted_stake: Amount) -> Result<u32, OracleError> {
        let index = self.stakes.entry(operator).or_default().record(block, weighted_stake)?;
        tracing::debug!(%operator, block, index, "stake snapshot recorded");
        Ok(index)
    }

    /// Record the attestation for its period, returning its digest.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::InvalidRecord`] if the period is already
    /// attested, the non-signer set is not strictly ascending, or the record
    /// cannot be digested.
    pub fn record_attestation(&mut self, record: PeriodAttestation) -> Result<ContentDigest, OracleError> {
        if self.attestations.contains_key(&record.period) {
            return Err(OracleError::InvalidRecord(format!("{} is already attested", record.period)));
        }
        if !record.is_sorted() {
            return Err(OracleError::InvalidRecord(format!(
                "non-signer set for {} is not strictly ascending",
                record.period
            )));
        }
        let digest = record
            .digest()
            .map_err(|e| OracleError::InvalidRecord(e.to_string()))?;
        tracing::debug!(period = %record.period, %digest, non_signers = record.non_signers.len(), "attestation recorded");
        self.attestations
            .insert(record.period, RecordedAttestation { record, digest });
        Ok(digest)
    }

    /// The recorded attestation for `period`.
    pub fn attestation(&self, period: PeriodId) -> Option<&PeriodAttestation> {
        self.attestations.get(&period).map(|a| &a.record)
    }

    /// The operator's stake history.
    pub fn stake_history(&self, operator: &AccountId) -> Option<&StakeHistory> {
        self.stakes.get(operator)
    }

    /// Index of the operator's snapshot in effect at `block`.
    pub fn stake_index_at(&self, operator: &AccountId, block: u64) -> Option<u32> {
        self.stakes.get(operator).and_then(|h| h.index_at(block))
    }
}

impl StakeAndSignatureOracle for InMemoryOracle {
    fn attestation_hash_for_period(&self, period: PeriodId) -> Result<ContentDigest, OracleError> {
        self.attestations
            .get(&period)
            .map(|a| a.digest)
            .ok_or(OracleError::UnknownPeriod(period))
    }

    fn stake_snapshot_at(&self, operator: &AccountId, index: u32) -> Result<StakeSnapshot, OracleError> {
        self.stakes
            .get(operator)
            .and_then(|h| h.get(index))
            .copied()
            .ok_or(OracleError::UnknownSnapshot {
                operator: *operator,
                index,
            })
    }

    fn fee_for_period(&self, period: PeriodId) -> Result<Amount, OracleError> {
        self.fees
            .get(&period)
            .copied()
            .ok_or(OracleError::UnknownFee(period))
    }
}
