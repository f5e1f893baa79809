//! # Final-Step Verification
//!
//! Once the disputed range is a single period, the turn-holder supplies a
//! [`FinalProof`] from which the operator's true amount owed for that period
//! is derived. Checks run in this order:
//!
//! 1. The attestation names the disputed period.
//! 2. The attestation reference equals the oracle's on-record digest.
//! 3. The supplied attestation record hashes to that reference.
//! 4. The stake snapshot at `stake_index` was in effect at the attested
//!    reference block.
//! 5. The non-signer witness holds against the sorted non-signer set.
//!
//! A non-signer is owed nothing. A signer is owed
//! `fee * weighted_stake / total_stake_signed`, rounded down.

use serde::{Deserialize, Serialize};

use eigenpay_core::{AccountId, Amount, ContentDigest, PeriodId};
use eigenpay_oracle::{PeriodAttestation, StakeAndSignatureOracle};

use crate::error::DisputeError;

/// Raw witness value meaning "the operator did not sign".
pub const NOT_SIGNED_SENTINEL: u32 = u32::MAX;

/// Claim about the operator's place in the non-signer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NonSignerWitness {
    /// The operator is listed as a non-signer.
    NotSigned,
    /// The operator signed: it is absent from the set and would be inserted
    /// at `insertion_index`.
    Signed {
        /// Position at which the operator would sort into the set.
        insertion_index: u32,
    },
}

impl NonSignerWitness {
    /// Decode the raw index-or-sentinel form.
    pub fn from_raw(raw: u32) -> Self {
        if raw == NOT_SIGNED_SENTINEL {
            Self::NotSigned
        } else {
            Self::Signed {
                insertion_index: raw,
            }
        }
    }

    /// Encode as the raw index-or-sentinel form.
    pub fn to_raw(&self) -> u32 {
        match self {
            Self::NotSigned => NOT_SIGNED_SENTINEL,
            Self::Signed { insertion_index } => *insertion_index,
        }
    }

    /// Witness for `operator` derived from a sorted non-signer set.
    pub fn for_operator(non_signers: &[AccountId], operator: &AccountId) -> Self {
        match non_signers.binary_search(operator) {
            Ok(_) => Self::NotSigned,
            Err(pos) => Self::Signed {
                insertion_index: u32::try_from(pos).unwrap_or(NOT_SIGNED_SENTINEL - 1),
            },
        }
    }
}

/// Evidence for the final step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalProof {
    /// Index of the operator's stake snapshot in its history.
    pub stake_index: u32,
    /// Non-signer witness.
    pub non_signer: NonSignerWitness,
    /// Attestation record: non-signer set, total signed stake and reference
    /// block.
    pub attestation: PeriodAttestation,
    /// Digest the record is claimed to have on record.
    pub attestation_ref: ContentDigest,
}

/// Verify `proof` for `operator` in `period` and return the true amount owed.
///
/// # Errors
///
/// Returns a consistency-class [`DisputeError`] for the first check that
/// fails, or [`DisputeError::Oracle`] if the oracle cannot answer.
pub fn verify_final_proof<O: StakeAndSignatureOracle + ?Sized>(
    oracle: &O,
    operator: &AccountId,
    period: PeriodId,
    proof: &FinalProof,
) -> Result<Amount, DisputeError> {
    let attestation = &proof.attestation;
    if attestation.period != period {
        return Err(DisputeError::AttestationPeriodMismatch {
            attested: attestation.period,
            disputed: period,
        });
    }

    let on_record = oracle.attestation_hash_for_period(period)?;
    if proof.attestation_ref != on_record {
        return Err(DisputeError::AttestationMismatch {
            period,
            provided: proof.attestation_ref,
            on_record,
        });
    }

    let computed = attestation
        .digest()
        .map_err(|e| DisputeError::Canonicalization(e.to_string()))?;
    if computed != proof.attestation_ref {
        return Err(DisputeError::AttestationRecordMismatch {
            reference: proof.attestation_ref,
            computed,
        });
    }
    if !attestation.is_sorted() {
        return Err(DisputeError::NonSignerWitness(
            "non-signer set is not strictly ascending".to_string(),
        ));
    }

    let snapshot = oracle.stake_snapshot_at(operator, proof.stake_index)?;
    if !snapshot.brackets(attestation.reference_block) {
        return Err(DisputeError::SnapshotNotInEffect {
            index: proof.stake_index,
            valid_from_block: snapshot.valid_from_block,
            valid_until_block: snapshot.valid_until_block,
            reference_block: attestation.reference_block,
        });
    }

    match proof.non_signer {
        NonSignerWitness::NotSigned => {
            if !attestation.lists_non_signer(operator) {
                return Err(DisputeError::NonSignerWitness(format!(
                    "operator {operator} is not in the non-signer set"
                )));
            }
            tracing::debug!(%operator, %period, "operator did not sign; owed nothing");
            Ok(0)
        }
        NonSignerWitness::Signed { insertion_index } => {
            check_absent_at(&attestation.non_signers, operator, insertion_index)?;
            let total = attestation.total_stake_signed;
            if total == 0 {
                return Err(DisputeError::NonSignerWitness(
                    "operator claims to have signed but total signed stake is zero".to_string(),
                ));
            }
            if snapshot.weighted_stake > total {
                return Err(DisputeError::StakeExceedsSigned {
                    weighted_stake: snapshot.weighted_stake,
                    total_stake_signed: total,
                });
            }
            let fee = oracle.fee_for_period(period)?;
            let owed = fee
                .checked_mul(snapshot.weighted_stake)
                .ok_or(DisputeError::Overflow("fee share"))?
                / total;
            tracing::debug!(%operator, %period, fee, weighted_stake = snapshot.weighted_stake, owed, "operator signed");
            Ok(owed)
        }
    }
}

fn check_absent_at(set: &[AccountId], operator: &AccountId, index: u32) -> Result<(), DisputeError> {
    let i = index as usize;
    if i > set.len() {
        return Err(DisputeError::NonSignerWitness(format!(
            "insertion index {index} is beyond a set of {} non-signers",
            set.len()
        )));
    }
    let after_prev = i == 0 || set[i - 1] < *operator;
    let before_next = i == set.len() || *operator < set[i];
    if after_prev && before_next {
        Ok(())
    } else {
        Err(DisputeError::NonSignerWitness(format!(
            "operator {operator} does not sort into position {index} of the non-signer set"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eigenpay_oracle::InMemoryOracle;

    fn acct(b: u8) -> AccountId {
        AccountId::from_bytes([b; 20])
    }

    const OP: u8 = 0x50;
    const PERIOD: PeriodId = PeriodId(5);

    /// Fee 1000 in period 5; operator stake 500 of 2000 signed at block 120.
    fn setup(non_signers: &[AccountId]) -> (InMemoryOracle, FinalProof) {
        let mut oracle = InMemoryOracle::new();
        oracle.record_fee(PERIOD, 1_000);
        oracle.record_stake(acct(OP), 10, 300).unwrap();
        oracle.record_stake(acct(OP), 100, 500).unwrap();
        let attestation = PeriodAttestation::new(PERIOD, 120, 2_000, non_signers.iter().copied());
        let attestation_ref = oracle.record_attestation(attestation.clone()).unwrap();
        let non_signer = NonSignerWitness::for_operator(&attestation.non_signers, &acct(OP));
        let proof = FinalProof {
            stake_index: 1,
            non_signer,
            attestation,
            attestation_ref,
        };
        (oracle, proof)
    }

    #[test]
    fn test_signer_owed_proportional_share() {
        let (oracle, proof) = setup(&[acct(0x10), acct(0x90)]);
        assert_eq!(proof.non_signer, NonSignerWitness::Signed { insertion_index: 1 });
        assert_eq!(verify_final_proof(&oracle, &acct(OP), PERIOD, &proof).unwrap(), 250);
    }

    #[test]
    fn test_share_rounds_down() {
        let mut oracle = InMemoryOracle::new();
        oracle.record_fee(PERIOD, 10);
        oracle.record_stake(acct(OP), 0, 1).unwrap();
        let attestation = PeriodAttestation::new(PERIOD, 5, 3, []);
        let attestation_ref = oracle.record_attestation(attestation.clone()).unwrap();
        let proof = FinalProof {
            stake_index: 0,
            non_signer: NonSignerWitness::Signed { insertion_index: 0 },
            attestation,
            attestation_ref,
        };
        assert_eq!(verify_final_proof(&oracle, &acct(OP), PERIOD, &proof).unwrap(), 3);
    }

    #[test]
    fn test_non_signer_owed_nothing() {
        let (oracle, proof) = setup(&[acct(0x10), acct(OP)]);
        assert_eq!(proof.non_signer, NonSignerWitness::NotSigned);
        assert_eq!(verify_final_proof(&oracle, &acct(OP), PERIOD, &proof).unwrap(), 0);
    }

    #[test]
    fn test_sentinel_for_absent_operator_rejected() {
        let (oracle, mut proof) = setup(&[acct(0x10)]);
        proof.non_signer = NonSignerWitness::NotSigned;
        assert!(matches!(
            verify_final_proof(&oracle, &acct(OP), PERIOD, &proof),
            Err(DisputeError::NonSignerWitness(_))
        ));
    }

    #[test]
    fn test_wrong_insertion_index_rejected() {
        let (oracle, mut proof) = setup(&[acct(0x10), acct(0x90)]);
        for bad in [0, 2, 3] {
            proof.non_signer = NonSignerWitness::Signed { insertion_index: bad };
            assert!(matches!(
                verify_final_proof(&oracle, &acct(OP), PERIOD, &proof),
                Err(DisputeError::NonSignerWitness(_))
            ));
        }
    }

    #[test]
    fn test_signed_witness_for_listed_operator_rejected() {
        let (oracle, mut proof) = setup(&[acct(OP)]);
        proof.non_signer = NonSignerWitness::Signed { insertion_index: 0 };
        assert!(verify_final_proof(&oracle, &acct(OP), PERIOD, &proof).is_err());
        proof.non_signer = NonSignerWitness::Signed { insertion_index: 1 };
        assert!(verify_final_proof(&oracle, &acct(OP), PERIOD, &proof).is_err());
    }

    #[test]
    fn test_stale_snapshot_rejected() {
        let (oracle, mut proof) = setup(&[]);
        proof.stake_index = 0;
        assert!(matches!(
            verify_final_proof(&oracle, &acct(OP), PERIOD, &proof),
            Err(DisputeError::SnapshotNotInEffect {
                valid_until_block: 100,
                reference_block: 120,
                ..
            })
        ));
    }

    #[test]
    fn test_fabricated_record_rejected() {
        let (oracle, mut proof) = setup(&[acct(0x10)]);
        proof.attestation.total_stake_signed = 1_000;
        assert!(matches!(
            verify_final_proof(&oracle, &acct(OP), PERIOD, &proof),
            Err(DisputeError::AttestationRecordMismatch { .. })
        ));
    }

    #[test]
    fn test_reference_must_match_on_record() {
        let (oracle, mut proof) = setup(&[]);
        let fabricated = PeriodAttestation::new(PERIOD, 120, 4_000, []);
        proof.attestation_ref = fabricated.digest().unwrap();
        proof.attestation = fabricated;
        assert!(matches!(
            verify_final_proof(&oracle, &acct(OP), PERIOD, &proof),
            Err(DisputeError::AttestationMismatch { .. })
        ));
    }

    #[test]
    fn test_period_must_match() {
        let (oracle, proof) = setup(&[]);
        assert!(matches!(
            verify_final_proof(&oracle, &acct(OP), PeriodId(6), &proof),
            Err(DisputeError::AttestationPeriodMismatch { .. })
        ));
    }

    #[test]
    fn test_stake_above_signed_total_rejected() {
        let mut oracle = InMemoryOracle::new();
        oracle.record_fee(PERIOD, 10);
        oracle.record_stake(acct(OP), 0, 50).unwrap();
        let attestation = PeriodAttestation::new(PERIOD, 5, 40, []);
        let attestation_ref = oracle.record_attestation(attestation.clone()).unwrap();
        let proof = FinalProof {
            stake_index: 0,
            non_signer: NonSignerWitness::Signed { insertion_index: 0 },
            attestation,
            attestation_ref,
        };
        assert!(matches!(
            verify_final_proof(&oracle, &acct(OP), PERIOD, &proof),
            Err(DisputeError::StakeExceedsSigned { .. })
        ));
    }

    #[test]
    fn test_raw_witness_roundtrip() {
        assert_eq!(NonSignerWitness::from_raw(NOT_SIGNED_SENTINEL), NonSignerWitness::NotSigned);
        assert_eq!(
            NonSignerWitness::from_raw(3),
            NonSignerWitness::Signed { insertion_index: 3 }
        );
        assert_eq!(NonSignerWitness::NotSigned.to_raw(), u32::MAX);
    }
}
