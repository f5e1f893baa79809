//! # Period Attestations
//!
//! A [`PeriodAttestation`] records, for one period, the block the quorum
//! signed against, the total stake that signed, and the sorted set of
//! operators that did not sign. Its digest is the reference a final-step
//! proof must reproduce.
//!
//! ## Canonical Form
//!
//! The digest preimage is the JCS encoding of:
//!
//! ```json
//! {
//!   "domain": "eigenpay.period-attestation.v1",
//!   "non_signers": ["0x…", "0x…"],
//!   "period": 7,
//!   "reference_block": 120,
//!   "total_stake_signed": "2000"
//! }
//! ```
//!
//! Stake totals are rendered as decimal strings so the full `u128` range is
//! representable.

use serde::{Deserialize, Serialize};

use eigenpay_core::{sha256_digest, AccountId, Amount, CanonicalBytes, ContentDigest, CoreError, PeriodId};

const ATTESTATION_DOMAIN: &str = "eigenpay.period-attestation.v1";

/// Signature record for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodAttestation {
    /// Period attested.
    pub period: PeriodId,
    /// Block the signatures were checked against.
    pub reference_block: u64,
    /// Total stake of the operators that signed.
    pub total_stake_signed: Amount,
    /// Operators that did not sign, strictly ascending.
    pub non_signers: Vec<AccountId>,
}

#[derive(Serialize)]
struct AttestationPreimage<'a> {
    domain: &'static str,
    period: u32,
    reference_block: u64,
    total_stake_signed: String,
    non_signers: &'a [AccountId],
}

impl PeriodAttestation {
    /// Build an attestation, sorting and de-duplicating the non-signer set.
    pub fn new(
        period: PeriodId,
        reference_block: u64,
        total_stake_signed: Amount,
        non_signers: impl IntoIterator<Item = AccountId>,
    ) -> Self {
        let mut non_signers: Vec<AccountId> = non_signers.into_iter().collect();
        non_signers.sort_unstable();
        non_signers.dedup();
        Self {
            period,
            reference_block,
            total_stake_signed,
            non_signers,
        }
    }

    /// Whether the non-signer set is strictly ascending.
    pub fn is_sorted(&self) -> bool {
        self.non_signers.windows(2).all(|w| w[0] < w[1])
    }

    /// Whether `operator` is listed as a non-signer.
    ///
    /// Assumes a sorted set.
    pub fn lists_non_signer(&self, operator: &AccountId) -> bool {
        self.non_signers.binary_search(operator).is_ok()
    }

    /// Canonical digest of this record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Canonicalization`] if the preimage cannot be
    /// canonicalized.
    pub fn digest(&self) -> Result<ContentDigest, CoreError> {
        let preimage = AttestationPreimage {
            domain: ATTESTATION_DOMAIN,
            period: self.period.get(),
            reference_block: self.reference_block,
            total_stake_signed: self.total_stake_signed.to_string(),
            non_signers: &self.non_signers,
        };
        let bytes = CanonicalBytes::new(&preimage)?;
        Ok(sha256_digest(&bytes))
    }
}
