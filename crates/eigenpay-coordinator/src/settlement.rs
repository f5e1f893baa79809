//! Settlement records: the coordinator's audit trail of how each dispute
//! ended and what happened to the claim it was opened against.

use serde::{Deserialize, Serialize};

use eigenpay_core::{AccountId, Timestamp};
use eigenpay_dispute::{DisputeHandle, DisputeOutcome, ResolutionReason};

use crate::claims::ClaimStatus;

/// How a dispute ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settlement {
    /// The operator's claim was shown to be wrong.
    ChallengeSucceeded { reason: ResolutionReason },
    /// The operator's claim stood.
    ChallengeFailed { reason: ResolutionReason },
    /// Neither party acted within two windows; the dispute was reaped.
    Abandoned,
}

impl Settlement {
    pub fn from_outcome(outcome: &DisputeOutcome) -> Self {
        if outcome.challenge_successful {
            Self::ChallengeSucceeded { reason: outcome.reason }
        } else {
            Self::ChallengeFailed { reason: outcome.reason }
        }
    }
}

/// One entry in the settlement log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub handle: DisputeHandle,
    pub operator: AccountId,
    pub challenger: AccountId,
    pub settlement: Settlement,
    /// Claim status after the settlement, if the dispute was opened against
    /// a claim.
    pub claim_status: Option<ClaimStatus>,
    pub recorded_at: Timestamp,
}
