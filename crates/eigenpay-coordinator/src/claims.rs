//! # Payment Claims
//!
//! An operator commits a claim to be paid `amount` for a range of periods.
//! During the challenge window anyone may challenge it, which opens a
//! dispute. The dispute's outcome decides whether the claim can be
//! redeemed:
//!
//! ```text
//! Committed ──challenge──► Challenged ──outcome──► Vindicated ──redeem──► Redeemed
//!     │                        │
//!     │                        ├──outcome──► Rejected
//!     │                        └──reap────► Committed
//!     └──window closes, redeem──────────────────────────────────────────► Redeemed
//! ```
//!
//! At most one unsettled claim exists per operator. `Rejected` and
//! `Redeemed` claims may be replaced by a new commitment.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use eigenpay_core::{AccountId, Amount, AmountSplit, PeriodRange, Timestamp};
use eigenpay_dispute::DisputeHandle;

use crate::error::CoordinatorError;

/// Claim status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Committed and not yet challenged.
    Committed,
    /// Under dispute.
    Challenged,
    /// The dispute upheld the claim.
    Vindicated,
    /// The dispute rejected the claim. Terminal.
    Rejected,
    /// Paid out. Terminal.
    Redeemed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "COMMITTED",
            Self::Challenged => "CHALLENGED",
            Self::Vindicated => "VINDICATED",
            Self::Rejected => "REJECTED",
            Self::Redeemed => "REDEEMED",
        }
    }

    /// Whether this claim is settled and may be replaced.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Rejected | Self::Redeemed)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator's claim to payment for a range of periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentClaim {
    pub operator: AccountId,
    pub range: PeriodRange,
    pub amount: Amount,
    pub committed_at: Timestamp,
    pub status: ClaimStatus,
    /// Dispute opened against this claim, if any.
    pub dispute: Option<DisputeHandle>,
}

impl PaymentClaim {
    /// Last instant at which the claim may be challenged.
    pub fn challenge_deadline(&self, window: Duration) -> Result<Timestamp, CoordinatorError> {
        self.committed_at
            .checked_add(window)
            .ok_or(CoordinatorError::Overflow("claim challenge deadline"))
    }
}

/// Claims keyed by operator.
#[derive(Debug, Default)]
pub struct ClaimLedger {
    claims: BTreeMap<AccountId, PaymentClaim>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, operator: &AccountId) -> Option<&PaymentClaim> {
        self.claims.get(operator)
    }

    /// Record a new claim in `Committed`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::ClaimOutstanding`] if the operator's
    /// previous claim is not settled.
    pub fn commit(
        &mut self,
        operator: AccountId,
        range: PeriodRange,
        amount: Amount,
        now: Timestamp,
    ) -> Result<&PaymentClaim, CoordinatorError> {
        if let Some(existing) = self.claims.get(&operator) {
            if !existing.status.is_settled() {
                return Err(CoordinatorError::ClaimOutstanding {
                    operator,
                    status: existing.status,
                });
            }
        }
        let claim = PaymentClaim {
            operator,
            range,
            amount,
            committed_at: now,
            status: ClaimStatus::Committed,
            dispute: None,
        };
        self.claims.insert(operator, claim);
        self.claims
            .get(&operator)
            .ok_or(CoordinatorError::NoClaim(operator))
    }

    /// Check that the operator's claim can be challenged with `split` now.
    pub fn check_challenge(
        &self,
        operator: &AccountId,
        split: AmountSplit,
        now: Timestamp,
        window: Duration,
    ) -> Result<&PaymentClaim, CoordinatorError> {
        let claim = self.require(operator, "challenge", ClaimStatus::Committed)?;
        let deadline = claim.challenge_deadline(window)?;
        if now > deadline {
            return Err(CoordinatorError::ChallengeWindowClosed {
                operator: *operator,
                deadline,
            });
        }
        if split.total() != Some(claim.amount) {
            return Err(CoordinatorError::SplitTotalMismatch {
                claimed: claim.amount,
                split,
            });
        }
        Ok(claim)
    }

    /// Mark the claim as under dispute.
    pub fn mark_challenged(&mut self, operator: &AccountId, handle: DisputeHandle) -> Result<(), CoordinatorError> {
        let claim = self.require_mut(operator, "challenge", ClaimStatus::Committed)?;
        claim.status = ClaimStatus::Challenged;
        claim.dispute = Some(handle);
        Ok(())
    }

    /// Apply a dispute outcome to the claim it was opened against. Returns
    /// the new status, or `None` if no claim references `handle`.
    pub fn apply_outcome(
        &mut self,
        operator: &AccountId,
        handle: DisputeHandle,
        challenge_successful: bool,
    ) -> Option<ClaimStatus> {
        let claim = self.disputed_by_mut(operator, handle)?;
        claim.status = if challenge_successful {
            ClaimStatus::Rejected
        } else {
            ClaimStatus::Vindicated
        };
        Some(claim.status)
    }

    /// Return a claim whose dispute was abandoned to `Committed`.
    pub fn reopen(&mut self, operator: &AccountId, handle: DisputeHandle) -> Option<ClaimStatus> {
        let claim = self.disputed_by_mut(operator, handle)?;
        claim.status = ClaimStatus::Committed;
        claim.dispute = None;
        Some(claim.status)
    }

    /// Redeem the claim, returning the amount paid.
    ///
    /// # Errors
    ///
    /// `Committed` claims redeem only after the challenge window;
    /// `Vindicated` claims redeem at once; other statuses are rejected.
    pub fn redeem(&mut self, operator: &AccountId, now: Timestamp, window: Duration) -> Result<Amount, CoordinatorError> {
        let claim = self
            .claims
            .get_mut(operator)
            .ok_or(CoordinatorError::NoClaim(*operator))?;
        match claim.status {
            ClaimStatus::Vindicated => {}
            ClaimStatus::Committed => {
                let deadline = claim.challenge_deadline(window)?;
                if now <= deadline {
                    return Err(CoordinatorError::ChallengeWindowOpen {
                        operator: *operator,
                        deadline,
                    });
                }
            }
            status => {
                return Err(CoordinatorError::ClaimStatus {
                    operator: *operator,
                    operation: "redeem",
                    status,
                })
            }
        }
        claim.status = ClaimStatus::Redeemed;
        Ok(claim.amount)
    }

    fn require(
        &self,
        operator: &AccountId,
        operation: &'static str,
        expected: ClaimStatus,
    ) -> Result<&PaymentClaim, CoordinatorError> {
        let claim = self
            .claims
            .get(operator)
            .ok_or(CoordinatorError::NoClaim(*operator))?;
        if claim.status != expected {
            return Err(CoordinatorError::ClaimStatus {
                operator: *operator,
                operation,
                status: claim.status,
            });
        }
        Ok(claim)
    }

    fn require_mut(
        &mut self,
        operator: &AccountId,
        operation: &'static str,
        expected: ClaimStatus,
    ) -> Result<&mut PaymentClaim, CoordinatorError> {
        self.require(operator, operation, expected)?;
        self.claims
            .get_mut(operator)
            .ok_or(CoordinatorError::NoClaim(*operator))
    }

    fn disputed_by_mut(&mut self, operator: &AccountId, handle: DisputeHandle) -> Option<&mut PaymentClaim> {
        self.claims
            .get_mut(operator)
            .filter(|c| c.status == ClaimStatus::Challenged && c.dispute == Some(handle))
    }
}
