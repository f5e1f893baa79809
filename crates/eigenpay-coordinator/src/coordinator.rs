//! # Dispute Coordinator
//!
//! Owns every dispute and the claims they are opened against. The
//! coordinator is the only caller of [`Dispute`] transitions: it supplies
//! the clock and the fraud-proof window, enforces one active dispute per
//! operator, and applies each outcome to the claim ledger.
//!
//! ## Flow
//!
//! 1. `commit_claim` records an operator's claim.
//! 2. `challenge_claim` opens a dispute over it with the operator to move first.
//! 3. The parties call `bisect` until one period remains, then the
//!    turn-holder calls `resolve_final`; anyone may `resolve_on_timeout` once
//!    a turn lapses.
//! 4. The outcome marks the claim `Vindicated` or `Rejected` and frees the
//!    dispute's slot. A dispute left past both windows is `reap_expired`.

use std::collections::HashMap;

use chrono::Duration;

use eigenpay_core::{AccountId, Amount, AmountSplit, Clock, PeriodRange, Timestamp};
use eigenpay_dispute::{
    Dispute, DisputeError, DisputeHandle, DisputeOutcome, DisputeSetup, DisputeStatus, DisputeTimer, FinalProof,
    FixedWindowTimer, Party, WindowPhase,
};
use eigenpay_oracle::StakeAndSignatureOracle;

use crate::arena::DisputeArena;
use crate::claims::{ClaimLedger, PaymentClaim};
use crate::config::DisputeParams;
use crate::error::CoordinatorError;
use crate::settlement::{Settlement, SettlementRecord};

/// Coordinates claims and their disputes.
#[derive(Debug)]
pub struct DisputeCoordinator<O, C> {
    params: DisputeParams,
    fraud_proof_window: Duration,
    claim_challenge_window: Duration,
    oracle: O,
    clock: C,
    arena: DisputeArena,
    active: HashMap<AccountId, DisputeHandle>,
    claims: ClaimLedger,
    settlements: Vec<SettlementRecord>,
}

impl<O: StakeAndSignatureOracle, C: Clock> DisputeCoordinator<O, C> {
    /// Build a coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::Config`] if `params` fail validation.
    pub fn new(params: DisputeParams, oracle: O, clock: C) -> Result<Self, CoordinatorError> {
        let fraud_proof_window = params.fraud_proof_window()?;
        let claim_challenge_window = params.claim_challenge_window()?;
        Ok(Self {
            params,
            fraud_proof_window,
            claim_challenge_window,
            oracle,
            clock,
            arena: DisputeArena::new(),
            active: HashMap::new(),
            claims: ClaimLedger::new(),
            settlements: Vec::new(),
        })
    }

    pub fn params(&self) -> &DisputeParams {
        &self.params
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn claim(&self, operator: &AccountId) -> Option<&PaymentClaim> {
        self.claims.get(operator)
    }

    /// The active dispute at `handle`.
    pub fn dispute(&self, handle: DisputeHandle) -> Result<&Dispute, CoordinatorError> {
        self.arena.get(handle)
    }

    /// The stored outcome of a resolved dispute.
    pub fn outcome(&self, handle: DisputeHandle) -> Result<&DisputeOutcome, CoordinatorError> {
        self.arena.outcome(handle)
    }

    /// The operator's active dispute, if any.
    pub fn active_dispute(&self, operator: &AccountId) -> Option<DisputeHandle> {
        self.active.get(operator).copied()
    }

    pub fn active_count(&self) -> usize {
        self.arena.active_count()
    }

    pub fn settlements(&self) -> &[SettlementRecord] {
        &self.settlements
    }

    /// Window phase of the active dispute at `handle`.
    pub fn window_phase(&self, handle: DisputeHandle) -> Result<WindowPhase, CoordinatorError> {
        Ok(self.arena.get(handle)?.window_phase(self))
    }

    /// Record a payment claim.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::ClaimOutstanding`] if the operator has an
    /// unsettled claim.
    pub fn commit_claim(
        &mut self,
        operator: AccountId,
        range: PeriodRange,
        amount: Amount,
    ) -> Result<&PaymentClaim, CoordinatorError> {
        let now = self.clock.now();
        let claim = self.claims.commit(operator, range, amount, now)?;
        tracing::info!(%operator, %range, amount, "payment claim committed");
        Ok(claim)
    }

    /// Challenge the operator's claim, opening a dispute in which the
    /// operator moves first against the challenger's `split`.
    ///
    /// # Errors
    ///
    /// Returns a claim error if the claim is missing, not `Committed`, past
    /// its challenge window, or `split` does not total its amount; or any
    /// error from [`DisputeCoordinator::create_dispute`].
    pub fn challenge_claim(
        &mut self,
        operator: AccountId,
        challenger: AccountId,
        split: AmountSplit,
    ) -> Result<DisputeHandle, CoordinatorError> {
        let now = self.clock.now();
        let range = self
            .claims
            .check_challenge(&operator, split, now, self.claim_challenge_window)?
            .range;
        let handle = self.create_dispute(DisputeSetup {
            operator,
            challenger,
            range,
            split,
            first_turn: Party::Operator,
        })?;
        self.claims.mark_challenged(&operator, handle)?;
        tracing::info!(%operator, %challenger, %handle, "payment claim challenged");
        Ok(handle)
    }

    /// Redeem the operator's claim, returning the amount paid.
    pub fn redeem_claim(&mut self, operator: &AccountId) -> Result<Amount, CoordinatorError> {
        let now = self.clock.now();
        let amount = self.claims.redeem(operator, now, self.claim_challenge_window)?;
        tracing::info!(%operator, amount, "payment claim redeemed");
        Ok(amount)
    }

    /// Open a dispute.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::ActiveDisputeExists`] if the operator is
    /// already in a dispute, or a setup error from [`Dispute::new`].
    pub fn create_dispute(&mut self, setup: DisputeSetup) -> Result<DisputeHandle, CoordinatorError> {
        if let Some(&handle) = self.active.get(&setup.operator) {
            return Err(CoordinatorError::ActiveDisputeExists {
                operator: setup.operator,
                handle,
            });
        }
        let now = self.clock.now();
        let handle = self
            .arena
            .insert_with(|handle| Ok(Dispute::new(setup, handle, now)?))?;
        self.active.insert(setup.operator, handle);
        Ok(handle)
    }

    /// Forward a bisection to the dispute at `handle`.
    pub fn bisect(
        &mut self,
        handle: DisputeHandle,
        caller: &AccountId,
        choose_second_half: bool,
        split: AmountSplit,
    ) -> Result<DisputeStatus, CoordinatorError> {
        let timer = FixedWindowTimer::new(&self.clock, self.fraud_proof_window);
        let dispute = self.arena.get_mut(handle)?;
        dispute
            .bisect(caller, choose_second_half, split, &timer)
            .map_err(|e| rejected(handle, "bisect", e))
    }

    /// Resolve the dispute at `handle` against the party whose turn lapsed.
    pub fn resolve_on_timeout(&mut self, handle: DisputeHandle) -> Result<DisputeOutcome, CoordinatorError> {
        let timer = FixedWindowTimer::new(&self.clock, self.fraud_proof_window);
        let outcome = self
            .arena
            .get_mut(handle)?
            .resolve_on_timeout(&timer)
            .map_err(|e| rejected(handle, "resolve_on_timeout", e))?;
        self.report_outcome(outcome)?;
        Ok(outcome)
    }

    /// Settle the dispute at `handle` with a final proof.
    pub fn resolve_final(
        &mut self,
        handle: DisputeHandle,
        caller: &AccountId,
        proof: &FinalProof,
    ) -> Result<DisputeOutcome, CoordinatorError> {
        let timer = FixedWindowTimer::new(&self.clock, self.fraud_proof_window);
        let outcome = self
            .arena
            .get_mut(handle)?
            .resolve_final(caller, proof, &self.oracle, &timer)
            .map_err(|e| rejected(handle, "resolve_final", e))?;
        self.report_outcome(outcome)?;
        Ok(outcome)
    }

    /// Release a dispute left unresolved past both windows and return its
    /// claim to `Committed`. Permissionless.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NotExpired`] unless the dispute's window
    /// phase is [`WindowPhase::Expired`].
    pub fn reap_expired(&mut self, handle: DisputeHandle) -> Result<SettlementRecord, CoordinatorError> {
        let phase = self.window_phase(handle)?;
        if phase != WindowPhase::Expired {
            return Err(CoordinatorError::NotExpired { handle, phase });
        }
        let dispute = self.arena.release(handle)?;
        let operator = *dispute.operator();
        self.clear_active(&operator, handle);
        let claim_status = self.claims.reopen(&operator, handle);

        let record = SettlementRecord {
            handle,
            operator,
            challenger: *dispute.challenger(),
            settlement: Settlement::Abandoned,
            claim_status,
            recorded_at: self.clock.now(),
        };
        tracing::info!(%handle, %operator, status = %dispute.status(), "expired dispute reaped");
        self.settlements.push(record.clone());
        Ok(record)
    }

    /// Apply a dispute outcome: free the slot, clear the operator's active
    /// entry, settle the claim and log the settlement.
    fn report_outcome(&mut self, outcome: DisputeOutcome) -> Result<(), CoordinatorError> {
        let handle = outcome.handle;
        self.arena.resolve(handle, outcome)?;
        self.clear_active(&outcome.operator, handle);
        let claim_status = self
            .claims
            .apply_outcome(&outcome.operator, handle, outcome.challenge_successful);

        tracing::info!(
            %handle,
            operator = %outcome.operator,
            challenge_successful = outcome.challenge_successful,
            claim_status = ?claim_status,
            "dispute outcome applied"
        );
        self.settlements.push(SettlementRecord {
            handle,
            operator: outcome.operator,
            challenger: outcome.challenger,
            settlement: Settlement::from_outcome(&outcome),
            claim_status,
            recorded_at: outcome.resolved_at,
        });
        Ok(())
    }

    fn clear_active(&mut self, operator: &AccountId, handle: DisputeHandle) {
        if self.active.get(operator) == Some(&handle) {
            self.active.remove(operator);
        }
    }
}

impl<O, C: Clock> DisputeTimer for DisputeCoordinator<O, C> {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn fraud_proof_window(&self) -> Duration {
        self.fraud_proof_window
    }
}

fn rejected(handle: DisputeHandle, operation: &'static str, err: DisputeError) -> CoordinatorError {
    tracing::warn!(%handle, operation, kind = ?err.kind(), error = %err, "dispute call rejected");
    CoordinatorError::Dispute(err)
}
