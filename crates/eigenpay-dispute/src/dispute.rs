//! # Dispute Entity
//!
//! One instance of the bisection game between an operator and a challenger.
//!
//! ## Turn Semantics
//!
//! The recorded split is always authored by the party *not* holding the
//! turn. Each `bisect` call contests one half of that split and records a
//! division of that half's amount, which the other party must then answer.
//! When a half of one period is reached, the recorded figure for it was
//! authored by the party that now holds the final turn, which defends it:
//!
//! - `FinalOperatorTurn`: the challenge succeeds if the true amount differs
//!   from the recorded figure.
//! - `FinalChallengerTurn`: the challenge succeeds if the true amount equals
//!   the recorded figure.
//!
//! Every split sums to the operator's total, so a challenger whose figures
//! all match the attested amounts wins even against an honest claim.
//!
//! A lapsed turn forfeits: the challenge succeeds exactly when the operator's
//! turn lapsed.
//!
//! ## Validation Order
//!
//! Terminal, phase, authorization, timing, then consistency. All checks run
//! before any field is written.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use eigenpay_core::{AccountId, Amount, AmountSplit, PeriodId, PeriodRange, Timestamp};
use eigenpay_oracle::StakeAndSignatureOracle;

use crate::error::DisputeError;
use crate::handle::DisputeHandle;
use crate::state::{DisputeStatus, Party};
use crate::timer::{DisputeTimer, WindowPhase};
use crate::verification::{verify_final_proof, FinalProof};

/// Parameters the coordinator supplies to open a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeSetup {
    pub operator: AccountId,
    pub challenger: AccountId,
    /// Disputed periods.
    pub range: PeriodRange,
    /// Initial division of the disputed amount across the halves of `range`.
    pub split: AmountSplit,
    /// Party that must respond first.
    pub first_turn: Party,
}

/// A record of a single state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Status before the transition.
    pub from_status: DisputeStatus,
    /// Status after the transition.
    pub to_status: DisputeStatus,
    /// Range after the transition.
    pub range: PeriodRange,
    /// Split after the transition.
    pub split: AmountSplit,
    /// When the transition occurred.
    pub timestamp: Timestamp,
}

/// Why a dispute was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionReason {
    /// The final proof was verified.
    FinalProof {
        /// The single disputed period.
        period: PeriodId,
        /// Amount derived from attested data.
        true_amount: Amount,
        /// Recorded figure for the period.
        claimed: Amount,
        /// Party that supplied the proof.
        prover: Party,
    },
    /// The turn-holder did not respond in time.
    Timeout {
        /// Party whose turn lapsed.
        lapsed: Party,
    },
}

/// Final result of a dispute, reported to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeOutcome {
    pub handle: DisputeHandle,
    pub operator: AccountId,
    pub challenger: AccountId,
    /// Whether the operator's claim was shown to be wrong.
    pub challenge_successful: bool,
    pub reason: ResolutionReason,
    pub resolved_at: Timestamp,
}

/// A bisection game over one disputed payment claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    operator: AccountId,
    challenger: AccountId,
    coordinator_ref: DisputeHandle,
    range: PeriodRange,
    split: AmountSplit,
    status: DisputeStatus,
    created_at: Timestamp,
    last_action_time: Timestamp,
    transition_log: Vec<TransitionRecord>,
}

impl Dispute {
    /// Open a dispute.
    ///
    /// A multi-period range starts in the first-turn party's bisection
    /// status. A single-period range starts directly in its final-step
    /// status and must carry the split `(amount, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::InvalidSetup`] if the parties coincide, the
    /// split overflows, or a single-period split is not `(amount, 0)`.
    pub fn new(setup: DisputeSetup, coordinator_ref: DisputeHandle, now: Timestamp) -> Result<Self, DisputeError> {
        if setup.operator == setup.challenger {
            return Err(DisputeError::InvalidSetup(format!(
                "operator {} cannot challenge itself",
                setup.operator
            )));
        }
        if setup.split.total().is_none() {
            return Err(DisputeError::InvalidSetup(format!("split {} overflows", setup.split)));
        }
        let status = if setup.range.is_single_period() {
            if setup.split.second != 0 {
                return Err(DisputeError::InvalidSetup(format!(
                    "single-period range {} requires a split of (amount, 0), got {}",
                    setup.range, setup.split
                )));
            }
            DisputeStatus::final_for(setup.first_turn)
        } else {
            DisputeStatus::bisect_for(setup.first_turn)
        };

        tracing::info!(
            handle = %coordinator_ref,
            operator = %setup.operator,
            challenger = %setup.challenger,
            range = %setup.range,
            split = %setup.split,
            status = %status,
            "dispute opened"
        );

        Ok(Self {
            operator: setup.operator,
            challenger: setup.challenger,
            coordinator_ref,
            range: setup.range,
            split: setup.split,
            status,
            created_at: now,
            last_action_time: now,
            transition_log: Vec::new(),
        })
    }

    pub fn operator(&self) -> &AccountId {
        &self.operator
    }

    pub fn challenger(&self) -> &AccountId {
        &self.challenger
    }

    pub fn coordinator_ref(&self) -> DisputeHandle {
        self.coordinator_ref
    }

    pub fn status(&self) -> DisputeStatus {
        self.status
    }

    pub fn range(&self) -> PeriodRange {
        self.range
    }

    pub fn split(&self) -> AmountSplit {
        self.split
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_action_time(&self) -> Timestamp {
        self.last_action_time
    }

    /// Complete transition history.
    pub fn transition_log(&self) -> &[TransitionRecord] {
        &self.transition_log
    }

    /// Account of the turn-holder, `None` once resolved.
    pub fn turn_holder(&self) -> Option<&AccountId> {
        self.status.turn_holder().map(|p| self.account_of(p))
    }

    /// Which party `account` is in this dispute.
    pub fn party_of(&self, account: &AccountId) -> Option<Party> {
        if *account == self.operator {
            Some(Party::Operator)
        } else if *account == self.challenger {
            Some(Party::Challenger)
        } else {
            None
        }
    }

    /// Window phase at the timer's current reading.
    pub fn window_phase(&self, timer: &impl DisputeTimer) -> WindowPhase {
        WindowPhase::classify(self.last_action_time, timer.now(), timer.fraud_proof_window())
    }

    /// Contest one half of the recorded split and record a division of it.
    ///
    /// `new_split` must sum to the recorded amount of the chosen half. If the
    /// chosen half is a single period, `new_split` must be `(amount, 0)`.
    /// Returns the new status.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::AlreadyResolved`], [`DisputeError::WrongPhase`],
    /// [`DisputeError::NotTurnHolder`], [`DisputeError::OutsideWindow`] or
    /// [`DisputeError::SplitMismatch`], in that order of precedence.
    pub fn bisect(
        &mut self,
        caller: &AccountId,
        choose_second_half: bool,
        new_split: AmountSplit,
        timer: &impl DisputeTimer,
    ) -> Result<DisputeStatus, DisputeError> {
        let mover = self.require_turn("bisect", DisputeStatus::is_bisect, caller)?;
        let now = timer.now();
        self.require_phase("bisect", WindowPhase::InWindow, now, timer.fraud_proof_window())?;

        let half = self.range.half(choose_second_half).ok_or_else(|| {
            DisputeError::InvalidSetup(format!("range {} cannot be halved", self.range))
        })?;
        let contested = self.split.component(choose_second_half);
        let total = new_split
            .total()
            .ok_or(DisputeError::Overflow("split total"))?;
        if total != contested || (half.is_single_period() && new_split.second != 0) {
            return Err(DisputeError::SplitMismatch {
                expected: contested,
                provided: new_split,
                range: half,
            });
        }

        let next = if half.is_single_period() {
            DisputeStatus::final_for(mover.other())
        } else {
            DisputeStatus::bisect_for(mover.other())
        };
        let from = self.status;
        self.range = half;
        self.split = new_split;
        self.last_action_time = now;
        self.status = next;
        self.record_transition(from, now);

        tracing::info!(
            handle = %self.coordinator_ref,
            mover = %mover,
            second_half = choose_second_half,
            range = %self.range,
            split = %self.split,
            status = %self.status,
            "dispute bisected"
        );
        Ok(next)
    }

    /// Resolve against the party whose turn lapsed. Permissionless.
    ///
    /// # Errors
    ///
    /// Returns [`DisputeError::AlreadyResolved`] once resolved, or
    /// [`DisputeError::OutsideWindow`] unless the call falls in the timeout
    /// phase.
    pub fn resolve_on_timeout(&mut self, timer: &impl DisputeTimer) -> Result<DisputeOutcome, DisputeError> {
        let lapsed = self.status.turn_holder().ok_or(DisputeError::AlreadyResolved)?;
        let now = timer.now();
        self.require_phase("resolve_on_timeout", WindowPhase::TimeoutOpen, now, timer.fraud_proof_window())?;

        let challenge_successful = lapsed == Party::Operator;
        Ok(self.finish(challenge_successful, ResolutionReason::Timeout { lapsed }, now))
    }

    /// Settle the single remaining period against attested data.
    ///
    /// # Errors
    ///
    /// Returns the terminal, phase, authorization and timing errors of
    /// [`Dispute::bisect`], or a consistency error from
    /// [`verify_final_proof`].
    pub fn resolve_final<O: StakeAndSignatureOracle + ?Sized>(
        &mut self,
        caller: &AccountId,
        proof: &FinalProof,
        oracle: &O,
        timer: &impl DisputeTimer,
    ) -> Result<DisputeOutcome, DisputeError> {
        let prover = self.require_turn("resolve_final", DisputeStatus::is_final, caller)?;
        let now = timer.now();
        self.require_phase("resolve_final", WindowPhase::InWindow, now, timer.fraud_proof_window())?;

        let period = self.range.single_period().ok_or_else(|| {
            DisputeError::InvalidSetup(format!("final step reached with multi-period range {}", self.range))
        })?;
        let true_amount = verify_final_proof(oracle, &self.operator, period, proof)?;
        let claimed = self.split.first;
        let challenge_successful = match prover {
            Party::Operator => true_amount != claimed,
            Party::Challenger => true_amount == claimed,
        };
        let reason = ResolutionReason::FinalProof {
            period,
            true_amount,
            claimed,
            prover,
        };
        Ok(self.finish(challenge_successful, reason, now))
    }

    fn account_of(&self, party: Party) -> &AccountId {
        match party {
            Party::Operator => &self.operator,
            Party::Challenger => &self.challenger,
        }
    }

    /// Check terminal, phase and authorization, returning the mover.
    fn require_turn(
        &self,
        operation: &'static str,
        phase: fn(&DisputeStatus) -> bool,
        caller: &AccountId,
    ) -> Result<Party, DisputeError> {
        if self.status.is_terminal() {
            return Err(DisputeError::AlreadyResolved);
        }
        let holder = match self.status.turn_holder() {
            Some(p) if phase(&self.status) => p,
            _ => {
                return Err(DisputeError::WrongPhase {
                    operation,
                    status: self.status,
                })
            }
        };
        if self.account_of(holder) != caller {
            return Err(DisputeError::NotTurnHolder {
                caller: *caller,
                expected: holder,
            });
        }
        Ok(holder)
    }

    fn require_phase(
        &self,
        operation: &'static str,
        required: WindowPhase,
        now: Timestamp,
        window: Duration,
    ) -> Result<(), DisputeError> {
        let actual = WindowPhase::classify(self.last_action_time, now, window);
        if actual == required {
            return Ok(());
        }
        Err(DisputeError::OutsideWindow {
            operation,
            required,
            actual,
            elapsed_secs: now.since(self.last_action_time).num_seconds(),
            window_secs: window.num_seconds(),
        })
    }

    fn finish(&mut self, challenge_successful: bool, reason: ResolutionReason, now: Timestamp) -> DisputeOutcome {
        let from = self.status;
        self.status = DisputeStatus::Resolved;
        self.last_action_time = now;
        self.record_transition(from, now);

        tracing::info!(
            handle = %self.coordinator_ref,
            operator = %self.operator,
            challenge_successful,
            reason = ?reason,
            "dispute resolved"
        );
        DisputeOutcome {
            handle: self.coordinator_ref,
            operator: self.operator,
            challenger: self.challenger,
            challenge_successful,
            reason,
            resolved_at: now,
        }
    }

    fn record_transition(&mut self, from: DisputeStatus, now: Timestamp) {
        self.transition_log.push(TransitionRecord {
            from_status: from,
            to_status: self.status,
            range: self.range,
            split: self.split,
            timestamp: now,
        });
    }
}
