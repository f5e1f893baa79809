//! # Simulate Subcommand
//!
//! Replays a [`Scenario`] against an in-memory oracle and a manual clock,
//! recording the dispute state after every step.
//!
//! Parameters come from `--config` when given, else from the scenario's own
//! `params` block, else from defaults. Environment overrides apply in every
//! case.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use eigenpay_coordinator::{ClaimStatus, DisputeCoordinator, DisputeParams, PaymentClaim, SettlementRecord};
use eigenpay_core::{AccountId, Amount, AmountSplit, Clock, ManualClock, PeriodId, PeriodRange, Timestamp};
use eigenpay_dispute::{DisputeHandle, DisputeOutcome, DisputeStatus, FinalProof, NonSignerWitness};
use eigenpay_oracle::InMemoryOracle;

use crate::scenario::{Action, Expectation, Scenario, ScenarioClaim};

type Coordinator = DisputeCoordinator<InMemoryOracle, ManualClock>;

/// Arguments for the `eigenpay simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Scenario file (YAML).
    #[arg(long)]
    pub scenario: PathBuf,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// State observed after one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub action: &'static str,
    pub expected: Expectation,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Whether the result matched `expected`.
    pub met: bool,
    pub error: Option<String>,
    pub status: Option<DisputeStatus>,
    pub range: Option<PeriodRange>,
    pub split: Option<AmountSplit>,
    /// When the observed dispute was opened.
    pub opened_at: Option<Timestamp>,
    pub claim_status: Option<ClaimStatus>,
    pub at: Timestamp,
}

/// Full result of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub scenario: String,
    pub params: DisputeParams,
    /// The most recently opened dispute.
    pub handle: Option<DisputeHandle>,
    pub steps: Vec<StepRecord>,
    pub outcome: Option<DisputeOutcome>,
    pub claim: Option<PaymentClaim>,
    pub settlements: Vec<SettlementRecord>,
    /// Steps whose result did not match their expectation.
    pub mismatches: usize,
}

impl SimulationReport {
    pub fn all_met(&self) -> bool {
        self.mismatches == 0
    }
}

/// Execute the simulate subcommand.
///
/// Returns exit code 0 when every step met its expectation and 1 otherwise.
pub fn run_simulate(args: &SimulateArgs, config: Option<&Path>) -> Result<u8> {
    let scenario = Scenario::from_file(&args.scenario)?;
    let params = resolve_params(&scenario, config)?;
    let report = simulate(&scenario, params)?;

    let rendered = serde_json::to_string_pretty(&report)?;
    match &args.out {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write report: {}", path.display()))?,
        None => println!("{rendered}"),
    }

    if report.all_met() {
        tracing::info!(scenario = %report.scenario, steps = report.steps.len(), "scenario passed");
        Ok(0)
    } else {
        tracing::warn!(scenario = %report.scenario, mismatches = report.mismatches, "scenario failed");
        Ok(1)
    }
}

fn resolve_params(scenario: &Scenario, config: Option<&Path>) -> Result<DisputeParams> {
    match (config, scenario.params) {
        (None, Some(own)) => {
            let params = own
                .with_overrides(|var| std::env::var(var).ok())
                .context("invalid parameter override")?;
            params.validate().context("invalid scenario parameters")?;
            Ok(params)
        }
        _ => DisputeParams::load(config).context("failed to load parameters"),
    }
}

/// Replay `scenario` with `params`.
///
/// # Errors
///
/// Fails if the oracle fixture, start time, parameters or claim are
/// invalid. Rejected steps are recorded in the report, not returned.
pub fn simulate(scenario: &Scenario, params: DisputeParams) -> Result<SimulationReport> {
    let oracle = InMemoryOracle::from_fixture(&scenario.oracle).context("invalid oracle fixture")?;
    let clock = ManualClock::at_epoch_secs(scenario.start_epoch_secs).context("invalid start time")?;
    let mut coordinator = Coordinator::new(params, oracle, clock)?;

    let claim = &scenario.claim;
    coordinator
        .commit_claim(claim.operator, claim.range, Amount::from(claim.amount))
        .context("failed to commit claim")?;

    let mut handle = None;
    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let result = apply(&mut coordinator, claim, &mut handle, &step.action);
        let ok = result.is_ok();
        let met = ok == (step.expect == Expectation::Ok);
        let error = result.err().map(|e| format!("{e:#}"));
        if !met {
            tracing::warn!(index, action = step.action.name(), error = ?error, "step did not meet expectation");
        }

        let view = observe(&coordinator, handle);
        steps.push(StepRecord {
            index,
            action: step.action.name(),
            expected: step.expect,
            ok,
            met,
            error,
            status: view.status,
            range: view.range,
            split: view.split,
            opened_at: view.opened_at,
            claim_status: coordinator.claim(&claim.operator).map(|c| c.status),
            at: coordinator.clock().now(),
        });
    }

    let mismatches = steps.iter().filter(|s| !s.met).count();
    Ok(SimulationReport {
        scenario: scenario.name.clone(),
        params,
        handle,
        outcome: handle.and_then(|h| coordinator.outcome(h).ok().copied()),
        claim: coordinator.claim(&claim.operator).cloned(),
        settlements: coordinator.settlements().to_vec(),
        steps,
        mismatches,
    })
}

fn apply(
    coordinator: &mut Coordinator,
    claim: &ScenarioClaim,
    handle: &mut Option<DisputeHandle>,
    action: &Action,
) -> Result<()> {
    match action {
        Action::Advance { secs } => coordinator.clock().advance_secs(*secs),
        Action::Challenge { split } => {
            let h = coordinator.challenge_claim(claim.operator, claim.challenger, (*split).into())?;
            *handle = Some(h);
        }
        Action::Bisect {
            by,
            second_half,
            split,
        } => {
            let h = current(*handle)?;
            coordinator.bisect(h, &claim.account(*by), *second_half, (*split).into())?;
        }
        Action::Timeout => {
            coordinator.resolve_on_timeout(current(*handle)?)?;
        }
        Action::Final {
            by,
            stake_index,
            non_signer_index,
        } => {
            let h = current(*handle)?;
            let range = coordinator.dispute(h)?.range();
            let period = range.single_period().unwrap_or(PeriodId(range.from()));
            let proof = build_proof(coordinator.oracle(), &claim.operator, period, *stake_index, *non_signer_index)?;
            coordinator.resolve_final(h, &claim.account(*by), &proof)?;
        }
        Action::Reap => {
            coordinator.reap_expired(current(*handle)?)?;
        }
        Action::Redeem => {
            coordinator.redeem_claim(&claim.operator)?;
        }
    }
    Ok(())
}

fn current(handle: Option<DisputeHandle>) -> Result<DisputeHandle> {
    match handle {
        Some(h) => Ok(h),
        None => bail!("no dispute has been opened"),
    }
}

/// Assemble a final proof from the oracle's records. Explicit indices
/// replace the derived ones.
fn build_proof(
    oracle: &InMemoryOracle,
    operator: &AccountId,
    period: PeriodId,
    stake_index: Option<u32>,
    non_signer_index: Option<u32>,
) -> Result<FinalProof> {
    let attestation = oracle
        .attestation(period)
        .cloned()
        .with_context(|| format!("no attestation recorded for {period}"))?;
    let attestation_ref = attestation.digest()?;
    let stake_index = match stake_index {
        Some(i) => i,
        None => oracle
            .stake_index_at(operator, attestation.reference_block)
            .with_context(|| {
                format!(
                    "operator {operator} has no stake snapshot at block {}",
                    attestation.reference_block
                )
            })?,
    };
    let non_signer = non_signer_index
        .map(NonSignerWitness::from_raw)
        .unwrap_or_else(|| NonSignerWitness::for_operator(&attestation.non_signers, operator));
    Ok(FinalProof {
        stake_index,
        non_signer,
        attestation,
        attestation_ref,
    })
}

#[derive(Default)]
struct DisputeView {
    status: Option<DisputeStatus>,
    range: Option<PeriodRange>,
    split: Option<AmountSplit>,
    opened_at: Option<Timestamp>,
}

fn observe(coordinator: &Coordinator, handle: Option<DisputeHandle>) -> DisputeView {
    let Some(h) = handle else {
        return DisputeView::default();
    };
    if let Ok(d) = coordinator.dispute(h) {
        return DisputeView {
            status: Some(d.status()),
            range: Some(d.range()),
            split: Some(d.split()),
            opened_at: Some(d.created_at()),
        };
    }
    if coordinator.outcome(h).is_ok() {
        return DisputeView {
            status: Some(DisputeStatus::Resolved),
            ..DisputeView::default()
        };
    }
    DisputeView::default()
}
