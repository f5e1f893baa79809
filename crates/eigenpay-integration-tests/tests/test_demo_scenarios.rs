//! The scenarios shipped under `demos/` replay cleanly and settle as their
//! comments describe.

use std::path::PathBuf;

use eigenpay_cli::scenario::Scenario;
use eigenpay_cli::simulate::{simulate, SimulationReport};
use eigenpay_coordinator::{ClaimStatus, Settlement};
use eigenpay_dispute::{DisputeStatus, Party, ResolutionReason};

fn demo(name: &str) -> SimulationReport {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name);
    let scenario = Scenario::from_file(&path).unwrap();
    let params = scenario.params.unwrap_or_default();
    let report = simulate(&scenario, params).unwrap();
    assert!(report.all_met(), "{name}: {:#?}", report.steps);
    report
}

#[test]
fn operator_overclaims() {
    let report = demo("operator-overclaims.yaml");
    let outcome = report.outcome.unwrap();
    assert!(outcome.challenge_successful);
    assert!(matches!(
        outcome.reason,
        ResolutionReason::FinalProof {
            true_amount: 250,
            claimed: 400,
            prover: Party::Operator,
            ..
        }
    ));
    assert_eq!(report.claim.unwrap().status, ClaimStatus::Rejected);
}

#[test]
fn challenger_lapses() {
    let report = demo("challenger-lapses.yaml");
    assert_eq!(
        report.outcome.unwrap().reason,
        ResolutionReason::Timeout {
            lapsed: Party::Challenger
        }
    );
    let timeout_step = report.steps.iter().rfind(|s| s.action == "timeout").unwrap();
    assert_eq!(timeout_step.status, Some(DisputeStatus::Resolved));
    assert_eq!(report.claim.unwrap().status, ClaimStatus::Redeemed);
}

#[test]
fn abandoned() {
    let report = demo("abandoned.yaml");
    assert!(report.outcome.is_none());
    assert_eq!(report.settlements.len(), 1);
    assert_eq!(report.settlements[0].settlement, Settlement::Abandoned);
    assert_eq!(report.claim.unwrap().status, ClaimStatus::Redeemed);
}

#[test]
fn report_serializes_to_json() {
    let report = demo("operator-overclaims.yaml");
    let value: serde_json::Value = serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
    assert_eq!(value["scenario"], "operator-overclaims");
    assert_eq!(value["steps"][6]["action"], "final");
    assert_eq!(value["claim"]["status"], "Rejected");
}

#[test]
fn scenario_file_round_trips_through_tempdir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.yaml");
    let original = Scenario::from_file(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/abandoned.yaml"))
        .unwrap();
    std::fs::write(&path, serde_yaml::to_string(&original).unwrap()).unwrap();
    let copy = Scenario::from_file(&path).unwrap();
    assert_eq!(copy.steps.len(), original.steps.len());
    assert!(simulate(&copy, copy.params.unwrap_or_default()).unwrap().all_met());
}
