//! End-to-end dispute lifecycles through the coordinator: claim, challenge,
//! bisection, final proof against a populated oracle, and settlement.

use eigenpay_coordinator::{ClaimStatus, CoordinatorError, DisputeCoordinator, DisputeParams, Settlement};
use eigenpay_core::{AccountId, Amount, AmountSplit, ManualClock, PeriodId, PeriodRange};
use eigenpay_dispute::{
    DisputeError, DisputeHandle, DisputeSetup, DisputeStatus, ErrorKind, FinalProof, NonSignerWitness, Party,
    ResolutionReason, TransitionRecord,
};
use eigenpay_oracle::{InMemoryOracle, PeriodAttestation};

const OP: AccountId = AccountId::from_bytes([0x0a; 20]);
const CH: AccountId = AccountId::from_bytes([0x0c; 20]);
const LOW: AccountId = AccountId::from_bytes([0x05; 20]);
const HIGH: AccountId = AccountId::from_bytes([0xf0; 20]);

const WINDOW: u64 = 600;

type Coordinator = DisputeCoordinator<InMemoryOracle, ManualClock>;

/// Periods 0..8 with fee `1000 + 100p`, attested at block `100 + 10p`
/// against 2000 signed stake. `OP` holds 500 throughout and skipped
/// period 5, so it is owed `fee / 4` everywhere but there.
fn oracle() -> InMemoryOracle {
    let mut oracle = InMemoryOracle::new();
    oracle.record_stake(OP, 10, 500).unwrap();
    oracle.record_stake(OP, 200, 800).unwrap();
    for p in 0..8u32 {
        oracle.record_fee(PeriodId(p), Amount::from(1000 + 100 * p));
        let non_signers = if p == 5 { vec![LOW, OP, HIGH] } else { vec![HIGH, LOW] };
        oracle
            .record_attestation(PeriodAttestation::new(PeriodId(p), u64::from(100 + 10 * p), 2000, non_signers))
            .unwrap();
    }
    oracle
}

fn coordinator() -> Coordinator {
    let params = DisputeParams {
        fraud_proof_window_secs: WINDOW,
        claim_challenge_window_secs: 10 * WINDOW,
    };
    DisputeCoordinator::new(params, oracle(), ManualClock::at_epoch_secs(1_700_000_000).unwrap()).unwrap()
}

fn proof(c: &Coordinator, period: u32, stake_index: u32, witness: Option<NonSignerWitness>) -> FinalProof {
    let attestation = c.oracle().attestation(PeriodId(period)).unwrap().clone();
    FinalProof {
        stake_index,
        non_signer: witness.unwrap_or_else(|| NonSignerWitness::for_operator(&attestation.non_signers, &OP)),
        attestation_ref: attestation.digest().unwrap(),
        attestation,
    }
}

/// Claim the honest total 2325 over [0, 8) and bisect down to [4, 6), where
/// the challenger divides the operator's 350 as `split`.
fn down_to_four_five(split: AmountSplit) -> (Coordinator, DisputeHandle) {
    let mut c = coordinator();
    c.commit_claim(OP, PeriodRange::new(0, 8).unwrap(), 2325).unwrap();
    let h = c.challenge_claim(OP, CH, AmountSplit::new(1150, 1175)).unwrap();
    c.clock().advance_secs(60);
    assert_eq!(
        c.bisect(h, &OP, true, AmountSplit::new(350, 825)).unwrap(),
        DisputeStatus::BisectChallengerTurn
    );
    c.clock().advance_secs(60);
    assert_eq!(c.bisect(h, &CH, false, split).unwrap(), DisputeStatus::BisectOperatorTurn);
    assert_eq!(c.dispute(h).unwrap().range(), PeriodRange::new(4, 6).unwrap());
    (c, h)
}

#[test]
fn challenger_figure_proven_wrong_vindicates_claim() {
    let (mut c, h) = down_to_four_five(AmountSplit::new(0, 350));
    assert_eq!(
        c.bisect(h, &OP, true, AmountSplit::new(350, 0)).unwrap(),
        DisputeStatus::FinalChallengerTurn
    );

    let p = proof(&c, 5, 0, None);
    assert_eq!(p.non_signer, NonSignerWitness::NotSigned);
    let outcome = c.resolve_final(h, &CH, &p).unwrap();
    assert!(!outcome.challenge_successful);
    assert_eq!(
        outcome.reason,
        ResolutionReason::FinalProof {
            period: PeriodId(5),
            true_amount: 0,
            claimed: 350,
            prover: Party::Challenger,
        }
    );
    assert_eq!(c.claim(&OP).unwrap().status, ClaimStatus::Vindicated);
    assert_eq!(c.redeem_claim(&OP).unwrap(), 2325);
    assert_eq!(c.claim(&OP).unwrap().status, ClaimStatus::Redeemed);
}

#[test]
fn challenger_figure_proven_right_rejects_claim() {
    let (mut c, h) = down_to_four_five(AmountSplit::new(350, 0));
    c.bisect(h, &OP, false, AmountSplit::new(350, 0)).unwrap();

    let outcome = c.resolve_final(h, &CH, &proof(&c, 4, 0, None)).unwrap();
    assert!(outcome.challenge_successful);
    assert_eq!(c.claim(&OP).unwrap().status, ClaimStatus::Rejected);

    let settlement = &c.settlements()[0];
    assert_eq!(settlement.claim_status, Some(ClaimStatus::Rejected));
    assert!(matches!(settlement.settlement, Settlement::ChallengeSucceeded { .. }));
    assert!(matches!(
        c.redeem_claim(&OP),
        Err(CoordinatorError::ClaimStatus {
            status: ClaimStatus::Rejected,
            ..
        })
    ));
}

#[test]
fn operator_defends_overstated_period() {
    let mut c = coordinator();
    let h = c
        .create_dispute(DisputeSetup {
            operator: OP,
            challenger: CH,
            range: PeriodRange::new(6, 8).unwrap(),
            split: AmountSplit::new(400, 500),
            first_turn: Party::Challenger,
        })
        .unwrap();
    c.bisect(h, &CH, true, AmountSplit::new(500, 0)).unwrap();
    assert_eq!(c.dispute(h).unwrap().status(), DisputeStatus::FinalOperatorTurn);

    // Snapshot 1 starts at block 200; period 7 is attested at 170.
    let err = c.resolve_final(h, &OP, &proof(&c, 7, 1, None)).unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::Dispute(DisputeError::SnapshotNotInEffect { index: 1, .. })
    ));

    // LOW < OP < HIGH, so OP would insert at 1.
    let err = c
        .resolve_final(h, &OP, &proof(&c, 7, 0, Some(NonSignerWitness::Signed { insertion_index: 0 })))
        .unwrap_err();
    match err {
        CoordinatorError::Dispute(e) => assert_eq!(e.kind(), ErrorKind::Consistency),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(c.dispute(h).unwrap().status(), DisputeStatus::FinalOperatorTurn);

    let outcome = c.resolve_final(h, &OP, &proof(&c, 7, 0, None)).unwrap();
    assert!(outcome.challenge_successful);
    assert!(matches!(
        outcome.reason,
        ResolutionReason::FinalProof {
            true_amount: 425,
            claimed: 500,
            prover: Party::Operator,
            ..
        }
    ));
    // No claim backs a directly created dispute.
    assert_eq!(c.settlements()[0].claim_status, None);
}

#[test]
fn transition_log_tracks_every_move() {
    let (c, h) = down_to_four_five(AmountSplit::new(0, 350));
    let log: &[TransitionRecord] = c.dispute(h).unwrap().transition_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].from_status, DisputeStatus::BisectOperatorTurn);
    assert_eq!(log[0].to_status, DisputeStatus::BisectChallengerTurn);
    assert_eq!(log[0].range, PeriodRange::new(4, 8).unwrap());
    assert_eq!(log[1].split, AmountSplit::new(0, 350));
    assert!(log[0].timestamp < log[1].timestamp);
    assert_eq!(c.dispute(h).unwrap().last_action_time(), log[1].timestamp);
}

#[test]
fn reaped_slot_is_reissued_under_new_generation() {
    let mut c = coordinator();
    c.commit_claim(OP, PeriodRange::new(0, 8).unwrap(), 2325).unwrap();
    let first = c.challenge_claim(OP, CH, AmountSplit::new(1000, 1325)).unwrap();
    c.clock().advance_secs(2 * WINDOW + 1);
    let record = c.reap_expired(first).unwrap();
    assert_eq!(record.settlement, Settlement::Abandoned);
    assert_eq!(c.claim(&OP).unwrap().status, ClaimStatus::Committed);

    let second = c.challenge_claim(OP, CH, AmountSplit::new(1150, 1175)).unwrap();
    assert_eq!(second.index(), first.index());
    assert!(second.generation() > first.generation());
    assert!(matches!(c.dispute(first), Err(CoordinatorError::StaleHandle { .. })));
    assert!(matches!(
        c.bisect(first, &OP, false, AmountSplit::new(575, 575)),
        Err(CoordinatorError::StaleHandle { .. })
    ));
    assert_eq!(c.dispute(second).unwrap().status(), DisputeStatus::BisectOperatorTurn);
}

#[test]
fn operators_dispute_independently() {
    let other = AccountId::from_bytes([0x0b; 20]);
    let mut c = coordinator();
    c.commit_claim(OP, PeriodRange::new(0, 8).unwrap(), 2325).unwrap();
    c.commit_claim(other, PeriodRange::new(0, 2).unwrap(), 10).unwrap();
    let a = c.challenge_claim(OP, CH, AmountSplit::new(1150, 1175)).unwrap();
    let b = c.challenge_claim(other, CH, AmountSplit::new(5, 5)).unwrap();
    assert_ne!(a, b);
    assert_eq!(c.active_count(), 2);

    c.clock().advance_secs(WINDOW + 1);
    assert!(c.resolve_on_timeout(b).unwrap().challenge_successful);
    assert_eq!(c.active_count(), 1);
    assert_eq!(c.active_dispute(&OP), Some(a));
    assert_eq!(c.active_dispute(&other), None);
    assert_eq!(c.claim(&OP).unwrap().status, ClaimStatus::Challenged);
    assert_eq!(c.claim(&other).unwrap().status, ClaimStatus::Rejected);
}

#[test]
fn rejected_calls_leave_dispute_untouched() {
    let (mut c, h) = down_to_four_five(AmountSplit::new(0, 350));
    let before = c.dispute(h).unwrap().clone();

    let wrong_total = c.bisect(h, &OP, true, AmountSplit::new(349, 0)).unwrap_err();
    let not_single = c.bisect(h, &OP, true, AmountSplit::new(300, 50)).unwrap_err();
    let wrong_caller = c.bisect(h, &CH, true, AmountSplit::new(350, 0)).unwrap_err();
    let early_final = c.resolve_final(h, &OP, &proof(&c, 5, 0, None)).unwrap_err();
    for (err, kind) in [
        (wrong_total, ErrorKind::Consistency),
        (not_single, ErrorKind::Consistency),
        (wrong_caller, ErrorKind::Authorization),
        (early_final, ErrorKind::Phase),
    ] {
        match err {
            CoordinatorError::Dispute(e) => assert_eq!(e.kind(), kind),
            other => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(c.dispute(h).unwrap(), &before);
}
