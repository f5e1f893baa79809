//! Window boundaries: at any elapsed time exactly one of bisect, timeout
//! resolution and reaping is accepted.

use eigenpay_coordinator::{CoordinatorError, DisputeCoordinator, DisputeParams};
use eigenpay_core::{AccountId, AmountSplit, ManualClock, PeriodRange};
use eigenpay_dispute::{DisputeError, DisputeHandle, Party, ResolutionReason, WindowPhase};
use eigenpay_oracle::InMemoryOracle;
use proptest::prelude::*;

const OP: AccountId = AccountId::from_bytes([0x0a; 20]);
const CH: AccountId = AccountId::from_bytes([0x0c; 20]);

type Coordinator = DisputeCoordinator<InMemoryOracle, ManualClock>;

fn challenged(window: u64) -> (Coordinator, DisputeHandle) {
    let params = DisputeParams {
        fraud_proof_window_secs: window,
        claim_challenge_window_secs: window,
    };
    let mut c = DisputeCoordinator::new(params, InMemoryOracle::new(), ManualClock::at_epoch_secs(0).unwrap()).unwrap();
    c.commit_claim(OP, PeriodRange::new(0, 4).unwrap(), 100).unwrap();
    let h = c.challenge_claim(OP, CH, AmountSplit::new(50, 50)).unwrap();
    (c, h)
}

/// Which of the three calls succeeds after `elapsed` seconds, each tried on
/// a fresh dispute.
fn accepted(window: u64, elapsed: u64) -> [bool; 3] {
    fn attempt(window: u64, elapsed: u64, call: impl FnOnce(&mut Coordinator, DisputeHandle) -> bool) -> bool {
        let (mut c, h) = challenged(window);
        c.clock().advance_secs(elapsed);
        call(&mut c, h)
    }
    [
        attempt(window, elapsed, |c, h| c.bisect(h, &OP, false, AmountSplit::new(25, 25)).is_ok()),
        attempt(window, elapsed, |c, h| c.resolve_on_timeout(h).is_ok()),
        attempt(window, elapsed, |c, h| c.reap_expired(h).is_ok()),
    ]
}

#[test]
fn boundaries_belong_to_the_earlier_phase() {
    let w = 600;
    assert_eq!(accepted(w, 0), [true, false, false]);
    assert_eq!(accepted(w, w), [true, false, false]);
    assert_eq!(accepted(w, w + 1), [false, true, false]);
    assert_eq!(accepted(w, 2 * w), [false, true, false]);
    assert_eq!(accepted(w, 2 * w + 1), [false, false, true]);
}

#[test]
fn coordinator_reports_phase() {
    let (c, h) = challenged(60);
    assert_eq!(c.window_phase(h).unwrap(), WindowPhase::InWindow);
    c.clock().advance_secs(61);
    assert_eq!(c.window_phase(h).unwrap(), WindowPhase::TimeoutOpen);
    c.clock().advance_secs(60);
    assert_eq!(c.window_phase(h).unwrap(), WindowPhase::Expired);
}

#[test]
fn each_move_restarts_the_window() {
    let (mut c, h) = challenged(100);
    c.clock().advance_secs(100);
    c.bisect(h, &OP, false, AmountSplit::new(25, 25)).unwrap();
    c.clock().advance_secs(100);
    assert!(matches!(
        c.resolve_on_timeout(h),
        Err(CoordinatorError::Dispute(DisputeError::OutsideWindow {
            required: WindowPhase::TimeoutOpen,
            actual: WindowPhase::InWindow,
            ..
        }))
    ));
    c.clock().advance_secs(1);
    let outcome = c.resolve_on_timeout(h).unwrap();
    assert_eq!(outcome.reason, ResolutionReason::Timeout { lapsed: Party::Challenger });
    assert!(!outcome.challenge_successful);
}

#[test]
fn late_bisect_reports_timing() {
    let (mut c, h) = challenged(100);
    c.clock().advance_secs(150);
    match c.bisect(h, &OP, false, AmountSplit::new(25, 25)) {
        Err(CoordinatorError::Dispute(DisputeError::OutsideWindow {
            elapsed_secs,
            window_secs,
            actual,
            ..
        })) => {
            assert_eq!(elapsed_secs, 150);
            assert_eq!(window_secs, 100);
            assert_eq!(actual, WindowPhase::TimeoutOpen);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn exactly_one_call_is_accepted(window in 1u64..10_000, elapsed in 0u64..30_000) {
        let ok = accepted(window, elapsed);
        prop_assert_eq!(ok.iter().filter(|&&b| b).count(), 1);
        prop_assert_eq!(ok[0], elapsed <= window);
        prop_assert_eq!(ok[2], elapsed > 2 * window);
    }
}
