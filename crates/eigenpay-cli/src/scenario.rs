//! # Scenario Files
//!
//! A scenario seeds the oracle, commits one payment claim, and scripts the
//! calls made against it:
//!
//! ```yaml
//! name: operator-overclaims
//! start_epoch_secs: 1700000000
//! params:
//!   fraud_proof_window_secs: 3600
//!   claim_challenge_window_secs: 86400
//! oracle:
//!   fees: [{ period: 2, amount: 1000 }]
//!   stakes:
//!     - operator: "0x1111111111111111111111111111111111111111"
//!       updates: [{ block: 10, stake: 500 }]
//!   attestations:
//!     - { period: 2, reference_block: 120, total_stake_signed: 2000, non_signers: [] }
//! claim:
//!   operator: "0x1111111111111111111111111111111111111111"
//!   challenger: "0x2222222222222222222222222222222222222222"
//!   range: { from: 0, to: 4 }
//!   amount: 1600
//! steps:
//!   - { action: challenge, split: { first: 800, second: 800 } }
//!   - { action: bisect, by: operator, second_half: true, split: { first: 400, second: 400 } }
//!   - { action: bisect, by: challenger, second_half: false, split: { first: 400, second: 0 } }
//!   - { action: final, by: operator }
//! ```
//!
//! Amounts in scenario files are `u64`. A step may set `expect: error` to
//! assert that the call is rejected.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use eigenpay_coordinator::DisputeParams;
use eigenpay_core::{AccountId, Amount, AmountSplit, PeriodRange};
use eigenpay_dispute::Party;
use eigenpay_oracle::OracleFixture;

const DEFAULT_START_EPOCH_SECS: i64 = 1_700_000_000;

fn default_start() -> i64 {
    DEFAULT_START_EPOCH_SECS
}

/// A replayable claim and dispute script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_start")]
    pub start_epoch_secs: i64,
    /// Parameters used when no parameter file is given on the command line.
    #[serde(default)]
    pub params: Option<DisputeParams>,
    #[serde(default)]
    pub oracle: OracleFixture,
    pub claim: ScenarioClaim,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse scenario YAML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file: {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("invalid scenario: {}", path.display()))
    }
}

/// The claim committed before the first step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioClaim {
    pub operator: AccountId,
    pub challenger: AccountId,
    pub range: PeriodRange,
    pub amount: u64,
}

impl ScenarioClaim {
    pub fn account(&self, party: Party) -> AccountId {
        match party {
            Party::Operator => self.operator,
            Party::Challenger => self.challenger,
        }
    }
}

/// An amount split as written in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSplit {
    pub first: u64,
    pub second: u64,
}

impl From<ScenarioSplit> for AmountSplit {
    fn from(s: ScenarioSplit) -> Self {
        AmountSplit::new(Amount::from(s.first), Amount::from(s.second))
    }
}

/// Whether a step is expected to succeed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    #[default]
    Ok,
    Error,
}

/// One scripted call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    #[serde(default)]
    pub expect: Expectation,
}

/// Scripted calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Move the clock forward.
    Advance { secs: u64 },
    /// Challenge the claim with an initial split.
    Challenge { split: ScenarioSplit },
    /// Bisect the open dispute.
    Bisect {
        by: Party,
        second_half: bool,
        split: ScenarioSplit,
    },
    /// Resolve the open dispute by timeout.
    Timeout,
    /// Supply the final proof. Omitted fields are derived from the oracle.
    Final {
        by: Party,
        #[serde(default)]
        stake_index: Option<u32>,
        /// Raw non-signer index, or `4294967295` for "did not sign".
        #[serde(default)]
        non_signer_index: Option<u32>,
    },
    /// Reap the open dispute once expired.
    Reap,
    /// Redeem the claim.
    Redeem,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::Challenge { .. } => "challenge",
            Self::Bisect { .. } => "bisect",
            Self::Timeout => "timeout",
            Self::Final { .. } => "final",
            Self::Reap => "reap",
            Self::Redeem => "redeem",
        }
    }
}
