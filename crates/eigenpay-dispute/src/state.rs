//! # Dispute Status
//!
//! The status encodes both the phase of the game (bisection or final step)
//! and which party holds the turn.

use serde::{Deserialize, Serialize};

/// One of the two named participants in a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// The operator whose payment claim is disputed.
    Operator,
    /// The party contesting the claim.
    Challenger,
}

impl Party {
    /// The opposing party.
    pub fn other(&self) -> Self {
        match self {
            Self::Operator => Self::Challenger,
            Self::Challenger => Self::Operator,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::Challenger => "challenger",
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeStatus {
    /// The operator must bisect.
    BisectOperatorTurn,
    /// The challenger must bisect.
    BisectChallengerTurn,
    /// The operator must supply the final proof.
    FinalOperatorTurn,
    /// The challenger must supply the final proof.
    FinalChallengerTurn,
    /// Terminal state.
    Resolved,
}

impl DisputeStatus {
    /// The bisection status in which `party` holds the turn.
    pub fn bisect_for(party: Party) -> Self {
        match party {
            Party::Operator => Self::BisectOperatorTurn,
            Party::Challenger => Self::BisectChallengerTurn,
        }
    }

    /// The final-step status in which `party` holds the turn.
    pub fn final_for(party: Party) -> Self {
        match party {
            Party::Operator => Self::FinalOperatorTurn,
            Party::Challenger => Self::FinalChallengerTurn,
        }
    }

    /// The party holding the turn, `None` once resolved.
    pub fn turn_holder(&self) -> Option<Party> {
        match self {
            Self::BisectOperatorTurn | Self::FinalOperatorTurn => Some(Party::Operator),
            Self::BisectChallengerTurn | Self::FinalChallengerTurn => Some(Party::Challenger),
            Self::Resolved => None,
        }
    }

    pub fn is_bisect(&self) -> bool {
        matches!(self, Self::BisectOperatorTurn | Self::BisectChallengerTurn)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::FinalOperatorTurn | Self::FinalChallengerTurn)
    }

    /// Whether this state is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BisectOperatorTurn => "BISECT_OPERATOR_TURN",
            Self::BisectChallengerTurn => "BISECT_CHALLENGER_TURN",
            Self::FinalOperatorTurn => "FINAL_OPERATOR_TURN",
            Self::FinalChallengerTurn => "FINAL_CHALLENGER_TURN",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
