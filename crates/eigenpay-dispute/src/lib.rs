//! # eigenpay-dispute — Payment Challenge Game
//!
//! A two-party bisection game over an operator's payment claim. The
//! disputed range of billing periods is halved each round until a single
//! period remains, which is then settled against attested stake and
//! signature data. An unresponsive party loses by timeout.
//!
//! ## Lifecycle
//!
//! ```text
//!   BisectOperatorTurn ⇄ BisectChallengerTurn
//!          │                      │
//!          ▼                      ▼
//!   FinalChallengerTurn    FinalOperatorTurn
//!          │                      │
//!          └──────► Resolved ◄────┘
//! ```
//!
//! Every active status can also reach `Resolved` through the timeout path.
//!
//! ## Modules
//!
//! - `state`: [`DisputeStatus`] and [`Party`].
//! - `timer`: [`DisputeTimer`] and the [`WindowPhase`] of a fraud-proof window.
//! - `verification`: [`FinalProof`] checks against the oracle.
//! - `dispute`: the [`Dispute`] entity and its transitions.
//! - `error`: [`DisputeError`] and its [`ErrorKind`] taxonomy.

pub mod dispute;
pub mod error;
pub mod handle;
pub mod state;
pub mod timer;
pub mod verification;

pub use dispute::{Dispute, DisputeOutcome, DisputeSetup, ResolutionReason, TransitionRecord};
pub use error::{DisputeError, ErrorKind};
pub use handle::DisputeHandle;
pub use state::{DisputeStatus, Party};
pub use timer::{DisputeTimer, FixedWindowTimer, WindowPhase};
pub use verification::{verify_final_proof, FinalProof, NonSignerWitness, NOT_SIGNED_SENTINEL};
