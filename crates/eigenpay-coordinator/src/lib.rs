//! # eigenpay-coordinator — Claims and Dispute Registry
//!
//! The [`DisputeCoordinator`] originates disputes from challenged payment
//! claims, routes party calls to them, and applies their outcomes.
//!
//! ## Modules
//!
//! - `coordinator`: the coordinator itself.
//! - `arena`: generational slot storage; resolved disputes keep only their
//!   outcome.
//! - `claims`: the payment-claim ledger and its status machine.
//! - `settlement`: the settlement log.
//! - `config`: [`DisputeParams`] loaded from YAML and environment.

pub mod arena;
pub mod claims;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod settlement;

pub use arena::DisputeArena;
pub use claims::{ClaimLedger, ClaimStatus, PaymentClaim};
pub use config::{ConfigError, DisputeParams, CLAIM_CHALLENGE_WINDOW_ENV, FRAUD_PROOF_WINDOW_ENV};
pub use coordinator::DisputeCoordinator;
pub use error::CoordinatorError;
pub use settlement::{Settlement, SettlementRecord};
