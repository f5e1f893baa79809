//! # eigenpay-oracle — Stake and Signature Oracle
//!
//! Defines the read contract the dispute's final step consumes, and an
//! in-memory implementation backed by explicit registries.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): [`StakeAndSignatureOracle`] with the three
//!   reads the final step needs: the on-record attestation digest for a
//!   period, an operator's stake snapshot by index, and the fee accrued in a
//!   period. Production and fixture backends are interchangeable.
//!
//! - **Stake** (`stake.rs`): [`StakeSnapshot`] validity intervals and the
//!   append-only [`StakeHistory`] that produces them.
//!
//! - **Attestation** (`attestation.rs`): [`PeriodAttestation`], the record of
//!   who did not sign a period and how much stake did, with its canonical
//!   digest.
//!
//! - **Memory** (`memory.rs`): [`InMemoryOracle`], a registry-backed
//!   implementation that can be loaded from a serde fixture.

pub mod attestation;
pub mod memory;
pub mod stake;
pub mod traits;

pub use attestation::PeriodAttestation;
pub use memory::{InMemoryOracle, OracleFixture};
pub use stake::{StakeHistory, StakeSnapshot};
pub use traits::{OracleError, StakeAndSignatureOracle};
