//! # eigenpay-core — Foundational Types for Payment Disputes
//!
//! Every other crate in the workspace depends on `eigenpay-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `AccountId`, `PeriodId`,
//!    `PeriodRange` and `ContentDigest` are newtypes with validated
//!    constructors. A `PeriodRange` with `from >= to` cannot be built.
//!
//! 2. **`CanonicalBytes` newtype.** Attestation digests flow through
//!    `CanonicalBytes::new()` so the same record always hashes to the same
//!    value, regardless of which party serialized it.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision.
//!    Time is read through the [`Clock`] trait so disputes never call the
//!    system clock directly.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `eigenpay-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod clock;
pub mod digest;
pub mod error;
pub mod identity;
pub mod period;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use clock::{Clock, ManualClock, SystemClock};
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CoreError};
pub use identity::AccountId;
pub use period::{Amount, AmountSplit, PeriodId, PeriodRange};
pub use temporal::Timestamp;
