//! # eigenpay-cli — Command-Line Interface
//!
//! ## Subcommands
//!
//! - `eigenpay params` prints the effective protocol parameters after the
//!   parameter file and `EIGENPAY_*` environment overrides are applied.
//! - `eigenpay simulate --scenario FILE` replays a scripted claim and
//!   dispute against a manual clock and prints a JSON report.
//!
//! ```bash
//! eigenpay --config eigenpay.yaml params
//! eigenpay -v simulate --scenario demos/operator-overclaims.yaml
//! ```
//!
//! Exit codes: 0 when every step met its expectation, 1 when a step did
//! not, 2 on operational error.

pub mod params;
pub mod scenario;
pub mod simulate;
