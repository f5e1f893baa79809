//! # Params Subcommand
//!
//! Prints the effective [`DisputeParams`] as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use eigenpay_coordinator::DisputeParams;

/// Arguments for the `eigenpay params` subcommand.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Emit compact JSON instead of pretty-printed.
    #[arg(long)]
    pub compact: bool,
}

/// Execute the params subcommand.
pub fn run_params(args: &ParamsArgs, config: Option<&Path>) -> Result<u8> {
    let params = DisputeParams::load(config).context("failed to load parameters")?;
    let rendered = if args.compact {
        serde_json::to_string(&params)?
    } else {
        serde_json::to_string_pretty(&params)?
    };
    println!("{rendered}");
    Ok(0)
}
