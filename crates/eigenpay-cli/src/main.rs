//! # eigenpay CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Logs go to stderr so reports on stdout stay machine-readable.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eigenpay_cli::params::{run_params, ParamsArgs};
use eigenpay_cli::simulate::{run_simulate, SimulateArgs};

/// EigenPay dispute toolkit.
///
/// Inspects protocol parameters and replays payment-claim dispute
/// scenarios against an in-memory stake and signature oracle.
#[derive(Parser, Debug)]
#[command(name = "eigenpay", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when `RUST_LOG` is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML parameter file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the effective protocol parameters.
    Params(ParamsArgs),

    /// Replay a claim and dispute scenario and print its report.
    Simulate(SimulateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "eigenpay CLI starting");

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Params(args) => run_params(&args, config),
        Commands::Simulate(args) => run_simulate(&args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
