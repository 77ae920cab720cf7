//! # idreport CLI entry point
//!
//! Parses command-line arguments, loads the configuration, initializes
//! tracing and dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use idreport_cli::config::Config;
use idreport_cli::inspect::{run_inspect_key, InspectKeyArgs};
use idreport_cli::sign::{run_sign, SignArgs};
use idreport_cli::validate::{run_validate, ValidateArgs};
use idreport_cli::verify::{run_verify, VerifyArgs};
use idreport_cli::{exit_code, EXIT_CONFIGURATION};

/// Identification report toolchain.
///
/// Signs identification reports into compact JWS tokens, verifies them
/// against certificates, and validates reports against their schemas.
#[derive(Parser, Debug)]
#[command(name = "idreport", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign a payload into a compact JWS.
    Sign(SignArgs),

    /// Verify a compact JWS and print its payload.
    Verify(VerifyArgs),

    /// Validate a report and print its violations as JSON.
    Validate(ValidateArgs),

    /// Show key type, algorithm and thumbprint of a certificate.
    InspectKey(InspectKeyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_optional(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };

    init_tracing(log_filter(cli.verbose, config.log_filter.as_deref()), cli.json_logs);
    tracing::debug!(config = ?cli.config, "idreport starting");

    let result = match &cli.command {
        Commands::Sign(args) => run_sign(args, &config),
        Commands::Verify(args) => run_verify(args, &config),
        Commands::Validate(args) => run_validate(args, &config),
        Commands::InspectKey(args) => run_inspect_key(args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// `RUST_LOG` wins, then `-v` flags, then the configured filter.
fn log_filter(verbose: u8, configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match (verbose, configured) {
        (0, Some(directives)) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("warning: ignoring log_filter '{directives}': {e}");
            EnvFilter::new("warn")
        }),
        (0, None) => EnvFilter::new("warn"),
        (1, _) => EnvFilter::new("info"),
        (2, _) => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Logs go to standard error; standard output carries command results.
fn init_tracing(filter: EnvFilter, json: bool) {
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
