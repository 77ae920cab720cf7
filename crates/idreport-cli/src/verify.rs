//! # Verify Subcommand
//!
//! Verifies a compact JWS against a certificate and prints the payload.
//! With `--validate` the payload is also parsed as a report and validated;
//! the validation outcome goes to standard error so standard output stays
//! the payload alone.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use idreport_crypto::verify;

use crate::config::Config;
use crate::validate::{parse_and_validate, ValidationOutput};
use crate::{read_input_string, EXIT_OK};

/// Arguments for the `idreport verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Token file, or `-` for standard input.
    #[arg(long)]
    pub token: PathBuf,

    /// PEM certificate of the expected signer.
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Parse the payload as a report and validate it.
    #[arg(long)]
    pub validate: bool,
}

/// A verified token.
#[derive(Debug)]
pub struct VerifyOutcome {
    pub payload: String,
    /// Present with `--validate`.
    pub validation: Option<ValidationOutput>,
}

impl VerifyOutcome {
    /// Exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        self.validation
            .as_ref()
            .map_or(EXIT_OK, ValidationOutput::exit_code)
    }
}

/// Verify the token named in `args`.
pub fn verify_token(args: &VerifyArgs, config: &Config) -> Result<VerifyOutcome> {
    let token = read_input_string(&args.token)?;
    let key = config.verification_key(args.cert.as_deref())?;
    let verified = verify(token.trim(), &key)
        .with_context(|| format!("failed to verify {}", args.token.display()))?;
    let payload = verified
        .payload_str()
        .context("verified payload is not UTF-8")?
        .to_string();
    tracing::info!(
        algorithm = %verified.header.alg,
        subject = key.certificate().subject(),
        "signature verified"
    );

    let validation = if args.validate {
        let (_, output) =
            parse_and_validate(&config.resolver(), &payload, None, &args.token)?;
        Some(output)
    } else {
        None
    };
    Ok(VerifyOutcome {
        payload,
        validation,
    })
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs, config: &Config) -> Result<u8> {
    let outcome = verify_token(args, config)?;
    println!("{}", outcome.payload);
    if let Some(validation) = &outcome.validation {
        eprintln!("{}", serde_json::to_string_pretty(validation)?);
    }
    Ok(outcome.exit_code())
}
