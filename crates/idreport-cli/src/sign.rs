//! # Sign Subcommand
//!
//! Signs a payload with the configured certificate and private key and
//! prints the compact JWS. The payload is signed byte for byte; it does not
//! have to be a report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use idreport_crypto::{sign, CompactToken};

use crate::config::Config;
use crate::{read_input, EXIT_OK};

/// Arguments for the `idreport sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Payload file, or `-` for standard input.
    #[arg(long)]
    pub input: PathBuf,

    /// PEM certificate of the signer.
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// PEM PKCS#8 private key matching the certificate.
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Sign the input and return the token.
pub fn sign_input(args: &SignArgs, config: &Config) -> Result<CompactToken> {
    let payload = read_input(&args.input)?;
    let key = config.signing_key(args.cert.as_deref(), args.key.as_deref())?;
    let token = sign(&payload, &key)
        .with_context(|| format!("failed to sign {}", args.input.display()))?;
    tracing::info!(
        subject = key.certificate().subject(),
        bytes = payload.len(),
        "payload signed"
    );
    Ok(token)
}

/// Execute the sign subcommand.
pub fn run_sign(args: &SignArgs, config: &Config) -> Result<u8> {
    println!("{}", sign_input(args, config)?);
    Ok(EXIT_OK)
}
