//! # Inspect-Key Subcommand
//!
//! Shows what a certificate would sign with: key type, curve, length, the
//! selected JWS algorithm and the `x5t#S256` thumbprint. A certificate whose
//! key cannot sign is still described; the reason is printed and the exit
//! code is the cryptographic one.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use idreport_crypto::{select_algorithm, sha256_thumbprint, Certificate, PublicKey};

use crate::config::Config;
use crate::{EXIT_CRYPTOGRAPHIC, EXIT_OK};

/// Arguments for the `idreport inspect-key` subcommand.
#[derive(Args, Debug)]
pub struct InspectKeyArgs {
    /// PEM certificate to inspect.
    #[arg(long)]
    pub cert: Option<PathBuf>,
}

/// Description of a certificate's signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    pub subject: String,
    pub key_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_length: Option<usize>,
    /// `None` when the key is unsupported.
    pub algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsupported: Option<String>,
    pub thumbprint: String,
}

impl KeyInfo {
    /// Describe `certificate`.
    pub fn describe(certificate: &Certificate) -> Self {
        let public_key = certificate.public_key();
        let curve = match public_key {
            PublicKey::Ec { curve, .. } => Some(curve.name().to_string()),
            _ => None,
        };
        let (algorithm, unsupported) = match select_algorithm(public_key) {
            Ok(algorithm) => (Some(algorithm.as_str().to_string()), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            subject: certificate.subject().to_string(),
            key_type: public_key.algorithm().to_string(),
            curve,
            bit_length: public_key.bit_length(),
            algorithm,
            unsupported,
            thumbprint: sha256_thumbprint(certificate).to_base64url(),
        }
    }

    /// Exit code for this description.
    pub fn exit_code(&self) -> u8 {
        if self.algorithm.is_some() {
            EXIT_OK
        } else {
            EXIT_CRYPTOGRAPHIC
        }
    }
}

/// Describe the certificate named by `args` or the config.
pub fn inspect_key(args: &InspectKeyArgs, config: &Config) -> Result<KeyInfo> {
    let key = config.verification_key(args.cert.as_deref())?;
    Ok(KeyInfo::describe(key.certificate()))
}

/// Execute the inspect-key subcommand.
pub fn run_inspect_key(args: &InspectKeyArgs, config: &Config) -> Result<u8> {
    let info = inspect_key(args, config)?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(info.exit_code())
}
