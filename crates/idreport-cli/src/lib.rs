//! # idreport-cli: Identification Report Command-Line Interface
//!
//! Provides the `idreport` binary.
//!
//! ## Subcommands
//!
//! - `idreport sign`: Sign a payload into a compact JWS.
//! - `idreport verify`: Verify a compact JWS and print its payload.
//! - `idreport validate`: Parse a report and print its violations.
//! - `idreport inspect-key`: Show what a certificate would sign with.
//!
//! ```bash
//! idreport sign --input report.json --cert signer.cert.pem --key signer.key.pem > report.jws
//! idreport verify --token report.jws --cert signer.cert.pem --validate
//! idreport validate report.json --shape eid-card
//! ```
//!
//! ## Exit Codes
//!
//! | code | meaning                                 |
//! |------|-----------------------------------------|
//! | 0    | success                                 |
//! | 1    | the document does not match its schema  |
//! | 2    | configuration or usage error            |
//! | 3    | cryptographic failure                   |
//! | 4    | malformed input                         |
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the command logic. Each command
//!   exposes a function that returns its result and a `run_*` wrapper that
//!   prints it.
//! - Domain work is delegated to the library crates.

pub mod config;
pub mod inspect;
pub mod sign;
pub mod validate;
pub mod verify;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use idreport_core::{CryptoError, ErrorKind, ParseError};
use idreport_report::ReportError;
use idreport_schema::SchemaError;

pub const EXIT_OK: u8 = 0;
pub const EXIT_INVALID: u8 = 1;
pub const EXIT_CONFIGURATION: u8 = 2;
pub const EXIT_CRYPTOGRAPHIC: u8 = 3;
pub const EXIT_PARSE: u8 = 4;

/// Read a file, or standard input when `path` is `-`.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read standard input")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// [`read_input`] as UTF-8 text.
pub fn read_input_string(path: &Path) -> Result<String> {
    let bytes = read_input(path)?;
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
}

/// The kind of the first library error in the cause chain.
pub fn error_kind(error: &anyhow::Error) -> Option<ErrorKind> {
    error.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ReportError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<SchemaError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<CryptoError>() {
            Some(e.kind())
        } else {
            cause.downcast_ref::<ParseError>().map(ParseError::kind)
        }
    })
}

/// Process exit code for a failed command. Errors raised by the CLI itself
/// (missing files, missing flags) count as configuration errors.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    match error_kind(error) {
        Some(ErrorKind::Validation) => EXIT_INVALID,
        Some(ErrorKind::Configuration) | None => EXIT_CONFIGURATION,
        Some(ErrorKind::Cryptographic) => EXIT_CRYPTOGRAPHIC,
        Some(ErrorKind::Parse) => EXIT_PARSE,
    }
}
