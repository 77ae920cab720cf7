//! # Validate Subcommand
//!
//! Parses a report, typing its subject from `subjectRefType` or from
//! `--shape`, and prints the violations of subject and report as JSON:
//!
//! ```json
//! {
//!   "valid": false,
//!   "subject": [],
//!   "report": [{"instanceLocation": "", "keyword": "required", "message": "..."}]
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use idreport_report::{ReportDocument, ReportResolver, ReportValidation, SubjectShape};
use idreport_schema::ValidationResult;

use crate::config::Config;
use crate::{read_input_string, EXIT_INVALID, EXIT_OK};

/// Arguments for the `idreport validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Report file, or `-` for standard input.
    pub file: PathBuf,

    /// Subject shape to use instead of the report's `subjectRefType`.
    #[arg(long)]
    pub shape: Option<ShapeArg>,
}

/// Built-in subject shapes selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    /// Person identified with an eID card.
    EidCard,
    /// Person with given and family name only.
    FinkMinimal,
}

impl From<ShapeArg> for SubjectShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::EidCard => SubjectShape::EidCard,
            ShapeArg::FinkMinimal => SubjectShape::FinkMinimal,
        }
    }
}

/// Printed validation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutput {
    pub valid: bool,
    /// Absent when the report has no typed subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<ValidationResult>,
    pub report: ValidationResult,
}

impl From<ReportValidation> for ValidationOutput {
    fn from(validation: ReportValidation) -> Self {
        Self {
            valid: validation.is_valid(),
            subject: validation.subject,
            report: validation.report,
        }
    }
}

impl ValidationOutput {
    /// Exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        if self.valid {
            EXIT_OK
        } else {
            EXIT_INVALID
        }
    }
}

/// Parse `json` as a report and validate it.
pub fn parse_and_validate(
    resolver: &ReportResolver,
    json: &str,
    shape: Option<&SubjectShape>,
    origin: &Path,
) -> Result<(ReportDocument, ValidationOutput)> {
    let report = match shape {
        Some(shape) => resolver.parse_as(json, shape),
        None => resolver.parse_auto(json),
    }
    .with_context(|| format!("failed to parse report {}", origin.display()))?;
    let validation = resolver
        .validate(&report)
        .with_context(|| format!("failed to validate report {}", origin.display()))?;
    Ok((report, validation.into()))
}

/// Validate the file named in `args`.
pub fn validate_file(args: &ValidateArgs, config: &Config) -> Result<ValidationOutput> {
    let json = read_input_string(&args.file)?;
    let shape = args.shape.map(SubjectShape::from);
    let (_, output) = parse_and_validate(&config.resolver(), &json, shape.as_ref(), &args.file)?;
    Ok(output)
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &Config) -> Result<u8> {
    let output = validate_file(args, config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(output.exit_code())
}
