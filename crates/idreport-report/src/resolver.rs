//! # Report Resolver
//!
//! Turns report JSON into a [`ReportDocument`] with a typed subject.
//!
//! ## Shape Resolution
//!
//! [`ReportResolver::parse_auto`] reads `subjectRefType` and asks the
//! registry which [`SubjectShape`] it denotes:
//!
//! | discriminator        | payload | result                                   |
//! |----------------------|---------|------------------------------------------|
//! | registered           | present | subject typed as the registered shape    |
//! | registered           | absent  | no subject                               |
//! | unregistered         | present | [`ReportError::UnregisteredSchemaId`]    |
//! | unregistered         | absent  | no subject                               |
//! | absent               | present | payload kept untyped in the property bag |
//! | absent               | absent  | no subject                               |
//!
//! A `null` payload counts as absent. [`ReportResolver::parse_as`] skips the
//! lookup and uses the caller's shape.
//!
//! ## Validation
//!
//! [`ReportResolver::validate`] checks the subject against its own schema
//! and the whole report against the report schema, and returns both results.

use std::sync::Arc;

use idreport_core::{ErrorKind, ParseError};
use idreport_schema::{SchemaError, ValidationResult};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::catalog::{builtin_registry, locations, ReportRegistry};
use crate::report::ReportDocument;
use crate::subject::{SubjectRef, SubjectShape};

const SUBJECT_REF: &str = "subjectRef";
const SUBJECT_REF_TYPE: &str = "subjectRefType";

/// Error while resolving or validating a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The discriminator names a schema id with no registered shape while a
    /// subject payload is present.
    #[error(
        "unregistered schema with id '{0}' found; register the schema first with its \
         corresponding subject shape"
    )]
    UnregisteredSchemaId(String),

    /// Malformed JSON or JSON of the wrong shape.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A schema could not be loaded or compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ReportError {
    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnregisteredSchemaId(_) => ErrorKind::Configuration,
            Self::Parse(e) => e.kind(),
            Self::Schema(e) => e.kind(),
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(ParseError::Json(e))
    }
}

/// Validation results for a report and its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportValidation {
    /// Result for the subject against its own schema; `None` without a
    /// typed subject.
    pub subject: Option<ValidationResult>,
    /// Result for the whole report against the report schema.
    pub report: ValidationResult,
}

impl ReportValidation {
    /// True when neither the subject nor the report has violations.
    pub fn is_valid(&self) -> bool {
        self.report.is_valid() && self.subject.as_ref().map_or(true, ValidationResult::is_valid)
    }
}

/// Parses and validates reports against a shared schema registry.
#[derive(Debug, Clone)]
pub struct ReportResolver {
    registry: Arc<ReportRegistry>,
}

impl Default for ReportResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReportResolver {
    /// A resolver over `registry`.
    pub fn new(registry: Arc<ReportRegistry>) -> Self {
        Self { registry }
    }

    /// A resolver over the embedded schemas and built-in shapes.
    pub fn builtin() -> Self {
        Self::new(Arc::new(builtin_registry()))
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<ReportRegistry> {
        &self.registry
    }

    /// Map a schema id to a shape; the last registration wins.
    pub fn register_shape(&self, schema_id: impl Into<String>, shape: SubjectShape) {
        self.registry.register_type(schema_id, shape);
    }

    /// The declared schema id of a shape's schema, read once and cached.
    pub fn schema_id(&self, shape: &SubjectShape) -> Result<Option<String>, ReportError> {
        Ok(self.registry.schema_id(shape.schema_location())?)
    }

    /// Parse report JSON, typing the subject from `subjectRefType`.
    pub fn parse_auto(&self, json: &str) -> Result<ReportDocument, ReportError> {
        self.parse_auto_value(serde_json::from_str(json)?)
    }

    /// [`parse_auto`](Self::parse_auto) for an already parsed value.
    pub fn parse_auto_value(&self, value: Value) -> Result<ReportDocument, ReportError> {
        let mut object = into_object(value, "identification report")?;
        drop_null_subject(&mut object);

        let discriminator = object
            .get(SUBJECT_REF_TYPE)
            .and_then(Value::as_str)
            .map(str::to_string);
        let shape = discriminator
            .as_deref()
            .and_then(|id| self.registry.resolve_type(id));
        let payload_present = object.contains_key(SUBJECT_REF);

        match (shape, discriminator) {
            (Some(shape), _) => attach_subject(object, &shape),
            (None, Some(id)) if payload_present => Err(ReportError::UnregisteredSchemaId(id)),
            (None, discriminator) => {
                if payload_present {
                    tracing::debug!("report has a subject but no subjectRefType; keeping it untyped");
                } else if let Some(id) = discriminator {
                    tracing::debug!(subject_ref_type = %id, "report has no subject to type");
                }
                Ok(serde_json::from_value(Value::Object(object))?)
            }
        }
    }

    /// Parse report JSON, typing the subject as `shape`.
    pub fn parse_as(&self, json: &str, shape: &SubjectShape) -> Result<ReportDocument, ReportError> {
        self.parse_as_value(serde_json::from_str(json)?, shape)
    }

    /// [`parse_as`](Self::parse_as) for an already parsed value.
    pub fn parse_as_value(
        &self,
        value: Value,
        shape: &SubjectShape,
    ) -> Result<ReportDocument, ReportError> {
        let mut object = into_object(value, "identification report")?;
        drop_null_subject(&mut object);
        attach_subject(object, shape)
    }

    /// Validate a subject against its own schema.
    pub fn validate_subject(&self, subject: &SubjectRef) -> Result<ValidationResult, ReportError> {
        Ok(self
            .registry
            .validate_serializable(subject.schema_location(), subject)?)
    }

    /// Validate the subject (if typed) and then the whole report.
    pub fn validate(&self, report: &ReportDocument) -> Result<ReportValidation, ReportError> {
        let subject = report
            .subject_ref
            .as_ref()
            .map(|subject| self.validate_subject(subject))
            .transpose()?;
        let report = self
            .registry
            .validate_serializable(locations::IDENTIFICATION_REPORT, report)?;
        Ok(ReportValidation { subject, report })
    }

    /// Validate and reduce to a boolean, logging each violation at `info`.
    pub fn is_valid(&self, report: &ReportDocument) -> Result<bool, ReportError> {
        if let Some(subject) = &report.subject_ref {
            if !self.registry.is_valid(subject.schema_location(), &subject.to_json()?)? {
                return Ok(false);
            }
        }
        Ok(self
            .registry
            .is_valid(locations::IDENTIFICATION_REPORT, &report.to_json()?)?)
    }
}

fn into_object(value: Value, what: &str) -> Result<Map<String, Value>, ParseError> {
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(ParseError::NotAnObject(what.to_string())),
    }
}

fn drop_null_subject(object: &mut Map<String, Value>) {
    if matches!(object.get(SUBJECT_REF), Some(Value::Null)) {
        object.remove(SUBJECT_REF);
    }
}

fn attach_subject(
    mut object: Map<String, Value>,
    shape: &SubjectShape,
) -> Result<ReportDocument, ReportError> {
    let payload = object.remove(SUBJECT_REF);
    let mut report: ReportDocument = serde_json::from_value(Value::Object(object))?;
    report.subject_ref = payload.map(|p| shape.deserialize(p)).transpose()?;
    Ok(report)
}
