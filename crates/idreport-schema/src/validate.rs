//! # Schema Validation
//!
//! Runs a cached compiled schema against a JSON document and returns every
//! violation found.
//!
//! Non-conformance is not an error: [`SchemaRegistry::validate`] returns a
//! [`ValidationResult`] that may be empty or not. Errors are reserved for
//! schemas that cannot be loaded and documents that cannot be turned into
//! JSON.
//!
//! ## Wire Format
//!
//! A violation serializes as `{"instanceLocation", "keyword", "message"}`.
//! The instance location is a JSON Pointer (`""` is the document root).

use std::fmt;

use idreport_core::ParseError;
use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;
use crate::registry::SchemaRegistry;

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_location: String,
    /// The schema keyword that failed (`required`, `pattern`, ...).
    pub keyword: String,
    /// Human-readable English description.
    pub message: String,
    /// JSON Pointer to the failing keyword within the schema.
    #[serde(skip)]
    pub schema_path: String,
    /// The offending property for `required` and `additionalProperties`.
    #[serde(skip)]
    pub property: Option<String>,
}

impl Violation {
    fn from_error(error: &ValidationError<'_>) -> Self {
        let schema_path = error.schema_path.to_string();
        let keyword = schema_path
            .rsplit('/')
            .find(|segment| !segment.is_empty() && !segment.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or("")
            .to_string();
        let property = match &error.kind {
            ValidationErrorKind::Required { property } => Some(match property {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            }),
            ValidationErrorKind::AdditionalProperties { unexpected } => Some(unexpected.join(", ")),
            _ => None,
        };
        Self {
            instance_location: error.instance_path.to_string(),
            keyword,
            message: error.to_string(),
            schema_path,
            property,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_location.is_empty() {
            write!(f, "(root) [{}]: {}", self.keyword, self.message)
        } else {
            write!(f, "{} [{}]: {}", self.instance_location, self.keyword, self.message)
        }
    }
}

/// The violations found in one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    violations: Vec<Violation>,
}

impl ValidationResult {
    /// True when no violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Same as [`is_valid`](Self::is_valid).
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violations, in the order the validator reported them.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations for a given keyword.
    pub fn with_keyword<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.keyword == keyword)
    }

    /// Consumes self and returns the inner list.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl<T: Clone> SchemaRegistry<T> {
    /// Validate `document` against the schema at `location`.
    pub fn validate(&self, location: &str, document: &Value) -> Result<ValidationResult, SchemaError> {
        let schema = self.get_schema(location)?;
        let violations = schema
            .validator()
            .iter_errors(document)
            .map(|e| Violation::from_error(&e))
            .collect();
        Ok(ValidationResult { violations })
    }

    /// Validate and reduce to a boolean, logging each violation at `info`.
    pub fn is_valid(&self, location: &str, document: &Value) -> Result<bool, SchemaError> {
        let result = self.validate(location, document)?;
        for violation in result.violations() {
            tracing::info!(
                schema = location,
                instance_location = %violation.instance_location,
                keyword = %violation.keyword,
                "{}",
                violation.message
            );
        }
        Ok(result.is_valid())
    }

    /// Serialize `value` to JSON and validate it.
    pub fn validate_serializable<S: Serialize + ?Sized>(
        &self,
        location: &str,
        value: &S,
    ) -> Result<ValidationResult, SchemaError> {
        let document = serde_json::to_value(value).map_err(ParseError::from)?;
        self.validate(location, &document)
    }
}
