//! # Subject Shapes
//!
//! The `subjectRef` slot of a report holds one of several payload shapes.
//! Which one is decided by [`SubjectShape`], either looked up from the
//! report's `subjectRefType` or supplied by the caller.
//!
//! Every shape keeps properties it does not know in an open map and writes
//! them back out flattened, so a subject survives a parse/serialize cycle
//! unchanged even when its schema would reject the extras.

use idreport_core::ParseError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::locations;

/// Postal address, or a statement that no structured address exists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    /// Unstructured place description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text_place: Option<String>,
    /// Reason no place information is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_place_info: Option<String>,
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

/// A person identified with an eID card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EidCardPersonRef {
    /// Service-specific pseudonym read from the card (64 hex digits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// `[[D]D-][M]M-YYYY`, parts may be omitted from the left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_residence: Option<Address>,
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

/// The minimal person reference: given and family name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinkPersonRefMinimal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

/// A shape registered at runtime: a name and the schema that describes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomShape {
    name: String,
    schema_location: String,
}

impl CustomShape {
    /// A custom shape validated by the schema at `schema_location`.
    pub fn new(name: impl Into<String>, schema_location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_location: schema_location.into(),
        }
    }

    /// The shape name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the shape's schema is found.
    pub fn schema_location(&self) -> &str {
        &self.schema_location
    }
}

/// A subject of a custom shape, kept as an untyped JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomSubject {
    #[serde(skip)]
    pub shape: CustomShape,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// The shape tag the schema registry maps schema ids to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectShape {
    /// [`EidCardPersonRef`].
    EidCard,
    /// [`FinkPersonRefMinimal`].
    FinkMinimal,
    /// A runtime-registered shape.
    Custom(CustomShape),
}

impl SubjectShape {
    /// The shape name.
    pub fn name(&self) -> &str {
        match self {
            Self::EidCard => "eid-card",
            Self::FinkMinimal => "fink-minimal",
            Self::Custom(custom) => custom.name(),
        }
    }

    /// Location of the schema that validates this shape.
    pub fn schema_location(&self) -> &str {
        match self {
            Self::EidCard => locations::EID_CARD,
            Self::FinkMinimal => locations::FINK_MINIMAL,
            Self::Custom(custom) => custom.schema_location(),
        }
    }

    /// Deserialize a `subjectRef` payload into this shape.
    pub fn deserialize(&self, payload: Value) -> Result<SubjectRef, ParseError> {
        let Value::Object(properties) = payload else {
            return Err(ParseError::NotAnObject("subjectRef".to_string()));
        };
        let subject = match self {
            Self::EidCard => SubjectRef::EidCard(serde_json::from_value(Value::Object(properties))?),
            Self::FinkMinimal => {
                SubjectRef::FinkMinimal(serde_json::from_value(Value::Object(properties))?)
            }
            Self::Custom(shape) => SubjectRef::Custom(CustomSubject {
                shape: shape.clone(),
                properties,
            }),
        };
        Ok(subject)
    }
}

impl std::str::FromStr for SubjectShape {
    type Err = String;

    /// Parses the built-in shape names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eid-card" => Ok(Self::EidCard),
            "fink-minimal" => Ok(Self::FinkMinimal),
            other => Err(format!(
                "unknown subject shape '{other}' (expected 'eid-card' or 'fink-minimal')"
            )),
        }
    }
}

/// A typed `subjectRef` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubjectRef {
    EidCard(EidCardPersonRef),
    FinkMinimal(FinkPersonRefMinimal),
    Custom(CustomSubject),
}

impl SubjectRef {
    /// The shape of this subject.
    pub fn shape(&self) -> SubjectShape {
        match self {
            Self::EidCard(_) => SubjectShape::EidCard,
            Self::FinkMinimal(_) => SubjectShape::FinkMinimal,
            Self::Custom(custom) => SubjectShape::Custom(custom.shape.clone()),
        }
    }

    /// Location of the schema that validates this subject.
    pub fn schema_location(&self) -> &str {
        match self {
            Self::EidCard(_) => locations::EID_CARD,
            Self::FinkMinimal(_) => locations::FINK_MINIMAL,
            Self::Custom(custom) => custom.shape.schema_location(),
        }
    }

    /// The eID card subject, if that is the shape.
    pub fn as_eid_card(&self) -> Option<&EidCardPersonRef> {
        match self {
            Self::EidCard(subject) => Some(subject),
            _ => None,
        }
    }

    /// The minimal person subject, if that is the shape.
    pub fn as_fink_minimal(&self) -> Option<&FinkPersonRefMinimal> {
        match self {
            Self::FinkMinimal(subject) => Some(subject),
            _ => None,
        }
    }

    /// The subject as a JSON value.
    pub fn to_json(&self) -> Result<Value, ParseError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl From<EidCardPersonRef> for SubjectRef {
    fn from(subject: EidCardPersonRef) -> Self {
        Self::EidCard(subject)
    }
}

impl From<FinkPersonRefMinimal> for SubjectRef {
    fn from(subject: FinkPersonRefMinimal) -> Self {
        Self::FinkMinimal(subject)
    }
}
