//! # Report Document
//!
//! The identification report: who was identified, by whom, when, and how
//! strongly. The subject payload is typed by
//! [`ReportResolver`](crate::ReportResolver); deserializing a
//! `ReportDocument` directly never types the subject and leaves any
//! `subjectRef` in [`ReportDocument::additional_properties`].
//!
//! ## Wire Format
//!
//! A flat JSON object in camelCase. Absent optional fields are omitted, a
//! level of assurance of `Unknown` is omitted, and unknown top-level
//! properties are written back at the top level.

use idreport_core::{ParseError, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::level::{IdStatus, LevelOfAssurance};
use crate::subject::SubjectRef;

/// A document reference: an id, a name and an optional hash.
pub type DocumentReference = Map<String, Value>;

/// An identification report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    /// Unique per report; a UUID is recommended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,

    /// The issuing software instance: host name, IP address or endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_identity: Option<String>,

    /// When this report was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_time: Option<Timestamp>,

    /// When the identification took place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_time: Option<Timestamp>,

    /// How the subject was authenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_framework: Option<String>,

    #[serde(default, skip_serializing_if = "LevelOfAssurance::is_unknown")]
    pub level_of_assurance: LevelOfAssurance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_status: Option<IdStatus>,

    /// Human-readable detail for `id_status`, e.g. the failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_statement: Option<String>,

    /// Schema id of the `subjectRef` payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_ref_type: Option<String>,

    /// The identified subject.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub subject_ref: Option<SubjectRef>,

    /// Context strings linking the report to the service that requested
    /// the identification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_information: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_references: Option<Vec<DocumentReference>>,

    /// Top-level properties not named above.
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

impl ReportDocument {
    /// The report as a JSON value.
    pub fn to_json(&self) -> Result<Value, ParseError> {
        Ok(serde_json::to_value(self)?)
    }

    /// The report as compact JSON text.
    pub fn to_json_string(&self) -> Result<String, ParseError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl std::fmt::Display for ReportDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::FinkPersonRefMinimal;
    use serde_json::json;

    #[test]
    fn test_empty_report_serializes_to_empty_object() {
        assert_eq!(ReportDocument::default().to_json().unwrap(), json!({}));
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let report = ReportDocument {
            report_id: Some("r-1".to_string()),
            server_identity: Some("https://idp.example".to_string()),
            report_time: Some(Timestamp::parse("2020-06-25T10:20:39.5Z").unwrap()),
            level_of_assurance: LevelOfAssurance::BsiEidHigh,
            id_status: Some(IdStatus::Failure),
            subject_ref_type: Some("urn:x".to_string()),
            subject_ref: Some(
                FinkPersonRefMinimal {
                    family_name: Some("Doe".to_string()),
                    ..Default::default()
                }
                .into(),
            ),
            context_information: Some(vec!["tx-1".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            report.to_json().unwrap(),
            json!({
                "reportId": "r-1",
                "serverIdentity": "https://idp.example",
                "reportTime": "2020-06-25T10:20:39.500Z",
                "levelOfAssurance": "http://bsi.bund.de/eID/LoA/hoch",
                "idStatus": "FAILURE",
                "subjectRefType": "urn:x",
                "subjectRef": {"familyName": "Doe"},
                "contextInformation": ["tx-1"]
            })
        );
    }

    #[test]
    fn test_unknown_properties_are_flattened_back() {
        let report: ReportDocument = serde_json::from_value(json!({
            "reportId": "r-2",
            "customerNumber": 4711,
            "audit": {"by": "ops"}
        }))
        .unwrap();
        assert_eq!(report.additional_properties.len(), 2);
        let back = report.to_json().unwrap();
        assert_eq!(back["customerNumber"], 4711);
        assert_eq!(back["audit"]["by"], "ops");
    }

    #[test]
    fn test_direct_deserialize_leaves_subject_untyped() {
        let report: ReportDocument =
            serde_json::from_value(json!({"subjectRef": {"givenName": "A"}})).unwrap();
        assert!(report.subject_ref.is_none());
        assert_eq!(report.additional_properties["subjectRef"]["givenName"], "A");
    }

    #[test]
    fn test_level_of_assurance_null_and_absent() {
        let absent: ReportDocument = serde_json::from_value(json!({})).unwrap();
        let null: ReportDocument = serde_json::from_value(json!({"levelOfAssurance": null})).unwrap();
        let unknown: ReportDocument =
            serde_json::from_value(json!({"levelOfAssurance": "unknown"})).unwrap();
        for report in [&absent, &null, &unknown] {
            assert_eq!(report.level_of_assurance, LevelOfAssurance::Unknown);
            assert!(report.to_json().unwrap().get("levelOfAssurance").is_none());
        }
    }

    #[test]
    fn test_display_is_json() {
        let report = ReportDocument {
            report_id: Some("r-3".to_string()),
            ..Default::default()
        };
        assert_eq!(report.to_string(), r#"{"reportId":"r-3"}"#);
    }
}
