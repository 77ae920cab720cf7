//! # Report Parsing & Validation Against Fixture Documents

use std::path::PathBuf;

use idreport_core::Timestamp;
use idreport_report::catalog::{ids, locations};
use idreport_report::{
    Address, EidCardPersonRef, IdStatus, LevelOfAssurance, ReportDocument, ReportResolver,
    SubjectRef, SubjectShape,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

const RESTRICTED_ID: &str = "1234567890123456789012345678901234567890123456789012345678901234";

fn eid_subject() -> EidCardPersonRef {
    EidCardPersonRef {
        restricted_id: Some(RESTRICTED_ID.to_string()),
        given_name: Some("Max".to_string()),
        family_name: Some("Mustermann".to_string()),
        date_of_birth: Some("01-01-1999".to_string()),
        place_of_birth: Some("Bremen".to_string()),
        birth_name: Some("Liebmann".to_string()),
        ..Default::default()
    }
}

fn subject_is_valid(resolver: &ReportResolver, subject: EidCardPersonRef) -> bool {
    resolver
        .validate_subject(&SubjectRef::EidCard(subject))
        .unwrap()
        .is_valid()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn eid_report_values_are_read() {
    let report = ReportResolver::builtin()
        .parse_auto(&fixture("identification-report-2.0.json"))
        .unwrap();

    assert_eq!(report.report_id.as_deref(), Some("be4f9806-0b5f-45c3-a008-96fd2750f8cb"));
    assert_eq!(
        report.server_identity.as_deref(),
        Some("https://test.governikus-eid.de/gov_autent/async")
    );
    assert_eq!(report.report_time, Some(Timestamp::parse("2020-06-25T10:20:39Z").unwrap()));
    assert_eq!(
        report.identification_time,
        Some(Timestamp::parse("2020-06-25T10:19:54Z").unwrap())
    );
    assert_eq!(
        report.id_statement.as_deref(),
        Some("successful identification sent by SAML-Assertion")
    );
    assert_eq!(report.id_status, Some(IdStatus::Success));
    assert_eq!(report.level_of_assurance, LevelOfAssurance::EidasHigh);

    let subject = report.subject_ref.as_ref().unwrap().as_eid_card().unwrap();
    assert_eq!(subject.given_name.as_deref(), Some("John"));
    assert_eq!(subject.family_name.as_deref(), Some("Doe"));
    assert!(report.additional_properties.is_empty());
}

#[test]
fn legacy_discriminator_resolves_to_eid_card() {
    let mut doc: Value = serde_json::from_str(&fixture("identification-report-2.0.json")).unwrap();
    doc["subjectRefType"] = json!(ids::LEGACY_EID_CARD);
    let report = ReportResolver::builtin().parse_auto_value(doc).unwrap();
    assert_eq!(report.subject_ref.unwrap().shape(), SubjectShape::EidCard);
}

#[test]
fn legacy_fink_discriminator_resolves() {
    let report = ReportResolver::builtin()
        .parse_auto(&fixture("fink-user-account-minimal-report.json"))
        .unwrap();
    let subject = report.subject_ref.as_ref().unwrap().as_fink_minimal().unwrap();
    assert_eq!(subject.given_name.as_deref(), Some("Max"));
    assert_eq!(report.level_of_assurance, LevelOfAssurance::EidasNotNotifiedSubstantial);
}

#[test]
fn explicit_shape_parses_every_fixture() {
    let resolver = ReportResolver::builtin();
    for (name, shape) in [
        ("identification-report-2.0.json", SubjectShape::EidCard),
        ("fink-user-account-minimal-report.json", SubjectShape::FinkMinimal),
        ("report-with-extensions.json", SubjectShape::FinkMinimal),
    ] {
        let report = resolver.parse_as(&fixture(name), &shape).unwrap();
        assert_eq!(report.subject_ref.as_ref().unwrap().shape(), shape, "{name}");
        let validation = resolver.validate(&report).unwrap();
        assert!(validation.is_valid(), "{name}: {validation:?}");
        assert!(validation.subject.is_some());
    }
}

#[test]
fn unregistered_discriminator_fails_only_with_payload() {
    let resolver = ReportResolver::builtin();
    let mut doc: Value = serde_json::from_str(&fixture("identification-report-2.0.json")).unwrap();
    doc["subjectRefType"] = json!("https://example.org/schemas/passport.json");
    assert!(resolver.parse_auto_value(doc.clone()).is_err());

    doc.as_object_mut().unwrap().remove("subjectRef");
    let report = resolver.parse_auto_value(doc).unwrap();
    assert!(report.subject_ref.is_none());
    assert!(resolver.validate(&report).unwrap().is_valid());
}

#[test]
fn level_of_assurance_values_are_deserializable() {
    let resolver = ReportResolver::builtin();
    let cases = [
        (json!("http://eidas.europa.eu/LoA/high"), LevelOfAssurance::EidasHigh),
        (json!("http://eidas.europa.eu/LoA/substantial"), LevelOfAssurance::EidasSubstantial),
        (json!("http://eidas.europa.eu/LoA/low"), LevelOfAssurance::EidasLow),
        (json!("http://eidas.europa.eu/NotNotified/LoA/high"), LevelOfAssurance::EidasNotNotifiedHigh),
        (
            json!("http://eidas.europa.eu/NotNotified/LoA/substantial"),
            LevelOfAssurance::EidasNotNotifiedSubstantial,
        ),
        (json!("http://eidas.europa.eu/NotNotified/LoA/low"), LevelOfAssurance::EidasNotNotifiedLow),
        (json!("http://bsi.bund.de/eID/LoA/hoch"), LevelOfAssurance::BsiEidHigh),
        (json!("http://bsi.bund.de/eID/LoA/substantiell"), LevelOfAssurance::BsiEidSubstantial),
        (json!("http://bsi.bund.de/eID/LoA/normal"), LevelOfAssurance::BsiEidLow),
        (json!("unknown"), LevelOfAssurance::Unknown),
        (Value::Null, LevelOfAssurance::Unknown),
    ];
    for (value, expected) in cases {
        let report = resolver
            .parse_auto_value(json!({ "levelOfAssurance": value }))
            .unwrap();
        assert_eq!(report.level_of_assurance, expected);
    }
}

// ---------------------------------------------------------------------------
// Report schema
// ---------------------------------------------------------------------------

#[test]
fn fixtures_validate_against_report_schema() {
    let resolver = ReportResolver::builtin();
    for name in [
        "identification-report-2.0.json",
        "identification-report-without-subject.json",
        "fink-user-account-minimal-report.json",
        "report-with-extensions.json",
    ] {
        let doc: Value = serde_json::from_str(&fixture(name)).unwrap();
        assert!(
            resolver.registry().is_valid(locations::IDENTIFICATION_REPORT, &doc).unwrap(),
            "{name}"
        );
    }
}

#[test]
fn custom_document_reference_property_is_rejected() {
    let resolver = ReportResolver::builtin();
    let report = ReportDocument {
        report_id: Some("7d0b3c1e-2c44-4d52-8c0b-5f7b0a1c2d3e".to_string()),
        server_identity: Some("https://test.governikus-eid.de/gov_autent/async".to_string()),
        report_time: Some(Timestamp::now()),
        identification_time: Some(Timestamp::now()),
        level_of_assurance: LevelOfAssurance::EidasLow,
        document_references: Some(vec![serde_json::from_value(json!({
            "documentId": "0f3e",
            "documentName": "test.pdf",
            "customField": "unwanted property"
        }))
        .unwrap()]),
        ..Default::default()
    };

    let validation = resolver.validate(&report).unwrap();
    assert!(!validation.is_valid());
    let violations = validation.report.violations();
    assert!(violations
        .iter()
        .any(|v| v.instance_location.contains("documentReferences")));
    assert!(violations
        .iter()
        .any(|v| v.property.as_deref() == Some("customField")));
}

// ---------------------------------------------------------------------------
// eID card subject schema
// ---------------------------------------------------------------------------

#[test]
fn empty_eid_subject_is_rejected() {
    assert!(!subject_is_valid(&ReportResolver::builtin(), EidCardPersonRef::default()));
}

#[test]
fn restricted_id_alone_is_enough() {
    let subject = EidCardPersonRef {
        restricted_id: Some(RESTRICTED_ID.to_string()),
        ..Default::default()
    };
    assert!(subject_is_valid(&ReportResolver::builtin(), subject));
}

#[test]
fn single_address_forms_are_accepted() {
    let resolver = ReportResolver::builtin();
    for address in [
        Address {
            free_text_place: Some("street 1".to_string()),
            ..Default::default()
        },
        Address {
            no_place_info: Some("nowhere".to_string()),
            ..Default::default()
        },
        Address {
            street: Some("some street".to_string()),
            city: Some("Bremen".to_string()),
            ..Default::default()
        },
    ] {
        let subject = EidCardPersonRef {
            place_of_residence: Some(address.clone()),
            ..eid_subject()
        };
        assert!(subject_is_valid(&resolver, subject), "{address:?}");
    }
}

#[test]
fn mixed_address_forms_are_rejected() {
    let resolver = ReportResolver::builtin();
    for address in [
        Address {
            street: Some("some street".to_string()),
            city: Some("Bremen".to_string()),
            no_place_info: Some("nowhere".to_string()),
            ..Default::default()
        },
        Address {
            street: Some("street 1".to_string()),
            locality: Some("bremen".to_string()),
            region: Some("bremen".to_string()),
            country: Some("D".to_string()),
            zip_code: Some("22222".to_string()),
            no_place_info: Some("nowhere".to_string()),
            free_text_place: Some("somewhere".to_string()),
            ..Default::default()
        },
    ] {
        let subject = EidCardPersonRef {
            place_of_residence: Some(address),
            ..eid_subject()
        };
        assert!(!subject_is_valid(&resolver, subject));
    }
}

#[test]
fn partial_dates_of_birth_are_accepted() {
    let resolver = ReportResolver::builtin();
    for date in [
        "1-1-1999", "01-1-2000", "1-01-2001", "31-12-2002", "12-2003", "1-2004", "02-2005", "2006",
    ] {
        let subject = EidCardPersonRef {
            date_of_birth: Some(date.to_string()),
            ..eid_subject()
        };
        assert!(subject_is_valid(&resolver, subject), "{date}");
    }
}

#[test]
fn malformed_dates_of_birth_are_rejected() {
    let resolver = ReportResolver::builtin();
    for date in ["1999-01-01", "32-01-2000", "01.01.2000", "99"] {
        let subject = EidCardPersonRef {
            date_of_birth: Some(date.to_string()),
            ..eid_subject()
        };
        assert!(!subject_is_valid(&resolver, subject), "{date}");
    }
}

#[test]
fn unknown_subject_properties_are_kept_but_rejected() {
    let resolver = ReportResolver::builtin();
    let mut subject = EidCardPersonRef {
        place_of_residence: Some(Address {
            free_text_place: Some("somewhere".to_string()),
            ..Default::default()
        }),
        ..eid_subject()
    };
    subject
        .additional_properties
        .insert("custom".to_string(), json!("custom"));
    let subject = SubjectRef::EidCard(subject);

    assert_eq!(subject.to_json().unwrap()["custom"], "custom");
    let result = resolver.validate_subject(&subject).unwrap();
    assert!(!result.is_valid());
    assert_eq!(result.violations()[0].property.as_deref(), Some("custom"));
}

#[test]
fn minimal_person_needs_both_names() {
    let resolver = ReportResolver::builtin();
    let report = resolver
        .parse_as(
            r#"{"subjectRef":{"givenName":"Max","familyName":"Mustermann"}}"#,
            &SubjectShape::FinkMinimal,
        )
        .unwrap();
    let subject = report.subject_ref.unwrap();
    assert!(resolver.validate_subject(&subject).unwrap().is_valid());

    let only_given = SubjectShape::FinkMinimal
        .deserialize(json!({"givenName": "Max"}))
        .unwrap();
    let result = resolver.validate_subject(&only_given).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.violations()[0].property.as_deref(), Some("familyName"));
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn extensions_survive_round_trip() {
    let resolver = ReportResolver::builtin();
    let report = resolver.parse_auto(&fixture("report-with-extensions.json")).unwrap();
    assert_eq!(report.additional_properties["customerNumber"], 4711);
    assert_eq!(report.additional_properties["channel"]["version"], 3);

    let reparsed = resolver.parse_auto(&report.to_json_string().unwrap()).unwrap();
    assert_eq!(reparsed, report);

    let original: Value = serde_json::from_str(&fixture("report-with-extensions.json")).unwrap();
    assert_eq!(report.to_json().unwrap(), original);
}

#[test]
fn every_fixture_round_trips() {
    let resolver = ReportResolver::builtin();
    for name in [
        "identification-report-2.0.json",
        "identification-report-without-subject.json",
        "fink-user-account-minimal-report.json",
        "report-with-extensions.json",
    ] {
        let report = resolver.parse_auto(&fixture(name)).unwrap();
        let reparsed = resolver.parse_auto(&report.to_string()).unwrap();
        assert_eq!(reparsed, report, "{name}");
    }
}

fn level_strategy() -> impl Strategy<Value = LevelOfAssurance> {
    prop::sample::select(LevelOfAssurance::ALL.to_vec())
}

fn extension_strategy() -> impl Strategy<Value = serde_json::Map<String, Value>> {
    prop::collection::btree_map("x[a-z]{1,8}", any::<i64>(), 0..4).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()
    })
}

proptest! {
    #[test]
    fn parse_serialize_parse_is_stable(
        level in level_strategy(),
        millis in 0i64..4_102_444_800_000i64,
        given in "[A-Za-z]{1,12}",
        extensions in extension_strategy(),
    ) {
        let resolver = ReportResolver::builtin();
        let report = ReportDocument {
            report_id: Some("r".to_string()),
            report_time: Some(Timestamp::from_epoch_millis(millis).unwrap()),
            level_of_assurance: level,
            subject_ref_type: Some(ids::FINK_PERSON_REF_MINIMAL.to_string()),
            subject_ref: Some(SubjectShape::FinkMinimal
                .deserialize(json!({"givenName": given}))
                .unwrap()),
            additional_properties: extensions,
            ..Default::default()
        };
        let once = resolver.parse_auto(&report.to_json_string().unwrap()).unwrap();
        prop_assert_eq!(&once, &report);
        let twice = resolver.parse_auto(&once.to_json_string().unwrap()).unwrap();
        prop_assert_eq!(twice, once);
    }
}
