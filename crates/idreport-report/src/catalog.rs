//! # Built-in Schema Catalog
//!
//! Schema ids, schema locations and the embedded schema documents for the
//! report and the built-in subject shapes.
//!
//! Locations are registry keys, not file paths. A [`DirectorySource`]
//! mounted at `/schemas/` in front of [`builtin_source`] overrides the
//! embedded documents from disk.
//!
//! [`DirectorySource`]: idreport_schema::DirectorySource

use idreport_schema::{MemorySource, SchemaRegistry, SchemaSource};

use crate::subject::SubjectShape;

/// The schema registry specialised to report subject shapes.
pub type ReportRegistry = SchemaRegistry<SubjectShape>;

/// Declared schema ids.
pub mod ids {
    /// Identification report, version 2.0.0.
    pub const IDENTIFICATION_REPORT: &str =
        "https://raw.githubusercontent.com/Governikus/IdentificationReport/2.0.0/schema/identification-report.json";

    /// eID card person reference.
    pub const EID_CARD_PERSON_REF: &str =
        "https://raw.githubusercontent.com/Governikus/IdReport-SubjectRefSchemas/2.0.0/eid/person-ref-eid-card.json";

    /// Minimal person reference.
    pub const FINK_PERSON_REF_MINIMAL: &str =
        "https://raw.githubusercontent.com/Governikus/IdReport-SubjectRefSchemas/2.0.0/fink/person-ref-minimal-fink.json";

    /// Discriminator used by older reports for the eID card shape.
    pub const LEGACY_EID_CARD: &str =
        "https://raw.githubusercontent.com/Governikus/IdentificationReport/2.0.0/schema/eid-card.json";

    /// Discriminator used by older reports for the minimal person shape.
    pub const LEGACY_FINK_USER_ACCOUNT_MINIMAL: &str =
        "https://raw.githubusercontent.com/Governikus/IdentificationReport/2.0.0/schema/fink-user-account-minimal.json";
}

/// Schema locations (registry keys).
pub mod locations {
    pub const IDENTIFICATION_REPORT: &str = "/schemas/identification-report-schema.json";
    pub const EID_CARD: &str = "/schemas/person-ref-eid-card.json";
    pub const FINK_MINIMAL: &str = "/schemas/person-ref-minimal-fink.json";
}

const IDENTIFICATION_REPORT_SCHEMA: &str = include_str!("../schemas/identification-report-schema.json");
const EID_CARD_SCHEMA: &str = include_str!("../schemas/person-ref-eid-card.json");
const FINK_MINIMAL_SCHEMA: &str = include_str!("../schemas/person-ref-minimal-fink.json");

/// The embedded schema documents.
pub fn builtin_source() -> MemorySource {
    MemorySource::new()
        .with(locations::IDENTIFICATION_REPORT, IDENTIFICATION_REPORT_SCHEMA)
        .with(locations::EID_CARD, EID_CARD_SCHEMA)
        .with(locations::FINK_MINIMAL, FINK_MINIMAL_SCHEMA)
}

/// Register the built-in schema id -> shape mappings, legacy ids included.
pub fn register_builtin_types(registry: &ReportRegistry) {
    registry.register_type(ids::EID_CARD_PERSON_REF, SubjectShape::EidCard);
    registry.register_type(ids::LEGACY_EID_CARD, SubjectShape::EidCard);
    registry.register_type(ids::FINK_PERSON_REF_MINIMAL, SubjectShape::FinkMinimal);
    registry.register_type(ids::LEGACY_FINK_USER_ACCOUNT_MINIMAL, SubjectShape::FinkMinimal);
}

/// A registry over `source` with the built-in mappings registered.
pub fn registry_with_source(source: impl SchemaSource + 'static) -> ReportRegistry {
    let registry = ReportRegistry::new(source);
    register_builtin_types(&registry);
    registry
}

/// A registry over the embedded schemas with the built-in mappings.
pub fn builtin_registry() -> ReportRegistry {
    registry_with_source(builtin_source())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_ids_match_constants() {
        let registry = builtin_registry();
        for (location, id) in [
            (locations::IDENTIFICATION_REPORT, ids::IDENTIFICATION_REPORT),
            (locations::EID_CARD, ids::EID_CARD_PERSON_REF),
            (locations::FINK_MINIMAL, ids::FINK_PERSON_REF_MINIMAL),
        ] {
            assert_eq!(registry.schema_id(location).unwrap().as_deref(), Some(id));
        }
    }

    #[test]
    fn test_builtin_types_are_registered() {
        let registry = builtin_registry();
        assert_eq!(registry.resolve_type(ids::EID_CARD_PERSON_REF), Some(SubjectShape::EidCard));
        assert_eq!(registry.resolve_type(ids::LEGACY_EID_CARD), Some(SubjectShape::EidCard));
        assert_eq!(
            registry.resolve_type(ids::LEGACY_FINK_USER_ACCOUNT_MINIMAL),
            Some(SubjectShape::FinkMinimal)
        );
        assert_eq!(registry.resolve_type(ids::IDENTIFICATION_REPORT), None);
    }

    #[test]
    fn test_shape_locations_point_into_catalog() {
        let registry = builtin_registry();
        for shape in [SubjectShape::EidCard, SubjectShape::FinkMinimal] {
            assert!(registry.get_schema(shape.schema_location()).is_ok());
        }
    }
}
