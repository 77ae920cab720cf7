//! # idreport-report: Identification Reports
//!
//! The report data model and the resolution of its polymorphic subject.
//!
//! - [`ReportDocument`]: the report, with an open bag for unknown
//!   top-level properties.
//! - [`SubjectRef`] / [`SubjectShape`]: the subject payload variants and
//!   their tags.
//! - [`catalog`]: built-in schema ids, locations and embedded schemas.
//! - [`ReportResolver`]: parses reports, typing the subject by
//!   `subjectRefType` or by a caller-supplied shape, and validates them.
//!
//! Signing is not done here. A report is serialized to JSON and handed to
//! `idreport-crypto` as an opaque payload.
//!
//! ## Crate Policy
//!
//! - Depends on `idreport-core` and `idreport-schema` internally.
//! - No global state. Registries are constructed explicitly and shared
//!   through `Arc`.

pub mod catalog;
pub mod level;
pub mod report;
pub mod resolver;
pub mod subject;

pub use catalog::{builtin_registry, ReportRegistry};
pub use level::{IdStatus, LevelOfAssurance};
pub use report::{DocumentReference, ReportDocument};
pub use resolver::{ReportError, ReportResolver, ReportValidation};
pub use subject::{
    Address, CustomShape, CustomSubject, EidCardPersonRef, FinkPersonRefMinimal, SubjectRef,
    SubjectShape,
};
