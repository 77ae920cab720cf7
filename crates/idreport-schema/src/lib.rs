//! # idreport-schema: Schema Registry & Validation
//!
//! Loads JSON Schema (Draft 2020-12) documents from pluggable sources,
//! compiles each location exactly once, and validates documents against
//! the cached compiled schemas.
//!
//! ## Registry (`registry`)
//!
//! [`SchemaRegistry`] owns two maps: the compile cache, keyed by location,
//! and the type registrations, keyed by schema `$id`. The registry is
//! generic over the shape tag so that the report crate can register its own
//! subject shapes without this crate knowing about them.
//!
//! ## Validation (`validate`)
//!
//! [`SchemaRegistry::validate`] returns a [`ValidationResult`] of structured
//! [`Violation`]s. Schema non-conformance is never an `Err`.
//!
//! ## Crate Policy
//!
//! - Depends only on `idreport-core` internally.
//! - No network access. `$ref` URIs resolve against the registry's sources.
//! - `SchemaRegistry` is `Send + Sync` and meant to be shared behind `Arc`.

pub mod error;
pub mod registry;
pub mod source;
pub mod validate;

pub use error::SchemaError;
pub use registry::{CompiledSchema, SchemaRegistry};
pub use source::{ChainSource, DirectorySource, MemorySource, SchemaSource};
pub use validate::{ValidationResult, Violation};
