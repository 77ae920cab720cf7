//! # Schema Registry
//!
//! Owns the compiled-schema cache and the schema id -> shape registrations.
//!
//! ## Compile Once
//!
//! A location is read, parsed and compiled at most once for the lifetime of
//! the registry. The first lookup of a location holds the cache entry while
//! it compiles, so concurrent first lookups of the same location wait for
//! that compile and then share its result. Every later lookup returns the
//! same `Arc<CompiledSchema>`.
//!
//! Failed compiles are not cached; the next lookup tries again.
//!
//! ## Schema Resolution
//!
//! Cross-schema `$ref` URIs are resolved from the registry's own source by
//! matching each document's `$id`, falling back to the last path segment of
//! the URI. Nothing is fetched over the network. A URI no document claims
//! resolves to the permissive schema `{}` and is logged at `warn`.
//!
//! The `$id` index is built from the source on the first compile and shared
//! by every later one. An index build that fails is retried on the next
//! compile.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;

use crate::error::SchemaError;
use crate::source::SchemaSource;

/// A parsed and compiled JSON Schema.
pub struct CompiledSchema {
    location: String,
    id: Option<String>,
    document: Value,
    validator: Validator,
}

impl CompiledSchema {
    /// The location key the schema was loaded from.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The schema's declared `$id`, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The raw schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The compiled validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("location", &self.location)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Compile cache plus schema id -> `T` registrations.
///
/// `T` is the caller's shape tag; the registry never interprets it.
pub struct SchemaRegistry<T> {
    source: Arc<dyn SchemaSource>,
    schemas: DashMap<String, Arc<CompiledSchema>>,
    types: DashMap<String, T>,
    ref_index: OnceLock<Arc<HashMap<String, Value>>>,
    compilations: AtomicUsize,
}

impl<T> fmt::Debug for SchemaRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("source", &self.source)
            .field("cached", &self.schemas.len())
            .field("types", &self.types.len())
            .finish()
    }
}

impl<T: Clone> SchemaRegistry<T> {
    /// An empty registry reading schemas from `source`.
    pub fn new(source: impl SchemaSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            schemas: DashMap::new(),
            types: DashMap::new(),
            ref_index: OnceLock::new(),
            compilations: AtomicUsize::new(0),
        }
    }

    /// The compiled schema at `location`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::SchemaNotFound`] if no source serves the location or
    ///   the text is blank.
    /// - [`SchemaError::InvalidJson`] / [`SchemaError::Compile`] if the text
    ///   is not a valid schema.
    pub fn get_schema(&self, location: &str) -> Result<Arc<CompiledSchema>, SchemaError> {
        if let Some(entry) = self.schemas.get(location) {
            return Ok(Arc::clone(entry.value()));
        }

        match self.schemas.entry(location.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let compiled = Arc::new(self.compile(location)?);
                entry.insert(Arc::clone(&compiled));
                Ok(compiled)
            }
        }
    }

    /// The declared `$id` of the schema at `location`.
    pub fn schema_id(&self, location: &str) -> Result<Option<String>, SchemaError> {
        Ok(self.get_schema(location)?.id().map(str::to_string))
    }

    /// Map a schema id to a shape tag. A later registration for the same id
    /// replaces the earlier one.
    pub fn register_type(&self, schema_id: impl Into<String>, shape: T) {
        self.types.insert(schema_id.into(), shape);
    }

    /// The shape tag registered for `schema_id`.
    pub fn resolve_type(&self, schema_id: &str) -> Option<T> {
        self.types.get(schema_id).map(|entry| entry.value().clone())
    }

    /// Number of compiles performed so far.
    pub fn compile_count(&self) -> usize {
        self.compilations.load(Ordering::SeqCst)
    }

    /// Number of cached schemas.
    pub fn cached_count(&self) -> usize {
        self.schemas.len()
    }

    fn compile(&self, location: &str) -> Result<CompiledSchema, SchemaError> {
        let text = self
            .source
            .read(location)?
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| SchemaError::SchemaNotFound(location.to_string()))?;

        let document: Value =
            serde_json::from_str(&text).map_err(|e| SchemaError::InvalidJson {
                location: location.to_string(),
                reason: e.to_string(),
            })?;
        let id = document.get("$id").and_then(Value::as_str).map(str::to_string);

        let mut options = jsonschema::options();
        options.with_draft(jsonschema::Draft::Draft202012);
        options.with_retriever(self.retriever()?);
        let validator = options.build(&document).map_err(|e| SchemaError::Compile {
            location: location.to_string(),
            reason: e.to_string(),
        })?;

        self.compilations.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(location, id = id.as_deref().unwrap_or(""), "compiled schema");

        Ok(CompiledSchema {
            location: location.to_string(),
            id,
            document,
            validator,
        })
    }

    fn retriever(&self) -> Result<LocalSchemaRetriever, SchemaError> {
        if let Some(index) = self.ref_index.get() {
            return Ok(LocalSchemaRetriever {
                schemas_by_uri: Arc::clone(index),
            });
        }
        let index = Arc::new(self.build_ref_index()?);
        let index = self.ref_index.get_or_init(|| index);
        Ok(LocalSchemaRetriever {
            schemas_by_uri: Arc::clone(index),
        })
    }

    fn build_ref_index(&self) -> Result<HashMap<String, Value>, SchemaError> {
        let mut schemas_by_uri = HashMap::new();
        for location in self.source.locations()? {
            let Some(text) = self.source.read(&location)? else {
                continue;
            };
            let Ok(value) = serde_json::from_str::<Value>(&text) else {
                tracing::warn!(location = %location, "skipping unparsable schema for $ref resolution");
                continue;
            };
            if let Some(id) = value.get("$id").and_then(Value::as_str) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }
            if let Some(filename) = location.rsplit('/').next() {
                schemas_by_uri.entry(filename.to_string()).or_insert(value);
            }
        }
        tracing::debug!(entries = schemas_by_uri.len(), "built $ref index");
        Ok(schemas_by_uri)
    }
}

/// Resolves `$ref` URIs to schemas held by the registry's source.
struct LocalSchemaRetriever {
    schemas_by_uri: Arc<HashMap<String, Value>>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        tracing::warn!(uri = uri_str, "unresolved $ref; using a permissive schema");
        Ok(serde_json::json!({}))
    }
}
