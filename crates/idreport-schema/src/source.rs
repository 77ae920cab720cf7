//! # Schema Sources
//!
//! A [`SchemaSource`] maps an opaque location key to schema text. The
//! registry never interprets a location beyond handing it to its source.
//!
//! - [`MemorySource`]: a fixed table, used for schemas embedded in a binary.
//! - [`DirectorySource`]: files under a root directory.
//! - [`ChainSource`]: tries several sources in order; the first hit wins.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::SchemaError;

/// Resolves schema locations to schema text.
pub trait SchemaSource: Send + Sync + fmt::Debug {
    /// Read the schema text at `location`, or `None` when this source does
    /// not know the location.
    fn read(&self, location: &str) -> Result<Option<String>, SchemaError>;

    /// Every location this source can serve. Used to resolve cross-schema
    /// `$ref`s by `$id`.
    fn locations(&self) -> Result<Vec<String>, SchemaError>;
}

impl<S: SchemaSource + ?Sized> SchemaSource for Arc<S> {
    fn read(&self, location: &str) -> Result<Option<String>, SchemaError> {
        (**self).read(location)
    }

    fn locations(&self) -> Result<Vec<String>, SchemaError> {
        (**self).locations()
    }
}

/// Schemas held in memory, keyed by location.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    schemas: BTreeMap<String, String>,
}

impl MemorySource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the schema at `location`.
    pub fn insert(&mut self, location: impl Into<String>, text: impl Into<String>) {
        self.schemas.insert(location.into(), text.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(location, text);
        self
    }
}

impl SchemaSource for MemorySource {
    fn read(&self, location: &str) -> Result<Option<String>, SchemaError> {
        Ok(self.schemas.get(location).cloned())
    }

    fn locations(&self) -> Result<Vec<String>, SchemaError> {
        Ok(self.schemas.keys().cloned().collect())
    }
}

/// Schema files below a root directory.
///
/// A location is served only if it starts with the mount prefix (`/` by
/// default); the rest of the location is taken as a path relative to the
/// root. Locations that climb out of the root with `..` are never served.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    prefix: String,
}

impl DirectorySource {
    /// Serve `<root>/<location>` for every location.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: "/".to_string(),
        }
    }

    /// Serve only locations starting with `prefix`, mapping
    /// `<prefix><rest>` to `<root>/<rest>`.
    pub fn mount_at(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, location: &str) -> Option<PathBuf> {
        let rest = location.strip_prefix(&self.prefix)?;
        let relative = Path::new(rest.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || rest.is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn collect(&self, dir: &Path, out: &mut Vec<String>) -> Result<(), SchemaError> {
        let entries = std::fs::read_dir(dir).map_err(|source| SchemaError::Io {
            location: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| SchemaError::Io {
                location: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                self.collect(&path, out)?;
            } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    let parts: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    let base = self.prefix.trim_end_matches('/');
                    out.push(format!("{base}/{}", parts.join("/")));
                }
            }
        }
        Ok(())
    }
}

impl SchemaSource for DirectorySource {
    fn read(&self, location: &str) -> Result<Option<String>, SchemaError> {
        let Some(path) = self.path_for(location) else {
            return Ok(None);
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SchemaError::Io {
                location: location.to_string(),
                source,
            }),
        }
    }

    fn locations(&self) -> Result<Vec<String>, SchemaError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        self.collect(&self.root, &mut out)?;
        out.sort();
        Ok(out)
    }
}

/// Tries each source in order.
#[derive(Debug, Clone, Default)]
pub struct ChainSource {
    sources: Vec<Arc<dyn SchemaSource>>,
}

impl ChainSource {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; earlier sources take precedence.
    pub fn then(mut self, source: impl SchemaSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }
}

impl SchemaSource for ChainSource {
    fn read(&self, location: &str) -> Result<Option<String>, SchemaError> {
        for source in &self.sources {
            if let Some(text) = source.read(location)? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    fn locations(&self) -> Result<Vec<String>, SchemaError> {
        let mut all = Vec::new();
        for source in &self.sources {
            for location in source.locations()? {
                if !all.contains(&location) {
                    all.push(location);
                }
            }
        }
        Ok(all)
    }
}
