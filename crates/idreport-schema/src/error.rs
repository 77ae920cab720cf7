//! Errors raised while loading, compiling, or applying schemas.

use idreport_core::{ErrorKind, ParseError};
use thiserror::Error;

/// Error from the schema registry or validator.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No source could resolve the location, or it resolved to empty text.
    #[error("schema not found at location '{0}'")]
    SchemaNotFound(String),

    /// The schema text is not valid JSON.
    #[error("schema at '{location}' is not valid JSON: {reason}")]
    InvalidJson {
        /// Location key of the schema.
        location: String,
        /// Parser message.
        reason: String,
    },

    /// The schema is valid JSON but does not compile as JSON Schema.
    #[error("schema at '{location}' does not compile: {reason}")]
    Compile {
        /// Location key of the schema.
        location: String,
        /// Compiler message.
        reason: String,
    },

    /// Reading schema text from disk failed.
    #[error("io error reading schema '{location}': {source}")]
    Io {
        /// Location key or path being read.
        location: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The document to validate could not be turned into JSON.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SchemaError {
    /// Everything except document conversion failures is a configuration
    /// problem.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            _ => ErrorKind::Configuration,
        }
    }
}
