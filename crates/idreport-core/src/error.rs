//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared across the identification report stack.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Configuration errors (missing schemas, unregistered schema ids) are
//!   fatal and surface immediately.
//! - Cryptographic errors fail loudly with the specific reason. A failed
//!   signature check is an error, never a `false` the caller may ignore.
//! - Structural validation failures are not errors at all: they are
//!   returned as a list of violations for the caller to act on.
//! - Parse errors (malformed JSON, wrong JSON types) are fatal.

use thiserror::Error;

/// The kind of failure an operation reported.
///
/// Every error type in the workspace maps onto exactly one kind via its
/// `kind()` method, so callers can branch on the category without matching
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unresolvable schema location, schema that does not compile, or an
    /// unregistered schema id with a subject payload present.
    Configuration,
    /// Unsupported key material or algorithm, malformed token, failed
    /// signature check.
    Cryptographic,
    /// Schema non-conformance of a document.
    Validation,
    /// Malformed JSON or JSON of the wrong shape.
    Parse,
}

impl ErrorKind {
    /// Returns the kind identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Cryptographic => "cryptographic",
            Self::Validation => "validation",
            Self::Parse => "parse",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The public key algorithm has no signature algorithm mapping.
    #[error("unsupported key type '{0}'")]
    UnsupportedKeyType(String),

    /// The EC curve order has no signature algorithm mapping.
    #[error("unsupported key length for EC key type: {0}-bit")]
    UnsupportedKeyLength(usize),

    /// The token header names an algorithm outside the RSA and EC families.
    #[error("unsupported algorithm found '{0}'")]
    UnsupportedAlgorithm(String),

    /// The token is not a compact JWS (exactly three segments).
    #[error(
        "unsupported JWT: only compact JWS structures are supported for signature \
         verification, found {0} segment(s)"
    )]
    UnsupportedStructure(usize),

    /// Signing was requested on key material without a private key.
    #[error("no private key present for signing")]
    MissingPrivateKey,

    /// Key material could not be parsed, or no signer/verifier could be
    /// constructed from it.
    #[error("key error: {0}")]
    KeyError(String),

    /// The algorithm does not fit the key (e.g. ES384 with a P-256 key).
    #[error("algorithm {algorithm} cannot be used with a {key} key")]
    KeyMismatch {
        /// Algorithm named by the token or the selector.
        algorithm: String,
        /// Description of the key that was offered.
        key: String,
    },

    /// The token's certificate thumbprint does not match the local certificate.
    #[error("token is bound to certificate {token}, but the local certificate is {local}")]
    CertificateMismatch {
        /// Thumbprint declared in the token header.
        token: String,
        /// Thumbprint of the certificate used for verification.
        local: String,
    },

    /// A token segment is not valid base64url or the header is not valid JSON.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The cryptographic signature check failed.
    #[error("signature validation has failed: {0}")]
    SignatureInvalid(String),
}

impl CryptoError {
    /// Cryptographic errors are always [`ErrorKind::Cryptographic`].
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Cryptographic
    }
}

/// Error while parsing a document or one of its fields.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input is not well-formed JSON, or a value has the wrong JSON type.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON object was required.
    #[error("expected a JSON object for {0}")]
    NotAnObject(String),

    /// A timestamp is not valid RFC 3339.
    #[error("invalid RFC 3339 timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Reason reported by the parser.
        reason: String,
    },
}

impl ParseError {
    /// Parse errors are always [`ErrorKind::Parse`].
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Parse
    }
}
