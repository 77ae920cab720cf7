//! # Certificate Thumbprints
//!
//! SHA-256 over the DER encoding of an X.509 certificate, rendered as
//! unpadded base64url. This is the value carried in the JWS `x5t#S256`
//! header (RFC 7515 §4.1.8).

use base64ct::{Base64UrlUnpadded, Encoding};
use sha2::{Digest, Sha256};

use crate::key::Certificate;

/// A SHA-256 certificate thumbprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertificateThumbprint([u8; 32]);

impl CertificateThumbprint {
    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Unpadded base64url encoding, as used in the `x5t#S256` header.
    pub fn to_base64url(&self) -> String {
        Base64UrlUnpadded::encode_string(&self.0)
    }
}

impl std::fmt::Display for CertificateThumbprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

/// Compute the SHA-256 thumbprint of a certificate.
pub fn sha256_thumbprint(certificate: &Certificate) -> CertificateThumbprint {
    let hash = Sha256::digest(certificate.encoded());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    CertificateThumbprint(bytes)
}
