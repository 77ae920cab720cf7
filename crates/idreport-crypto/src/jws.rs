//! # Compact JWS
//!
//! Signs an arbitrary byte payload into a compact JWS
//! (`header.payload.signature`, each segment unpadded base64url) and
//! verifies such tokens against a certificate.
//!
//! ## Header
//!
//! Tokens produced here carry exactly two header parameters:
//!
//! - `alg`: chosen from the certificate's public key by
//!   [`select_algorithm`].
//! - `x5t#S256`: the SHA-256 thumbprint of the signing certificate.
//!
//! ## Verification
//!
//! 1. The token must have exactly three segments. Anything else (including
//!    five-segment JWE) is rejected before any decoding.
//! 2. The header is decoded and its `alg` must be an RSA (`RS*`, `PS*`) or
//!    ECDSA (`ES*`) algorithm. Signing only ever emits the subset picked by
//!    [`select_algorithm`].
//! 3. If the header carries `x5t#S256`, it must equal the thumbprint of the
//!    verifying certificate.
//! 4. The signature is checked over the received header and payload
//!    segments exactly as they appear in the token.
//!
//! A failure at any step is an error. There is no boolean result a caller
//! could forget to check.

use std::str::FromStr;

use base64ct::{Base64UrlUnpadded, Encoding};
use idreport_core::CryptoError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::algorithm::{select_algorithm, JwsAlgorithm, SignatureAlgorithm};
use crate::key::KeyMaterial;
use crate::signer::{sign_input, verify_input};
use crate::thumbprint::{sha256_thumbprint, CertificateThumbprint};

/// Name of the certificate thumbprint header parameter.
pub const X5T_S256: &str = "x5t#S256";

/// A JWS protected header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm name.
    pub alg: String,
    /// SHA-256 thumbprint of the signing certificate.
    #[serde(rename = "x5t#S256", default, skip_serializing_if = "Option::is_none")]
    pub x5t_s256: Option<String>,
    /// Any further header parameters found in a received token.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl JwsHeader {
    /// Header for a token signed with `algorithm` by the certificate with
    /// `thumbprint`.
    pub fn new(algorithm: SignatureAlgorithm, thumbprint: &CertificateThumbprint) -> Self {
        Self {
            alg: algorithm.to_string(),
            x5t_s256: Some(thumbprint.to_base64url()),
            other: Map::new(),
        }
    }

    /// The header's algorithm, if verifiable.
    pub fn algorithm(&self) -> Result<JwsAlgorithm, CryptoError> {
        self.alg.parse()
    }
}

/// A compact JWS split into its three base64url segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompactToken {
    header: String,
    payload: String,
    signature: String,
}

impl CompactToken {
    /// The encoded header segment.
    pub fn header_segment(&self) -> &str {
        &self.header
    }

    /// The encoded payload segment.
    pub fn payload_segment(&self) -> &str {
        &self.payload
    }

    /// The encoded signature segment.
    pub fn signature_segment(&self) -> &str {
        &self.signature
    }

    /// The JWS signing input, `header.payload`.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }

    /// Decode and parse the header without verifying anything.
    pub fn header(&self) -> Result<JwsHeader, CryptoError> {
        let bytes = decode_segment("header", &self.header)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CryptoError::MalformedToken(format!("header is not a JSON object: {e}")))
    }

    /// Decode the payload without verifying the signature.
    pub fn payload_unverified(&self) -> Result<Vec<u8>, CryptoError> {
        decode_segment("payload", &self.payload)
    }
}

impl FromStr for CompactToken {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(CryptoError::UnsupportedStructure(parts.len()));
        }
        Ok(Self {
            header: parts[0].to_string(),
            payload: parts[1].to_string(),
            signature: parts[2].to_string(),
        })
    }
}

impl std::fmt::Display for CompactToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.header, self.payload, self.signature)
    }
}

/// What a successful verification did to the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationExecuted {
    /// The JWS signature was verified.
    SignatureVerified,
    /// The token was decrypted. Never produced: encrypted tokens are rejected.
    Decrypted,
}

/// The outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayload {
    /// The operation that was performed.
    pub operation: OperationExecuted,
    /// The verified header.
    pub header: JwsHeader,
    /// The verified payload bytes.
    pub payload: Vec<u8>,
}

impl VerifiedPayload {
    /// The payload as UTF-8 text.
    pub fn payload_str(&self) -> Result<&str, CryptoError> {
        std::str::from_utf8(&self.payload)
            .map_err(|e| CryptoError::MalformedToken(format!("payload is not UTF-8: {e}")))
    }
}

/// Sign `body` into a compact JWS with the key material's private key.
///
/// The algorithm is chosen from the certificate's public key.
pub fn sign(body: &[u8], key: &KeyMaterial) -> Result<CompactToken, CryptoError> {
    let algorithm = select_algorithm(key.public_key())?;
    let private_key = key.private_key().ok_or(CryptoError::MissingPrivateKey)?;
    let thumbprint = sha256_thumbprint(key.certificate());

    let header = JwsHeader::new(algorithm, &thumbprint);
    let header_json = serde_json::to_vec(&header)
        .map_err(|e| CryptoError::MalformedToken(format!("cannot encode header: {e}")))?;

    let header = Base64UrlUnpadded::encode_string(&header_json);
    let payload = Base64UrlUnpadded::encode_string(body);
    let signing_input = format!("{header}.{payload}");
    let signature = sign_input(algorithm, private_key, signing_input.as_bytes())?;

    tracing::debug!(
        algorithm = %algorithm,
        thumbprint = %thumbprint,
        payload_len = body.len(),
        "signed compact JWS"
    );

    Ok(CompactToken {
        header,
        payload,
        signature: Base64UrlUnpadded::encode_string(&signature),
    })
}

/// Verify a compact JWS against the key material's certificate.
pub fn verify(token: &str, key: &KeyMaterial) -> Result<VerifiedPayload, CryptoError> {
    let token: CompactToken = token.parse()?;
    let header = token.header()?;
    let algorithm = header.algorithm()?;

    let local = sha256_thumbprint(key.certificate()).to_base64url();
    if let Some(declared) = &header.x5t_s256 {
        if *declared != local {
            return Err(CryptoError::CertificateMismatch {
                token: declared.clone(),
                local,
            });
        }
    }

    let signature = decode_segment("signature", &token.signature)?;
    verify_input(
        algorithm,
        key.public_key(),
        token.signing_input().as_bytes(),
        &signature,
    )?;
    let payload = token.payload_unverified()?;

    tracing::debug!(algorithm = %algorithm, payload_len = payload.len(), "verified compact JWS");

    Ok(VerifiedPayload {
        operation: OperationExecuted::SignatureVerified,
        header,
        payload,
    })
}

fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>, CryptoError> {
    Base64UrlUnpadded::decode_vec(segment)
        .map_err(|e| CryptoError::MalformedToken(format!("{name} segment is not base64url: {e}")))
}
