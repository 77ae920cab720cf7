//! # idreport-crypto: Certificate-Driven JWS
//!
//! Signs identification reports into compact JWS tokens and verifies them:
//!
//! - **Key material.** X.509 certificates and PKCS#8 private keys, loaded
//!   from PEM or DER ([`KeyMaterial`]).
//! - **Algorithm selection.** The signature algorithm follows from the
//!   certificate's public key ([`select_algorithm`]): RS512 for RSA, ES256,
//!   ES256K, ES384 or ES512 for EC keys by curve. Verification also accepts
//!   RS256, RS384 and the PS family ([`JwsAlgorithm`]).
//! - **Thumbprints.** Tokens are bound to the signing certificate through the
//!   `x5t#S256` header ([`sha256_thumbprint`]).
//! - **Compact JWS.** [`sign`] and [`verify`].
//!
//! ## Crate Policy
//!
//! - Depends only on `idreport-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   keys and certificates from `tests/fixtures`.
//! - Encrypted (five-segment) tokens are rejected, never decrypted.

pub mod algorithm;
pub mod jws;
pub mod key;
mod signer;
pub mod thumbprint;

pub use algorithm::{select_algorithm, AlgorithmFamily, JwsAlgorithm, SignatureAlgorithm};
pub use jws::{sign, verify, CompactToken, JwsHeader, OperationExecuted, VerifiedPayload};
pub use key::{Certificate, EcCurve, KeyMaterial, PrivateKey, PublicKey};
pub use thumbprint::{sha256_thumbprint, CertificateThumbprint};
