//! # Key Material
//!
//! X.509 certificates, PKCS#8 private keys, and the [`KeyMaterial`] pair
//! the JWS codec signs and verifies with.
//!
//! ## Invariants
//!
//! - A [`Certificate`] always keeps the exact DER encoding it was built
//!   from; the certificate thumbprint is computed over these bytes.
//! - Public keys are classified at parse time into RSA, EC (named curve), or
//!   "other". Classification never fails for a well-formed certificate with
//!   an unsupported key type; the algorithm selector reports that instead.
//! - An EC key on a curve outside the known table is rejected at parse time,
//!   because its order bit length cannot be determined.
//! - Private keys never appear in `Debug` output.
//!
//! Mismatched pairs (a private key that does not belong to the certificate)
//! are a caller error and are not detected here.

use der::asn1::ObjectIdentifier;
use der::{Decode, DecodePem, Encode, SecretDocument};
use idreport_core::CryptoError;
use pkcs8::{DecodePrivateKey, DecodePublicKey, PrivateKeyInfo};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const RSASSA_PSS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10");
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const DSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10040.4.1");
const ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
const ED448: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.113");
const X25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.110");

/// Named elliptic curves recognized in certificates and private keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    /// NIST P-256 (secp256r1, prime256v1).
    P256,
    /// The Koblitz curve secp256k1.
    Secp256k1,
    /// NIST P-384 (secp384r1).
    P384,
    /// NIST P-521 (secp521r1).
    P521,
    /// NIST P-224 (secp224r1).
    P224,
    /// NIST P-192 (prime192v1).
    P192,
    /// brainpoolP256r1.
    BrainpoolP256r1,
    /// brainpoolP384r1.
    BrainpoolP384r1,
    /// brainpoolP512r1.
    BrainpoolP512r1,
}

impl EcCurve {
    const ALL: [Self; 9] = [
        Self::P256,
        Self::Secp256k1,
        Self::P384,
        Self::P521,
        Self::P224,
        Self::P192,
        Self::BrainpoolP256r1,
        Self::BrainpoolP384r1,
        Self::BrainpoolP512r1,
    ];

    /// The named-curve object identifier.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            Self::P256 => ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7"),
            Self::Secp256k1 => ObjectIdentifier::new_unwrap("1.3.132.0.10"),
            Self::P384 => ObjectIdentifier::new_unwrap("1.3.132.0.34"),
            Self::P521 => ObjectIdentifier::new_unwrap("1.3.132.0.35"),
            Self::P224 => ObjectIdentifier::new_unwrap("1.3.132.0.33"),
            Self::P192 => ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.1"),
            Self::BrainpoolP256r1 => ObjectIdentifier::new_unwrap("1.3.36.3.3.2.8.1.1.7"),
            Self::BrainpoolP384r1 => ObjectIdentifier::new_unwrap("1.3.36.3.3.2.8.1.1.11"),
            Self::BrainpoolP512r1 => ObjectIdentifier::new_unwrap("1.3.36.3.3.2.8.1.1.13"),
        }
    }

    /// Look up a curve by its object identifier.
    pub fn from_oid(oid: ObjectIdentifier) -> Option<Self> {
        Self::ALL.into_iter().find(|curve| curve.oid() == oid)
    }

    /// The curve's standard name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::Secp256k1 => "secp256k1",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
            Self::P224 => "P-224",
            Self::P192 => "P-192",
            Self::BrainpoolP256r1 => "brainpoolP256r1",
            Self::BrainpoolP384r1 => "brainpoolP384r1",
            Self::BrainpoolP512r1 => "brainpoolP512r1",
        }
    }

    /// Bit length of the order of the curve's base point.
    pub fn order_bits(&self) -> usize {
        match self {
            Self::P256 | Self::Secp256k1 | Self::BrainpoolP256r1 => 256,
            Self::P384 | Self::BrainpoolP384r1 => 384,
            Self::P521 => 521,
            Self::P224 => 224,
            Self::P192 => 192,
            Self::BrainpoolP512r1 => 512,
        }
    }
}

impl std::fmt::Display for EcCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The public key carried by a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// RSA public key.
    Rsa(RsaPublicKey),
    /// EC public key on a named curve, as a SEC1-encoded point.
    Ec {
        /// The named curve.
        curve: EcCurve,
        /// SEC1 encoded point (uncompressed or compressed).
        point: Vec<u8>,
    },
    /// Any other key algorithm (Ed25519, DSA, ...), kept by name only.
    Other {
        /// Algorithm name, or the dotted OID when unnamed.
        algorithm: String,
    },
}

impl PublicKey {
    fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self, CryptoError> {
        let oid = spki.algorithm.oid;
        if oid == RSA_ENCRYPTION {
            let spki_der = spki
                .to_der()
                .map_err(|e| CryptoError::KeyError(format!("cannot encode public key info: {e}")))?;
            let key = RsaPublicKey::from_public_key_der(&spki_der)
                .map_err(|e| CryptoError::KeyError(format!("invalid RSA public key: {e}")))?;
            return Ok(Self::Rsa(key));
        }
        if oid != EC_PUBLIC_KEY {
            return Ok(Self::Other {
                algorithm: algorithm_name(oid),
            });
        }

        let params = spki.algorithm.parameters.as_ref().ok_or_else(|| {
            CryptoError::KeyError("EC public key without curve parameters".to_string())
        })?;
        let params_der = params
            .to_der()
            .map_err(|e| CryptoError::KeyError(format!("cannot encode EC parameters: {e}")))?;
        let curve_oid = ObjectIdentifier::from_der(&params_der).map_err(|e| {
            CryptoError::KeyError(format!("EC parameters are not a named curve: {e}"))
        })?;
        let curve = EcCurve::from_oid(curve_oid)
            .ok_or_else(|| CryptoError::KeyError(format!("unrecognized EC curve {curve_oid}")))?;
        let point = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| CryptoError::KeyError("EC public key is not octet aligned".to_string()))?
            .to_vec();

        Ok(Self::Ec { curve, point })
    }

    /// The key algorithm name: `RSA`, `EC`, or the name of the other algorithm.
    pub fn algorithm(&self) -> &str {
        match self {
            Self::Rsa(_) => "RSA",
            Self::Ec { .. } => "EC",
            Self::Other { algorithm } => algorithm,
        }
    }

    /// Key length in bits: the modulus size for RSA, the order bit length for
    /// EC, and `None` for other key types.
    pub fn bit_length(&self) -> Option<usize> {
        match self {
            Self::Rsa(key) => Some(key.size() * 8),
            Self::Ec { curve, .. } => Some(curve.order_bits()),
            Self::Other { .. } => None,
        }
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa(key) => write!(f, "RSA-{}", key.size() * 8),
            Self::Ec { curve, .. } => write!(f, "EC {curve}"),
            Self::Other { algorithm } => f.write_str(algorithm),
        }
    }
}

/// An X.509 certificate, reduced to what signing and verification need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    public_key: PublicKey,
}

impl Certificate {
    /// Parse a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let cert = x509_cert::Certificate::from_der(der)
            .map_err(|e| CryptoError::KeyError(format!("invalid X.509 certificate: {e}")))?;
        Self::from_parsed(&cert, der.to_vec())
    }

    /// Parse a PEM-encoded (`CERTIFICATE`) certificate.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let cert = x509_cert::Certificate::from_pem(pem.as_bytes())
            .map_err(|e| CryptoError::KeyError(format!("invalid PEM certificate: {e}")))?;
        let der = cert
            .to_der()
            .map_err(|e| CryptoError::KeyError(format!("cannot encode certificate: {e}")))?;
        Self::from_parsed(&cert, der)
    }

    fn from_parsed(cert: &x509_cert::Certificate, der: Vec<u8>) -> Result<Self, CryptoError> {
        let tbs = &cert.tbs_certificate;
        let public_key = PublicKey::from_spki(&tbs.subject_public_key_info)?;
        Ok(Self {
            der,
            subject: tbs.subject.to_string(),
            public_key,
        })
    }

    /// The DER encoding of the certificate.
    pub fn encoded(&self) -> &[u8] {
        &self.der
    }

    /// The subject distinguished name, RFC 4514 style.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The certified public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// A PKCS#8 private key.
#[derive(Clone)]
pub enum PrivateKey {
    /// RSA private key.
    Rsa(RsaPrivateKey),
    /// NIST P-256 secret scalar.
    P256(p256::SecretKey),
    /// secp256k1 secret scalar.
    Secp256k1(k256::SecretKey),
    /// NIST P-384 secret scalar.
    P384(p384::SecretKey),
    /// NIST P-521 secret scalar.
    P521(p521::SecretKey),
    /// A well-formed key this crate has no signer for.
    Unsupported {
        /// Algorithm (and curve) description.
        algorithm: String,
    },
}

impl PrivateKey {
    /// Parse a DER-encoded PKCS#8 `PrivateKeyInfo`.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CryptoError> {
        let info = PrivateKeyInfo::from_der(der)
            .map_err(|e| CryptoError::KeyError(format!("invalid PKCS#8 private key: {e}")))?;
        let oid = info.algorithm.oid;

        if oid == RSA_ENCRYPTION {
            let key = RsaPrivateKey::from_pkcs8_der(der).map_err(pkcs8_error)?;
            return Ok(Self::Rsa(key));
        }
        if oid != EC_PUBLIC_KEY {
            return Ok(Self::Unsupported {
                algorithm: algorithm_name(oid),
            });
        }

        let curve_oid = info.algorithm.parameters_oid().map_err(|e| {
            CryptoError::KeyError(format!("EC private key without named curve: {e}"))
        })?;
        let key = match EcCurve::from_oid(curve_oid) {
            Some(EcCurve::P256) => Self::P256(p256::SecretKey::from_pkcs8_der(der).map_err(pkcs8_error)?),
            Some(EcCurve::Secp256k1) => {
                Self::Secp256k1(k256::SecretKey::from_pkcs8_der(der).map_err(pkcs8_error)?)
            }
            Some(EcCurve::P384) => Self::P384(p384::SecretKey::from_pkcs8_der(der).map_err(pkcs8_error)?),
            Some(EcCurve::P521) => Self::P521(p521::SecretKey::from_pkcs8_der(der).map_err(pkcs8_error)?),
            Some(curve) => Self::Unsupported {
                algorithm: format!("EC {curve}"),
            },
            None => {
                return Err(CryptoError::KeyError(format!(
                    "unrecognized EC curve {curve_oid}"
                )))
            }
        };
        Ok(key)
    }

    /// Parse a PEM-encoded (`PRIVATE KEY`) PKCS#8 key.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let (label, doc) = SecretDocument::from_pem(pem)
            .map_err(|e| CryptoError::KeyError(format!("invalid PEM private key: {e}")))?;
        if label != "PRIVATE KEY" {
            return Err(CryptoError::KeyError(format!(
                "expected a PKCS#8 'PRIVATE KEY' PEM block, found '{label}'"
            )));
        }
        Self::from_pkcs8_der(doc.as_bytes())
    }

    /// Short description of the key type, e.g. `RSA` or `EC P-384`.
    pub fn describe(&self) -> String {
        match self {
            Self::Rsa(_) => "RSA".to_string(),
            Self::P256(_) => format!("EC {}", EcCurve::P256),
            Self::Secp256k1(_) => format!("EC {}", EcCurve::Secp256k1),
            Self::P384(_) => format!("EC {}", EcCurve::P384),
            Self::P521(_) => format!("EC {}", EcCurve::P521),
            Self::Unsupported { algorithm } => algorithm.clone(),
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey({}, <private>)", self.describe())
    }
}

/// A certificate plus, for signing, the matching private key.
///
/// Do not pair keys that do not belong together: signing would succeed but
/// verification against the certificate would fail.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    certificate: Certificate,
    private_key: Option<PrivateKey>,
}

impl KeyMaterial {
    /// Pair a certificate with an optional private key.
    pub fn new(certificate: Certificate, private_key: Option<PrivateKey>) -> Self {
        Self {
            certificate,
            private_key,
        }
    }

    /// Key material that can only verify.
    pub fn verify_only(certificate: Certificate) -> Self {
        Self::new(certificate, None)
    }

    /// Load from a PEM certificate and an optional PEM PKCS#8 private key.
    pub fn from_pem(certificate_pem: &str, private_key_pem: Option<&str>) -> Result<Self, CryptoError> {
        let certificate = Certificate::from_pem(certificate_pem)?;
        let private_key = private_key_pem.map(PrivateKey::from_pem).transpose()?;
        Ok(Self::new(certificate, private_key))
    }

    /// The certificate.
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// The certified public key.
    pub fn public_key(&self) -> &PublicKey {
        self.certificate.public_key()
    }

    /// The private key, if this key material can sign.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }
}

fn algorithm_name(oid: ObjectIdentifier) -> String {
    match oid {
        o if o == RSA_ENCRYPTION => "RSA".to_string(),
        o if o == RSASSA_PSS => "RSASSA-PSS".to_string(),
        o if o == EC_PUBLIC_KEY => "EC".to_string(),
        o if o == DSA => "DSA".to_string(),
        o if o == ED25519 => "Ed25519".to_string(),
        o if o == ED448 => "Ed448".to_string(),
        o if o == X25519 => "X25519".to_string(),
        o => o.to_string(),
    }
}

fn pkcs8_error(e: pkcs8::Error) -> CryptoError {
    CryptoError::KeyError(format!("invalid PKCS#8 private key: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_CERT: &str = include_str!("../tests/fixtures/rsa-2048.cert.pem");
    const RSA_KEY: &str = include_str!("../tests/fixtures/rsa-2048.key.pem");
    const P256_CERT: &str = include_str!("../tests/fixtures/ec-p256.cert.pem");
    const K256_CERT: &str = include_str!("../tests/fixtures/ec-secp256k1.cert.pem");
    const P521_KEY: &str = include_str!("../tests/fixtures/ec-p521.key.pem");
    const BRAINPOOL_KEY: &str = include_str!("../tests/fixtures/ec-brainpool256.key.pem");
    const ED25519_CERT: &str = include_str!("../tests/fixtures/ed25519.cert.pem");
    const ED25519_KEY: &str = include_str!("../tests/fixtures/ed25519.key.pem");

    #[test]
    fn test_rsa_certificate_is_classified() {
        let cert = Certificate::from_pem(RSA_CERT).unwrap();
        assert_eq!(cert.public_key().algorithm(), "RSA");
        assert_eq!(cert.public_key().bit_length(), Some(2048));
        assert!(cert.subject().contains("rsa-2048"));
    }

    #[test]
    fn test_ec_certificates_carry_their_curve() {
        let p256 = Certificate::from_pem(P256_CERT).unwrap();
        assert!(matches!(p256.public_key(), PublicKey::Ec { curve: EcCurve::P256, .. }));

        let k256 = Certificate::from_pem(K256_CERT).unwrap();
        assert!(matches!(k256.public_key(), PublicKey::Ec { curve: EcCurve::Secp256k1, .. }));
        assert_eq!(k256.public_key().bit_length(), Some(256));
    }

    #[test]
    fn test_ed25519_certificate_is_other() {
        let cert = Certificate::from_pem(ED25519_CERT).unwrap();
        assert_eq!(cert.public_key().algorithm(), "Ed25519");
        assert_eq!(cert.public_key().bit_length(), None);
    }

    #[test]
    fn test_der_and_pem_agree() {
        let from_pem = Certificate::from_pem(P256_CERT).unwrap();
        let from_der = Certificate::from_der(from_pem.encoded()).unwrap();
        assert_eq!(from_pem, from_der);
    }

    #[test]
    fn test_private_keys_are_classified() {
        assert!(matches!(PrivateKey::from_pem(RSA_KEY).unwrap(), PrivateKey::Rsa(_)));
        assert!(matches!(PrivateKey::from_pem(P521_KEY).unwrap(), PrivateKey::P521(_)));
        assert!(matches!(
            PrivateKey::from_pem(BRAINPOOL_KEY).unwrap(),
            PrivateKey::Unsupported { .. }
        ));
        match PrivateKey::from_pem(ED25519_KEY).unwrap() {
            PrivateKey::Unsupported { algorithm } => assert_eq!(algorithm, "Ed25519"),
            other => panic!("expected unsupported key, got {other:?}"),
        }
    }

    #[test]
    fn test_certificate_pem_is_not_a_private_key() {
        let err = PrivateKey::from_pem(RSA_CERT).unwrap_err();
        assert!(err.to_string().contains("PRIVATE KEY"), "{err}");
    }

    #[test]
    fn test_garbage_certificate_rejected() {
        assert!(matches!(
            Certificate::from_der(b"not a certificate"),
            Err(CryptoError::KeyError(_))
        ));
        assert!(Certificate::from_pem("-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----\n").is_err());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let key = PrivateKey::from_pem(RSA_KEY).unwrap();
        let debug = format!("{key:?}");
        assert_eq!(debug, "PrivateKey(RSA, <private>)");
    }

    #[test]
    fn test_curve_table_roundtrips_oids() {
        for curve in EcCurve::ALL {
            assert_eq!(EcCurve::from_oid(curve.oid()), Some(curve));
        }
    }
}
