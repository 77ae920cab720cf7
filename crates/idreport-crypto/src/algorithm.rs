//! # Signature Algorithm Selection
//!
//! Maps the public key in a certificate to the JWS algorithm used to sign
//! with it:
//!
//! | Key                           | Algorithm |
//! |-------------------------------|-----------|
//! | RSA, any size                 | `RS512`   |
//! | EC, 256-bit order, secp256k1  | `ES256K`  |
//! | EC, 256-bit order, otherwise  | `ES256`   |
//! | EC, 384-bit order             | `ES384`   |
//! | EC, 521-bit order             | `ES512`   |
//!
//! Every other EC order length is [`CryptoError::UnsupportedKeyLength`] and
//! every other key type is [`CryptoError::UnsupportedKeyType`].
//!
//! The mapping goes by order bit length, so a brainpoolP256r1 key selects
//! `ES256`. Signing with it then fails when the signer is constructed.
//!
//! Verification reads the algorithm from the token header instead
//! ([`JwsAlgorithm`]), which also admits the RSA and EC algorithms this crate
//! never selects for signing.

use std::str::FromStr;

use idreport_core::CryptoError;
use serde::{Deserialize, Serialize};

use crate::key::{EcCurve, PublicKey};

/// JWS signature algorithms this crate signs and verifies with.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-512.
    RS512,
    /// ECDSA using P-256 and SHA-256.
    ES256,
    /// ECDSA using secp256k1 and SHA-256.
    ES256K,
    /// ECDSA using P-384 and SHA-384.
    ES384,
    /// ECDSA using P-521 and SHA-512.
    ES512,
}

/// Key family of a signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// RSA signatures.
    Rsa,
    /// Elliptic curve signatures.
    Ec,
}

impl SignatureAlgorithm {
    /// The JWS `alg` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS512 => "RS512",
            Self::ES256 => "ES256",
            Self::ES256K => "ES256K",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
        }
    }

    /// The key family this algorithm belongs to.
    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Self::RS512 => AlgorithmFamily::Rsa,
            Self::ES256 | Self::ES256K | Self::ES384 | Self::ES512 => AlgorithmFamily::Ec,
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS512" => Ok(Self::RS512),
            "ES256" => Ok(Self::ES256),
            "ES256K" => Ok(Self::ES256K),
            "ES384" => Ok(Self::ES384),
            "ES512" => Ok(Self::ES512),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// JWS `alg` header values accepted for verification.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JwsAlgorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256.
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384.
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512.
    RS512,
    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256.
    PS256,
    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384.
    PS384,
    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512.
    PS512,
    ES256,
    ES256K,
    ES384,
    ES512,
}

impl JwsAlgorithm {
    /// The JWS `alg` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::ES256 => "ES256",
            Self::ES256K => "ES256K",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
        }
    }

    /// The key family this algorithm belongs to.
    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Self::RS256 | Self::RS384 | Self::RS512 | Self::PS256 | Self::PS384 | Self::PS512 => {
                AlgorithmFamily::Rsa
            }
            Self::ES256 | Self::ES256K | Self::ES384 | Self::ES512 => AlgorithmFamily::Ec,
        }
    }
}

impl From<SignatureAlgorithm> for JwsAlgorithm {
    fn from(algorithm: SignatureAlgorithm) -> Self {
        match algorithm {
            SignatureAlgorithm::RS512 => Self::RS512,
            SignatureAlgorithm::ES256 => Self::ES256,
            SignatureAlgorithm::ES256K => Self::ES256K,
            SignatureAlgorithm::ES384 => Self::ES384,
            SignatureAlgorithm::ES512 => Self::ES512,
        }
    }
}

impl std::fmt::Display for JwsAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JwsAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "PS256" => Ok(Self::PS256),
            "PS384" => Ok(Self::PS384),
            "PS512" => Ok(Self::PS512),
            "ES256" => Ok(Self::ES256),
            "ES256K" => Ok(Self::ES256K),
            "ES384" => Ok(Self::ES384),
            "ES512" => Ok(Self::ES512),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Select the signature algorithm for a certificate's public key.
pub fn select_algorithm(public_key: &PublicKey) -> Result<SignatureAlgorithm, CryptoError> {
    match public_key {
        PublicKey::Rsa(_) => Ok(SignatureAlgorithm::RS512),
        PublicKey::Ec { curve, .. } => match curve.order_bits() {
            256 if *curve == EcCurve::Secp256k1 => Ok(SignatureAlgorithm::ES256K),
            256 => Ok(SignatureAlgorithm::ES256),
            384 => Ok(SignatureAlgorithm::ES384),
            521 => Ok(SignatureAlgorithm::ES512),
            bits => Err(CryptoError::UnsupportedKeyLength(bits)),
        },
        PublicKey::Other { algorithm } => Err(CryptoError::UnsupportedKeyType(algorithm.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ec(curve: EcCurve) -> PublicKey {
        PublicKey::Ec {
            curve,
            point: Vec::new(),
        }
    }

    #[test]
    fn test_ec_selection_by_order_length() {
        assert_eq!(select_algorithm(&ec(EcCurve::P256)).unwrap(), SignatureAlgorithm::ES256);
        assert_eq!(select_algorithm(&ec(EcCurve::Secp256k1)).unwrap(), SignatureAlgorithm::ES256K);
        assert_eq!(select_algorithm(&ec(EcCurve::P384)).unwrap(), SignatureAlgorithm::ES384);
        assert_eq!(select_algorithm(&ec(EcCurve::P521)).unwrap(), SignatureAlgorithm::ES512);
    }

    #[test]
    fn test_brainpool_256_selects_es256() {
        assert_eq!(
            select_algorithm(&ec(EcCurve::BrainpoolP256r1)).unwrap(),
            SignatureAlgorithm::ES256
        );
        assert_eq!(
            select_algorithm(&ec(EcCurve::BrainpoolP384r1)).unwrap(),
            SignatureAlgorithm::ES384
        );
    }

    #[test]
    fn test_unsupported_ec_lengths() {
        for (curve, bits) in [
            (EcCurve::P224, 224),
            (EcCurve::P192, 192),
            (EcCurve::BrainpoolP512r1, 512),
        ] {
            match select_algorithm(&ec(curve)) {
                Err(CryptoError::UnsupportedKeyLength(n)) => assert_eq!(n, bits),
                other => panic!("expected unsupported length for {curve}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unsupported_key_type() {
        let key = PublicKey::Other {
            algorithm: "Ed25519".to_string(),
        };
        match select_algorithm(&key) {
            Err(CryptoError::UnsupportedKeyType(name)) => assert_eq!(name, "Ed25519"),
            other => panic!("expected unsupported key type, got {other:?}"),
        }
    }

    #[test]
    fn test_header_names_parse() {
        for alg in [
            SignatureAlgorithm::RS512,
            SignatureAlgorithm::ES256,
            SignatureAlgorithm::ES256K,
            SignatureAlgorithm::ES384,
            SignatureAlgorithm::ES512,
        ] {
            assert_eq!(alg.as_str().parse::<SignatureAlgorithm>().unwrap(), alg);
        }
    }

    #[test]
    fn test_selector_never_yields_rs256_or_pss() {
        for name in ["RS256", "RS384", "PS256", "PS512"] {
            assert!(matches!(
                name.parse::<SignatureAlgorithm>(),
                Err(CryptoError::UnsupportedAlgorithm(_))
            ));
        }
    }

    #[test]
    fn test_verification_accepts_rsa_and_ec_families() {
        for (name, family) in [
            ("RS256", AlgorithmFamily::Rsa),
            ("RS384", AlgorithmFamily::Rsa),
            ("RS512", AlgorithmFamily::Rsa),
            ("PS256", AlgorithmFamily::Rsa),
            ("PS384", AlgorithmFamily::Rsa),
            ("PS512", AlgorithmFamily::Rsa),
            ("ES256", AlgorithmFamily::Ec),
            ("ES256K", AlgorithmFamily::Ec),
            ("ES384", AlgorithmFamily::Ec),
            ("ES512", AlgorithmFamily::Ec),
        ] {
            let alg: JwsAlgorithm = name.parse().unwrap();
            assert_eq!(alg.as_str(), name);
            assert_eq!(alg.family(), family);
        }
    }

    #[test]
    fn test_foreign_algorithms_rejected() {
        for name in ["HS256", "HS512", "EdDSA", "none", "es256", ""] {
            match name.parse::<JwsAlgorithm>() {
                Err(CryptoError::UnsupportedAlgorithm(alg)) => assert_eq!(alg, name),
                other => panic!("expected unsupported algorithm for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_selected_algorithms_verify_under_same_name() {
        for alg in [
            SignatureAlgorithm::RS512,
            SignatureAlgorithm::ES256,
            SignatureAlgorithm::ES256K,
            SignatureAlgorithm::ES384,
            SignatureAlgorithm::ES512,
        ] {
            let header = JwsAlgorithm::from(alg);
            assert_eq!(header.as_str(), alg.as_str());
            assert_eq!(header.family(), alg.family());
        }
    }

    #[test]
    fn test_families() {
        assert_eq!(SignatureAlgorithm::RS512.family(), AlgorithmFamily::Rsa);
        assert_eq!(SignatureAlgorithm::ES256K.family(), AlgorithmFamily::Ec);
    }
}
