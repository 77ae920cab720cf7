//! # Signature Primitives
//!
//! Raw sign/verify over a JWS signing input. Signatures use the JWS wire
//! form: PKCS#1 v1.5 or PSS bytes for RSA, fixed-width `r || s` for ECDSA.
//!
//! Verification first dispatches on the algorithm family, then checks that
//! the key actually fits the algorithm. A key of the wrong family or curve is
//! [`CryptoError::KeyMismatch`], never a silent verification failure.

use ecdsa::signature::{SignatureEncoding, Signer, Verifier};
use idreport_core::CryptoError;
use rsa::{pkcs1v15, pss};
use sha2::{Sha256, Sha384, Sha512};

use crate::algorithm::{AlgorithmFamily, JwsAlgorithm, SignatureAlgorithm};
use crate::key::{EcCurve, PrivateKey, PublicKey};

/// Sign `input` with `key` under `algorithm`.
pub(crate) fn sign_input(
    algorithm: SignatureAlgorithm,
    key: &PrivateKey,
    input: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    match (algorithm, key) {
        (SignatureAlgorithm::RS512, PrivateKey::Rsa(key)) => {
            let signer = pkcs1v15::SigningKey::<Sha512>::new(key.clone());
            let signature = signer.try_sign(input).map_err(signer_error)?;
            Ok(signature.to_vec())
        }
        (SignatureAlgorithm::ES256, PrivateKey::P256(key)) => {
            let signer = p256::ecdsa::SigningKey::from(key);
            let signature: p256::ecdsa::Signature = signer.try_sign(input).map_err(signer_error)?;
            Ok(signature.to_bytes().to_vec())
        }
        (SignatureAlgorithm::ES256K, PrivateKey::Secp256k1(key)) => {
            let signer = k256::ecdsa::SigningKey::from(key);
            let signature: k256::ecdsa::Signature = signer.try_sign(input).map_err(signer_error)?;
            Ok(signature.to_bytes().to_vec())
        }
        (SignatureAlgorithm::ES384, PrivateKey::P384(key)) => {
            let signer = p384::ecdsa::SigningKey::from(key);
            let signature: p384::ecdsa::Signature = signer.try_sign(input).map_err(signer_error)?;
            Ok(signature.to_bytes().to_vec())
        }
        (SignatureAlgorithm::ES512, PrivateKey::P521(key)) => {
            let signer = p521::ecdsa::SigningKey::from_bytes(&key.to_bytes()).map_err(signer_error)?;
            let signature: p521::ecdsa::Signature = signer.try_sign(input).map_err(signer_error)?;
            Ok(signature.to_bytes().to_vec())
        }
        (algorithm, PrivateKey::Unsupported { algorithm: key }) => Err(CryptoError::KeyError(
            format!("no {algorithm} signer available for a {key} private key"),
        )),
        (algorithm, key) => Err(CryptoError::KeyMismatch {
            algorithm: algorithm.to_string(),
            key: key.describe(),
        }),
    }
}

/// Verify `signature` over `input` with `key` under `algorithm`.
pub(crate) fn verify_input(
    algorithm: JwsAlgorithm,
    key: &PublicKey,
    input: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    match algorithm.family() {
        AlgorithmFamily::Rsa => verify_rsa(algorithm, key, input, signature),
        AlgorithmFamily::Ec => verify_ec(algorithm, key, input, signature),
    }
}

fn verify_rsa(
    algorithm: JwsAlgorithm,
    key: &PublicKey,
    input: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let PublicKey::Rsa(rsa_key) = key else {
        return Err(mismatch(algorithm, key));
    };
    let rsa_key = rsa_key.clone();
    let verified = match algorithm {
        JwsAlgorithm::RS256 => pkcs1v15::VerifyingKey::<Sha256>::new(rsa_key)
            .verify(input, &pkcs1v15_signature(signature)?),
        JwsAlgorithm::RS384 => pkcs1v15::VerifyingKey::<Sha384>::new(rsa_key)
            .verify(input, &pkcs1v15_signature(signature)?),
        JwsAlgorithm::RS512 => pkcs1v15::VerifyingKey::<Sha512>::new(rsa_key)
            .verify(input, &pkcs1v15_signature(signature)?),
        JwsAlgorithm::PS256 => {
            pss::VerifyingKey::<Sha256>::new(rsa_key).verify(input, &pss_signature(signature)?)
        }
        JwsAlgorithm::PS384 => {
            pss::VerifyingKey::<Sha384>::new(rsa_key).verify(input, &pss_signature(signature)?)
        }
        JwsAlgorithm::PS512 => {
            pss::VerifyingKey::<Sha512>::new(rsa_key).verify(input, &pss_signature(signature)?)
        }
        _ => return Err(mismatch(algorithm, key)),
    };
    verified.map_err(invalid)
}

fn pkcs1v15_signature(bytes: &[u8]) -> Result<pkcs1v15::Signature, CryptoError> {
    pkcs1v15::Signature::try_from(bytes).map_err(invalid)
}

fn pss_signature(bytes: &[u8]) -> Result<pss::Signature, CryptoError> {
    pss::Signature::try_from(bytes).map_err(invalid)
}

fn verify_ec(
    algorithm: JwsAlgorithm,
    key: &PublicKey,
    input: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let PublicKey::Ec { curve, point } = key else {
        return Err(mismatch(algorithm, key));
    };
    match (algorithm, curve) {
        (JwsAlgorithm::ES256, EcCurve::P256) => {
            let verifier = p256::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(verifier_error)?;
            let signature = p256::ecdsa::Signature::from_slice(signature).map_err(invalid)?;
            verifier.verify(input, &signature).map_err(invalid)
        }
        (JwsAlgorithm::ES256K, EcCurve::Secp256k1) => {
            let verifier = k256::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(verifier_error)?;
            let signature = k256::ecdsa::Signature::from_slice(signature).map_err(invalid)?;
            // k256 only accepts low-S; other signers may emit either form.
            let signature = signature.normalize_s().unwrap_or(signature);
            verifier.verify(input, &signature).map_err(invalid)
        }
        (JwsAlgorithm::ES384, EcCurve::P384) => {
            let verifier = p384::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(verifier_error)?;
            let signature = p384::ecdsa::Signature::from_slice(signature).map_err(invalid)?;
            verifier.verify(input, &signature).map_err(invalid)
        }
        (JwsAlgorithm::ES512, EcCurve::P521) => {
            let verifier = p521::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(verifier_error)?;
            let signature = p521::ecdsa::Signature::from_slice(signature).map_err(invalid)?;
            verifier.verify(input, &signature).map_err(invalid)
        }
        _ => Err(mismatch(algorithm, key)),
    }
}

fn mismatch(algorithm: JwsAlgorithm, key: &PublicKey) -> CryptoError {
    CryptoError::KeyMismatch {
        algorithm: algorithm.to_string(),
        key: key.to_string(),
    }
}

fn invalid(e: impl std::fmt::Display) -> CryptoError {
    CryptoError::SignatureInvalid(e.to_string())
}

fn signer_error(e: impl std::fmt::Display) -> CryptoError {
    CryptoError::KeyError(format!("cannot sign: {e}"))
}

fn verifier_error(e: impl std::fmt::Display) -> CryptoError {
    CryptoError::KeyError(format!("cannot construct verifier: {e}"))
}
