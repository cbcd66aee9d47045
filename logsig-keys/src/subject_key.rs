//! SubjectPublicKeyInfo parsing.
//!
//! ## Supported Algorithms
//! - `id-ecPublicKey` on P-256 or P-384 -> [`PublicKey::Ecdsa`]
//! - `rsaEncryption` -> [`PublicKey::Rsa`]
//! - `id-Ed25519` -> [`PublicKey::Ed25519`]

use crate::KeyError;
use logsig_core::PublicKey;
use rsa::pkcs8::DecodePublicKey as _;
use x509_parser::prelude::FromDer as _;
use x509_parser::x509::SubjectPublicKeyInfo;

const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_ED25519: &str = "1.3.101.112";

/// Parse a DER-encoded SubjectPublicKeyInfo.
pub fn public_key_from_spki_der(der: &[u8]) -> Result<PublicKey, KeyError> {
    let (rest, spki) = SubjectPublicKeyInfo::from_der(der)
        .map_err(|e| unsupported(format!("not a SubjectPublicKeyInfo: {}", e)))?;
    if !rest.is_empty() {
        return Err(KeyError::TrailingData);
    }

    let algorithm = spki.algorithm.algorithm.to_id_string();
    tracing::trace!(%algorithm, "parsing SubjectPublicKeyInfo");

    match algorithm.as_str() {
        OID_EC_PUBLIC_KEY => parse_ecdsa(der),
        OID_RSA_ENCRYPTION => rsa::RsaPublicKey::from_public_key_der(der)
            .map(PublicKey::from)
            .map_err(|e| unsupported(format!("bad RSA public key: {}", e))),
        OID_ED25519 => ed25519_dalek::VerifyingKey::from_public_key_der(der)
            .map(PublicKey::from)
            .map_err(|e| unsupported(format!("bad Ed25519 public key: {}", e))),
        other => Err(unsupported(format!("public key algorithm {}", other))),
    }
}

/// The curve is named in the algorithm parameters; each decoder checks it.
fn parse_ecdsa(der: &[u8]) -> Result<PublicKey, KeyError> {
    if let Ok(key) = p256::PublicKey::from_public_key_der(der) {
        return Ok(PublicKey::from(p256::ecdsa::VerifyingKey::from(key)));
    }
    if let Ok(key) = p384::PublicKey::from_public_key_der(der) {
        return Ok(PublicKey::from(p384::ecdsa::VerifyingKey::from(key)));
    }
    Err(unsupported("elliptic curve is not P-256 or P-384"))
}

fn unsupported(message: impl Into<String>) -> KeyError {
    KeyError::UnsupportedKeyFormat(message.into())
}
