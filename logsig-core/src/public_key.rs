//! Public keys accepted by the verifier.
//!
//! `PublicKey` is a closed union over key families. The verifier matches it
//! exhaustively, so a new family has to be handled there before it compiles.

use std::fmt;

/// ECDSA verifying key on one of the supported NIST curves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcdsaPublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

impl EcdsaPublicKey {
    /// Curve name (e.g., "P-256").
    pub fn curve(&self) -> &'static str {
        match self {
            EcdsaPublicKey::P256(_) => "P-256",
            EcdsaPublicKey::P384(_) => "P-384",
        }
    }
}

/// A parsed public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Ecdsa(EcdsaPublicKey),
    Rsa(rsa::RsaPublicKey),
    /// Parsed from SPKI but not usable with any tagged signature algorithm.
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PublicKey {
    /// Key family name, for diagnostics.
    pub fn family(&self) -> &'static str {
        match self {
            PublicKey::Ecdsa(_) => "ECDSA",
            PublicKey::Rsa(_) => "RSA",
            PublicKey::Ed25519(_) => "Ed25519",
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKey::Ecdsa(key) => write!(f, "ECDSA {} public key", key.curve()),
            PublicKey::Rsa(key) => {
                use rsa::traits::PublicKeyParts;
                write!(f, "RSA-{} public key", key.size() * 8)
            }
            PublicKey::Ed25519(_) => write!(f, "Ed25519 public key"),
        }
    }
}

impl From<p256::ecdsa::VerifyingKey> for PublicKey {
    fn from(key: p256::ecdsa::VerifyingKey) -> Self {
        PublicKey::Ecdsa(EcdsaPublicKey::P256(key))
    }
}

impl From<p384::ecdsa::VerifyingKey> for PublicKey {
    fn from(key: p384::ecdsa::VerifyingKey) -> Self {
        PublicKey::Ecdsa(EcdsaPublicKey::P384(key))
    }
}

impl From<rsa::RsaPublicKey> for PublicKey {
    fn from(key: rsa::RsaPublicKey) -> Self {
        PublicKey::Rsa(key)
    }
}

impl From<ed25519_dalek::VerifyingKey> for PublicKey {
    fn from(key: ed25519_dalek::VerifyingKey) -> Self {
        PublicKey::Ed25519(key)
    }
}
