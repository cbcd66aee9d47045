//! Core types used across the log signature system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA-256 hash (32 bytes)
pub type Hash256 = [u8; 32];

/// Hash algorithm named by a tagged signature.
///
/// Serialized as its integer wire value. Values this build does not know are
/// kept as `Unrecognized` so the verifier can reject them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum HashAlgorithm {
    /// SHA-256 (wire value 1)
    Sha256,
    /// Any other wire value
    Unrecognized(i32),
}

impl From<i32> for HashAlgorithm {
    fn from(value: i32) -> Self {
        match value {
            1 => HashAlgorithm::Sha256,
            other => HashAlgorithm::Unrecognized(other),
        }
    }
}

impl From<HashAlgorithm> for i32 {
    fn from(value: HashAlgorithm) -> Self {
        match value {
            HashAlgorithm::Sha256 => 1,
            HashAlgorithm::Unrecognized(other) => other,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha256 => write!(f, "SHA-256"),
            HashAlgorithm::Unrecognized(id) => write!(f, "unrecognized({})", id),
        }
    }
}

/// Signature algorithm named by a tagged signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum SignatureAlgorithm {
    /// ECDSA (wire value 1)
    Ecdsa,
    /// RSA (wire value 2)
    Rsa,
    /// Any other wire value
    Unrecognized(i32),
}

impl From<i32> for SignatureAlgorithm {
    fn from(value: i32) -> Self {
        match value {
            1 => SignatureAlgorithm::Ecdsa,
            2 => SignatureAlgorithm::Rsa,
            other => SignatureAlgorithm::Unrecognized(other),
        }
    }
}

impl From<SignatureAlgorithm> for i32 {
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            SignatureAlgorithm::Ecdsa => 1,
            SignatureAlgorithm::Rsa => 2,
            SignatureAlgorithm::Unrecognized(other) => other,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::Ecdsa => write!(f, "ECDSA"),
            SignatureAlgorithm::Rsa => write!(f, "RSA"),
            SignatureAlgorithm::Unrecognized(id) => write!(f, "unrecognized({})", id),
        }
    }
}

/// A signature bundled with the algorithms that produced it.
///
/// The layout of `signature` depends on `signature_algorithm`:
/// - ECDSA: DER `SEQUENCE { INTEGER r, INTEGER s }`
/// - RSA: raw PKCS#1 v1.5 or PSS signature bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedSignature {
    pub hash_algorithm: HashAlgorithm,
    pub signature_algorithm: SignatureAlgorithm,
    pub signature: Vec<u8>,
}

impl TaggedSignature {
    pub fn new(
        hash_algorithm: HashAlgorithm,
        signature_algorithm: SignatureAlgorithm,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            hash_algorithm,
            signature_algorithm,
            signature,
        }
    }

    /// SHA-256 + ECDSA with a DER-encoded (r, s) pair.
    pub fn ecdsa_sha256(der_signature: Vec<u8>) -> Self {
        Self::new(HashAlgorithm::Sha256, SignatureAlgorithm::Ecdsa, der_signature)
    }

    /// SHA-256 + RSA with raw signature bytes.
    pub fn rsa_sha256(signature: Vec<u8>) -> Self {
        Self::new(HashAlgorithm::Sha256, SignatureAlgorithm::Rsa, signature)
    }
}

/// Log identifier (unique per log tree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(pub i64);

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
