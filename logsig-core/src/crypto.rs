//! Cryptographic primitives and the hash-algorithm lookup table.

use crate::types::{Hash256, HashAlgorithm};
use rsa::{Pkcs1v15Sign, Pss};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data.
pub fn sha256(data: &[u8]) -> Hash256 {
    let hash = Sha256::digest(data);
    hash.into()
}

/// A concrete digest function bound to a wire hash algorithm, together with
/// the RSA padding schemes parameterized by that digest.
pub struct Digester {
    pub algorithm: HashAlgorithm,
    digest: fn(&[u8]) -> Vec<u8>,
    pkcs1v15: fn() -> Pkcs1v15Sign,
    pss: fn() -> Pss,
}

impl Digester {
    /// Hash `data` with this digester's algorithm.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        (self.digest)(data)
    }

    /// Deterministic RSASSA-PKCS1-v1_5 scheme for this digest.
    pub fn pkcs1v15(&self) -> Pkcs1v15Sign {
        (self.pkcs1v15)()
    }

    /// Probabilistic RSASSA-PSS scheme for this digest (salt length = digest length).
    pub fn pss(&self) -> Pss {
        (self.pss)()
    }
}

impl std::fmt::Debug for Digester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digester")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

fn sha256_digest(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// Supported hash algorithms. Read-only for the life of the process.
static DIGESTERS: &[Digester] = &[Digester {
    algorithm: HashAlgorithm::Sha256,
    digest: sha256_digest,
    pkcs1v15: Pkcs1v15Sign::new::<Sha256>,
    pss: Pss::new::<Sha256>,
}];

/// Resolve a wire hash algorithm to its digester.
///
/// Returns `None` for anything not in the table; callers must not substitute
/// a default.
pub fn lookup_digester(algorithm: HashAlgorithm) -> Option<&'static Digester> {
    DIGESTERS.iter().find(|d| d.algorithm == algorithm)
}
