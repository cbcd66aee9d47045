//! Public key material loading for log signature verification.
//!
//! Turns PEM-encoded SubjectPublicKeyInfo text into the
//! [`logsig_core::PublicKey`] the verifier consumes.
//!
//! ## Loading Flow
//! 1. Decode exactly one PEM block (no trailing data)
//! 2. Parse the block as a DER SubjectPublicKeyInfo
//! 3. Dispatch on the key algorithm OID

pub mod pem;
pub mod subject_key;

use logsig_core::PublicKey;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use subject_key::public_key_from_spki_der;

/// Errors that can occur while loading key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Could not decode PEM for public key: {0}")]
    MalformedKeyEncoding(String),

    #[error("Extra data found after PEM key decoded")]
    TrailingData,

    #[error("Unable to parse public key: {0}")]
    UnsupportedKeyFormat(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a PEM-encoded public key.
pub fn public_key_from_pem(pem_text: &str) -> Result<PublicKey, KeyError> {
    let block = pem::decode_single(pem_text)?;
    tracing::debug!(label = %block.label, len = block.contents.len(), "Decoded PEM block");

    let key = public_key_from_spki_der(&block.contents)?;
    tracing::debug!("Parsed {}", key);

    Ok(key)
}

/// Read and parse a PEM-encoded public key file.
pub fn public_key_from_file(path: impl AsRef<Path>) -> Result<PublicKey, KeyError> {
    let path = path.as_ref();
    let pem_text = std::fs::read_to_string(path).map_err(|source| KeyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    public_key_from_pem(&pem_text)
}
