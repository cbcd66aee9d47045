//! Signed log artifacts.
//!
//! A log signs the canonical object hash of an artifact (tree head, leaf, ...)
//! and ships the payload alongside its tagged signature. Consumers must call
//! [`Signed::verify`] before trusting the payload.

use crate::objecthash::{object_hash, HashError};
use crate::public_key::PublicKey;
use crate::types::{Hash256, LogId, TaggedSignature};
use crate::verifier::{verify_object_with_options, VerifyError, VerifyOptions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A payload together with the signature over its canonical object hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed<T> {
    pub payload: T,
    pub signature: TaggedSignature,
}

impl<T: Serialize> Signed<T> {
    pub fn new(payload: T, signature: TaggedSignature) -> Self {
        Self { payload, signature }
    }

    /// Verify the signature with default options.
    pub fn verify(&self, public_key: &PublicKey) -> Result<(), VerifyError> {
        self.verify_with_options(public_key, &VerifyOptions::default())
    }

    pub fn verify_with_options(
        &self,
        public_key: &PublicKey,
        options: &VerifyOptions,
    ) -> Result<(), VerifyError> {
        verify_object_with_options(public_key, &self.payload, &self.signature, options)
    }

    /// Verify and hand out the payload only on success.
    pub fn into_verified(self, public_key: &PublicKey) -> Result<T, VerifyError> {
        self.verify(public_key)?;
        Ok(self.payload)
    }
}

/// Commitment to the state of a log tree at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeHead {
    /// Log tree this head belongs to
    pub log_id: LogId,

    /// Number of leaves committed to
    pub tree_size: u64,

    /// Storage revision at which the head was produced
    pub tree_revision: u64,

    /// Merkle root over the first `tree_size` leaves
    pub root_hash: Hash256,

    /// When the log produced this head
    pub timestamp: DateTime<Utc>,
}

impl TreeHead {
    /// Canonical object hash of this tree head (the bytes the log signs).
    pub fn object_hash(&self) -> Result<Hash256, HashError> {
        object_hash(self)
    }
}

pub type SignedTreeHead = Signed<TreeHead>;
