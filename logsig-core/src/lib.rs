//! # Log Signature Core
//!
//! Verifies digital signatures over structured log artifacts.
//!
//! ## Key Features
//! - **Canonical object hashing**: order-independent, type-distinguishing digests
//! - **Algorithm binding**: declared signature algorithm must match the key family
//! - **Fail-closed verification**: every failure is a distinct, terminal error
//! - **Canonical CBOR**: deterministic wire form for tagged signatures

pub mod crypto;
mod lowering;
pub mod objecthash;
pub mod public_key;
pub mod serialization;
pub mod signed;
pub mod types;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use objecthash::{object_hash, HashError};
pub use public_key::{EcdsaPublicKey, PublicKey};
pub use serialization::SerializationError;
pub use signed::{Signed, SignedTreeHead, TreeHead};
pub use types::*;
pub use verifier::{
    verify, verify_object, verify_object_with_options, verify_with_options, RsaPadding,
    VerifyError, VerifyOptions,
};
