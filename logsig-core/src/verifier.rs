//! Tagged signature verification.
//!
//! ## Verification Flow
//! 1. Resolve the declared hash algorithm (no fallback)
//! 2. Recompute the digest over the supplied bytes
//! 3. Bind the declared signature algorithm to the key family
//! 4. Decode the signature bytes and run the cryptographic check
//!
//! Every step is a hard gate. Cryptographic rejection always surfaces as the
//! single [`VerifyError::VerificationFailed`] variant.

use crate::crypto::{lookup_digester, Digester};
use crate::objecthash::{object_hash, HashError};
use crate::public_key::{EcdsaPublicKey, PublicKey};
use crate::types::{HashAlgorithm, SignatureAlgorithm, TaggedSignature};
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by signature verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(HashAlgorithm),

    #[error("Signature algorithm {declared} does not match {key_family} public key")]
    AlgorithmMismatch {
        declared: SignatureAlgorithm,
        key_family: &'static str,
    },

    #[error("Unknown public key type: {0}")]
    UnknownKeyType(&'static str),

    #[error("Malformed signature")]
    MalformedSignature,

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error(transparent)]
    Hash(#[from] HashError),
}

pub type Result<T> = std::result::Result<T, VerifyError>;

/// RSA padding scheme used for verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsaPadding {
    /// Deterministic RSASSA-PKCS1-v1_5
    #[default]
    Pkcs1v15,
    /// Probabilistic RSASSA-PSS, salt length equal to the digest length
    Pss,
}

/// Caller-selected verification options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOptions {
    #[serde(default)]
    pub rsa_padding: RsaPadding,
}

impl VerifyOptions {
    /// Options that verify RSA signatures with PSS padding.
    pub fn pss() -> Self {
        Self {
            rsa_padding: RsaPadding::Pss,
        }
    }
}

/// Verify `signature` over `data` with default options.
pub fn verify(public_key: &PublicKey, data: &[u8], signature: &TaggedSignature) -> Result<()> {
    verify_with_options(public_key, data, signature, &VerifyOptions::default())
}

/// Verify `signature` over `data`.
pub fn verify_with_options(
    public_key: &PublicKey,
    data: &[u8],
    signature: &TaggedSignature,
    options: &VerifyOptions,
) -> Result<()> {
    let digester = lookup_digester(signature.hash_algorithm)
        .ok_or(VerifyError::UnsupportedHashAlgorithm(signature.hash_algorithm))?;
    let digest = digester.digest(data);

    tracing::trace!(
        hash_algorithm = %signature.hash_algorithm,
        signature_algorithm = %signature.signature_algorithm,
        key_family = public_key.family(),
        "verifying tagged signature"
    );

    match public_key {
        PublicKey::Ecdsa(key) => {
            bind_algorithm(public_key, signature, SignatureAlgorithm::Ecdsa)?;
            verify_ecdsa(key, &digest, &signature.signature)
        }
        PublicKey::Rsa(key) => {
            bind_algorithm(public_key, signature, SignatureAlgorithm::Rsa)?;
            verify_rsa(key, digester, &digest, &signature.signature, options.rsa_padding)
        }
        PublicKey::Ed25519(_) => Err(VerifyError::UnknownKeyType(public_key.family())),
    }
}

/// Verify `signature` over the canonical object hash of `object` with default options.
pub fn verify_object<T: Serialize + ?Sized>(
    public_key: &PublicKey,
    object: &T,
    signature: &TaggedSignature,
) -> Result<()> {
    verify_object_with_options(public_key, object, signature, &VerifyOptions::default())
}

/// Verify `signature` over the canonical object hash of `object`.
pub fn verify_object_with_options<T: Serialize + ?Sized>(
    public_key: &PublicKey,
    object: &T,
    signature: &TaggedSignature,
    options: &VerifyOptions,
) -> Result<()> {
    let hash = object_hash(object)?;
    verify_with_options(public_key, &hash, signature, options)
}

fn bind_algorithm(
    public_key: &PublicKey,
    signature: &TaggedSignature,
    expected: SignatureAlgorithm,
) -> Result<()> {
    if signature.signature_algorithm != expected {
        return Err(VerifyError::AlgorithmMismatch {
            declared: signature.signature_algorithm,
            key_family: public_key.family(),
        });
    }
    Ok(())
}

/// DER structure errors are `MalformedSignature`. A well-formed pair whose
/// scalars are zero or out of range is rejected like any other bad signature.
fn verify_ecdsa(key: &EcdsaPublicKey, digest: &[u8], der: &[u8]) -> Result<()> {
    match key {
        EcdsaPublicKey::P256(verifying_key) => {
            let encoded = p256::ecdsa::DerSignature::from_bytes(der)
                .map_err(|_| VerifyError::MalformedSignature)?;
            let signature = p256::ecdsa::Signature::try_from(encoded)
                .map_err(|_| VerifyError::VerificationFailed)?;
            // Re-encoding must reproduce the input: no trailing bytes, minimal integers.
            if signature.to_der().as_bytes() != der {
                return Err(VerifyError::MalformedSignature);
            }
            verifying_key
                .verify_prehash(digest, &signature)
                .map_err(|_| VerifyError::VerificationFailed)
        }
        EcdsaPublicKey::P384(verifying_key) => {
            let encoded = p384::ecdsa::DerSignature::from_bytes(der)
                .map_err(|_| VerifyError::MalformedSignature)?;
            let signature = p384::ecdsa::Signature::try_from(encoded)
                .map_err(|_| VerifyError::VerificationFailed)?;
            if signature.to_der().as_bytes() != der {
                return Err(VerifyError::MalformedSignature);
            }
            verifying_key
                .verify_prehash(digest, &signature)
                .map_err(|_| VerifyError::VerificationFailed)
        }
    }
}

fn verify_rsa(
    key: &RsaPublicKey,
    digester: &Digester,
    digest: &[u8],
    signature: &[u8],
    padding: RsaPadding,
) -> Result<()> {
    let outcome = match padding {
        RsaPadding::Pkcs1v15 => key.verify(digester.pkcs1v15(), digest, signature),
        RsaPadding::Pss => key.verify(digester.pss(), digest, signature),
    };
    outcome.map_err(|_| VerifyError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::OnceLock;

    const DATA: &[u8] = b"signed tree head v1";

    #[test]
    fn test_ecdsa_p256_roundtrip() {
        let signature = sign_p256(DATA);
        assert!(verify(&p256_public_key(), DATA, &signature).is_ok());
    }

    #[test]
    fn test_ecdsa_p384_roundtrip() {
        let signature = sign_p384(DATA);
        assert!(verify(&p384_public_key(), DATA, &signature).is_ok());
    }

    #[test]
    fn test_rsa_pkcs1v15_roundtrip() {
        let signature = sign_rsa_pkcs1v15(DATA);
        assert!(verify(&rsa_public_key(), DATA, &signature).is_ok());
    }

    #[test]
    fn test_rsa_pss_requires_pss_option() {
        let signature = sign_rsa_pss(DATA);
        let key = rsa_public_key();

        assert!(verify_with_options(&key, DATA, &signature, &VerifyOptions::pss()).is_ok());
        assert!(matches!(
            verify(&key, DATA, &signature),
            Err(VerifyError::VerificationFailed)
        ));
    }

    #[test]
    fn test_rsa_pkcs1v15_rejected_under_pss_option() {
        let signature = sign_rsa_pkcs1v15(DATA);
        let result = verify_with_options(&rsa_public_key(), DATA, &signature, &VerifyOptions::pss());
        assert!(matches!(result, Err(VerifyError::VerificationFailed)));
    }

    #[test]
    fn test_tampered_data_fails() {
        let ecdsa = sign_p256(DATA);
        let rsa = sign_rsa_pkcs1v15(DATA);

        assert!(matches!(
            verify(&p256_public_key(), b"signed tree head v2", &ecdsa),
            Err(VerifyError::VerificationFailed)
        ));
        assert!(matches!(
            verify(&rsa_public_key(), b"signed tree head v2", &rsa),
            Err(VerifyError::VerificationFailed)
        ));
    }

    #[test]
    fn test_wrong_key_same_family_fails() {
        let signature = sign_p256(DATA);
        let result = verify(&p384_public_key(), DATA, &signature);
        assert!(matches!(result, Err(VerifyError::VerificationFailed)));
    }

    #[test]
    fn test_ecdsa_trailing_bytes_rejected() {
        let mut signature = sign_p256(DATA);
        signature.signature.push(0x00);

        let result = verify(&p256_public_key(), DATA, &signature);
        assert!(matches!(result, Err(VerifyError::MalformedSignature)));
    }

    #[test]
    fn test_ecdsa_garbage_rejected() {
        let signature = TaggedSignature::ecdsa_sha256(vec![0xde, 0xad, 0xbe, 0xef]);
        let result = verify(&p256_public_key(), DATA, &signature);
        assert!(matches!(result, Err(VerifyError::MalformedSignature)));
    }

    #[test]
    fn test_ecdsa_out_of_range_scalars_fail_verification() {
        // SEQUENCE { INTEGER 0, INTEGER 1 }
        let zero_r =
            TaggedSignature::ecdsa_sha256(vec![0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x01]);
        assert!(matches!(
            verify(&p256_public_key(), DATA, &zero_r),
            Err(VerifyError::VerificationFailed)
        ));

        // SEQUENCE { INTEGER 2^256 - 1, INTEGER 1 }: r exceeds the P-256 group order
        let mut der = vec![0x30, 0x26, 0x02, 0x21, 0x00];
        der.extend_from_slice(&[0xff; 32]);
        der.extend_from_slice(&[0x02, 0x01, 0x01]);
        let large_r = TaggedSignature::ecdsa_sha256(der);
        assert!(matches!(
            verify(&p256_public_key(), DATA, &large_r),
            Err(VerifyError::VerificationFailed)
        ));
    }

    #[test]
    fn test_ecdsa_non_minimal_integer_rejected() {
        // SEQUENCE { INTEGER 00 01, INTEGER 1 }
        let padded = TaggedSignature::ecdsa_sha256(vec![
            0x30, 0x07, 0x02, 0x02, 0x00, 0x01, 0x02, 0x01, 0x01,
        ]);
        assert!(matches!(
            verify(&p256_public_key(), DATA, &padded),
            Err(VerifyError::MalformedSignature)
        ));
    }

    #[test]
    fn test_ecdsa_raw_concatenation_rejected() {
        use signature::Signer as _;
        let raw: p256::ecdsa::Signature = p256_signing_key().sign(DATA);
        let signature = TaggedSignature::ecdsa_sha256(raw.to_bytes().to_vec());

        let result = verify(&p256_public_key(), DATA, &signature);
        assert!(matches!(result, Err(VerifyError::MalformedSignature)));
    }

    #[test]
    fn test_rsa_key_with_ecdsa_tag_is_mismatch() {
        // Garbage bytes: reaching any primitive would yield a different error.
        let signature = TaggedSignature::ecdsa_sha256(vec![0xff; 3]);
        let result = verify(&rsa_public_key(), DATA, &signature);
        assert!(matches!(
            result,
            Err(VerifyError::AlgorithmMismatch {
                declared: SignatureAlgorithm::Ecdsa,
                key_family: "RSA",
            })
        ));
    }

    #[test]
    fn test_ecdsa_key_with_rsa_tag_is_mismatch() {
        let mut signature = sign_p256(DATA);
        signature.signature_algorithm = SignatureAlgorithm::Rsa;

        let result = verify(&p256_public_key(), DATA, &signature);
        assert!(matches!(result, Err(VerifyError::AlgorithmMismatch { .. })));
    }

    #[test]
    fn test_unrecognized_signature_algorithm_is_mismatch() {
        let mut signature = sign_rsa_pkcs1v15(DATA);
        signature.signature_algorithm = SignatureAlgorithm::Unrecognized(3);

        let result = verify(&rsa_public_key(), DATA, &signature);
        assert!(matches!(result, Err(VerifyError::AlgorithmMismatch { .. })));
    }

    #[test]
    fn test_unsupported_hash_algorithm_for_every_key_type() {
        let keys = [
            p256_public_key(),
            p384_public_key(),
            rsa_public_key(),
            ed25519_public_key(),
        ];

        for key in &keys {
            for sig_alg in [SignatureAlgorithm::Ecdsa, SignatureAlgorithm::Rsa] {
                let signature =
                    TaggedSignature::new(HashAlgorithm::Unrecognized(4), sig_alg, vec![0u8; 8]);
                let result = verify(key, DATA, &signature);
                assert!(
                    matches!(
                        result,
                        Err(VerifyError::UnsupportedHashAlgorithm(HashAlgorithm::Unrecognized(4)))
                    ),
                    "{} key",
                    key.family()
                );
            }
        }
    }

    #[test]
    fn test_ed25519_key_is_unknown_type() {
        let signature = sign_p256(DATA);
        let result = verify(&ed25519_public_key(), DATA, &signature);
        assert!(matches!(result, Err(VerifyError::UnknownKeyType("Ed25519"))));
    }

    #[test]
    fn test_verify_object_is_order_independent() {
        let signed = json!({"a": 1, "b": 2});
        let hash = object_hash(&signed).unwrap();
        let signature = sign_p256(&hash);
        let key = p256_public_key();

        let reordered: serde_json::Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        assert!(verify_object(&key, &signed, &signature).is_ok());
        assert!(verify_object(&key, &reordered, &signature).is_ok());

        let altered = json!({"a": 1, "b": 3});
        assert!(matches!(
            verify_object(&key, &altered, &signature),
            Err(VerifyError::VerificationFailed)
        ));
    }

    #[test]
    fn test_verify_object_rsa_pss() {
        let object = json!({"tree_size": 10, "root": "00ff"});
        let signature = sign_rsa_pss(&object_hash(&object).unwrap());

        let result =
            verify_object_with_options(&rsa_public_key(), &object, &signature, &VerifyOptions::pss());
        assert!(result.is_ok());
    }

    #[test]
    fn test_verify_object_unhashable() {
        let mut object = json!(null);
        for _ in 0..200 {
            object = json!([object]);
        }

        let result = verify_object(&p256_public_key(), &object, &sign_p256(DATA));
        assert!(matches!(result, Err(VerifyError::Hash(HashError::UnhashableInput(_)))));
    }

    #[test]
    fn test_verify_options_config_form() {
        let options: VerifyOptions = serde_json::from_str(r#"{"rsa_padding":"pss"}"#).unwrap();
        assert_eq!(options, VerifyOptions::pss());

        let defaults: VerifyOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults.rsa_padding, RsaPadding::Pkcs1v15);
    }

    fn rsa_fixture() -> &'static (PublicKey, TaggedSignature) {
        static FIXTURE: OnceLock<(PublicKey, TaggedSignature)> = OnceLock::new();
        FIXTURE.get_or_init(|| (rsa_public_key(), sign_rsa_pkcs1v15(DATA)))
    }

    fn ecdsa_fixture() -> &'static (PublicKey, TaggedSignature) {
        static FIXTURE: OnceLock<(PublicKey, TaggedSignature)> = OnceLock::new();
        FIXTURE.get_or_init(|| (p256_public_key(), sign_p256(DATA)))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_data_bit_flip_rejected(bit in 0..(DATA.len() * 8)) {
            let mut data = DATA.to_vec();
            data[bit / 8] ^= 1 << (bit % 8);

            let (rsa_key, rsa_sig) = rsa_fixture();
            prop_assert!(matches!(verify(rsa_key, &data, rsa_sig), Err(VerifyError::VerificationFailed)));

            let (ec_key, ec_sig) = ecdsa_fixture();
            prop_assert!(matches!(verify(ec_key, &data, ec_sig), Err(VerifyError::VerificationFailed)));
        }

        #[test]
        fn prop_rsa_signature_bit_flip_rejected(bit in 0..(256usize * 8)) {
            let (key, signature) = rsa_fixture();
            let mut tampered = signature.clone();
            tampered.signature[bit / 8] ^= 1 << (bit % 8);

            prop_assert!(matches!(verify(key, DATA, &tampered), Err(VerifyError::VerificationFailed)));
        }

        #[test]
        fn prop_ecdsa_signature_bit_flip_rejected(seed in any::<usize>()) {
            let (key, signature) = ecdsa_fixture();
            let bit = seed % (signature.signature.len() * 8);
            let mut tampered = signature.clone();
            tampered.signature[bit / 8] ^= 1 << (bit % 8);

            prop_assert!(matches!(
                verify(key, DATA, &tampered),
                Err(VerifyError::VerificationFailed) | Err(VerifyError::MalformedSignature)
            ));
        }
    }
}
