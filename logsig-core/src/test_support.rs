//! Fixture keys and signing helpers shared by unit tests.

use crate::crypto::sha256;
use crate::public_key::PublicKey;
use crate::types::TaggedSignature;
use p256::pkcs8::DecodePrivateKey as _;
use rsa::pkcs8::DecodePrivateKey as _;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey};
use sha2::Sha256;
use signature::Signer as _;

const P256_PRIVATE_PEM: &str = include_str!("../../testdata/ec_p256_private.pem");
const P384_PRIVATE_PEM: &str = include_str!("../../testdata/ec_p384_private.pem");
const RSA_PRIVATE_PEM: &str = include_str!("../../testdata/rsa_private.pem");

pub fn p256_signing_key() -> p256::ecdsa::SigningKey {
    p256::ecdsa::SigningKey::from_pkcs8_pem(P256_PRIVATE_PEM).unwrap()
}

pub fn p384_signing_key() -> p384::ecdsa::SigningKey {
    p384::ecdsa::SigningKey::from_pkcs8_pem(P384_PRIVATE_PEM).unwrap()
}

pub fn rsa_private_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(RSA_PRIVATE_PEM).unwrap()
}

pub fn p256_public_key() -> PublicKey {
    PublicKey::from(p256::ecdsa::VerifyingKey::from(&p256_signing_key()))
}

pub fn p384_public_key() -> PublicKey {
    PublicKey::from(p384::ecdsa::VerifyingKey::from(&p384_signing_key()))
}

pub fn rsa_public_key() -> PublicKey {
    PublicKey::from(rsa_private_key().to_public_key())
}

pub fn ed25519_public_key() -> PublicKey {
    let signing_key = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
    PublicKey::from(signing_key.verifying_key())
}

/// ECDSA P-256 over SHA-256(data), DER encoded.
pub fn sign_p256(data: &[u8]) -> TaggedSignature {
    let signature: p256::ecdsa::Signature = p256_signing_key().sign(data);
    TaggedSignature::ecdsa_sha256(signature.to_der().as_bytes().to_vec())
}

/// ECDSA P-384 over SHA-256(data), DER encoded.
pub fn sign_p384(data: &[u8]) -> TaggedSignature {
    use p384::ecdsa::signature::hazmat::PrehashSigner;
    let signature: p384::ecdsa::Signature = p384_signing_key()
        .sign_prehash(&sha256(data))
        .unwrap();
    TaggedSignature::ecdsa_sha256(signature.to_der().as_bytes().to_vec())
}

/// RSASSA-PKCS1-v1_5 over SHA-256(data).
pub fn sign_rsa_pkcs1v15(data: &[u8]) -> TaggedSignature {
    let signature = rsa_private_key()
        .sign(Pkcs1v15Sign::new::<Sha256>(), &sha256(data))
        .unwrap();
    TaggedSignature::rsa_sha256(signature)
}

/// RSASSA-PSS over SHA-256(data).
pub fn sign_rsa_pss(data: &[u8]) -> TaggedSignature {
    let mut rng = rand::rngs::OsRng;
    let signature = rsa_private_key()
        .sign_with_rng(&mut rng, Pss::new::<Sha256>(), &sha256(data))
        .unwrap();
    TaggedSignature::rsa_sha256(signature)
}
