//! Example: signing and verifying a log tree head
//!
//! Run with: cargo run -p logsig-keys --example verify_tree_head

use chrono::Utc;
use logsig_core::crypto::sha256;
use logsig_core::{LogId, Signed, TaggedSignature, TreeHead, VerifyError};
use logsig_keys::public_key_from_pem;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::{EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use signature::Signer;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Log Signature Verification - Example Usage\n");
    println!("==========================================\n");

    // Step 1: Log signing key (in production, this stays inside the log's HSM)
    println!("1. Generating log signing key...");
    let signing_key = SigningKey::random(&mut OsRng);
    let public_pem = signing_key
        .verifying_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| format!("encode public key: {}", e))?;
    println!("   Published key:\n{}", public_pem);

    // Step 2: Log signs the canonical object hash of a tree head
    println!("2. Signing tree head...");
    let head = TreeHead {
        log_id: LogId(1),
        tree_size: 5,
        tree_revision: 5,
        root_hash: sha256(b"leaves 0..5"),
        timestamp: Utc::now(),
    };
    let digest = head.object_hash()?;
    let signature: Signature = signing_key.sign(&digest);
    let sth = Signed::new(
        head,
        TaggedSignature::ecdsa_sha256(signature.to_der().as_bytes().to_vec()),
    );

    let wire = sth.signature.to_bytes()?;
    println!("   Object hash: {}", hex::encode(digest));
    println!("   Tagged signature: {} bytes of canonical CBOR\n", wire.len());

    // Step 3: Consumer loads the published key and verifies what it received
    println!("3. Verifying received tree head...");
    let public_key = public_key_from_pem(&public_pem)?;
    let received = Signed::new(sth.payload.clone(), TaggedSignature::from_bytes(&wire)?);
    received.verify(&public_key)?;
    println!("   Verified with {}\n", public_key);

    // Step 4: Any change to the payload is rejected
    println!("4. Tampering with tree size...");
    let mut forged = received.clone();
    forged.payload.tree_size += 1;
    match forged.verify(&public_key) {
        Err(VerifyError::VerificationFailed) => println!("   Rejected: tree head not trusted"),
        other => return Err(format!("tampered tree head was not rejected: {:?}", other).into()),
    }

    Ok(())
}
