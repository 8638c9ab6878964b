//! Canonical vote signing bytes and Ed25519 signature plumbing.
//!
//! What a validator signs is never the raw header: it is a domain-separated
//! canonical encoding of the vote identity (chain id, height, block hash).
//! The domain tag keeps vote signatures from being replayed as any other
//! kind of protocol signature.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::Serialize;

use crate::canonical::{canonical_encode, CanonicalError, Hash32};
use crate::commit::{Signature, Vote};
use crate::validator::PublicKey;

/// Domain separator for vote signing bytes (v1).
pub const VOTE_SIGNING_DOMAIN_V1: &[u8] = b"WEAVE-LIGHT:VOTE:V1\n";

/// The canonical payload a commit vote signs.
///
/// Vote type, round and step of the full consensus protocol collapse to the
/// single commit-vote kind carried in block commits, so they do not appear
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CanonicalVote<'a> {
    chain_id: &'a str,
    height: u64,
    block_hash: Hash32,
}

/// Canonical signing bytes for a vote on `(chain_id, height, block_hash)`.
///
/// Format: `VOTE_SIGNING_DOMAIN_V1 || canonical_bytes(CanonicalVote)`.
pub fn vote_signing_bytes(
    chain_id: &str,
    height: u64,
    block_hash: Hash32,
) -> Result<Vec<u8>, CanonicalError> {
    let payload = canonical_encode(&CanonicalVote {
        chain_id,
        height,
        block_hash,
    })?;
    let mut out = Vec::with_capacity(VOTE_SIGNING_DOMAIN_V1.len() + payload.len());
    out.extend_from_slice(VOTE_SIGNING_DOMAIN_V1);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Produce a signed vote for a block. This is the producer-side helper used
/// by chains embedding the light client types and by test fixtures.
pub fn sign_vote(
    signing_key: &SigningKey,
    chain_id: &str,
    height: u64,
    block_hash: Hash32,
) -> Result<Vote, CanonicalError> {
    let message = vote_signing_bytes(chain_id, height, block_hash)?;
    let signature = signing_key.sign(&message);
    Ok(Vote {
        pub_key: PublicKey(signing_key.verifying_key().to_bytes()),
        block_hash,
        signature: Signature(signature.to_bytes()),
    })
}

/// Signature verification seam consumed by the verifier.
///
/// Implementations must be deterministic and side-effect-free; a malformed
/// key or signature is simply an invalid signature, never a panic.
pub trait SignatureVerifier: Send + Sync {
    fn verify_signature(
        &self,
        pub_key: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> bool;
}

/// Production Ed25519 verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify_signature(
        &self,
        pub_key: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&pub_key.0) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        verifying_key.verify(message, &signature).is_ok()
    }
}
