//! Weighted commit verification.
//!
//! One tally routine backs both named checks. It counts the voting power of
//! the *reference* set's members whose votes in the commit verify, with
//! these rules:
//!
//! - absent slots contribute zero and are never an error;
//! - signers unknown to the reference set contribute zero and are never an
//!   error (the reference set may legitimately differ from the set that
//!   produced the commit);
//! - each validator contributes at most once, the first valid vote wins;
//! - a vote with the wrong block hash or a failing signature contributes
//!   zero without aborting the tally. Tolerating minority bad votes is a
//!   liveness requirement, so a bad vote is a skipped vote, not an error.

use tracing::{debug, trace};

use light_core::{
    block_threshold_power, meets_block_threshold, vote_signing_bytes, Commit, SignatureVerifier,
    TrustLevel, ValidatorSet,
};

use crate::errors::VerificationError;

/// Sum the voting power of `ref_set` members with a valid vote in `commit`.
pub fn tally_signed_power<S: SignatureVerifier>(
    ref_set: &ValidatorSet,
    commit: &Commit,
    chain_id: &str,
    signature_verifier: &S,
) -> Result<u64, VerificationError> {
    let signing_bytes = vote_signing_bytes(chain_id, commit.height, commit.block_hash)
        .map_err(|err| VerificationError::InvalidCommit {
            reason: format!("cannot derive vote signing bytes: {err}"),
        })?;

    let mut counted = vec![false; ref_set.len()];
    let mut tallied: u64 = 0;

    for vote in commit.signed_votes() {
        let Some((index, validator)) = ref_set.get_by_key(&vote.pub_key) else {
            trace!(signer = %vote.pub_key, "vote from signer outside the reference set");
            continue;
        };
        if counted[index] {
            debug!(signer = %vote.pub_key, "duplicate vote for validator, keeping the first");
            continue;
        }
        if vote.block_hash != commit.block_hash {
            debug!(signer = %vote.pub_key, "vote references a different block");
            continue;
        }
        if !signature_verifier.verify_signature(&vote.pub_key, &signing_bytes, &vote.signature) {
            debug!(signer = %vote.pub_key, "invalid vote signature");
            continue;
        }

        counted[index] = true;
        // Set totals fit in i64, so the partial sum cannot overflow u64.
        tallied += validator.voting_power;
    }

    Ok(tallied)
}

/// Verify that `commit` is a valid commit of `vals` itself: one vote slot
/// per validator and strictly more than two thirds of the set's power
/// signing.
pub fn verify_commit_full<S: SignatureVerifier>(
    vals: &ValidatorSet,
    commit: &Commit,
    chain_id: &str,
    signature_verifier: &S,
) -> Result<(), VerificationError> {
    if commit.len() != vals.len() {
        return Err(VerificationError::InvalidCommit {
            reason: format!(
                "commit carries {} vote slots for a set of {} validators",
                commit.len(),
                vals.len()
            ),
        });
    }

    let got = tally_signed_power(vals, commit, chain_id, signature_verifier)?;
    let total = vals.total_power();
    if !meets_block_threshold(got, total) {
        return Err(VerificationError::NotEnoughVotingPowerSigned {
            got,
            needed: block_threshold_power(total),
        });
    }

    Ok(())
}

/// Verify that at least `trust_level` of `ref_set`'s power signed `commit`.
///
/// The commit belongs to some other (newer) validator set, so no shape
/// check applies; only the overlap of signing power matters. Failure means
/// too much validator change since the reference set was trusted.
pub fn verify_commit_trusting<S: SignatureVerifier>(
    ref_set: &ValidatorSet,
    commit: &Commit,
    chain_id: &str,
    trust_level: TrustLevel,
    signature_verifier: &S,
) -> Result<(), VerificationError> {
    let got = tally_signed_power(ref_set, commit, chain_id, signature_verifier)?;
    let total = ref_set.total_power();
    if !trust_level.is_met_by(got, total) {
        return Err(VerificationError::NewValSetCantBeTrusted {
            got,
            needed: trust_level.min_power(total),
        });
    }

    Ok(())
}
