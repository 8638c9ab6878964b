//! The verification error taxonomy.
//!
//! Every failure mode is a distinct variant carrying the exact values the
//! check compared, so callers branch on kind instead of parsing messages.
//! Voting power is reported as integers: the tallied power (`got`) and the
//! smallest power that would have passed the failed check (`needed`).

use thiserror::Error;

use light_core::{Hash32, HeaderError};

/// Why a candidate header was rejected.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The candidate signed header failed structural validation
    /// (foreign chain id, non-positive height, commit reference mismatch).
    #[error("invalid header: {0}")]
    InvalidHeader(#[from] HeaderError),

    /// The commit's shape does not fit the validator set it must have been
    /// produced by.
    #[error("invalid commit: {reason}")]
    InvalidCommit { reason: String },

    /// The candidate's height does not increase over the trusted height.
    #[error("expected new header height {new} to be greater than one of old header {old}")]
    NonIncreasingHeight { old: u64, new: u64 },

    /// The candidate's block time does not increase over the trusted time.
    #[error(
        "expected new header time {new_ms}ms to be after old header time {old_ms}ms"
    )]
    NonMonotonicBlockTime { old_ms: u64, new_ms: u64 },

    /// The trusted header has left its trusting period and can no longer
    /// serve as a trust anchor.
    #[error("old header has expired at {expired_at_ms}ms (now: {now_ms}ms)")]
    OldHeaderExpired { expired_at_ms: u64, now_ms: u64 },

    /// The candidate's block time lies at or beyond the acceptable bound.
    #[error(
        "new header has a time from the future {header_time_ms}ms (bound: {bound_ms}ms)"
    )]
    NewHeaderTooFarIntoFuture { header_time_ms: u64, bound_ms: u64 },

    /// The supplied validator set does not hash to the candidate header's
    /// `validators_hash`.
    #[error(
        "expected new header validators ({expected}) to match those that were supplied ({got})"
    )]
    InvalidValidatorSet { expected: Hash32, got: Hash32 },

    /// Adjacent verification: the supplied set does not hash to the trusted
    /// header's `next_validators_hash`.
    #[error(
        "expected old header next validators ({expected}) to match those from new header ({got})"
    )]
    InvalidNextValidatorSet { expected: Hash32, got: Hash32 },

    /// The commit does not carry enough of its own set's power: the block
    /// is invalid under the validators that were supposed to produce it.
    #[error("not enough voting power signed: got {got}, needed at least {needed}")]
    NotEnoughVotingPowerSigned { got: u64, needed: u64 },

    /// Skipping verification: too much change between the trusted set and
    /// the candidate commit; continuity of trust is broken.
    #[error(
        "too much change: new validator set cannot be trusted, got {got} of previously trusted power, needed {needed}"
    )]
    NewValSetCantBeTrusted { got: u64, needed: u64 },
}
