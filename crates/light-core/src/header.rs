//! Block headers and signed headers.
//!
//! A `Header` commits to the validator set that signs it
//! (`validators_hash`) and to the set that will sign the next height
//! (`next_validators_hash`); that forward commitment is what lets the
//! verifier accept an adjacent header without a trust-level check. The
//! application digests (`app_hash`, `consensus_hash`, `results_hash`) are
//! carried opaquely and never interpreted here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canonical::{canonical_hash, CanonicalError, Hash32};
use crate::commit::Commit;

/// Structural header/commit validation errors.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("signed header belongs to another chain '{got}' not '{expected}'")]
    ChainIdMismatch { expected: String, got: String },

    #[error("header height must be at least 1")]
    NonPositiveHeight,

    #[error("commit signs block {got}, expected header hash {expected}")]
    CommitHashMismatch { expected: Hash32, got: Hash32 },

    #[error("commit is for height {commit}, expected header height {header}")]
    CommitHeightMismatch { header: u64, commit: u64 },

    #[error("canonical encoding error: {0}")]
    Canonical(#[from] CanonicalError),
}

/// A block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Chain this header belongs to.
    pub chain_id: String,

    /// Block height, starting at 1.
    pub height: u64,

    /// Block time in milliseconds since the Unix epoch.
    pub time_ms: u64,

    /// Commitment to the validator set that signs this height.
    pub validators_hash: Hash32,

    /// Commitment to the validator set that signs height + 1.
    pub next_validators_hash: Hash32,

    /// Application state digest after the previous block. Opaque.
    pub app_hash: Hash32,

    /// Consensus parameter digest. Opaque.
    pub consensus_hash: Hash32,

    /// Digest of the previous block's transaction results. Opaque.
    pub results_hash: Hash32,
}

impl Header {
    /// The header's hash: SHA-256 over its canonical encoding. This is the
    /// block identity that commits reference and votes sign.
    pub fn hash(&self) -> Result<Hash32, CanonicalError> {
        canonical_hash(self)
    }
}

/// A header together with the commit that attests to it.
///
/// Carries no verifier state; it is data. The verification layer decides
/// whether the commit actually carries enough signing power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedHeader {
    pub header: Header,
    pub commit: Commit,
}

impl SignedHeader {
    pub fn new(header: Header, commit: Commit) -> Self {
        Self { header, commit }
    }

    /// Structural validation against the configured chain.
    ///
    /// Checks that the header belongs to `chain_id`, that its height is
    /// positive, and that the commit references this header's hash and
    /// height. Commit length against the validator set's cardinality is
    /// checked by the commit verifier, which has the set in hand.
    pub fn validate_basic(&self, chain_id: &str) -> Result<(), HeaderError> {
        if self.header.chain_id != chain_id {
            return Err(HeaderError::ChainIdMismatch {
                expected: chain_id.to_string(),
                got: self.header.chain_id.clone(),
            });
        }

        if self.header.height < 1 {
            return Err(HeaderError::NonPositiveHeight);
        }

        let header_hash = self.header.hash()?;
        if self.commit.block_hash != header_hash {
            return Err(HeaderError::CommitHashMismatch {
                expected: header_hash,
                got: self.commit.block_hash,
            });
        }

        if self.commit.height != self.header.height {
            return Err(HeaderError::CommitHeightMismatch {
                header: self.header.height,
                commit: self.commit.height,
            });
        }

        Ok(())
    }
}
