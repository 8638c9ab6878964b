//! Commits: the vote aggregates that prove a header was signed.
//!
//! A commit carries one vote slot per validator of the set that produced
//! it, in set order, so signed power can be counted without searching.
//! Absent slots are `None` and contribute zero power; they are never an
//! error. Each vote also embeds the signer's public key so a commit can be
//! cross-referenced against a *different* reference set (the skipping
//! verification path counts how much of the previously trusted set signed
//! a newer commit).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::canonical::Hash32;
use crate::validator::PublicKey;

/// Ed25519 signature bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let raw = hex::decode(s).map_err(serde::de::Error::custom)?;
        let array: [u8; 64] = raw
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 64-byte signature"))?;
        Ok(Signature(array))
    }
}

/// One validator's signed attestation to a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// The signer's public key.
    pub pub_key: PublicKey,

    /// The block hash this vote attests to.
    pub block_hash: Hash32,

    /// Signature over the canonical vote signing bytes.
    pub signature: Signature,
}

/// The aggregate of votes attesting to one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Height of the block this commit is for.
    pub height: u64,

    /// Hash of the block this commit is for.
    pub block_hash: Hash32,

    /// One slot per validator of the producing set, in set order.
    /// `None` marks a validator that did not sign.
    pub votes: Vec<Option<Vote>>,
}

impl Commit {
    pub fn new(height: u64, block_hash: Hash32, votes: Vec<Option<Vote>>) -> Self {
        Self {
            height,
            block_hash,
            votes,
        }
    }

    /// Number of vote slots (equals the producing set's cardinality).
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Iterator over the present votes, skipping absent slots.
    pub fn signed_votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes.iter().flatten()
    }

    /// Number of present votes.
    pub fn signed_count(&self) -> usize {
        self.signed_votes().count()
    }
}
