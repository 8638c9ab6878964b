//! Canonical encoding and hashing.
//!
//! Every commitment in the protocol (header hashes, vote signing bytes) is
//! derived from the same deterministic byte encoding: bincode with fixed-int
//! little-endian options and trailing-byte rejection, hashed with SHA-256.
//! Two encoders disagreeing on a single byte would make every commit
//! unverifiable, so this module is the single place the convention lives.

use bincode::Options;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// 32-byte digest wrapper used for all protocol commitments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// The all-zero digest.
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, CanonicalError> {
        let s = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(s).map_err(CanonicalError::from_hex)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CanonicalError::from_hex("expected 32-byte digest"))?;
        Ok(Self(array))
    }
}

impl std::fmt::Display for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash32::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Canonical serialization/hashing errors.
#[derive(Debug, Error)]
pub enum CanonicalError {
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("hash decode error: {0}")]
    FromHex(String),
}

impl CanonicalError {
    fn from_hex(err: impl ToString) -> Self {
        Self::FromHex(err.to_string())
    }
}

/// Canonical encoder options (fixed-int, little-endian, no trailing bytes).
fn encoder() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Serialize using canonical encoding.
pub fn canonical_encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    encoder().serialize(value).map_err(CanonicalError::from)
}

/// Decode canonical bytes back into the target structure.
pub fn canonical_decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CanonicalError> {
    encoder().deserialize(bytes).map_err(CanonicalError::from)
}

/// Hash any serializable value using canonical encoding and SHA-256.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<Hash32, CanonicalError> {
    let bytes = canonical_encode(value)?;
    Ok(canonical_hash_bytes(&bytes))
}

/// Hash raw bytes with the protocol digest (SHA-256).
pub fn canonical_hash_bytes(bytes: &[u8]) -> Hash32 {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash32(out)
}
