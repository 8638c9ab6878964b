//! Weighted validator sets.
//!
//! A `ValidatorSet` is an ordered sequence of validators with no duplicate
//! public keys. Quorum for every check in the verifier is measured against
//! the set's total voting power. The hash commitment is derived through the
//! same canonical-encoding pipeline as every other protocol commitment and
//! is computed at construction; the total is cached behind one-time
//! initialization. Either way a set shared across concurrent verifications
//! computes each quantity at most once.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::canonical::{canonical_hash, Hash32};

/// Ed25519 public key identifying a validator.
///
/// Two validators are the same validator iff their public keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let raw = hex::decode(s).map_err(serde::de::Error::custom)?;
        let array: [u8; 32] = raw
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32-byte public key"))?;
        Ok(PublicKey(array))
    }
}

/// A single validator: a public key with a non-negative integer weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub pub_key: PublicKey,
    pub voting_power: u64,
}

impl Validator {
    pub fn new(pub_key: PublicKey, voting_power: u64) -> Self {
        Self {
            pub_key,
            voting_power,
        }
    }
}

/// Errors from validator set construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorSetError {
    #[error("validator set must not be empty")]
    Empty,

    #[error("duplicate validator public key {0}")]
    DuplicateValidator(PublicKey),

    #[error("total voting power {total} exceeds the signed 64-bit range")]
    TotalPowerOverflow { total: u128 },

    #[error("cannot encode validator set: {0}")]
    Encoding(String),
}

/// An ordered, duplicate-free set of weighted validators.
///
/// # Invariants
///
/// - Non-empty.
/// - No duplicate public keys.
/// - Total voting power fits in an `i64`.
/// - Canonically encodable (proven at construction, where the hash
///   commitment is computed).
///
/// The hash is computed before the set can be shared and the total is
/// computed on first use and synchronized internally, so a `ValidatorSet`
/// behind an `Arc` can be used from any number of threads without call-site
/// locking.
#[derive(Debug)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
    index_by_key: HashMap<PublicKey, usize>,
    total_power: OnceLock<u64>,
    hash: Hash32,
}

impl ValidatorSet {
    /// Maximum allowed total voting power: `i64::MAX` as unsigned.
    pub const MAX_TOTAL_POWER: u64 = u64::MAX >> 1;

    /// Build a validator set, enforcing the set invariants.
    pub fn new<I>(validators: I) -> Result<Self, ValidatorSetError>
    where
        I: IntoIterator<Item = Validator>,
    {
        let mut vec = Vec::new();
        let mut index_by_key = HashMap::new();
        let mut total: u128 = 0;

        for validator in validators {
            if index_by_key.contains_key(&validator.pub_key) {
                return Err(ValidatorSetError::DuplicateValidator(validator.pub_key));
            }
            index_by_key.insert(validator.pub_key, vec.len());
            total += u128::from(validator.voting_power);
            vec.push(validator);
        }

        if vec.is_empty() {
            return Err(ValidatorSetError::Empty);
        }
        if total > u128::from(Self::MAX_TOTAL_POWER) {
            return Err(ValidatorSetError::TotalPowerOverflow { total });
        }

        let hash = canonical_hash(&vec)
            .map_err(|err| ValidatorSetError::Encoding(err.to_string()))?;

        Ok(Self {
            validators: vec,
            index_by_key,
            total_power: OnceLock::new(),
            hash,
        })
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// The validators in set order.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Look up a validator and its index by public key. O(1) expected.
    pub fn get_by_key(&self, pub_key: &PublicKey) -> Option<(usize, &Validator)> {
        self.index_by_key
            .get(pub_key)
            .map(|&idx| (idx, &self.validators[idx]))
    }

    /// Sum of all voting power. Cached after the first call.
    ///
    /// The constructor guarantees the sum fits in an `i64`, so plain `u64`
    /// accumulation cannot overflow here.
    pub fn total_power(&self) -> u64 {
        *self.total_power.get_or_init(|| {
            self.validators.iter().map(|v| v.voting_power).sum()
        })
    }

    /// Hash commitment over the ordered `(public key, voting power)`
    /// sequence: SHA-256 over the canonical encoding of the validators, the
    /// same pipeline every other protocol commitment uses.
    ///
    /// Order-sensitive and power-sensitive: this is the value embedded in
    /// headers as `validators_hash` / `next_validators_hash`. Computed at
    /// construction.
    pub fn hash(&self) -> Hash32 {
        self.hash
    }
}

impl Clone for ValidatorSet {
    fn clone(&self) -> Self {
        Self {
            validators: self.validators.clone(),
            index_by_key: self.index_by_key.clone(),
            total_power: self.total_power.clone(),
            hash: self.hash,
        }
    }
}

impl PartialEq for ValidatorSet {
    fn eq(&self, other: &Self) -> bool {
        self.validators == other.validators
    }
}

impl Eq for ValidatorSet {}

impl Serialize for ValidatorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.validators.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidatorSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let validators = Vec::<Validator>::deserialize(deserializer)?;
        ValidatorSet::new(validators).map_err(serde::de::Error::custom)
    }
}
