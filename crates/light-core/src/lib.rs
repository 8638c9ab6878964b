#![forbid(unsafe_code)]
#![deny(clippy::float_arithmetic)]
#![deny(clippy::float_cmp)]
#![deny(clippy::cast_precision_loss)]
#![deny(clippy::cast_possible_truncation)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::cast_sign_loss)]

//! Core types and primitives for the Weave light client.
//!
//! This crate defines the data model shared by light client components:
//! weighted validator sets, block headers, commits (vote aggregates),
//! canonical encoding, and the Ed25519 vote signing scheme.
//!
//! All values are immutable once constructed; the verification layer in
//! `light-verifier` borrows them and never mutates. All timestamps are
//! milliseconds since the Unix epoch and all voting-power arithmetic is
//! exact integer arithmetic (the crate-level lints reject floats).

pub mod canonical;
pub mod commit;
pub mod header;
pub mod signing;
pub mod trust;
pub mod validator;

pub use canonical::{
    canonical_decode, canonical_encode, canonical_hash, CanonicalError, Hash32,
};
pub use commit::{Commit, Signature, Vote};
pub use header::{Header, HeaderError, SignedHeader};
pub use signing::{
    sign_vote, vote_signing_bytes, Ed25519Verifier, SignatureVerifier, VOTE_SIGNING_DOMAIN_V1,
};
pub use trust::{
    block_threshold_power, meets_block_threshold, TrustLevel, TrustLevelError,
    DEFAULT_TRUST_LEVEL,
};
pub use validator::{PublicKey, Validator, ValidatorSet, ValidatorSetError};
