//! The verification driver.
//!
//! Orchestrates structural, temporal, binding and commit checks, and
//! dispatches between adjacent and skipping verification on the height
//! distance between the trusted and candidate headers.

use tracing::debug;

use light_core::{
    Ed25519Verifier, Header, SignatureVerifier, SignedHeader, TrustLevel, ValidatorSet,
};

use crate::commit_verifier::{verify_commit_full, verify_commit_trusting};
use crate::errors::VerificationError;
use crate::time_guard::{check_candidate_time, check_trusting_period};

/// Verification parameters.
///
/// `max_clock_drift_ms` bounds how far a candidate's block time may run
/// ahead of the caller's clock; left unset it equals the trusting period,
/// which is the convention the protocol inherited.
#[derive(Debug, Clone)]
pub struct VerifierOptions {
    chain_id: String,
    trusting_period_ms: u64,
    max_clock_drift_ms: Option<u64>,
    trust_level: TrustLevel,
}

impl VerifierOptions {
    pub fn new(chain_id: impl Into<String>, trusting_period_ms: u64) -> Self {
        Self {
            chain_id: chain_id.into(),
            trusting_period_ms,
            max_clock_drift_ms: None,
            trust_level: TrustLevel::ONE_THIRD,
        }
    }

    /// Set the trust level for skipping verification. The type enforces the
    /// `[1/3, 1]` range, so raising is possible and lowering below one
    /// third is not.
    pub fn with_trust_level(mut self, trust_level: TrustLevel) -> Self {
        self.trust_level = trust_level;
        self
    }

    /// Bound the candidate's clock drift separately from the trusting
    /// period.
    pub fn with_max_clock_drift_ms(mut self, max_clock_drift_ms: u64) -> Self {
        self.max_clock_drift_ms = Some(max_clock_drift_ms);
        self
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn trusting_period_ms(&self) -> u64 {
        self.trusting_period_ms
    }

    pub fn trust_level(&self) -> TrustLevel {
        self.trust_level
    }

    pub fn max_clock_drift_ms(&self) -> u64 {
        self.max_clock_drift_ms.unwrap_or(self.trusting_period_ms)
    }
}

/// A trust anchor: a header and the validator set it commits to.
///
/// The constructor checks the binding between the two, so an inconsistent
/// anchor cannot be built. Callers that accept a verification verdict are
/// expected to atomically replace their anchor with the candidate pair;
/// that transition lives outside this crate.
#[derive(Debug, Clone)]
pub struct TrustedState {
    header: Header,
    validators: ValidatorSet,
}

impl TrustedState {
    pub fn new(header: Header, validators: ValidatorSet) -> Result<Self, VerificationError> {
        let supplied = validators.hash();
        if supplied != header.validators_hash {
            return Err(VerificationError::InvalidValidatorSet {
                expected: header.validators_hash,
                got: supplied,
            });
        }
        Ok(Self { header, validators })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }
}

/// The header verification core.
///
/// Pure and synchronous: borrows its inputs for the duration of a call,
/// performs no I/O, and is safe to share across threads.
#[derive(Debug, Clone)]
pub struct Verifier<S: SignatureVerifier = Ed25519Verifier> {
    options: VerifierOptions,
    signature_verifier: S,
}

impl Verifier<Ed25519Verifier> {
    /// Verifier with the production Ed25519 signature check.
    pub fn new(options: VerifierOptions) -> Self {
        Self {
            options,
            signature_verifier: Ed25519Verifier,
        }
    }
}

impl<S: SignatureVerifier> Verifier<S> {
    /// Verifier with a caller-supplied signature backend.
    pub fn with_signature_verifier(options: VerifierOptions, signature_verifier: S) -> Self {
        Self {
            options,
            signature_verifier,
        }
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.options
    }

    /// Decide whether trust can advance from `trusted` to `candidate`.
    ///
    /// Checks run in a fixed order, each short-circuiting:
    ///
    /// 1. structural validation of the candidate against the configured
    ///    chain;
    /// 2. height and block-time monotonicity;
    /// 3. trusting-period liveness of the anchor, then the candidate's
    ///    future-time bounds;
    /// 4. the supplied validator set must hash to the candidate header's
    ///    `validators_hash`;
    /// 5. adjacent (`height + 1`): the supplied set must also hash to the
    ///    anchor's `next_validators_hash`, then the commit must carry more
    ///    than two thirds of the new set's power. Skipping (further out):
    ///    at least `trust_level` of the anchor set's power must have
    ///    co-signed the candidate, and the commit must carry more than two
    ///    thirds of the new set's power.
    ///
    /// On success the caller may adopt `(candidate.header,
    /// candidate_validators)` as its new trust anchor.
    pub fn verify_header(
        &self,
        trusted: &TrustedState,
        candidate: &SignedHeader,
        candidate_validators: &ValidatorSet,
        now_ms: u64,
    ) -> Result<(), VerificationError> {
        candidate.validate_basic(&self.options.chain_id)?;

        let old = trusted.header();
        let new = &candidate.header;

        if new.height <= old.height {
            return Err(VerificationError::NonIncreasingHeight {
                old: old.height,
                new: new.height,
            });
        }
        if new.time_ms <= old.time_ms {
            return Err(VerificationError::NonMonotonicBlockTime {
                old_ms: old.time_ms,
                new_ms: new.time_ms,
            });
        }

        check_trusting_period(old.time_ms, self.options.trusting_period_ms, now_ms)?;
        check_candidate_time(
            old.time_ms,
            new.time_ms,
            self.options.trusting_period_ms,
            self.options.max_clock_drift_ms(),
            now_ms,
        )?;

        let supplied = candidate_validators.hash();
        if supplied != new.validators_hash {
            return Err(VerificationError::InvalidValidatorSet {
                expected: new.validators_hash,
                got: supplied,
            });
        }

        if new.height == old.height + 1 {
            debug!(
                height = new.height,
                "adjacent verification: anchor commits to the candidate set"
            );
            if supplied != old.next_validators_hash {
                return Err(VerificationError::InvalidNextValidatorSet {
                    expected: old.next_validators_hash,
                    got: supplied,
                });
            }
        } else {
            debug!(
                trusted_height = old.height,
                height = new.height,
                trust_level = %self.options.trust_level,
                "skipping verification: checking trust continuity"
            );
            verify_commit_trusting(
                trusted.validators(),
                &candidate.commit,
                &self.options.chain_id,
                self.options.trust_level,
                &self.signature_verifier,
            )?;
        }

        verify_commit_full(
            candidate_validators,
            &candidate.commit,
            &self.options.chain_id,
            &self.signature_verifier,
        )
    }

    /// Validate a candidate trust anchor in isolation: structural checks,
    /// validator binding, and a full self-commit check. This is the one
    /// moment of trust at initialization; the returned [`TrustedState`] is
    /// what the caller persists.
    pub fn verify_bootstrap(
        &self,
        candidate: &SignedHeader,
        validators: &ValidatorSet,
    ) -> Result<TrustedState, VerificationError> {
        candidate.validate_basic(&self.options.chain_id)?;

        let supplied = validators.hash();
        if supplied != candidate.header.validators_hash {
            return Err(VerificationError::InvalidValidatorSet {
                expected: candidate.header.validators_hash,
                got: supplied,
            });
        }

        verify_commit_full(
            validators,
            &candidate.commit,
            &self.options.chain_id,
            &self.signature_verifier,
        )?;

        TrustedState::new(candidate.header.clone(), validators.clone())
    }
}

/// One-shot verification with the production signature backend.
///
/// Assembles a [`Verifier`] from the given parameters and runs
/// [`Verifier::verify_header`]; long-lived callers should construct a
/// [`Verifier`] once instead.
#[allow(clippy::too_many_arguments)]
pub fn verify(
    chain_id: &str,
    trusted_header: &Header,
    trusted_validators: &ValidatorSet,
    candidate: &SignedHeader,
    candidate_validators: &ValidatorSet,
    trusting_period_ms: u64,
    now_ms: u64,
    trust_level: TrustLevel,
) -> Result<(), VerificationError> {
    let trusted = TrustedState::new(trusted_header.clone(), trusted_validators.clone())?;
    let options = VerifierOptions::new(chain_id, trusting_period_ms).with_trust_level(trust_level);
    Verifier::new(options).verify_header(&trusted, candidate, candidate_validators, now_ms)
}
