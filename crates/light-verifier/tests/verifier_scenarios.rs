//! End-to-end verification scenarios.
//!
//! Four weighted validators (powers 20, 30, 40, 50; total 140) anchor a
//! trusted header at height 1, and candidates at later heights exercise
//! every branch of the predicate: adjacent and skipping verification,
//! monotonicity, trusting-period expiry, future-time bounds, validator-set
//! binding, and both voting-power thresholds. All commits carry real
//! Ed25519 signatures from deterministic seeds.

use ed25519_dalek::SigningKey;
use light_core::{
    Commit, Hash32, Header, PublicKey, SignedHeader, TrustLevel, Validator, ValidatorSet,
};
use light_verifier::{verify, TrustedState, VerificationError, Verifier, VerifierOptions};

const CHAIN_ID: &str = "weave-test";
const HOUR_MS: u64 = 3_600_000;
/// 2006-01-02T15:04:05Z, the anchor block time.
const BTIME_MS: u64 = 1_136_214_245_000;
const TRUSTING_PERIOD_MS: u64 = 3 * HOUR_MS;

// ========== Fixtures ==========

fn gen_keys(n: usize) -> Vec<SigningKey> {
    (0..n)
        .map(|i| SigningKey::from_bytes(&[u8::try_from(i + 1).expect("small seed"); 32]))
        .collect()
}

/// Validator set over `keys` with powers `base, base + step, ...`.
fn to_validators(keys: &[SigningKey], base_power: u64, step: u64) -> ValidatorSet {
    let validators = keys.iter().enumerate().map(|(i, key)| {
        let power = base_power + u64::try_from(i).expect("small index") * step;
        Validator::new(PublicKey(key.verifying_key().to_bytes()), power)
    });
    ValidatorSet::new(validators).expect("valid set")
}

/// A signed header whose commit carries votes from `keys[signers]` only,
/// with one slot per key in set order.
fn gen_signed_header(
    chain_id: &str,
    height: u64,
    time_ms: u64,
    vals: &ValidatorSet,
    next_vals: &ValidatorSet,
    keys: &[SigningKey],
    signers: std::ops::Range<usize>,
) -> SignedHeader {
    let header = Header {
        chain_id: chain_id.to_string(),
        height,
        time_ms,
        validators_hash: vals.hash(),
        next_validators_hash: next_vals.hash(),
        app_hash: Hash32([0xA0; 32]),
        consensus_hash: Hash32([0xC0; 32]),
        results_hash: Hash32([0xE0; 32]),
    };
    let block_hash = header.hash().expect("hash");
    let votes = (0..keys.len())
        .map(|i| {
            if signers.contains(&i) {
                Some(
                    light_core::sign_vote(&keys[i], chain_id, height, block_hash).expect("sign"),
                )
            } else {
                None
            }
        })
        .collect();
    SignedHeader::new(header, Commit::new(height, block_hash, votes))
}

struct Fixture {
    keys: Vec<SigningKey>,
    vals: ValidatorSet,
    trusted: TrustedState,
}

fn fixture() -> Fixture {
    let keys = gen_keys(4);
    // Powers 20, 30, 40, 50: the first three do not hold 2/3, the last
    // three do.
    let vals = to_validators(&keys, 20, 10);
    let anchor = gen_signed_header(CHAIN_ID, 1, BTIME_MS, &vals, &vals, &keys, 0..4);
    let trusted = TrustedState::new(anchor.header.clone(), vals.clone()).expect("anchor");
    Fixture { keys, vals, trusted }
}

fn verifier() -> Verifier {
    Verifier::new(VerifierOptions::new(CHAIN_ID, TRUSTING_PERIOD_MS))
}

fn run(
    fx: &Fixture,
    candidate: &SignedHeader,
    candidate_vals: &ValidatorSet,
    now_ms: u64,
) -> Result<(), VerificationError> {
    verifier().verify_header(&fx.trusted, candidate, candidate_vals, now_ms)
}

// ========== Adjacent Verification ==========

#[test]
fn same_header_is_a_height_error() {
    let fx = fixture();
    let candidate = gen_signed_header(CHAIN_ID, 1, BTIME_MS, &fx.vals, &fx.vals, &fx.keys, 0..4);

    let err = run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect_err("same height");
    assert!(matches!(
        err,
        VerificationError::NonIncreasingHeight { old: 1, new: 1 }
    ));
}

#[test]
fn foreign_chain_id_is_structural() {
    let fx = fixture();
    let candidate = gen_signed_header(
        "different-chain",
        2,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        0..4,
    );

    let err = run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect_err("foreign chain");
    assert!(matches!(err, VerificationError::InvalidHeader(_)));
    assert!(err.to_string().contains("belongs to another chain"));
}

#[test]
fn adjacent_with_all_signatures_succeeds() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        2,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        0..4,
    );

    run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect("fully signed");
}

#[test]
fn adjacent_with_two_thirds_plus_succeeds() {
    let fx = fixture();
    // Validators 1..4 hold 120 of 140.
    let candidate = gen_signed_header(
        CHAIN_ID,
        2,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        1..4,
    );

    run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect("120 of 140 signed");
}

#[test]
fn adjacent_below_two_thirds_fails() {
    let fx = fixture();
    // Only the strongest validator signs: 50 of 140.
    let candidate = gen_signed_header(
        CHAIN_ID,
        2,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        3..4,
    );

    let err = run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect_err("not enough");
    assert!(matches!(
        err,
        VerificationError::NotEnoughVotingPowerSigned { got: 50, needed: 94 }
    ));
}

#[test]
fn adjacent_set_must_match_anchor_commitment() {
    let fx = fixture();
    // A different set signs height 2; the anchor never committed to it.
    let other_vals = to_validators(&fx.keys, 10, 1);
    let candidate = gen_signed_header(
        CHAIN_ID,
        2,
        BTIME_MS + HOUR_MS,
        &other_vals,
        &other_vals,
        &fx.keys,
        0..4,
    );

    let err =
        run(&fx, &candidate, &other_vals, BTIME_MS + 2 * HOUR_MS).expect_err("unexpected set");
    assert!(matches!(
        err,
        VerificationError::InvalidNextValidatorSet { .. }
    ));
    assert!(err.to_string().contains("to match those from new header"));
}

#[test]
fn supplied_set_must_match_candidate_header() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        2,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        0..4,
    );
    let other_vals = to_validators(&fx.keys, 10, 1);

    let err = run(&fx, &candidate, &other_vals, BTIME_MS + 2 * HOUR_MS).expect_err("mismatch");
    assert!(matches!(err, VerificationError::InvalidValidatorSet { .. }));
    assert!(err
        .to_string()
        .contains("to match those that were supplied"));
}

#[test]
fn expired_anchor_is_rejected_before_set_checks() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        2,
        BTIME_MS + HOUR_MS / 2,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        0..4,
    );
    // Even a mismatched supplied set must not mask the expiry.
    let other_vals = to_validators(&fx.keys, 10, 1);

    let options = VerifierOptions::new(CHAIN_ID, HOUR_MS);
    let err = Verifier::new(options)
        .verify_header(&fx.trusted, &candidate, &other_vals, BTIME_MS + HOUR_MS)
        .expect_err("expired");
    assert!(matches!(
        err,
        VerificationError::OldHeaderExpired { expired_at_ms, now_ms }
            if expired_at_ms == BTIME_MS + HOUR_MS && now_ms == BTIME_MS + HOUR_MS
    ));
}

#[test]
fn candidate_from_the_future_is_rejected() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        2,
        BTIME_MS + 4 * HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        0..4,
    );

    let err = run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect_err("too far ahead");
    assert!(matches!(
        err,
        VerificationError::NewHeaderTooFarIntoFuture { header_time_ms, bound_ms }
            if header_time_ms == BTIME_MS + 4 * HOUR_MS && bound_ms == BTIME_MS + 3 * HOUR_MS
    ));
}

#[test]
fn non_monotonic_time_is_rejected() {
    let fx = fixture();
    let candidate = gen_signed_header(CHAIN_ID, 2, BTIME_MS, &fx.vals, &fx.vals, &fx.keys, 0..4);

    let err = run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect_err("same time");
    assert!(matches!(
        err,
        VerificationError::NonMonotonicBlockTime { .. }
    ));
}

// ========== Skipping Verification ==========

#[test]
fn skipping_with_unchanged_set_succeeds() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        3,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        0..4,
    );

    run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect("unchanged set");
}

#[test]
fn skipping_with_two_thirds_of_new_set_succeeds() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        4,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        1..4,
    );

    run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect("120 of 140 signed");
}

#[test]
fn skipping_fails_when_new_block_is_undersigned() {
    let fx = fixture();
    // 50 of 140: enough continuity for 1/3 trust, not enough to make the
    // block valid under its own set.
    let candidate = gen_signed_header(
        CHAIN_ID,
        5,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        3..4,
    );

    let err = run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS).expect_err("undersigned");
    assert!(matches!(
        err,
        VerificationError::NotEnoughVotingPowerSigned { got: 50, needed: 94 }
    ));
}

#[test]
fn skipping_to_a_two_thirds_subset_succeeds() {
    let fx = fixture();
    // New set: validators 1..4 of the anchor set (powers 30, 40, 50).
    let subset_keys = &fx.keys[1..];
    let subset_vals = to_validators(subset_keys, 30, 10);
    let candidate = gen_signed_header(
        CHAIN_ID,
        5,
        BTIME_MS + HOUR_MS,
        &subset_vals,
        &subset_vals,
        subset_keys,
        0..3,
    );

    run(&fx, &candidate, &subset_vals, BTIME_MS + 2 * HOUR_MS).expect("120 of 140 overlap");
}

#[test]
fn skipping_to_a_one_third_subset_succeeds() {
    let fx = fixture();
    // New set: just the strongest validator (power 50 of the trusted 140,
    // exactly at the default trust level).
    let subset_keys = &fx.keys[3..];
    let subset_vals = to_validators(subset_keys, 50, 10);
    let candidate = gen_signed_header(
        CHAIN_ID,
        5,
        BTIME_MS + HOUR_MS,
        &subset_vals,
        &subset_vals,
        subset_keys,
        0..1,
    );

    run(&fx, &candidate, &subset_vals, BTIME_MS + 2 * HOUR_MS).expect("one third overlap");
}

#[test]
fn skipping_below_one_third_is_too_much_change() {
    let fx = fixture();
    // New set: only the weakest validator (20 of 140 < 1/3).
    let subset_keys = &fx.keys[..1];
    let subset_vals = to_validators(subset_keys, 20, 10);
    let candidate = gen_signed_header(
        CHAIN_ID,
        5,
        BTIME_MS + HOUR_MS,
        &subset_vals,
        &subset_vals,
        subset_keys,
        0..1,
    );

    let err =
        run(&fx, &candidate, &subset_vals, BTIME_MS + 2 * HOUR_MS).expect_err("too much change");
    assert!(matches!(
        err,
        VerificationError::NewValSetCantBeTrusted { got: 20, needed: 47 }
    ));
    assert!(err.to_string().contains("too much change"));
}

#[test]
fn raised_trust_level_demands_more_overlap() {
    let fx = fixture();
    // 50 of 140 overlap: fine at 1/3, not at 2/3.
    let subset_keys = &fx.keys[3..];
    let subset_vals = to_validators(subset_keys, 50, 10);
    let candidate = gen_signed_header(
        CHAIN_ID,
        5,
        BTIME_MS + HOUR_MS,
        &subset_vals,
        &subset_vals,
        subset_keys,
        0..1,
    );

    let two_thirds = TrustLevel::new(2, 3).expect("valid level");
    let options =
        VerifierOptions::new(CHAIN_ID, TRUSTING_PERIOD_MS).with_trust_level(two_thirds);
    let err = Verifier::new(options)
        .verify_header(&fx.trusted, &candidate, &subset_vals, BTIME_MS + 2 * HOUR_MS)
        .expect_err("2/3 not met");
    assert!(matches!(
        err,
        VerificationError::NewValSetCantBeTrusted { got: 50, needed: 94 }
    ));
}

// ========== Properties ==========

#[test]
fn verdicts_are_deterministic() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        5,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        3..4,
    );

    let first = run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS);
    let second = run(&fx, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS);
    assert_eq!(
        format!("{first:?}"),
        format!("{second:?}"),
        "same inputs must yield the same verdict"
    );
}

#[test]
fn adjacent_outcome_is_independent_of_trust_level() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        2,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        1..4,
    );

    for (num, den) in [(1u64, 3u64), (1, 2), (2, 3), (1, 1)] {
        let level = TrustLevel::new(num, den).expect("valid level");
        let options = VerifierOptions::new(CHAIN_ID, TRUSTING_PERIOD_MS).with_trust_level(level);
        Verifier::new(options)
            .verify_header(&fx.trusted, &candidate, &fx.vals, BTIME_MS + 2 * HOUR_MS)
            .expect("adjacent verification never consults the trust level");
    }
}

#[test]
fn one_shot_verify_matches_the_driver() {
    let fx = fixture();
    let candidate = gen_signed_header(
        CHAIN_ID,
        3,
        BTIME_MS + HOUR_MS,
        &fx.vals,
        &fx.vals,
        &fx.keys,
        0..4,
    );

    verify(
        CHAIN_ID,
        fx.trusted.header(),
        &fx.vals,
        &candidate,
        &fx.vals,
        TRUSTING_PERIOD_MS,
        BTIME_MS + 2 * HOUR_MS,
        TrustLevel::ONE_THIRD,
    )
    .expect("one-shot verify");
}

// ========== Bootstrap ==========

#[test]
fn bootstrap_accepts_a_self_consistent_anchor() {
    let fx = fixture();
    let candidate = gen_signed_header(CHAIN_ID, 10, BTIME_MS, &fx.vals, &fx.vals, &fx.keys, 0..4);

    let state = verifier()
        .verify_bootstrap(&candidate, &fx.vals)
        .expect("bootstrap");
    assert_eq!(state.height(), 10);
    assert_eq!(state.validators().hash(), fx.vals.hash());
}

#[test]
fn bootstrap_rejects_an_undersigned_anchor() {
    let fx = fixture();
    let candidate = gen_signed_header(CHAIN_ID, 10, BTIME_MS, &fx.vals, &fx.vals, &fx.keys, 3..4);

    let err = verifier()
        .verify_bootstrap(&candidate, &fx.vals)
        .expect_err("undersigned anchor");
    assert!(matches!(
        err,
        VerificationError::NotEnoughVotingPowerSigned { got: 50, needed: 94 }
    ));
}

#[test]
fn bootstrap_rejects_a_mismatched_set() {
    let fx = fixture();
    let candidate = gen_signed_header(CHAIN_ID, 10, BTIME_MS, &fx.vals, &fx.vals, &fx.keys, 0..4);
    let other_vals = to_validators(&fx.keys, 10, 1);

    let err = verifier()
        .verify_bootstrap(&candidate, &other_vals)
        .expect_err("mismatched set");
    assert!(matches!(err, VerificationError::InvalidValidatorSet { .. }));
}
