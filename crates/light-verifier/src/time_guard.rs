//! Temporal validity checks.
//!
//! Both predicates take the caller's clock value; the verifier never reads
//! a clock itself, which keeps verification deterministic and testable.

use crate::errors::VerificationError;

/// Check that the trusted header is still inside its trusting period:
/// live iff `now - trusted_time < trusting_period`.
///
/// Runs before any commit arithmetic: an expired anchor must not be used
/// no matter what the candidate looks like.
pub fn check_trusting_period(
    trusted_time_ms: u64,
    trusting_period_ms: u64,
    now_ms: u64,
) -> Result<(), VerificationError> {
    let expired_at_ms = trusted_time_ms.saturating_add(trusting_period_ms);
    if now_ms >= expired_at_ms {
        return Err(VerificationError::OldHeaderExpired {
            expired_at_ms,
            now_ms,
        });
    }
    Ok(())
}

/// Check that the candidate's block time is acceptable.
///
/// Two bounds apply, each reported with the bound that was violated:
///
/// 1. the candidate must fall inside the trusted header's trusting window
///    (`candidate_time < trusted_time + trusting_period`); a header past
///    the window could never be trusted from this anchor;
/// 2. the candidate must not outrun the caller's clock by more than the
///    configured drift (`candidate_time < now + max_clock_drift`).
pub fn check_candidate_time(
    trusted_time_ms: u64,
    candidate_time_ms: u64,
    trusting_period_ms: u64,
    max_clock_drift_ms: u64,
    now_ms: u64,
) -> Result<(), VerificationError> {
    let window_bound_ms = trusted_time_ms.saturating_add(trusting_period_ms);
    if candidate_time_ms >= window_bound_ms {
        return Err(VerificationError::NewHeaderTooFarIntoFuture {
            header_time_ms: candidate_time_ms,
            bound_ms: window_bound_ms,
        });
    }

    let drift_bound_ms = now_ms.saturating_add(max_clock_drift_ms);
    if candidate_time_ms >= drift_bound_ms {
        return Err(VerificationError::NewHeaderTooFarIntoFuture {
            header_time_ms: candidate_time_ms,
            bound_ms: drift_bound_ms,
        });
    }

    Ok(())
}
