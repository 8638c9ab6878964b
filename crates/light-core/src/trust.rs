//! Trust levels and quorum arithmetic.
//!
//! Every power-versus-fraction comparison in the verifier goes through this
//! module and is carried out in exact integer arithmetic, widened to `u128`
//! so `power * denominator` cannot overflow for any total that fits in 63
//! bits. Floats never enter voting-power math; the crate lints enforce it.
//!
//! Two thresholds exist with deliberately different strictness:
//!
//! - the block-production threshold is strict (`power > 2/3 * total`):
//!   a commit carrying exactly two thirds of its own set is invalid;
//! - a trust level is non-strict (`power >= level * total`): exactly one
//!   third of the previously trusted power suffices for skipping at the
//!   default level.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from trust level construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrustLevelError {
    #[error("trust level denominator must not be zero")]
    ZeroDenominator,

    #[error("trust level {numerator}/{denominator} is outside [1/3, 1]")]
    OutOfRange { numerator: u64, denominator: u64 },
}

/// A rational fraction of a validator set's total power, within `[1/3, 1]`.
///
/// The range is enforced at construction: callers may demand more overlap
/// with the trusted set than one third, never less, so an out-of-range
/// level is unrepresentable and the verifier never re-validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTrustLevel", into = "RawTrustLevel")]
pub struct TrustLevel {
    numerator: u64,
    denominator: u64,
}

/// Serde carrier for [`TrustLevel`], so deserialization re-validates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawTrustLevel {
    numerator: u64,
    denominator: u64,
}

impl From<TrustLevel> for RawTrustLevel {
    fn from(level: TrustLevel) -> Self {
        RawTrustLevel {
            numerator: level.numerator,
            denominator: level.denominator,
        }
    }
}

impl TryFrom<RawTrustLevel> for TrustLevel {
    type Error = TrustLevelError;

    fn try_from(raw: RawTrustLevel) -> Result<Self, Self::Error> {
        TrustLevel::new(raw.numerator, raw.denominator)
    }
}

impl TrustLevel {
    /// The canonical default: one third of the trusted set's power.
    pub const ONE_THIRD: TrustLevel = TrustLevel {
        numerator: 1,
        denominator: 3,
    };

    /// Build a trust level, rejecting anything outside `[1/3, 1]`.
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, TrustLevelError> {
        if denominator == 0 {
            return Err(TrustLevelError::ZeroDenominator);
        }
        let num = u128::from(numerator);
        let den = u128::from(denominator);
        // 1/3 <= num/den <= 1, compared cross-multiplied.
        if num > den || 3 * num < den {
            return Err(TrustLevelError::OutOfRange {
                numerator,
                denominator,
            });
        }
        Ok(TrustLevel {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Exact test of `power >= level * total`, i.e.
    /// `power * denominator >= numerator * total` in `u128`.
    pub fn is_met_by(&self, power: u64, total: u64) -> bool {
        u128::from(power) * u128::from(self.denominator)
            >= u128::from(self.numerator) * u128::from(total)
    }

    /// The smallest power that meets this level of `total`:
    /// `ceil(numerator * total / denominator)`. Used for error reporting.
    pub fn min_power(&self, total: u64) -> u64 {
        let needed =
            (u128::from(self.numerator) * u128::from(total)).div_ceil(u128::from(self.denominator));
        // numerator <= denominator, so needed <= total <= u64::MAX.
        u64::try_from(needed).unwrap_or(u64::MAX)
    }
}

impl std::fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// The default trust level for skipping verification.
pub const DEFAULT_TRUST_LEVEL: TrustLevel = TrustLevel::ONE_THIRD;

/// Strict block-production threshold: `power > 2/3 * total`, compared as
/// `3 * power > 2 * total` in `u128`. Exactly two thirds fails.
pub fn meets_block_threshold(power: u64, total: u64) -> bool {
    3 * u128::from(power) > 2 * u128::from(total)
}

/// The smallest power that passes [`meets_block_threshold`] for `total`:
/// `floor(2 * total / 3) + 1`. Used for error reporting.
pub fn block_threshold_power(total: u64) -> u64 {
    let needed = 2 * u128::from(total) / 3 + 1;
    u64::try_from(needed).unwrap_or(u64::MAX)
}
