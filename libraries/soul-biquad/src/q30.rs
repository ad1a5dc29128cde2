//! Q30 arithmetic unit
//!
//! Scalar fixed-point multiply, multiply-accumulate and 32-bit saturation.
//! An integer `v` represents the real value `v / 2^30`.
//!
//! Products are formed in 128-bit arithmetic and rounded half-up with
//! `(x * y + 2^29) >> 30`. Every rounded product must land in
//! `[-2^33, 2^33)` and every running sum in `[-2^39, 2^39 - 1)`. Both ranges
//! are inclusive below and exclusive above. Leaving them means the
//! coefficients or the input amplitude were scaled wrongly upstream.
//!
//! Two flavours exist for each operation:
//! - [`mul_q30`] / [`macc_q30`] always check and return [`BiquadError::RangeViolation`]
//! - [`mul_q30_unchecked`] / [`macc_q30_unchecked`] only `debug_assert!` the
//!   bounds and wrap at 64 bits in release builds
//!
//! [`CheckMode`] selects between them at run time.

use crate::error::{ArithOp, BiquadError, Result};
use serde::{Deserialize, Serialize};

/// Fractional bits of the Q30 format
pub const Q30_SHIFT: u32 = 30;

/// 1.0 in Q30
pub const Q30_ONE: i64 = 1 << Q30_SHIFT;

/// Added before the shift so the product rounds half-up
const ROUND_HALF: i128 = 1 << (Q30_SHIFT - 1);

/// Smallest allowed rounded product (inclusive)
pub const PRODUCT_MIN: i64 = -(1 << 33);

/// Largest allowed rounded product (exclusive)
pub const PRODUCT_MAX: i64 = 1 << 33;

/// Smallest allowed accumulator value (inclusive)
pub const ACC_MIN: i64 = -(1 << 39);

/// Largest allowed accumulator value (exclusive)
pub const ACC_MAX: i64 = (1 << 39) - 1;

/// Lower saturation limit of a section output
pub const SAT_MIN: i64 = i32::MIN as i64;

/// Upper saturation limit of a section output
pub const SAT_MAX: i64 = i32::MAX as i64;

/// How the multiply-accumulate bounds are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Check every step and return an error on violation
    #[default]
    Strict,
    /// `debug_assert!` only; compiled out of release builds
    Debug,
}

impl CheckMode {
    /// Rounded Q30 product under this mode
    #[inline]
    pub fn mul(self, x: i64, y: i64) -> Result<i64> {
        match self {
            CheckMode::Strict => mul_q30(x, y),
            CheckMode::Debug => Ok(mul_q30_unchecked(x, y)),
        }
    }

    /// Multiply-accumulate under this mode
    #[inline]
    pub fn macc(self, acc: i64, x: i64, y: i64) -> Result<i64> {
        match self {
            CheckMode::Strict => macc_q30(acc, x, y),
            CheckMode::Debug => Ok(macc_q30_unchecked(acc, x, y)),
        }
    }
}

#[inline]
fn rounded_product(x: i64, y: i64) -> i128 {
    (i128::from(x) * i128::from(y) + ROUND_HALF) >> Q30_SHIFT
}

#[inline]
fn product_in_range(p: i128) -> bool {
    i128::from(PRODUCT_MIN) <= p && p < i128::from(PRODUCT_MAX)
}

#[inline]
fn acc_in_range(acc: i128) -> bool {
    i128::from(ACC_MIN) <= acc && acc < i128::from(ACC_MAX)
}

/// Multiply two Q30 values, rounding half-up
///
/// Returns `round((x * y) / 2^30)` computed as `(x * y + 2^29) >> 30`.
///
/// # Errors
/// [`BiquadError::RangeViolation`] if the rounded product is outside
/// `[-2^33, 2^33)`.
#[inline]
pub fn mul_q30(x: i64, y: i64) -> Result<i64> {
    let p = rounded_product(x, y);
    if !product_in_range(p) {
        return Err(BiquadError::RangeViolation {
            op: ArithOp::Mul,
            value: p,
            min: PRODUCT_MIN,
            max: PRODUCT_MAX,
        });
    }
    Ok(p as i64)
}

/// Add `mul_q30(x, y)` to a running accumulator
///
/// # Errors
/// Propagates a product violation, and reports
/// [`BiquadError::RangeViolation`] if the new sum is outside
/// `[-2^39, 2^39 - 1)`.
#[inline]
pub fn macc_q30(acc: i64, x: i64, y: i64) -> Result<i64> {
    let sum = i128::from(acc) + i128::from(mul_q30(x, y)?);
    if !acc_in_range(sum) {
        return Err(BiquadError::RangeViolation {
            op: ArithOp::Macc,
            value: sum,
            min: ACC_MIN,
            max: ACC_MAX,
        });
    }
    Ok(sum as i64)
}

/// [`mul_q30`] with the bound reduced to a `debug_assert!`
///
/// In release builds an out-of-range product is truncated to 64 bits.
#[inline]
pub fn mul_q30_unchecked(x: i64, y: i64) -> i64 {
    let p = rounded_product(x, y);
    debug_assert!(product_in_range(p), "mul_q30 out of range: {p}");
    p as i64
}

/// [`macc_q30`] with the bounds reduced to `debug_assert!`s
#[inline]
pub fn macc_q30_unchecked(acc: i64, x: i64, y: i64) -> i64 {
    let sum = i128::from(acc) + i128::from(mul_q30_unchecked(x, y));
    debug_assert!(acc_in_range(sum), "macc_q30 out of range: {sum}");
    sum as i64
}

/// Clamp an accumulator into the signed 32-bit range
///
/// Returns the clamped value and whether clamping happened, in the manner
/// of `i32::overflowing_add`. Callers are expected to count the flag.
#[inline]
pub fn saturate32(acc: i64) -> (i64, bool) {
    if acc > SAT_MAX {
        (SAT_MAX, true)
    } else if acc < SAT_MIN {
        (SAT_MIN, true)
    } else {
        (acc, false)
    }
}

/// Quantise a real coefficient to Q30, rounding half to even
///
/// Non-finite or huge inputs saturate to the `i64` range; range checks
/// belong to the caller (see [`crate::CascadeConfig::validate`]).
pub fn quantize_q30(value: f64) -> i64 {
    (value * Q30_ONE as f64).round_ties_even() as i64
}

/// Real value of a Q30 integer
pub fn to_real(value: i64) -> f64 {
    value as f64 / Q30_ONE as f64
}
