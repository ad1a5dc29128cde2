//! Error types for the biquad kernel

use std::fmt;
use thiserror::Error;

/// Result type alias using `BiquadError`
pub type Result<T> = std::result::Result<T, BiquadError>;

/// Arithmetic step that produced a range violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// Rounded Q30 product
    Mul,
    /// Running multiply-accumulate sum
    Macc,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithOp::Mul => f.write_str("mul_q30"),
            ArithOp::Macc => f.write_str("macc_q30"),
        }
    }
}

/// Errors raised by the fixed-point kernel and its configuration layer
///
/// Saturation is deliberately absent: clamping the section output is normal
/// operation and is reported through [`crate::SaturationMonitor`] instead.
#[derive(Error, Debug)]
pub enum BiquadError {
    /// A product or accumulator left its designed range
    ///
    /// The coefficients or the input amplitude do not fit the Q30 format.
    #[error("{op} result {value} outside designed range [{min}, {max})")]
    RangeViolation {
        op: ArithOp,
        value: i128,
        min: i64,
        max: i64,
    },

    /// Coefficient is NaN or infinite
    #[error("Section {section}: coefficient {index} is not finite ({value})")]
    NonFiniteCoefficient {
        section: usize,
        index: usize,
        value: f64,
    },

    /// Quantised coefficient does not fit in a signed 32-bit word
    #[error("Section {section}: coefficient {index} ({value}) does not fit Q30 in 32 bits")]
    CoefficientOutOfRange {
        section: usize,
        index: usize,
        value: f64,
    },

    /// Cascade has more sections than a rendered coefficient table holds
    #[error("Cascade has {sections} sections, test vectors hold at most {max}")]
    TooManySections { sections: usize, max: usize },

    /// Configuration could not be parsed or written
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl BiquadError {
    /// True for arithmetic range violations
    pub fn is_range_violation(&self) -> bool {
        matches!(self, BiquadError::RangeViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_violation_message_names_the_operation() {
        let err = BiquadError::RangeViolation {
            op: ArithOp::Mul,
            value: 1 << 33,
            min: -(1 << 33),
            max: 1 << 33,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("mul_q30 result 8589934592"));
        assert!(err.is_range_violation());
    }

    #[test]
    fn config_errors_are_not_range_violations() {
        let err = BiquadError::NonFiniteCoefficient {
            section: 2,
            index: 4,
            value: f64::NAN,
        };
        assert!(!err.is_range_violation());
        assert!(err.to_string().contains("Section 2"));
    }

    #[test]
    fn too_many_sections_message() {
        let err = BiquadError::TooManySections { sections: 9, max: 8 };
        assert_eq!(
            err.to_string(),
            "Cascade has 9 sections, test vectors hold at most 8"
        );
    }
}
