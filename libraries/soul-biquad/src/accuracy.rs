//! Differential comparison between two cascades
//!
//! Runs the same integer stimulus through two cascades of any kernel and
//! reports the largest absolute difference, in raw sample units.

use crate::cascade::Cascade;
use crate::error::Result;
use crate::q30::Q30_ONE;
use crate::section::{Sample, SectionKernel};

/// Worst-case divergence found by [`compare`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DifferentialReport {
    pub samples: usize,
    pub max_abs_error: f64,
    pub max_error_index: usize,
    pub first_at_max: f64,
    pub second_at_max: f64,
}

impl DifferentialReport {
    /// Largest error as a Q30 fraction of full scale
    pub fn max_abs_error_q30(&self) -> f64 {
        self.max_abs_error / Q30_ONE as f64
    }
}

/// Feed `samples` through both cascades and track the largest difference
///
/// # Errors
/// Propagates the first range violation from either cascade. The cascades
/// are then out of step: `first` may already have advanced on the failing
/// sample while `second` has not, so reset both before comparing again.
pub fn compare<A, B>(
    first: &mut Cascade<A>,
    second: &mut Cascade<B>,
    samples: &[i64],
) -> Result<DifferentialReport>
where
    A: SectionKernel,
    B: SectionKernel,
{
    let mut report = DifferentialReport {
        samples: samples.len(),
        ..DifferentialReport::default()
    };

    for (i, &raw) in samples.iter().enumerate() {
        let a = first.apply_cascade(A::Sample::from_raw(raw))?.to_f64();
        let b = second.apply_cascade(B::Sample::from_raw(raw))?.to_f64();
        let error = (a - b).abs();
        if error > report.max_abs_error {
            report.max_abs_error = error;
            report.max_error_index = i;
            report.first_at_max = a;
            report.second_at_max = b;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CascadeConfig, SectionConfig, SectionKind};

    #[test]
    fn identical_cascades_do_not_diverge() {
        let config = CascadeConfig::notch_bank_with_low_shelf();
        let samples: Vec<i64> = (0..200).map(|i| (i % 17 - 8) << 20).collect();
        let mut a = Cascade::fixed(&config).unwrap();
        let mut b = Cascade::fixed(&config).unwrap();

        let report = compare(&mut a, &mut b, &samples).unwrap();
        assert_eq!(report.samples, 200);
        assert_eq!(report.max_abs_error, 0.0);
    }

    #[test]
    fn error_in_second_cascade_leaves_first_advanced() {
        use crate::q30::PRODUCT_MAX;

        let gain = |g: f64| {
            CascadeConfig::new(vec![SectionConfig::new(
                SectionKind::Custom,
                [g, 0.0, 0.0, 0.0, 0.0],
            )])
        };
        let mut first = Cascade::fixed(&gain(0.5)).unwrap();
        let mut second = Cascade::fixed(&gain(1.0)).unwrap();

        let err = compare(&mut first, &mut second, &[PRODUCT_MAX]).unwrap_err();
        assert!(err.is_range_violation());
        assert_eq!(first.state(0).unwrap().x1(), PRODUCT_MAX);
        assert_eq!(second.state(0).unwrap().x1(), 0);

        first.reset();
        second.reset();
        let report = compare(&mut first, &mut second, &[1000]).unwrap();
        assert_eq!(report.max_abs_error, 500.0);
    }

    #[test]
    fn rounding_error_is_bounded_by_half_lsb() {
        let config = CascadeConfig::new(vec![SectionConfig::new(
            SectionKind::Custom,
            [1.0 / 3.0, 0.0, 0.0, 0.0, 0.0],
        )]);
        let mut fixed = Cascade::fixed(&config).unwrap();
        let mut reference = Cascade::reference(&config);

        let report = compare(&mut fixed, &mut reference, &[1, 2, 3, 1000]).unwrap();
        assert!(report.max_abs_error > 0.0);
        assert!(report.max_abs_error <= 0.5);
        assert!(report.max_abs_error_q30() < 1e-9);
    }
}
