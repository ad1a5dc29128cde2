//! Single second-order section
//!
//! One recurrence, two arithmetics. The section update lives once in
//! [`SectionKernel::apply_section`]; kernels only supply the
//! multiply-accumulate step and the output stage:
//!
//! ```text
//! acc = a2*y[n-2] + a1*y[n-1] + b2*x[n-2] + b1*x[n-1] + b0*x[n]
//! y[n] = finish(acc)
//! ```
//!
//! The feedback coefficients are stored with the sign already folded in, so
//! every term is added. [`FixedQ30`] rounds every product to Q30 and
//! saturates the output to 32 bits. [`FloatReference`] does neither and
//! exists only as an oracle for differential tests.

use crate::error::Result;
use crate::q30::CheckMode;
use crate::saturation::SaturationMonitor;
use std::fmt;

/// Order in which the coefficient taps are accumulated
///
/// Coefficient `k` multiplies state tap `k - 1`; the leading term `b0`
/// is added last.
const FEEDBACK_ORDER: [usize; 4] = [4, 3, 2, 1];

/// Numeric representation flowing through a kernel
pub trait Sample: Copy + Default + PartialEq + fmt::Debug + Send + 'static {
    /// Convert a raw integer sample
    fn from_raw(raw: i64) -> Self;

    /// Value as a real number in raw sample units
    fn to_f64(self) -> f64;
}

impl Sample for i64 {
    #[inline]
    fn from_raw(raw: i64) -> Self {
        raw
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    #[inline]
    fn from_raw(raw: i64) -> Self {
        raw as f64
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// Coefficients of one section: `[b0, b1, b2, a1, a2]`
///
/// Fixed once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients<T> {
    taps: [T; 5],
}

impl<T: Sample> Coefficients<T> {
    pub fn new(taps: [T; 5]) -> Self {
        Self { taps }
    }

    /// Pass-through section (`b0 = one`, everything else zero)
    pub fn identity(one: T) -> Self {
        let mut taps = [T::default(); 5];
        taps[0] = one;
        Self { taps }
    }

    pub fn b0(&self) -> T {
        self.taps[0]
    }

    pub fn b1(&self) -> T {
        self.taps[1]
    }

    pub fn b2(&self) -> T {
        self.taps[2]
    }

    pub fn a1(&self) -> T {
        self.taps[3]
    }

    pub fn a2(&self) -> T {
        self.taps[4]
    }

    pub fn taps(&self) -> &[T; 5] {
        &self.taps
    }
}

/// Delay line of one section: `[x[n-1], x[n-2], y[n-1], y[n-2]]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectionState<T> {
    taps: [T; 4],
}

impl<T: Sample> SectionState<T> {
    pub fn new(taps: [T; 4]) -> Self {
        Self { taps }
    }

    /// All-zero history
    pub fn zeroed() -> Self {
        Self {
            taps: [T::default(); 4],
        }
    }

    pub fn x1(&self) -> T {
        self.taps[0]
    }

    pub fn x2(&self) -> T {
        self.taps[1]
    }

    pub fn y1(&self) -> T {
        self.taps[2]
    }

    pub fn y2(&self) -> T {
        self.taps[3]
    }

    pub fn taps(&self) -> &[T; 4] {
        &self.taps
    }

    /// Advance one sample
    ///
    /// The older taps are taken from the pre-update values.
    #[inline]
    fn advance(&mut self, input: T, output: T) {
        self.taps[1] = self.taps[0];
        self.taps[0] = input;
        self.taps[3] = self.taps[2];
        self.taps[2] = output;
    }
}

/// Arithmetic used by a section
///
/// Implementors provide the accumulate step and the output stage; the
/// recurrence itself is the provided [`apply_section`](Self::apply_section).
pub trait SectionKernel {
    type Sample: Sample;

    /// `acc + coef * x` in this kernel's arithmetic
    fn macc(&mut self, acc: Self::Sample, coef: Self::Sample, x: Self::Sample)
        -> Result<Self::Sample>;

    /// Turn the final accumulator into the section output
    fn finish(&mut self, acc: Self::Sample) -> Self::Sample;

    /// Saturation diagnostics, if this kernel saturates
    fn saturation(&self) -> Option<&SaturationMonitor> {
        None
    }

    /// Clear any diagnostics held by the kernel
    fn reset(&mut self) {}

    /// Run one sample through one section
    ///
    /// The accumulator is computed in full before the state is touched, so
    /// a range violation leaves `state` as it was.
    #[inline]
    fn apply_section(
        &mut self,
        sample_in: Self::Sample,
        state: &mut SectionState<Self::Sample>,
        coef: &Coefficients<Self::Sample>,
    ) -> Result<Self::Sample> {
        let mut acc = Self::Sample::default();
        for k in FEEDBACK_ORDER {
            acc = self.macc(acc, coef.taps[k], state.taps[k - 1])?;
        }
        acc = self.macc(acc, coef.taps[0], sample_in)?;
        let out = self.finish(acc);

        state.advance(sample_in, out);
        Ok(out)
    }
}

/// Q30 fixed-point kernel
#[derive(Debug, Clone, Default)]
pub struct FixedQ30 {
    mode: CheckMode,
    monitor: SaturationMonitor,
}

impl FixedQ30 {
    pub fn new(mode: CheckMode) -> Self {
        Self {
            mode,
            monitor: SaturationMonitor::new(),
        }
    }

    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    pub fn monitor(&self) -> &SaturationMonitor {
        &self.monitor
    }
}

impl SectionKernel for FixedQ30 {
    type Sample = i64;

    #[inline]
    fn macc(&mut self, acc: i64, coef: i64, x: i64) -> Result<i64> {
        self.mode.macc(acc, coef, x)
    }

    #[inline]
    fn finish(&mut self, acc: i64) -> i64 {
        self.monitor.saturate(acc)
    }

    fn saturation(&self) -> Option<&SaturationMonitor> {
        Some(&self.monitor)
    }

    fn reset(&mut self) {
        self.monitor.reset();
    }
}

/// Double-precision reference kernel
///
/// No rounding, no saturation. Used as the oracle for the fixed-point path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatReference;

impl SectionKernel for FloatReference {
    type Sample = f64;

    #[inline]
    fn macc(&mut self, acc: f64, coef: f64, x: f64) -> Result<f64> {
        Ok(acc + coef * x)
    }

    #[inline]
    fn finish(&mut self, acc: f64) -> f64 {
        acc
    }
}
