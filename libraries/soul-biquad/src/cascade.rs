//! Biquad cascade engine

use crate::config::CascadeConfig;
use crate::error::Result;
use crate::section::{Coefficients, FixedQ30, FloatReference, Sample, SectionKernel, SectionState};
use tracing::debug;

/// A section's coefficients together with its delay line
#[derive(Debug, Clone, PartialEq)]
pub struct Section<T> {
    coefficients: Coefficients<T>,
    state: SectionState<T>,
    initial: SectionState<T>,
}

impl<T: Sample> Section<T> {
    pub fn new(coefficients: Coefficients<T>, state: SectionState<T>) -> Self {
        Self {
            coefficients,
            state,
            initial: state,
        }
    }

    pub fn coefficients(&self) -> &Coefficients<T> {
        &self.coefficients
    }

    pub fn state(&self) -> &SectionState<T> {
        &self.state
    }

    fn reset(&mut self) {
        self.state = self.initial;
    }
}

/// Ordered chain of sections sharing one kernel
///
/// Each sample passes through the sections in order; the output of
/// section `i` is the input of section `i + 1`. Every section keeps its own
/// state across calls.
#[derive(Debug, Clone)]
pub struct Cascade<K: SectionKernel> {
    kernel: K,
    sections: Vec<Section<K::Sample>>,
}

impl<K: SectionKernel> Cascade<K> {
    pub fn new(kernel: K, sections: Vec<Section<K::Sample>>) -> Self {
        Self { kernel, sections }
    }

    /// Run one sample through every section in order
    ///
    /// An empty cascade returns the input unchanged. On a range violation
    /// the sections already passed have advanced and the failing section
    /// has not.
    #[inline]
    pub fn apply_cascade(&mut self, sample_in: K::Sample) -> Result<K::Sample> {
        let Self { kernel, sections } = self;
        sections.iter_mut().try_fold(sample_in, |x, section| {
            kernel.apply_section(x, &mut section.state, &section.coefficients)
        })
    }

    /// Filter a block, returning a new buffer
    pub fn process(&mut self, input: &[K::Sample]) -> Result<Vec<K::Sample>> {
        input.iter().map(|&x| self.apply_cascade(x)).collect()
    }

    /// Filter a block in place
    pub fn process_in_place(&mut self, buffer: &mut [K::Sample]) -> Result<()> {
        for sample in buffer.iter_mut() {
            *sample = self.apply_cascade(*sample)?;
        }
        Ok(())
    }

    /// Restore every section to its initial history and clear diagnostics
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
        self.kernel.reset();
        debug!(sections = self.sections.len(), "Cascade reset");
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[Section<K::Sample>] {
        &self.sections
    }

    /// State of section `index`, if it exists
    pub fn state(&self, index: usize) -> Option<&SectionState<K::Sample>> {
        self.sections.get(index).map(Section::state)
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Saturation events since construction or the last reset
    ///
    /// Always zero for kernels that do not saturate.
    pub fn saturation_events(&self) -> u64 {
        self.kernel.saturation().map_or(0, |m| m.events())
    }
}

impl Cascade<FixedQ30> {
    /// Build a Q30 cascade from a configuration
    ///
    /// # Errors
    /// Fails if a coefficient is not finite or does not fit in 32 bits.
    pub fn fixed(config: &CascadeConfig) -> Result<Self> {
        let sections: Vec<_> = config
            .quantized_coefficients()?
            .into_iter()
            .zip(&config.sections)
            .map(|(coef, cfg)| Section::new(coef, SectionState::new(cfg.initial_state)))
            .collect();

        debug!(
            sections = sections.len(),
            mode = ?config.check_mode,
            "Built Q30 biquad cascade"
        );
        Ok(Self::new(FixedQ30::new(config.check_mode), sections))
    }
}

impl Cascade<FloatReference> {
    /// Build the double-precision oracle for a configuration
    ///
    /// Coefficients are used unquantised.
    pub fn reference(config: &CascadeConfig) -> Self {
        let sections: Vec<_> = config
            .real_coefficients()
            .into_iter()
            .zip(&config.sections)
            .map(|(coef, cfg)| {
                Section::new(coef, SectionState::new(cfg.initial_state.map(f64::from_raw)))
            })
            .collect();

        debug!(sections = sections.len(), "Built reference biquad cascade");
        Self::new(FloatReference, sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SectionConfig, SectionKind};
    use crate::q30::{CheckMode, PRODUCT_MAX, SAT_MAX};

    fn gain(g: f64) -> SectionConfig {
        SectionConfig::new(SectionKind::Custom, [g, 0.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn empty_cascade_is_passthrough() {
        let mut cascade = Cascade::fixed(&CascadeConfig::default()).unwrap();
        assert!(cascade.is_empty());
        assert_eq!(cascade.apply_cascade(-77).unwrap(), -77);
    }

    #[test]
    fn sections_run_in_order() {
        // 1.5 first saturates, then halves; 0.5 first never saturates
        let mut clip_first = Cascade::fixed(&CascadeConfig::new(vec![gain(1.5), gain(0.5)])).unwrap();
        let y = clip_first.apply_cascade(SAT_MAX).unwrap();
        assert_eq!(y, SAT_MAX / 2 + 1);
        assert_eq!(clip_first.saturation_events(), 1);

        let mut halve_first = Cascade::fixed(&CascadeConfig::new(vec![gain(0.5), gain(1.5)])).unwrap();
        let z = halve_first.apply_cascade(SAT_MAX).unwrap();
        assert_ne!(y, z);
        assert_eq!(halve_first.saturation_events(), 0);
    }

    #[test]
    fn each_section_keeps_its_own_state() {
        let mut cascade = Cascade::fixed(&CascadeConfig::new(vec![gain(0.5), gain(0.5)])).unwrap();
        assert_eq!(cascade.apply_cascade(400).unwrap(), 100);

        assert_eq!(cascade.state(0).unwrap().taps(), &[400, 0, 200, 0]);
        assert_eq!(cascade.state(1).unwrap().taps(), &[200, 0, 100, 0]);
        assert!(cascade.state(2).is_none());
    }

    #[test]
    fn reset_restores_initial_history() {
        let section = SectionConfig::new(SectionKind::Custom, [1.0, 1.0, 0.0, 0.0, 0.0])
            .with_initial_state([10, 0, 0, 0]);
        let mut cascade = Cascade::fixed(&CascadeConfig::new(vec![section])).unwrap();

        assert_eq!(cascade.apply_cascade(5).unwrap(), 15);
        assert_eq!(cascade.apply_cascade(5).unwrap(), 10);

        cascade.reset();
        assert_eq!(cascade.apply_cascade(5).unwrap(), 15);
    }

    #[test]
    fn process_and_in_place_agree() {
        let config = CascadeConfig::notch_bank_with_low_shelf();
        let input: Vec<i64> = (0..256).map(|i| ((i * 7919) % 2001 - 1000) << 16).collect();

        let mut a = Cascade::fixed(&config).unwrap();
        let out = a.process(&input).unwrap();

        let mut b = Cascade::fixed(&config).unwrap();
        let mut buffer = input.clone();
        b.process_in_place(&mut buffer).unwrap();

        assert_eq!(out, buffer);
    }

    #[test]
    fn range_violation_propagates() {
        let mut cascade = Cascade::fixed(&CascadeConfig::new(vec![gain(1.0)])).unwrap();
        let err = cascade.apply_cascade(PRODUCT_MAX).unwrap_err();
        assert!(err.is_range_violation());
        assert_eq!(cascade.state(0).unwrap().taps(), &[0, 0, 0, 0]);
    }

    #[test]
    fn debug_mode_matches_strict() {
        let config = CascadeConfig::notch_bank_with_low_shelf();
        let input: Vec<i64> = (0..128).map(|i| (i % 13 - 6) << 22).collect();

        let strict = Cascade::fixed(&config).unwrap().process(&input).unwrap();
        let debug = Cascade::fixed(&config.clone().with_check_mode(CheckMode::Debug))
            .unwrap()
            .process(&input)
            .unwrap();
        assert_eq!(strict, debug);
    }

    #[test]
    fn reference_uses_initial_history() {
        let section = SectionConfig::new(SectionKind::Custom, [1.0, 0.0, 0.0, 0.5, 0.0])
            .with_initial_state([0, 0, 64, 0]);
        let config = CascadeConfig::new(vec![section]);

        let mut fixed = Cascade::fixed(&config).unwrap();
        let mut reference = Cascade::reference(&config);
        assert_eq!(fixed.apply_cascade(0).unwrap(), 32);
        assert_eq!(reference.apply_cascade(0.0).unwrap(), 32.0);
        assert_eq!(reference.saturation_events(), 0);
    }
}
