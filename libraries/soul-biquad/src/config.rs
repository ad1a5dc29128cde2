//! Cascade configuration
//!
//! Real-valued coefficients and initial histories, loaded from JSON or built
//! in code, and quantised to Q30 when a fixed-point cascade is created.

use crate::error::{BiquadError, Result};
use crate::q30::{quantize_q30, CheckMode};
use crate::section::Coefficients;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Filter shape a section was designed as
///
/// Informational only; processing depends on the coefficients alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Notch,
    LowShelf,
    HighShelf,
    Peaking,
    Lowpass,
    Highpass,
    Bandpass,
    Allpass,
    #[default]
    Custom,
}

/// One section: `[b0, b1, b2, a1, a2]` with feedback signs folded in
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SectionConfig {
    #[serde(default)]
    pub kind: SectionKind,

    pub coefficients: [f64; 5],

    /// `[x[n-1], x[n-2], y[n-1], y[n-2]]` as raw samples
    #[serde(default)]
    pub initial_state: [i64; 4],
}

impl SectionConfig {
    pub fn new(kind: SectionKind, coefficients: [f64; 5]) -> Self {
        Self {
            kind,
            coefficients,
            initial_state: [0; 4],
        }
    }

    pub fn with_initial_state(mut self, state: [i64; 4]) -> Self {
        self.initial_state = state;
        self
    }

    /// Poles strictly inside the unit circle
    ///
    /// With the sign folded into the stored feedback taps the denominator is
    /// `1 - a1 z^-1 - a2 z^-2`.
    pub fn is_stable(&self) -> bool {
        let [_, _, _, a1, a2] = self.coefficients;
        a2.abs() < 1.0 && a1.abs() < 1.0 - a2
    }
}

/// Ordered list of sections plus arithmetic settings
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CascadeConfig {
    #[serde(default)]
    pub check_mode: CheckMode,

    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl CascadeConfig {
    pub fn new(sections: Vec<SectionConfig>) -> Self {
        Self {
            check_mode: CheckMode::default(),
            sections,
        }
    }

    pub fn with_check_mode(mut self, mode: CheckMode) -> Self {
        self.check_mode = mode;
        self
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every coefficient quantises into a 32-bit Q30 word
    ///
    /// Unstable sections are reported with a warning but still accepted;
    /// their output is bounded by saturation.
    pub fn validate(&self) -> Result<()> {
        self.quantized_coefficients().map(|_| ())
    }

    /// Coefficients rounded to Q30
    pub fn quantized_coefficients(&self) -> Result<Vec<Coefficients<i64>>> {
        self.sections
            .iter()
            .enumerate()
            .map(|(section, cfg)| -> Result<Coefficients<i64>> {
                if !cfg.is_stable() {
                    warn!(section, kind = ?cfg.kind, "Section has poles on or outside the unit circle");
                }
                let mut taps = [0i64; 5];
                for (index, (tap, &value)) in
                    taps.iter_mut().zip(cfg.coefficients.iter()).enumerate()
                {
                    *tap = quantize_checked(section, index, value)?;
                }
                Ok(Coefficients::new(taps))
            })
            .collect()
    }

    /// Coefficients as given, for the reference path
    pub fn real_coefficients(&self) -> Vec<Coefficients<f64>> {
        self.sections
            .iter()
            .map(|cfg| Coefficients::new(cfg.coefficients))
            .collect()
    }

    /// Seven notches at 0.05..0.35 fs followed by a 3 dB low shelf at 1 kHz/48 kHz
    ///
    /// The last section's gain drives a full-scale input into saturation.
    #[rustfmt::skip]
    pub fn notch_bank_with_low_shelf() -> Self {
        let notch = |c: [f64; 5]| SectionConfig::new(SectionKind::Notch, c);
        Self::new(vec![
            notch([0.8661694582551718, -1.6475522154942155, 0.8661694582551718, 1.6475522154942155, -0.7323389174416661]),
            notch([0.7728616576641798, -1.2505164304748178, 0.7728616576641798, 1.2505164304748178, -0.5457233153283596]),
            notch([0.7119928449392319, -0.8369977874681354, 0.7119928449392319, 0.8369977874681354, -0.42398568894714117]),
            notch([0.6777233807370067, -0.41885608434677124, 0.6777233807370067, 0.41885608434677124, -0.3554467624053359]),
            notch([0.6666666669771075, 0.0, 0.6666666669771075, 0.0, -0.3333333330228925]),
            notch([0.6777233807370067, 0.41885608434677124, 0.6777233807370067, -0.41885608434677124, -0.3554467624053359]),
            notch([0.7119928449392319, 0.8369977874681354, 0.7119928449392319, -0.8369977874681354, -0.42398568894714117]),
            SectionConfig::new(
                SectionKind::LowShelf,
                [1.012055790051818, -1.8705660654231906, 0.8777095526456833, 1.8733696807175875, -0.8869617283344269],
            ),
        ])
    }
}

fn quantize_checked(section: usize, index: usize, value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(BiquadError::NonFiniteCoefficient {
            section,
            index,
            value,
        });
    }
    let q = quantize_q30(value);
    if i32::try_from(q).is_err() {
        return Err(BiquadError::CoefficientOutOfRange {
            section,
            index,
            value,
        });
    }
    Ok(q)
}
