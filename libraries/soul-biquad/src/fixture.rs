//! Test vector rendering
//!
//! Captures a stimulus, the quantised coefficient table and the bit-exact
//! fixed-point response, and renders them as C array initialisers for
//! hardware or firmware test benches:
//!
//! ```text
//! int32_t samples[126] = {0, 0, 0, 0, -1, 1, ...};
//! int32_t coef[0x5][0x8] = {{0x376f5206, ...},{...},...};
//! int32_t Y_exp[126] = {0, 0, 0, 0, -1, 1, ...};
//! ```
//!
//! The coefficient table is transposed: row `r` holds tap `r` of every
//! section, padded with zeros up to [`MAX_SECTIONS`] columns. Array
//! dimensions are printed in the same format as the values.

use crate::cascade::Cascade;
use crate::config::CascadeConfig;
use crate::error::{BiquadError, Result};

/// Columns in the rendered coefficient table
pub const MAX_SECTIONS: usize = 8;

/// How values are printed in a rendered array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Decimal,
    /// Two's complement 32-bit hex (`0xffffffff` for -1)
    Hex32,
}

impl ValueFormat {
    fn render(self, value: i64) -> String {
        match self {
            ValueFormat::Decimal => value.to_string(),
            ValueFormat::Hex32 => format!("{:#x}", value as u32),
        }
    }
}

/// Stimulus, coefficients and expected response of one run
#[derive(Debug, Clone, PartialEq)]
pub struct TestVector {
    pub samples: Vec<i64>,
    /// `coefficients[tap][section]`
    pub coefficients: [[i64; MAX_SECTIONS]; 5],
    pub expected: Vec<i64>,
    pub section_count: usize,
    pub saturation_events: u64,
}

impl TestVector {
    /// Run `samples` through a fresh fixed-point cascade built from `config`
    ///
    /// # Errors
    /// [`BiquadError::TooManySections`] if the cascade does not fit the
    /// coefficient table, plus any error from building or running it.
    pub fn generate(config: &CascadeConfig, samples: &[i64]) -> Result<Self> {
        if config.section_count() > MAX_SECTIONS {
            return Err(BiquadError::TooManySections {
                sections: config.section_count(),
                max: MAX_SECTIONS,
            });
        }

        let mut cascade = Cascade::fixed(config)?;
        let expected = cascade.process(samples)?;

        let mut coefficients = [[0i64; MAX_SECTIONS]; 5];
        for (column, section) in cascade.sections().iter().enumerate() {
            for (row, &tap) in section.coefficients().taps().iter().enumerate() {
                coefficients[row][column] = tap;
            }
        }

        Ok(Self {
            samples: samples.to_vec(),
            coefficients,
            expected,
            section_count: cascade.len(),
            saturation_events: cascade.saturation_events(),
        })
    }

    /// Render as three C declarations, one per line
    pub fn render_c(&self) -> String {
        let rows: Vec<&[i64]> = self.coefficients.iter().map(|r| r.as_slice()).collect();
        [
            render_c_array("samples", &[self.samples.as_slice()], ValueFormat::Decimal),
            render_c_array("coef", &rows, ValueFormat::Hex32),
            render_c_array("Y_exp", &[self.expected.as_slice()], ValueFormat::Decimal),
        ]
        .iter()
        .map(|line| format!("    {line}\n"))
        .collect()
    }
}

/// Render `rows` as an `int32_t` array declaration
///
/// A single row produces a one-dimensional array, several rows a
/// two-dimensional one. Rows must all have the same length. Dimensions use
/// `format` too, so a hex table is declared as `coef[0x5][0x8]`.
pub fn render_c_array(name: &str, rows: &[&[i64]], format: ValueFormat) -> String {
    let width = rows.first().map_or(0, |r| r.len());
    debug_assert!(rows.iter().all(|r| r.len() == width), "ragged rows in {name}");
    let dim = |n: usize| format.render(n as i64);

    if let [row] = rows {
        return format!("int32_t {name}[{}] = {};", dim(width), write_row(row, format));
    }

    let body: Vec<String> = rows.iter().map(|row| write_row(row, format)).collect();
    format!(
        "int32_t {name}[{}][{}] = {{{}}};",
        dim(rows.len()),
        dim(width),
        body.join(",")
    )
}

fn write_row(row: &[i64], format: ValueFormat) -> String {
    let values: Vec<String> = row.iter().map(|&v| format.render(v)).collect();
    format!("{{{}}}", values.join(", "))
}
